//! Form Session Store
//!
//! Ephemeral one-time tokens gating access to the calculation web form.
//! Each session is valid for a configurable TTL and can be claimed exactly
//! once. Everything lives in memory; nothing survives a restart.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

/// Errors when claiming a form session
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    /// Token was never issued or has been purged
    #[error("Session not found")]
    NotFound,

    /// Token TTL has elapsed
    #[error("Session has expired")]
    Expired,

    /// Token was already claimed once
    #[error("Session has already been used")]
    AlreadyUsed,

    /// Store lock failure
    #[error("Session store error: {0}")]
    Store(String),
}

/// A single issued session
#[derive(Debug, Clone)]
struct SessionState {
    expires_at: SystemTime,
    used: bool,
}

/// An issued session token with its expiry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IssuedSession {
    pub token: Uuid,
    /// Expiry as seconds since the Unix epoch, for the client-side timer
    pub expires_at_epoch: u64,
}

/// In-memory store of one-time form sessions
pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, SessionState>>,
    ttl: Duration,
}

impl SessionStore {
    /// Create a store issuing sessions with the given TTL
    pub fn new(ttl: Duration) -> Self {
        info!("Creating form session store with TTL {:?}", ttl);
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Issue a new session token
    pub fn create(&self) -> Result<IssuedSession, SessionError> {
        let token = Uuid::new_v4();
        let expires_at = SystemTime::now() + self.ttl;

        let mut sessions = self
            .sessions
            .lock()
            .map_err(|e| SessionError::Store(format!("Lock error: {}", e)))?;

        // Drop expired entries while we hold the lock anyway
        let now = SystemTime::now();
        sessions.retain(|_, state| state.expires_at > now);

        sessions.insert(
            token,
            SessionState {
                expires_at,
                used: false,
            },
        );
        debug!(%token, "Issued form session");

        Ok(IssuedSession {
            token,
            expires_at_epoch: expires_at
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        })
    }

    /// Claim a session, marking it used. Succeeds at most once per token.
    pub fn claim(&self, token: Uuid) -> Result<IssuedSession, SessionError> {
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|e| SessionError::Store(format!("Lock error: {}", e)))?;

        let state = sessions.get_mut(&token).ok_or(SessionError::NotFound)?;

        if SystemTime::now() > state.expires_at {
            return Err(SessionError::Expired);
        }
        if state.used {
            return Err(SessionError::AlreadyUsed);
        }
        state.used = true;
        debug!(%token, "Form session claimed");

        Ok(IssuedSession {
            token,
            expires_at_epoch: state
                .expires_at
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        })
    }

    /// Number of live (unexpired) sessions
    pub fn active_count(&self) -> usize {
        let now = SystemTime::now();
        self.sessions
            .lock()
            .map(|s| s.values().filter(|st| st.expires_at > now).count())
            .unwrap_or(0)
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(600))
    }
}
