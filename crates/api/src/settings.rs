//! Service Configuration
//!
//! Settings are layered: `config/default.toml` (optional) first, then
//! `MATERIALITY_`-prefixed environment variables, e.g.
//! `MATERIALITY_BIND_ADDR=0.0.0.0:9000` or
//! `MATERIALITY_RATE_LIMIT__BURST_SIZE=10`.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Rate limit knobs for the form-generation endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitSettings {
    /// Seconds per replenished request
    #[serde(default = "default_per_second")]
    pub per_second: u64,
    /// Requests allowed in an immediate burst
    #[serde(default = "default_burst_size")]
    pub burst_size: u32,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            per_second: default_per_second(),
            burst_size: default_burst_size(),
        }
    }
}

/// Top-level service settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Socket address the server binds to
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Base URL used when building form links for clients
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// Maximum indicators accepted per calculation request
    #[serde(default = "default_max_indicators")]
    pub max_indicators: usize,
    /// Form session time-to-live in seconds
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
    /// Rate limiting for form generation
    #[serde(default)]
    pub rate_limit: RateLimitSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            public_base_url: default_public_base_url(),
            max_indicators: default_max_indicators(),
            session_ttl_secs: default_session_ttl_secs(),
            rate_limit: RateLimitSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from file and environment
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(Environment::with_prefix("MATERIALITY").separator("__"))
            .build()?
            .try_deserialize()
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_public_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_max_indicators() -> usize {
    50
}

fn default_session_ttl_secs() -> u64 {
    600
}

fn default_per_second() -> u64 {
    2
}

fn default_burst_size() -> u32 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.bind_addr, "0.0.0.0:8080");
        assert_eq!(settings.max_indicators, 50);
        assert_eq!(settings.session_ttl_secs, 600);
        assert_eq!(settings.rate_limit.burst_size, 5);
    }
}
