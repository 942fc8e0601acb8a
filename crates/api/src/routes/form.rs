//! Web Form Routes
//!
//! The form flow is two-step: a client first requests a form link, which
//! allocates a one-time session, then opens the link to get the HTML
//! calculator form. Each link works once and expires after the session TTL.

use axum::extract::{Path, State};
use axum::response::Html;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::AppState;

/// Calculator form page, expiry and session injected at render time
const FORM_TEMPLATE: &str = include_str!("../../templates/form.html");

/// Response for the form-generation endpoint
#[derive(Debug, Serialize)]
pub struct GenerateFormResponse {
    /// Absolute URL of the one-time form
    pub form_url: String,
    /// Session expiry as seconds since the Unix epoch
    pub expires_at: u64,
}

/// Issue a one-time form link
pub async fn generate_form(
    State(state): State<Arc<AppState>>,
) -> Result<Json<GenerateFormResponse>, ApiError> {
    let issued = state.sessions.create()?;
    let form_url = format!(
        "{}/form/{}",
        state.settings.public_base_url.trim_end_matches('/'),
        issued.token
    );

    info!(token = %issued.token, "form session issued");

    Ok(Json(GenerateFormResponse {
        form_url,
        expires_at: issued.expires_at_epoch,
    }))
}

/// Serve the calculator form for a previously issued session
pub async fn render_form(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Html<String>, ApiError> {
    let token = Uuid::parse_str(&session_id).map_err(|_| ApiError::InvalidToken)?;
    let session = state.sessions.claim(token)?;

    let page = FORM_TEMPLATE
        .replace("{{expires_at}}", &session.expires_at_epoch.to_string())
        .replace("{{session_id}}", &session.token.to_string());

    Ok(Html(page))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use form_session::SessionError;

    fn state() -> Arc<AppState> {
        Arc::new(AppState::new(Settings::default()))
    }

    #[tokio::test]
    async fn test_generate_form_returns_absolute_url() {
        let response = generate_form(State(state())).await.unwrap();
        assert!(response.0.form_url.starts_with("http://localhost:8080/form/"));
        assert!(response.0.expires_at > 0);
    }

    #[tokio::test]
    async fn test_form_link_works_once() {
        let state = state();
        let issued = generate_form(State(state.clone())).await.unwrap();
        let token = issued.0.form_url.rsplit('/').next().unwrap().to_string();

        let page = render_form(State(state.clone()), Path(token.clone()))
            .await
            .unwrap();
        assert!(page.0.contains("Materiality"));
        assert!(!page.0.contains("{{expires_at}}"));

        let err = render_form(State(state), Path(token)).await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::Session(SessionError::AlreadyUsed)
        ));
    }

    #[tokio::test]
    async fn test_unknown_session_not_found() {
        let err = render_form(State(state()), Path(Uuid::new_v4().to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Session(SessionError::NotFound)));
    }

    #[tokio::test]
    async fn test_malformed_token_rejected() {
        let err = render_form(State(state()), Path("not-a-uuid".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidToken));
    }
}
