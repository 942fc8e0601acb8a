//! Materiality Calculation API Server
//!
//! JSON API and one-time web form around the materiality calculator core.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_governor::GovernorLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod error;
mod rate_limit;
mod routes;
mod settings;

pub use error::ApiError;
pub use settings::{RateLimitSettings, Settings};

use form_session::SessionStore;

/// Application state shared across handlers
pub struct AppState {
    /// One-time form sessions
    pub sessions: SessionStore,
    /// Service settings
    pub settings: Settings,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(settings: Settings) -> Self {
        Self {
            sessions: SessionStore::new(Duration::from_secs(settings.session_ttl_secs)),
            settings,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        }
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub active_sessions: usize,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let governor = rate_limit::create_governor_config(&state.settings.rate_limit);

    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/calculate", post(routes::calculate::calculate))
        .route(
            "/api/v1/generate-form",
            get(routes::form::generate_form).layer(GovernorLayer { config: governor }),
        )
        .route("/form/:session_id", get(routes::form::render_form))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        active_sessions: state.sessions.active_count(),
    })
}

/// Initialize logging
pub fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

/// Run the server until shutdown
pub async fn run_server(settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    let addr = settings.bind_addr.clone();
    let state = Arc::new(AppState::new(settings));
    let app = create_router(state);

    info!("Starting materiality service on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    // connect_info is required by the peer-IP rate limiter
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
