//! HTTP surface: input page, health check and the agent endpoint.

pub mod error;
pub mod handlers;
pub mod models;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;

use crate::agent::Agent;
use crate::config::ServerConfig;
use crate::error::Result;
use crate::util::RequestIdGenerator;

pub use error::ApiError;
pub use models::{ErrorResponse, HealthResponse, UserInput, UserInputResponse};

/// Application state shared with all routes.
#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<Agent>,
    pub ids: Arc<RequestIdGenerator>,
    pub static_dir: PathBuf,
}

impl AppState {
    pub fn new(agent: Arc<Agent>, static_dir: impl Into<PathBuf>) -> Self {
        Self {
            agent,
            ids: Arc::new(RequestIdGenerator::default()),
            static_dir: static_dir.into(),
        }
    }
}

/// Build the router.
pub fn create_app(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.static_dir);

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/api/input", post(handlers::receive_user_input))
        .nest_service("/static", static_files)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until Ctrl-C.
pub async fn serve(config: &ServerConfig, agent: Arc<Agent>) -> Result<()> {
    let addr = config.socket_addr()?;
    let app = create_app(AppState::new(agent, config.static_dir.clone()));

    let listener = TcpListener::bind(addr).await?;
    info!("Starting Miki User Input API server on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
