//! HTTP API consumed by the dashboard.
//!
//! All `/api` routes except health and registration require the caller's
//! user id in the `X-User-Id` header (see [`auth::CurrentUser`]).

mod auth;
mod error;
mod extract;
mod handlers;
mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header},
    routing::get,
};
use chrono::{NaiveDate, Utc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::application::FinanceService;

pub use auth::{CurrentUser, USER_ID_HEADER};
pub use error::{ApiError, MessageBody};

/// Source of "today" for date-dependent endpoints.
pub type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

#[derive(Clone)]
pub struct AppState {
    pub service: FinanceService,
    clock: Clock,
}

impl AppState {
    /// State backed by the system clock (UTC).
    pub fn new(service: FinanceService) -> Self {
        Self::with_clock(service, Arc::new(|| Utc::now().date_naive()))
    }

    pub fn with_clock(service: FinanceService, clock: Clock) -> Self {
        Self { service, clock }
    }

    pub fn today(&self) -> NaiveDate {
        (self.clock)()
    }
}

/// Where and how to serve the API.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origin allowed to call the API from a browser.
    pub cors_origin: String,
}

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .merge(routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origin: &str) -> anyhow::Result<CorsLayer> {
    let origin: HeaderValue = origin
        .parse()
        .with_context(|| format!("Invalid CORS origin: {}", origin))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(USER_ID_HEADER),
        ]))
}

/// Serve the API until Ctrl-C.
pub async fn run_server(service: FinanceService, config: ServerConfig) -> anyhow::Result<()> {
    let app = router(AppState::new(service)).layer(cors_layer(&config.cors_origin)?);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.host, config.port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(%addr, cors_origin = %config.cors_origin, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
