use std::sync::Arc;

use anyhow::Context;
use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::fetcher::AVAILABILITY_PATH;
use crate::models::AvailabilityRecord;
use crate::normalize::normalize_rows;
use crate::sources::RowSource;

#[derive(Clone)]
struct AppState {
    source: Arc<dyn RowSource>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    source: &'static str,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    detail: String,
    stack: String,
}

/// Any failure behind a handler; always rendered as a 500 with the error chain
struct ApiError(anyhow::Error);

impl From<anyhow::Error> for ApiError {
    fn from(value: anyhow::Error) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!(error = ?self.0, "Availability request failed");
        let body = ErrorResponse {
            error: "Server Error",
            detail: self.0.to_string(),
            stack: format!("{:?}", self.0),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        source: state.source.source_name(),
    })
}

async fn availability_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<AvailabilityRecord>>, ApiError> {
    info!("📥 {} requested", AVAILABILITY_PATH);
    let rows = state
        .source
        .fetch_rows()
        .await
        .with_context(|| format!("Failed to read rows from {}", state.source.source_name()))?;
    Ok(Json(normalize_rows(&rows)))
}

/// Routes for the availability backend.
pub fn router(source: Arc<dyn RowSource>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health_handler))
        .route(AVAILABILITY_PATH, get(availability_handler))
        .with_state(AppState { source })
        .layer(cors)
}

/// Serve the backend on `listener` until ctrl-c.
pub async fn serve(listener: TcpListener, source: Arc<dyn RowSource>) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    info!("Server running at http://{}", addr);
    info!("  source: {}", source.source_name());

    axum::serve(listener, router(source))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await
        .context("HTTP server failed")?;
    Ok(())
}
