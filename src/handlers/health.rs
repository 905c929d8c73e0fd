use std::sync::Arc;
use axum::{extract::State, Json};
use crate::{models::HealthResponse, AppState};
use tracing::debug;

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    debug!("Health check requested");
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "Server is running".to_string(),
        connections: None,
    })
}

/// Readiness check endpoint
pub async fn ready_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    debug!("Readiness check requested");
    let connections = state.hub.lock().await.connection_count() as u32;
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "Service is ready".to_string(),
        connections: Some(connections),
    })
}
