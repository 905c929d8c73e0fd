use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// API response for health and readiness checks
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    /// Live WebSocket connections, reported by the readiness check only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connections: Option<u32>,
}
