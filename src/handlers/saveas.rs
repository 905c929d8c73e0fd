use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, info};

use crate::{models::ErrorResponse, AppState};

/// Download the current document text as an attachment named `name`.
///
/// The name is used as given; only values that cannot be carried in a header
/// at all are refused.
pub async fn save_as(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", name)).map_err(|e| {
        error!("Cannot use '{}' as a download name: {}", name, e);
        ErrorResponse::reply(StatusCode::BAD_REQUEST, format!("Invalid file name '{}'", name))
    })?;

    let text = state.hub.lock().await.snapshot();
    info!("Exporting document as '{}' ({} bytes)", name, text.len());

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        text,
    )
        .into_response())
}
