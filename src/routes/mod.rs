pub mod api;

use std::sync::Arc;
use axum::{http::HeaderValue, routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::Config, docs::ApiDoc, handlers::save_as, websocket::websocket_handler, AppState};
use api::create_api_routes;

/// Build the full HTTP + WebSocket surface
pub fn create_router(state: Arc<AppState>, config: &Config) -> Router {
    let page = ServeFile::new(config.static_dir.join("collabo.html"));

    let router = Router::new()
        .route_service("/", page)
        .nest_service("/static", ServeDir::new(&config.static_dir))
        .route("/ws", get(websocket_handler))
        .route("/saveas/:name", get(save_as))
        .nest("/api", create_api_routes())
        .with_state(state)
        .merge(SwaggerUi::new("/swagger").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http());

    match config.cors_origins.as_deref() {
        Some(origins) => router.layer(cors_layer(origins)),
        None => router,
    }
}

fn cors_layer(origins: &str) -> CorsLayer {
    if origins.trim() == "*" {
        return CorsLayer::new().allow_origin(Any).allow_methods(Any);
    }
    let allowed: Vec<HeaderValue> = origins
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin '{}': {}", o, e);
                None
            }
        })
        .collect();
    CorsLayer::new().allow_origin(allowed).allow_methods(Any)
}
