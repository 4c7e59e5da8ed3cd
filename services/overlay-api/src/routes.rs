//! Router assembly.

use std::sync::Arc;

use axum::{handler::HandlerWithoutStateExt, routing::get, Extension, Router};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::handlers;
use crate::state::AppState;

/// URL prefix the tile tree is mounted at.
pub const STATIC_PREFIX: &str = "/v1/metoffice/datahub";

pub fn build_router(state: AppState) -> Router {
    let tiles = ServeDir::new(&state.root_dir)
        .append_index_html_on_directories(false)
        .fallback(handlers::tile_fallback_handler.into_service());

    Router::new()
        .route("/healthz", get(handlers::health_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .nest_service(STATIC_PREFIX, tiles)
        .fallback(handlers::not_found_handler)
        .layer(Extension(Arc::new(state)))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
