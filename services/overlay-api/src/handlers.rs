//! HTTP handlers.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{StatusCode, Uri},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use metrics::counter;
use overlay_common::resolve_fallback;
use tracing::debug;

use crate::routes::STATIC_PREFIX;
use crate::state::AppState;

pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Prometheus text exposition.
pub async fn metrics_handler(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    match &state.prometheus {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::OK, String::new()),
    }
}

/// Called by the static layer when a file is not on disk.
///
/// `uri` has the static prefix already stripped. Tiles the previous run
/// still covers get a temporary redirect; everything else is a JSON 404.
pub async fn tile_fallback_handler(uri: Uri) -> Response {
    let requested = uri.path();
    let relative = requested.trim_start_matches('/');

    match resolve_fallback(relative) {
        Ok(target) => {
            let location = format!("{}/{}", STATIC_PREFIX, target.to_path());
            debug!(requested = %requested, location = %location, "Redirecting to previous run");
            counter!("overlay_fallback_redirects_total").increment(1);
            Redirect::temporary(&location).into_response()
        }
        Err(e) => {
            debug!(requested = %requested, reason = %e, "Tile not found");
            counter!("overlay_tile_not_found_total").increment(1);
            not_found(&format!("{}{}", STATIC_PREFIX, requested))
        }
    }
}

/// Any route the router does not know.
pub async fn not_found_handler(uri: Uri) -> Response {
    debug!(path = %uri.path(), "No route");
    not_found(uri.path())
}

fn not_found(path: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "error": "Resource not found",
            "path": path,
        })),
    )
        .into_response()
}
