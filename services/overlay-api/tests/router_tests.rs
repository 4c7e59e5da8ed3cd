//! Tests for the tile router: static hits, fallback redirects and 404s.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use overlay_api::{build_router, AppState};
use test_utils::solid_png;

fn router_with_tiles(tiles: &[&str]) -> (tempfile::TempDir, Router) {
    let root = tempfile::tempdir().unwrap();
    for tile in tiles {
        let path = root.path().join(tile);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, solid_png(2, 2, [1, 2, 3, 4])).unwrap();
    }
    let router = build_router(AppState::new(root.path()));
    (root, router)
}

async fn get(router: &Router, uri: &str) -> axum::response::Response {
    router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// ============================================================================
// Health and metrics
// ============================================================================

#[tokio::test]
async fn test_healthz() {
    let (_root, router) = router_with_tiles(&[]);
    let response = get(&router, "/healthz").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"OK");
}

#[tokio::test]
async fn test_metrics_without_recorder() {
    let (_root, router) = router_with_tiles(&[]);
    let response = get(&router, "/metrics").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_metrics_with_handle() {
    let root = tempfile::tempdir().unwrap();
    let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
    let router = build_router(AppState::new(root.path()).with_prometheus(recorder.handle()));

    let response = get(&router, "/metrics").await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ============================================================================
// Static tiles
// ============================================================================

#[tokio::test]
async fn test_existing_tile_served() {
    let (_root, router) =
        router_with_tiles(&["total_precipitation_rate/2023/10/15/20.png"]);

    let response = get(
        &router,
        "/v1/metoffice/datahub/total_precipitation_rate/2023/10/15/20.png",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/png"
    );
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], &solid_png(2, 2, [1, 2, 3, 4])[..]);
}

// ============================================================================
// Fallback
// ============================================================================

#[tokio::test]
async fn test_missing_tile_redirects_to_previous_run() {
    let (_root, router) = router_with_tiles(&[]);

    let response = get(
        &router,
        "/v1/metoffice/datahub/total_precipitation_rate/2023/10/15/20.png",
    )
    .await;

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/v1/metoffice/datahub/total_precipitation_rate/2023/10/14/44.png"
    );
}

#[tokio::test]
async fn test_redirect_target_is_served() {
    let (_root, router) =
        router_with_tiles(&["cloud_amount_total/2023/12/31/30.png"]);

    let first = get(&router, "/v1/metoffice/datahub/cloud_amount_total/2024/01/01/06.png").await;
    assert_eq!(first.status(), StatusCode::TEMPORARY_REDIRECT);
    let location = first
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();

    let second = get(&router, &location).await;
    assert_eq!(second.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_hour_beyond_previous_run_is_not_found() {
    let (_root, router) = router_with_tiles(&[]);

    let response = get(
        &router,
        "/v1/metoffice/datahub/total_precipitation_rate/2023/10/15/50.png",
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({
            "error": "Resource not found",
            "path": "/v1/metoffice/datahub/total_precipitation_rate/2023/10/15/50.png"
        })
    );
}

#[tokio::test]
async fn test_hour_48_redirects_to_last_hour() {
    let (_root, router) = router_with_tiles(&[]);

    let response = get(&router, "/v1/metoffice/datahub/cloud_amount_total/2024/03/01/48.png").await;

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/v1/metoffice/datahub/cloud_amount_total/2024/02/29/72.png"
    );
}

#[tokio::test]
async fn test_unrecognised_path_is_not_found() {
    let (_root, router) = router_with_tiles(&[]);

    for path in [
        "/v1/metoffice/datahub/readme.txt",
        "/v1/metoffice/datahub/total_precipitation_rate/2023/10/15/7.png",
        "/v1/metoffice/datahub/total_precipitation_rate/2023/13/40/07.png",
    ] {
        let response = get(&router, path).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{path}");
        let body = body_json(response).await;
        assert_eq!(body["error"], "Resource not found");
        assert_eq!(body["path"], path);
    }
}

#[tokio::test]
async fn test_outside_prefix_is_json_404() {
    let (_root, router) = router_with_tiles(&["x/2023/10/15/20.png"]);

    for path in ["/x/2023/10/15/20.png", "/", "/v2/metoffice/datahub/x.png"] {
        let response = get(&router, path).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{path}");
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "error": "Resource not found", "path": path })
        );
    }
}
