// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! GET /health and GET / tests

use axum::http::StatusCode;
use serde_json::json;

use super::common::*;

#[tokio::test]
async fn test_health_reports_model_and_version() {
    let app = app_with(DarkRegionDetector);
    let response = send(&app, get_request("/health")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"status": "healthy", "model": TEST_MODEL_NAME, "version": "1.0"})
    );
}

#[tokio::test]
async fn test_health_unchanged_after_failed_requests() {
    let mut detector = MockDetector::new();
    detector
        .expect_detect()
        .returning(|_| Err(anyhow::anyhow!("model failure")));
    let app = app_with(detector);

    let before = body_json(send(&app, get_request("/health")).await).await;

    let image = square_on_white(10, 10, [1, 1, 3, 3]);
    let failed = send(&app, detect_request(&png_base64(&image))).await;
    assert_eq!(failed.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let rejected = send(&app, json_request("/detect", "{}")).await;
    assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);

    let after = body_json(send(&app, get_request("/health")).await).await;
    assert_eq!(before, after);
    assert_eq!(after["status"], "healthy");
}

#[tokio::test]
async fn test_index_lists_endpoints() {
    let app = app_with(DarkRegionDetector);
    let response = send(&app, get_request("/")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({
            "message": "YOLO Object Detection API",
            "endpoints": {
                "/health": "GET - Check API health",
                "/detect": "POST - Detect objects in image"
            }
        })
    );
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = app_with(DarkRegionDetector);
    let response = send(&app, get_request("/v1/models")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cors_headers_present() {
    let app = app_with(DarkRegionDetector);
    let request = axum::http::Request::builder()
        .uri("/health")
        .header("origin", "http://example.com")
        .body(axum::body::Body::empty())
        .unwrap();

    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .contains_key("access-control-allow-origin"));
}
