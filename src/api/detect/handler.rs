// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection endpoint handler

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use tracing::{error, info, warn};

use super::request::DetectionRequest;
use super::response::DetectionResponse;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::vision::image_utils::color_mode;
use crate::vision::{decode_base64_image, flatten_alpha, ObjectDetector};

/// POST /detect - Detect objects in an image
///
/// Accepts a base64-encoded image and returns detected objects with bounding boxes.
///
/// # Request
/// - `image`: Base64-encoded image data (required)
///
/// # Response
/// - `success`: Always `true`
/// - `detections`: `{class, confidence, bbox: [x1, y1, x2, y2]}` in model output order
/// - `count`: Number of detections
///
/// # Errors
/// - 400 Bad Request: body is not JSON, `image` missing, or image undecodable
/// - 413 Payload Too Large: body over the server limit
/// - 500 Internal Server Error: detection failed
pub async fn detect_handler(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<DetectionResponse>, ApiError> {
    info!("Detection request received");

    // 1. Parse JSON body
    let Json(body) = payload.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            warn!("Detection request rejected: {}", rejection.body_text());
            ApiError::PayloadTooLarge
        } else {
            warn!("Detection request is not JSON: {}", rejection.body_text());
            ApiError::InvalidJson
        }
    })?;

    // 2. Validate request
    let request = DetectionRequest::from_json(&body).map_err(|e| {
        warn!("Detection validation failed: {}", e);
        e
    })?;

    // 3. Decode and run inference off the async executor
    let detector = state.detector.clone();
    let response = tokio::task::spawn_blocking(move || run_detection(detector.as_ref(), &request))
        .await
        .map_err(|e| {
            error!("Detection task failed: {}", e);
            ApiError::InternalError(format!("Detection task failed: {}", e))
        })??;

    Ok(Json(response))
}

/// Decode, normalize, detect, and map one request
pub fn run_detection(
    detector: &dyn ObjectDetector,
    request: &DetectionRequest,
) -> Result<DetectionResponse, ApiError> {
    let (image, image_info) = decode_base64_image(&request.image).map_err(|e| {
        error!("Image decode error: {}", e);
        ApiError::from(e)
    })?;

    let image = flatten_alpha(image);

    info!(
        "Image size: {}x{}, mode: {} (decoded as {}, {} bytes)",
        image.width(),
        image.height(),
        color_mode(image.color()),
        image_info.mode(),
        image_info.size_bytes
    );

    let groups = detector.detect(&image).map_err(|e| {
        error!("Detection error: {:#}", e);
        ApiError::from(e)
    })?;

    let response = DetectionResponse::from_groups(&groups).map_err(|e| {
        error!("Detection error: {}", e);
        e
    })?;

    info!("Found {} objects", response.count);

    Ok(response)
}
