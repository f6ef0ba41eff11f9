// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::api::http_server::AppState;
use crate::version::{API_VERSION, SERVICE_TITLE};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
    pub version: String,
}

impl HealthResponse {
    pub fn healthy(model: &str) -> Self {
        Self {
            status: "healthy".to_string(),
            model: model.to_string(),
            version: API_VERSION.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexResponse {
    pub message: String,
    pub endpoints: BTreeMap<String, String>,
}

impl Default for IndexResponse {
    fn default() -> Self {
        let endpoints = [
            ("/health", "GET - Check API health"),
            ("/detect", "POST - Detect objects in image"),
        ]
        .into_iter()
        .map(|(path, description)| (path.to_string(), description.to_string()))
        .collect();

        Self {
            message: SERVICE_TITLE.to_string(),
            endpoints,
        }
    }
}

/// GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(&state.model_name))
}

/// GET /
pub async fn index_handler() -> Json<IndexResponse> {
    Json(IndexResponse::default())
}
