// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the Iris detection node

/// API contract version reported by `GET /health`
pub const API_VERSION: &str = "1.0";

/// Crate version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Service title reported by `GET /`
pub const SERVICE_TITLE: &str = "YOLO Object Detection API";

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Iris Detection Node {} (API {})", VERSION_NUMBER, API_VERSION)
}
