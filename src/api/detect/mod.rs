// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection API endpoint module
//!
//! Provides POST /detect for finding objects in images.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::{detect_handler, run_detection};
pub use request::DetectionRequest;
pub use response::{Detection, DetectionResponse};
