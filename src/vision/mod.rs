// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing module for CPU-based object detection
//!
//! This module provides:
//! - Base64 image decoding and alpha flattening
//! - Object detection via an Ultralytics YOLO ONNX export

pub mod detection;
pub mod image_utils;

pub use detection::{
    ClassNames, DetectionGroup, DetectionParams, ObjectDetector, RawDetection, YoloModelConfig,
    YoloOnnxDetector,
};
pub use image_utils::{decode_base64_image, decode_image_bytes, detect_format, flatten_alpha, ImageError, ImageInfo};
