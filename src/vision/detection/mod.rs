// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Object detection models
//!
//! Components:
//! - `labels` - Class index to label tables
//! - `preprocessing` - Letterbox resize into NCHW tensors
//! - `postprocess` - Output decoding and non-maximum suppression
//! - `yolo` - Ultralytics YOLO exported to ONNX

pub mod labels;
pub mod postprocess;
pub mod preprocessing;
pub mod yolo;

use std::sync::Arc;

use image::DynamicImage;

pub use labels::{ClassNames, COCO_CLASSES};
pub use preprocessing::Letterbox;
pub use yolo::{YoloModelConfig, YoloOnnxDetector};

/// Default letterbox size for YOLO exports
pub const DEFAULT_INPUT_SIZE: u32 = 640;

/// One detected object as produced by a model
#[derive(Debug, Clone, PartialEq)]
pub struct RawDetection {
    /// Index into the group's class table
    pub class_id: usize,
    /// Confidence score (0.0-1.0)
    pub confidence: f32,
    /// `[x1, y1, x2, y2]` in original image pixels
    pub bbox: [f32; 4],
}

/// A batch of detections sharing one class table
#[derive(Debug, Clone)]
pub struct DetectionGroup {
    pub names: Arc<ClassNames>,
    pub detections: Vec<RawDetection>,
}

impl DetectionGroup {
    pub fn new(names: Arc<ClassNames>, detections: Vec<RawDetection>) -> Self {
        Self { names, detections }
    }
}

/// Thresholds and sizes used to turn raw model output into detections
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionParams {
    /// Square letterbox size fed to the model
    pub input_size: u32,
    /// Minimum confidence kept
    pub conf_threshold: f32,
    /// IoU above which same-class boxes are suppressed
    pub iou_threshold: f32,
    /// Upper bound on detections per image
    pub max_detections: usize,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            input_size: DEFAULT_INPUT_SIZE,
            conf_threshold: 0.25,
            iou_threshold: 0.7,
            max_detections: 300,
        }
    }
}

impl DetectionParams {
    /// Clamp thresholds into [0, 1] and sizes to at least 1
    ///
    /// Non-finite thresholds fall back to the defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        self.conf_threshold = clamp_threshold(self.conf_threshold, defaults.conf_threshold);
        self.iou_threshold = clamp_threshold(self.iou_threshold, defaults.iou_threshold);
        self.input_size = self.input_size.max(1);
        self.max_detections = self.max_detections.max(1);
        self
    }
}

fn clamp_threshold(value: f32, default: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        default
    }
}

/// Opaque image -> detections function shared by every request
///
/// Implementations must be safe to call from several threads at once.
pub trait ObjectDetector: Send + Sync {
    /// Run inference on an RGB or grayscale image
    fn detect(&self, image: &DynamicImage) -> anyhow::Result<Vec<DetectionGroup>>;
}
