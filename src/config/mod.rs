// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Server configuration from command-line flags and environment variables

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::vision::{DetectionParams, YoloModelConfig};

/// Iris object detection node
#[derive(Parser, Debug, Clone)]
#[command(name = "iris-detection-node")]
#[command(version)]
#[command(about = "Serves a YOLO object detection model over HTTP", long_about = None)]
pub struct ServerConfig {
    /// Interface to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Path to the exported ONNX detection model
    #[arg(long, env = "MODEL_PATH", default_value = "./models/yolo11n.onnx")]
    pub model_path: PathBuf,

    /// Model name reported by /health
    #[arg(long, env = "MODEL_NAME", default_value = "yolo11n")]
    pub model_name: String,

    /// Labels file (one class per line) overriding model metadata
    #[arg(long, env = "LABELS_PATH")]
    pub labels_path: Option<PathBuf>,

    /// Minimum detection confidence
    #[arg(long, env = "CONF_THRESHOLD", default_value_t = 0.25)]
    pub conf_threshold: f32,

    /// IoU threshold for non-maximum suppression
    #[arg(long, env = "IOU_THRESHOLD", default_value_t = 0.7)]
    pub iou_threshold: f32,

    /// Maximum detections per image
    #[arg(long, env = "MAX_DETECTIONS", default_value_t = 300)]
    pub max_detections: usize,

    /// Square model input size
    #[arg(long, env = "INPUT_SIZE", default_value_t = 640)]
    pub input_size: u32,

    /// ONNX Runtime intra-op threads
    #[arg(long, env = "INTRA_THREADS", default_value_t = 4)]
    pub intra_threads: usize,
}

impl ServerConfig {
    /// Address the HTTP server binds to
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", self.host, self.port))
    }

    /// Model settings, with out-of-range thresholds sanitized
    pub fn model_config(&self) -> YoloModelConfig {
        YoloModelConfig {
            model_path: self.model_path.clone(),
            model_name: self.model_name.clone(),
            labels_path: self.labels_path.clone(),
            params: DetectionParams {
                input_size: self.input_size,
                conf_threshold: self.conf_threshold,
                iou_threshold: self.iou_threshold,
                max_detections: self.max_detections,
            }
            .sanitized(),
            intra_threads: self.intra_threads,
        }
    }
}
