// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Ultralytics YOLO object detection via ONNX Runtime
//!
//! Expects a model exported with `yolo export format=onnx`. Both the raw head
//! (`[1, 4 + nc, N]`) and the end-to-end head (`[1, N, 6]`) are supported.

use anyhow::{Context, Result};
use image::DynamicImage;
use ndarray::Array4;
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, info, warn};

use super::labels::ClassNames;
use super::postprocess::postprocess;
use super::preprocessing::{preprocess_for_detection, Letterbox};
use super::{DetectionGroup, DetectionParams, ObjectDetector, RawDetection};

/// Configuration for loading a YOLO ONNX model
#[derive(Debug, Clone)]
pub struct YoloModelConfig {
    /// Path to the exported ONNX file
    pub model_path: PathBuf,
    /// Name reported by the health endpoint
    pub model_name: String,
    /// Optional labels file overriding the model metadata
    pub labels_path: Option<PathBuf>,
    /// Decoding thresholds
    pub params: DetectionParams,
    /// ONNX Runtime intra-op threads
    pub intra_threads: usize,
}

impl Default for YoloModelConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("./models/yolo11n.onnx"),
            model_name: "yolo11n".to_string(),
            labels_path: None,
            params: DetectionParams::default(),
            intra_threads: 4,
        }
    }
}

/// YOLO detector backed by an ONNX Runtime session
///
/// Runs on CPU only. The session is shared behind a mutex because
/// `Session::run` needs exclusive access.
#[derive(Clone)]
pub struct YoloOnnxDetector {
    /// ONNX Runtime session (thread-safe)
    session: Arc<Mutex<Session>>,
    /// Model input name
    input_name: String,
    /// Class index -> label table
    names: Arc<ClassNames>,
    /// Decoding thresholds
    params: DetectionParams,
    /// Reported model name
    model_name: String,
}

impl std::fmt::Debug for YoloOnnxDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoloOnnxDetector")
            .field("model_name", &self.model_name)
            .field("input_name", &self.input_name)
            .field("num_classes", &self.names.len())
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl YoloOnnxDetector {
    /// Load the detection model from disk
    ///
    /// # Errors
    /// Returns error if:
    /// - Model file not found
    /// - ONNX Runtime initialization fails
    /// - A configured labels file cannot be read
    pub fn new(config: &YoloModelConfig) -> Result<Self> {
        let model_path = config.model_path.as_path();

        if !model_path.exists() {
            anyhow::bail!("Detection model not found: {}", model_path.display());
        }

        info!("Loading detection model from {}", model_path.display());

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(config.intra_threads.max(1))
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .context(format!(
                "Failed to load detection model from {}",
                model_path.display()
            ))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "images".to_string());

        let names = resolve_class_names(&session, config.labels_path.as_deref())?;

        debug!(
            "Detection model loaded - input: {}, classes: {}",
            input_name,
            names.len()
        );

        info!(
            "✅ Detection model '{}' loaded successfully (CPU-only)",
            config.model_name
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            names: Arc::new(names),
            params: config.params.clone().sanitized(),
            model_name: config.model_name.clone(),
        })
    }

    /// Name reported by the health endpoint
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn class_names(&self) -> &ClassNames {
        &self.names
    }

    /// Run the session on a preprocessed `[1, 3, S, S]` tensor
    fn infer(&self, input: Array4<f32>, letterbox: &Letterbox) -> Result<Vec<RawDetection>> {
        let input_value = Value::from_array(input).context("Failed to create input tensor")?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("Detection session lock poisoned"))?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .context("Detection inference failed")?;

        let output_tensor = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        debug!("Detection output shape: {:?}", output_tensor.shape());

        postprocess(output_tensor.view(), &self.params, self.names.len(), letterbox)
    }
}

impl ObjectDetector for YoloOnnxDetector {
    fn detect(&self, image: &DynamicImage) -> Result<Vec<DetectionGroup>> {
        let start = Instant::now();
        let (tensor, letterbox) = preprocess_for_detection(image, self.params.input_size);
        let detections = self.infer(tensor, &letterbox)?;

        debug!(
            "Detected {} objects in {}ms",
            detections.len(),
            start.elapsed().as_millis()
        );

        Ok(vec![DetectionGroup::new(self.names.clone(), detections)])
    }
}

/// Labels file first, then model metadata, then COCO
fn resolve_class_names(session: &Session, labels_path: Option<&Path>) -> Result<ClassNames> {
    if let Some(path) = labels_path {
        let names = ClassNames::from_file(path)?;
        info!("Using {} class names from {}", names.len(), path.display());
        return Ok(names);
    }

    let from_metadata = session
        .metadata()
        .ok()
        .and_then(|metadata| metadata.custom("names").ok().flatten());

    match from_metadata.map(|raw| ClassNames::from_ultralytics_metadata(&raw)) {
        Some(Ok(names)) => {
            debug!("Using {} class names from model metadata", names.len());
            Ok(names)
        }
        Some(Err(e)) => {
            warn!("⚠️ Could not parse model class names ({}), using COCO", e);
            Ok(ClassNames::coco())
        }
        None => {
            debug!("Model has no class names metadata, using COCO");
            Ok(ClassNames::coco())
        }
    }
}
