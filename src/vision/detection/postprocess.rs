// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLO output decoding and non-maximum suppression

use anyhow::{Context, Result};
use ndarray::{ArrayView3, ArrayViewD, Ix3};
use tracing::debug;

use super::preprocessing::Letterbox;
use super::{DetectionParams, RawDetection};

/// Shape of the exported detection head
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputLayout {
    /// `[1, 4 + nc, N]`: cx, cy, w, h followed by per-class scores
    Raw { num_classes: usize },
    /// `[1, N, 6]`: x1, y1, x2, y2, score, class (NMS already applied)
    EndToEnd,
}

/// Work out which head layout a model output uses
pub fn detect_layout(shape: &[usize], num_classes: usize) -> Result<OutputLayout> {
    if shape.len() != 3 || shape[0] != 1 {
        anyhow::bail!("Unexpected detection output shape: {:?}", shape);
    }

    if shape[1] == 4 + num_classes {
        Ok(OutputLayout::Raw { num_classes })
    } else if shape[2] == 6 {
        Ok(OutputLayout::EndToEnd)
    } else if shape[1] > 4 {
        Ok(OutputLayout::Raw {
            num_classes: shape[1] - 4,
        })
    } else {
        anyhow::bail!("Unexpected detection output shape: {:?}", shape)
    }
}

/// Turn a model output tensor into detections in source image pixels
pub fn postprocess(
    output: ArrayViewD<f32>,
    params: &DetectionParams,
    num_classes: usize,
    letterbox: &Letterbox,
) -> Result<Vec<RawDetection>> {
    let layout = detect_layout(output.shape(), num_classes)?;
    let output = output
        .into_dimensionality::<Ix3>()
        .context("Detection output is not 3-dimensional")?;

    let detections = match layout {
        OutputLayout::Raw { num_classes } => {
            let candidates = decode_raw(output, num_classes, params.conf_threshold);
            debug!("{} candidates above confidence threshold", candidates.len());
            non_max_suppression(candidates, params.iou_threshold, params.max_detections)
        }
        OutputLayout::EndToEnd => {
            let mut candidates = decode_end_to_end(output, params.conf_threshold);
            sort_by_confidence(&mut candidates);
            candidates.truncate(params.max_detections);
            candidates
        }
    };

    Ok(detections
        .into_iter()
        .map(|det| RawDetection {
            bbox: letterbox.to_original(det.bbox),
            ..det
        })
        .collect())
}

/// Decode a `[1, 4 + nc, N]` head into letterbox-space candidates
pub fn decode_raw(output: ArrayView3<f32>, num_classes: usize, conf_threshold: f32) -> Vec<RawDetection> {
    let anchors = output.shape()[2];
    let mut candidates = Vec::new();

    for i in 0..anchors {
        let mut best_class = 0usize;
        let mut best_score = f32::MIN;
        for class_id in 0..num_classes {
            let score = output[[0, 4 + class_id, i]];
            if score > best_score {
                best_score = score;
                best_class = class_id;
            }
        }

        if !(best_score > conf_threshold) {
            continue;
        }

        let cx = output[[0, 0, i]];
        let cy = output[[0, 1, i]];
        let w = output[[0, 2, i]];
        let h = output[[0, 3, i]];

        candidates.push(RawDetection {
            class_id: best_class,
            confidence: best_score.min(1.0),
            bbox: [cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0],
        });
    }

    candidates
}

/// Decode a `[1, N, 6]` end-to-end head into letterbox-space candidates
pub fn decode_end_to_end(output: ArrayView3<f32>, conf_threshold: f32) -> Vec<RawDetection> {
    let rows = output.shape()[1];
    let mut candidates = Vec::new();

    for i in 0..rows {
        let score = output[[0, i, 4]];
        let class = output[[0, i, 5]];
        if !(score > conf_threshold) || !class.is_finite() || class < 0.0 {
            continue;
        }

        candidates.push(RawDetection {
            class_id: class.round() as usize,
            confidence: score.min(1.0),
            bbox: [
                output[[0, i, 0]],
                output[[0, i, 1]],
                output[[0, i, 2]],
                output[[0, i, 3]],
            ],
        });
    }

    candidates
}

/// Class-aware greedy NMS, highest confidence first
pub fn non_max_suppression(
    mut detections: Vec<RawDetection>,
    iou_threshold: f32,
    max_detections: usize,
) -> Vec<RawDetection> {
    sort_by_confidence(&mut detections);

    let mut kept: Vec<RawDetection> = Vec::new();
    for det in detections {
        if kept.len() >= max_detections {
            break;
        }
        let suppressed = kept
            .iter()
            .any(|k| k.class_id == det.class_id && iou(&k.bbox, &det.bbox) > iou_threshold);
        if !suppressed {
            kept.push(det);
        }
    }

    kept
}

fn sort_by_confidence(detections: &mut [RawDetection]) {
    detections.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
}

/// Intersection over union of two `[x1, y1, x2, y2]` boxes
pub fn iou(a: &[f32; 4], b: &[f32; 4]) -> f32 {
    let x1 = a[0].max(b[0]);
    let y1 = a[1].max(b[1]);
    let x2 = a[2].min(b[2]);
    let y2 = a[3].min(b[3]);

    let intersection = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    let area_a = (a[2] - a[0]).max(0.0) * (a[3] - a[1]).max(0.0);
    let area_b = (b[2] - b[0]).max(0.0) * (b[3] - b[1]).max(0.0);
    let union = area_a + area_b - intersection;

    if union > 0.0 {
        intersection / union
    } else {
        0.0
    }
}
