// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection response types

use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;
use crate::vision::{ClassNames, DetectionGroup, RawDetection};

/// A detected object
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Detection {
    /// Human-readable class label
    #[serde(rename = "class")]
    pub class_name: String,
    /// Confidence score (0.0-1.0)
    pub confidence: f64,
    /// `[x1, y1, x2, y2]` in image pixels
    pub bbox: [f64; 4],
}

impl Detection {
    /// Resolve a raw model detection against its class table
    pub fn from_raw(raw: &RawDetection, names: &ClassNames) -> Result<Self, ApiError> {
        let class_name = names.get(raw.class_id).ok_or_else(|| {
            ApiError::InternalError(format!(
                "Model returned class index {} outside its {} class names",
                raw.class_id,
                names.len()
            ))
        })?;

        Ok(Self {
            class_name: class_name.to_string(),
            confidence: raw.confidence as f64,
            bbox: raw.bbox.map(|v| v as f64),
        })
    }
}

/// Response from a successful detection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectionResponse {
    pub success: bool,
    pub detections: Vec<Detection>,
    pub count: usize,
}

impl DetectionResponse {
    pub fn new(detections: Vec<Detection>) -> Self {
        Self {
            success: true,
            count: detections.len(),
            detections,
        }
    }

    /// Flatten model result groups in order: group order, then within-group order
    pub fn from_groups(groups: &[DetectionGroup]) -> Result<Self, ApiError> {
        let detections = groups
            .iter()
            .flat_map(|group| {
                group
                    .detections
                    .iter()
                    .map(move |raw| Detection::from_raw(raw, &group.names))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(detections))
    }
}
