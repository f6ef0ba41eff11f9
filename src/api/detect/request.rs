// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection request types and validation

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::errors::ApiError;

/// Request for object detection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectionRequest {
    /// Base64-encoded image data (optionally a `data:` URL)
    pub image: String,
}

impl DetectionRequest {
    /// Validate a parsed JSON body
    ///
    /// The `image` key is checked for presence before its type, so a body like
    /// `{"image": 42}` reports an invalid image rather than a missing one.
    pub fn from_json(body: &Value) -> Result<Self, ApiError> {
        let image = body
            .as_object()
            .and_then(|obj| obj.get("image"))
            .ok_or(ApiError::MissingImage)?;

        match image {
            Value::String(s) => Ok(Self { image: s.clone() }),
            other => Err(ApiError::InvalidImage(format!(
                "expected a base64 string, got {}",
                json_type_name(other)
            ))),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
