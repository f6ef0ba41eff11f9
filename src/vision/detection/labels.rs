// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Class index -> label tables

use anyhow::{Context, Result};
use regex::Regex;
use std::path::Path;

/// COCO dataset class names, in Ultralytics index order
pub const COCO_CLASSES: [&str; 80] = [
    "person",
    "bicycle",
    "car",
    "motorcycle",
    "airplane",
    "bus",
    "train",
    "truck",
    "boat",
    "traffic light",
    "fire hydrant",
    "stop sign",
    "parking meter",
    "bench",
    "bird",
    "cat",
    "dog",
    "horse",
    "sheep",
    "cow",
    "elephant",
    "bear",
    "zebra",
    "giraffe",
    "backpack",
    "umbrella",
    "handbag",
    "tie",
    "suitcase",
    "frisbee",
    "skis",
    "snowboard",
    "sports ball",
    "kite",
    "baseball bat",
    "baseball glove",
    "skateboard",
    "surfboard",
    "tennis racket",
    "bottle",
    "wine glass",
    "cup",
    "fork",
    "knife",
    "spoon",
    "bowl",
    "banana",
    "apple",
    "sandwich",
    "orange",
    "broccoli",
    "carrot",
    "hot dog",
    "pizza",
    "donut",
    "cake",
    "chair",
    "couch",
    "potted plant",
    "bed",
    "dining table",
    "toilet",
    "tv",
    "laptop",
    "mouse",
    "remote",
    "keyboard",
    "cell phone",
    "microwave",
    "oven",
    "toaster",
    "sink",
    "refrigerator",
    "book",
    "clock",
    "vase",
    "scissors",
    "teddy bear",
    "hair drier",
    "toothbrush",
];

/// Ordered label table; position is the class index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassNames {
    names: Vec<String>,
}

impl ClassNames {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn coco() -> Self {
        Self::new(COCO_CLASSES.iter().map(|s| s.to_string()).collect())
    }

    /// Label for a class index, if the table has one
    pub fn get(&self, class_id: usize) -> Option<&str> {
        self.names.get(class_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Load a labels file with one label per line
    ///
    /// Blank lines are skipped and surrounding whitespace is trimmed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read labels file {}", path.display()))?;

        let names: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        if names.is_empty() {
            anyhow::bail!("Labels file {} contains no labels", path.display());
        }

        Ok(Self::new(names))
    }

    /// Parse the `names` entry Ultralytics writes into exported model metadata
    ///
    /// The value is a Python dict literal: `{0: 'person', 1: 'bicycle'}`.
    /// Indices missing from the dict are filled with `class_<i>`.
    pub fn from_ultralytics_metadata(raw: &str) -> Result<Self> {
        let pattern = Regex::new(r#"(\d+)\s*:\s*(?:'((?:[^'\\]|\\.)*)'|"((?:[^"\\]|\\.)*)")"#)
            .context("Invalid names pattern")?;

        let mut entries: Vec<(usize, String)> = Vec::new();
        for caps in pattern.captures_iter(raw) {
            let index: usize = caps[1]
                .parse()
                .with_context(|| format!("Invalid class index '{}'", &caps[1]))?;
            let label = caps
                .get(2)
                .or_else(|| caps.get(3))
                .map(|m| m.as_str().replace("\\'", "'").replace("\\\"", "\""))
                .unwrap_or_default();
            entries.push((index, label));
        }

        let Some(max_index) = entries.iter().map(|(i, _)| *i).max() else {
            anyhow::bail!("No class names found in model metadata");
        };

        let mut names: Vec<String> = (0..=max_index).map(|i| format!("class_{}", i)).collect();
        for (index, label) in entries {
            names[index] = label;
        }

        Ok(Self::new(names))
    }
}
