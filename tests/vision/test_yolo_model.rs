// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Real model tests
//!
//! Require an Ultralytics export at `./models/yolo11n.onnx`:
//! `yolo export model=yolo11n.pt format=onnx`
//!
//! Run with `cargo test --test vision_tests -- --ignored`

use image::{DynamicImage, Rgb, RgbImage};
use iris_detection_node::vision::{ObjectDetector, YoloModelConfig, YoloOnnxDetector};
use std::sync::Arc;

fn load_detector() -> YoloOnnxDetector {
    YoloOnnxDetector::new(&YoloModelConfig::default()).expect("Failed to load detection model")
}

fn square_on_white() -> DynamicImage {
    let mut image = RgbImage::from_pixel(200, 200, Rgb([255, 255, 255]));
    for y in 50..150 {
        for x in 50..150 {
            image.put_pixel(x, y, Rgb([0, 0, 0]));
        }
    }
    DynamicImage::ImageRgb8(image)
}

#[test]
#[ignore]
fn test_model_loads_coco_names() {
    let detector = load_detector();
    assert_eq!(detector.model_name(), "yolo11n");
    assert_eq!(detector.class_names().len(), 80);
    assert_eq!(detector.class_names().get(0), Some("person"));
}

#[test]
#[ignore]
fn test_detections_stay_inside_image() {
    let detector = load_detector();
    let groups = detector.detect(&square_on_white()).unwrap();

    assert_eq!(groups.len(), 1);
    for det in &groups[0].detections {
        assert!(det.confidence > 0.25 && det.confidence <= 1.0);
        assert!(det.bbox[0] >= 0.0 && det.bbox[2] <= 200.0);
        assert!(det.bbox[1] >= 0.0 && det.bbox[3] <= 200.0);
        assert!(det.bbox[0] <= det.bbox[2] && det.bbox[1] <= det.bbox[3]);
        assert!(groups[0].names.get(det.class_id).is_some());
    }
}

#[tokio::test]
#[ignore]
async fn test_concurrent_detection() {
    let detector = Arc::new(load_detector());
    let image = Arc::new(square_on_white());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let detector = detector.clone();
            let image = image.clone();
            tokio::task::spawn_blocking(move || detector.detect(&image))
        })
        .collect();

    let mut counts = Vec::new();
    for handle in handles {
        let groups = handle.await.unwrap().unwrap();
        counts.push(groups[0].detections.len());
    }

    // Same input, same model, same answer
    assert!(counts.windows(2).all(|pair| pair[0] == pair[1]));
}
