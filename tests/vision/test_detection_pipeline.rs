// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Letterbox and output decoding without a model
//!
//! Synthetic head outputs are fed through `postprocess` to check that boxes
//! land back in source image pixels.

use image::{DynamicImage, Rgb, RgbImage};
use iris_detection_node::vision::detection::postprocess::postprocess;
use iris_detection_node::vision::detection::preprocessing::{
    preprocess_for_detection, PAD_VALUE,
};
use iris_detection_node::vision::DetectionParams;
use ndarray::{Array3, IxDyn};

const NUM_CLASSES: usize = 80;

fn wide_image() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(1280, 640, Rgb([255, 0, 0])))
}

#[test]
fn test_preprocess_wide_image() {
    let (tensor, letterbox) = preprocess_for_detection(&wide_image(), 640);

    assert_eq!(tensor.shape(), &[1, 3, 640, 640]);
    assert_eq!(letterbox.scale, 0.5);
    assert_eq!(letterbox.pad_x, 0.0);
    assert_eq!(letterbox.pad_y, 160.0);

    let pad = PAD_VALUE as f32 / 255.0;
    assert!((tensor[[0, 0, 0, 0]] - pad).abs() < 1e-6);
    assert!((tensor[[0, 0, 320, 320]] - 1.0).abs() < 1e-6);
    assert!(tensor[[0, 1, 320, 320]].abs() < 1e-6);
}

#[test]
fn test_raw_head_maps_back_to_source_pixels() {
    let (_, letterbox) = preprocess_for_detection(&wide_image(), 640);

    // [1, 4 + nc, anchors]
    let mut output = Array3::<f32>::zeros((1, 4 + NUM_CLASSES, 3));
    let anchors = [
        ([320.0, 320.0, 100.0, 50.0], 2, 0.9),
        ([322.0, 321.0, 100.0, 50.0], 2, 0.6),
        ([100.0, 300.0, 20.0, 20.0], 5, 0.2),
    ];
    for (i, (bbox, class_id, score)) in anchors.iter().enumerate() {
        for (j, v) in bbox.iter().enumerate() {
            output[[0, j, i]] = *v;
        }
        output[[0, 4 + class_id, i]] = *score;
    }

    let output = output.into_dyn();
    let detections = postprocess(
        output.view(),
        &DetectionParams::default(),
        NUM_CLASSES,
        &letterbox,
    )
    .unwrap();

    // Second anchor overlaps the first, third is under the threshold
    assert_eq!(detections.len(), 1);
    assert_eq!(detections[0].class_id, 2);
    assert!((detections[0].confidence - 0.9).abs() < 1e-6);
    assert_eq!(detections[0].bbox, [540.0, 270.0, 740.0, 370.0]);
}

#[test]
fn test_end_to_end_head_clamps_and_orders() {
    let (_, letterbox) = preprocess_for_detection(&wide_image(), 640);

    // [1, rows, 6]: x1, y1, x2, y2, score, class
    let rows = [
        [-50.0, 100.0, 700.0, 900.0, 0.5, 1.0],
        [0.0, 160.0, 640.0, 480.0, 0.8, 0.0],
        [10.0, 10.0, 20.0, 20.0, 0.1, 3.0],
    ];
    let mut output = Array3::<f32>::zeros((1, rows.len(), 6));
    for (i, row) in rows.iter().enumerate() {
        for (j, v) in row.iter().enumerate() {
            output[[0, i, j]] = *v;
        }
    }

    let output = output.into_dyn();
    let detections = postprocess(
        output.view(),
        &DetectionParams::default(),
        NUM_CLASSES,
        &letterbox,
    )
    .unwrap();

    assert_eq!(detections.len(), 2);
    assert_eq!(detections[0].class_id, 0);
    assert_eq!(detections[0].bbox, [0.0, 0.0, 1280.0, 640.0]);
    assert_eq!(detections[1].class_id, 1);
    assert_eq!(detections[1].bbox, [0.0, 0.0, 1280.0, 640.0]);

    for det in &detections {
        assert!(det.bbox[0] <= det.bbox[2]);
        assert!(det.bbox[1] <= det.bbox[3]);
    }
}

#[test]
fn test_max_detections_caps_output() {
    let (_, letterbox) = preprocess_for_detection(&wide_image(), 640);

    let anchors = 10;
    let mut output = Array3::<f32>::zeros((1, 4 + NUM_CLASSES, anchors));
    for i in 0..anchors {
        // Disjoint boxes so nothing is suppressed
        output[[0, 0, i]] = 30.0 + 60.0 * i as f32;
        output[[0, 1, i]] = 320.0;
        output[[0, 2, i]] = 20.0;
        output[[0, 3, i]] = 20.0;
        output[[0, 4, i]] = 0.5 + 0.01 * i as f32;
    }

    let params = DetectionParams {
        max_detections: 4,
        ..DetectionParams::default()
    };
    let detections = postprocess(output.into_dyn().view(), &params, NUM_CLASSES, &letterbox).unwrap();

    assert_eq!(detections.len(), 4);
    assert!(detections
        .windows(2)
        .all(|pair| pair[0].confidence >= pair[1].confidence));
}

#[test]
fn test_unexpected_output_shape_is_error() {
    let (_, letterbox) = preprocess_for_detection(&wide_image(), 640);
    let output = ndarray::ArrayD::<f32>::zeros(IxDyn(&[1, 3, 5]));

    let result = postprocess(
        output.view(),
        &DetectionParams::default(),
        NUM_CLASSES,
        &letterbox,
    );
    assert!(result.is_err());
}
