// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for YOLO detection

use image::{imageops, DynamicImage, GenericImageView, Rgb, RgbImage};
use ndarray::Array4;

/// Gray level used for letterbox padding (Ultralytics default)
pub const PAD_VALUE: u8 = 114;

/// Geometry of a letterbox resize, used to map boxes back to the source image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    /// Resize factor applied to the source image
    pub scale: f32,
    /// Horizontal padding on the left, in letterbox pixels
    pub pad_x: f32,
    /// Vertical padding on the top, in letterbox pixels
    pub pad_y: f32,
    /// Source image width
    pub orig_width: u32,
    /// Source image height
    pub orig_height: u32,
}

impl Letterbox {
    /// Map an `[x1, y1, x2, y2]` box from letterbox space to source pixels
    ///
    /// The result is clamped to the source image and ordered so x1 <= x2, y1 <= y2.
    pub fn to_original(&self, bbox: [f32; 4]) -> [f32; 4] {
        let max_x = self.orig_width as f32;
        let max_y = self.orig_height as f32;
        let unpad_x = |v: f32| ((v - self.pad_x) / self.scale).clamp(0.0, max_x);
        let unpad_y = |v: f32| ((v - self.pad_y) / self.scale).clamp(0.0, max_y);

        let (x1, x2) = (unpad_x(bbox[0]), unpad_x(bbox[2]));
        let (y1, y2) = (unpad_y(bbox[1]), unpad_y(bbox[3]));

        [x1.min(x2), y1.min(y2), x1.max(x2), y1.max(y2)]
    }
}

/// Resize with aspect ratio preservation and center padding
///
/// The image is scaled to fit within `target_size` x `target_size` and padded
/// with gray (114) to a square.
pub fn letterbox(image: &DynamicImage, target_size: u32) -> (RgbImage, Letterbox) {
    let (orig_w, orig_h) = image.dimensions();
    let mut canvas = RgbImage::from_pixel(target_size, target_size, Rgb([PAD_VALUE; 3]));

    if orig_w == 0 || orig_h == 0 {
        let geometry = Letterbox {
            scale: 1.0,
            pad_x: 0.0,
            pad_y: 0.0,
            orig_width: orig_w,
            orig_height: orig_h,
        };
        return (canvas, geometry);
    }

    let scale = (target_size as f32 / orig_w as f32).min(target_size as f32 / orig_h as f32);
    let new_w = ((orig_w as f32 * scale).round() as u32).clamp(1, target_size);
    let new_h = ((orig_h as f32 * scale).round() as u32).clamp(1, target_size);

    let resized = imageops::resize(
        &image.to_rgb8(),
        new_w,
        new_h,
        imageops::FilterType::Triangle,
    );

    let offset_x = (target_size - new_w) / 2;
    let offset_y = (target_size - new_h) / 2;
    imageops::replace(&mut canvas, &resized, offset_x as i64, offset_y as i64);

    let geometry = Letterbox {
        scale,
        pad_x: offset_x as f32,
        pad_y: offset_y as f32,
        orig_width: orig_w,
        orig_height: orig_h,
    };

    (canvas, geometry)
}

/// Preprocess an image for YOLO detection
///
/// Steps:
/// 1. Letterbox to `target_size`
/// 2. Scale pixels to [0, 1]
/// 3. Convert to NCHW tensor format [1, 3, S, S]
pub fn preprocess_for_detection(image: &DynamicImage, target_size: u32) -> (Array4<f32>, Letterbox) {
    let (rgb, geometry) = letterbox(image, target_size);
    let size = target_size as usize;

    let mut tensor = Array4::zeros((1, 3, size, size));
    for (x, y, pixel) in rgb.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = pixel[c] as f32 / 255.0;
        }
    }

    (tensor, geometry)
}
