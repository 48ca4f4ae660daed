//! Shared helpers for integration tests

#![allow(dead_code)]

use bgremove_chain::{MethodKind, RemovalMethod, RemovalResult};
use image::{DynamicImage, Rgb, RgbImage};
use std::path::Path;

/// Solid-color RGB image
pub fn solid_image(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)))
}

/// White image with a dark centered square
pub fn dark_square_on_white(size: u32, side: u32) -> DynamicImage {
    let start = (size - side) / 2;
    let end = start + side;
    DynamicImage::ImageRgb8(RgbImage::from_fn(size, size, |x, y| {
        if (start..end).contains(&x) && (start..end).contains(&y) {
            Rgb([30, 30, 30])
        } else {
            Rgb([245, 245, 245])
        }
    }))
}

/// Save a solid image at `dir/name`, format taken from the extension
pub fn write_image(dir: &Path, name: &str, color: [u8; 3]) {
    solid_image(8, 6, color)
        .save(dir.join(name))
        .expect("Failed to write test image");
}

/// Method that always reports the same failure
pub struct AlwaysFails {
    pub kind: MethodKind,
    pub reason: &'static str,
}

impl RemovalMethod for AlwaysFails {
    fn kind(&self) -> MethodKind {
        self.kind
    }

    fn attempt(&self, _image: &DynamicImage) -> RemovalResult {
        RemovalResult::failure(self.reason)
    }
}

/// Method that panics on every attempt
pub struct AlwaysPanics;

impl RemovalMethod for AlwaysPanics {
    fn kind(&self) -> MethodKind {
        MethodKind::Neural
    }

    fn attempt(&self, _image: &DynamicImage) -> RemovalResult {
        panic!("inference runtime aborted");
    }
}
