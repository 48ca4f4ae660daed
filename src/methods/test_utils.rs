//! Test utilities and mock methods for exercising the removal chain
//!
//! These helpers build small synthetic images and methods with scripted
//! behavior so chain and batch logic can be tested without model files.

use super::{MethodKind, RemovalMethod, Segmenter};
use crate::{
    error::{BgRemovalError, Result},
    types::RemovalResult,
};
use image::{DynamicImage, Rgb, RgbImage, RgbaImage};
use std::cell::Cell;
use std::rc::Rc;

/// Solid-color RGB image
pub fn create_test_image(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)))
}

/// Image whose left half is `left` and right half is `right`
pub fn split_image(width: u32, height: u32, left: [u8; 3], right: [u8; 3]) -> DynamicImage {
    let image = RgbImage::from_fn(width, height, |x, _| {
        if x < width / 2 {
            Rgb(left)
        } else {
            Rgb(right)
        }
    });
    DynamicImage::ImageRgb8(image)
}

/// White image with a dark square of side `side` centered in it
pub fn dark_square_on_white(size: u32, side: u32) -> DynamicImage {
    let start = (size - side) / 2;
    let end = start + side;
    let image = RgbImage::from_fn(size, size, |x, y| {
        if (start..end).contains(&x) && (start..end).contains(&y) {
            Rgb([20, 20, 20])
        } else {
            Rgb([250, 250, 250])
        }
    });
    DynamicImage::ImageRgb8(image)
}

/// Method that always fails with a fixed reason and counts its calls
pub struct FailingMethod {
    kind: MethodKind,
    reason: String,
    calls: Rc<Cell<usize>>,
}

impl FailingMethod {
    pub fn new(kind: MethodKind, reason: &str) -> Self {
        Self {
            kind,
            reason: reason.to_string(),
            calls: Rc::new(Cell::new(0)),
        }
    }

    /// Shared call counter, readable after the method is moved into a chain
    pub fn call_counter(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.calls)
    }
}

impl RemovalMethod for FailingMethod {
    fn kind(&self) -> MethodKind {
        self.kind
    }

    fn attempt(&self, _image: &DynamicImage) -> RemovalResult {
        self.calls.set(self.calls.get() + 1);
        RemovalResult::failure(self.reason.clone())
    }
}

/// Method that always succeeds with an opaque copy of the input
pub struct SucceedingMethod {
    kind: MethodKind,
    calls: Rc<Cell<usize>>,
}

impl SucceedingMethod {
    pub fn new(kind: MethodKind) -> Self {
        Self {
            kind,
            calls: Rc::new(Cell::new(0)),
        }
    }

    pub fn call_counter(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.calls)
    }
}

impl RemovalMethod for SucceedingMethod {
    fn kind(&self) -> MethodKind {
        self.kind
    }

    fn attempt(&self, image: &DynamicImage) -> RemovalResult {
        self.calls.set(self.calls.get() + 1);
        RemovalResult::Success(image.to_rgba8())
    }
}

/// Method that panics, standing in for an unexpected runtime error
pub struct PanickingMethod(pub MethodKind);

impl RemovalMethod for PanickingMethod {
    fn kind(&self) -> MethodKind {
        self.0
    }

    fn attempt(&self, _image: &DynamicImage) -> RemovalResult {
        panic!("segmentation backend crashed");
    }
}

/// Method that claims success but returns an image of the wrong size
pub struct WrongSizeMethod(pub MethodKind);

impl RemovalMethod for WrongSizeMethod {
    fn kind(&self) -> MethodKind {
        self.0
    }

    fn attempt(&self, _image: &DynamicImage) -> RemovalResult {
        RemovalResult::Success(RgbaImage::new(1, 1))
    }
}

/// Segmenter that returns a canned response
pub enum MockSegmenter {
    /// Fail with the given message
    Unavailable(String),
    /// Return the input decoded and re-encoded as a fully transparent PNG
    Transparent,
    /// Return bytes that are not an image
    Garbage,
}

impl Segmenter for MockSegmenter {
    fn name(&self) -> &str {
        "mock"
    }

    fn segment(&self, image_bytes: &[u8]) -> Result<Vec<u8>> {
        match self {
            Self::Unavailable(message) => Err(BgRemovalError::model(message.clone())),
            Self::Transparent => {
                let decoded = image::load_from_memory(image_bytes)?;
                let mut rgba = decoded.to_rgba8();
                for pixel in rgba.pixels_mut() {
                    pixel[3] = 0;
                }
                crate::services::ImageIOService::encode_png(&rgba)
            },
            Self::Garbage => Ok(b"not an image".to_vec()),
        }
    }
}
