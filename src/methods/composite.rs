//! Alpha composite fallback
//!
//! Converts the image to RGBA and composites it onto a fully transparent
//! canvas of the same size. No mask is computed, so opaque inputs come back
//! fully opaque and nothing is removed. The behavior is kept as observed and
//! is left out of the default method order; see DESIGN.md.

use super::{MethodKind, RemovalMethod};
use crate::types::RemovalResult;
use image::{imageops, DynamicImage, RgbaImage};

#[derive(Debug, Clone, Copy, Default)]
pub struct AlphaCompositeNoOp;

impl RemovalMethod for AlphaCompositeNoOp {
    fn kind(&self) -> MethodKind {
        MethodKind::AlphaComposite
    }

    fn attempt(&self, image: &DynamicImage) -> RemovalResult {
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();

        let mut canvas = RgbaImage::new(width, height);
        imageops::overlay(&mut canvas, &rgba, 0, 0);

        log::warn!("Alpha composite fallback used: background was not removed");
        RemovalResult::Success(canvas)
    }
}
