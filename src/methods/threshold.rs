//! Otsu threshold and contour fill mask
//!
//! Pipeline: luminance grayscale, Gaussian blur, inverse Otsu threshold
//! (darker pixels become foreground candidates), external contour
//! extraction, contour interior fill. The filled mask is inverted and merged
//! as the alpha channel. Alpha is hard-edged at contour boundaries.

use super::{MethodKind, RemovalMethod};
use crate::types::{Mask, RemovalResult};
use image::{DynamicImage, GrayImage, Luma};
use imageproc::{
    contours::find_contours,
    contrast::otsu_level,
    drawing::draw_polygon_mut,
    filter::gaussian_blur_f32,
    point::Point,
};
use tracing::debug;

/// Default blur kernel side length
pub const DEFAULT_BLUR_KERNEL_SIZE: u32 = 5;

const FOREGROUND: Luma<u8> = Luma([255]);

#[derive(Debug, Clone, Copy)]
pub struct ThresholdContourMask {
    kernel_size: u32,
}

impl ThresholdContourMask {
    /// Create the method with an odd blur kernel size of at least 3
    #[must_use]
    pub fn new(kernel_size: u32) -> Self {
        Self { kernel_size }
    }

    /// Gaussian sigma for the kernel size, derived the way common CV
    /// libraries do when no sigma is given
    #[must_use]
    pub fn sigma(&self) -> f32 {
        let k = self.kernel_size.max(3) as f32;
        0.3 * ((k - 1.0) * 0.5 - 1.0) + 0.8
    }

    /// Grayscale, blur and inverse-Otsu threshold the image
    ///
    /// Pixels at or below the Otsu level are 255, the rest 0.
    #[must_use]
    pub fn threshold_inverse(&self, image: &DynamicImage) -> GrayImage {
        let gray = image.to_luma8();
        let blurred = gaussian_blur_f32(&gray, self.sigma());
        let level = otsu_level(&blurred);
        debug!(otsu_level = level, sigma = self.sigma(), "Computed inverse threshold");

        GrayImage::from_fn(blurred.width(), blurred.height(), |x, y| {
            if blurred.get_pixel(x, y)[0] <= level {
                FOREGROUND
            } else {
                Luma([0])
            }
        })
    }

    /// Foreground mask before inversion, `None` when no contours exist
    #[must_use]
    pub fn build_mask(&self, image: &DynamicImage) -> Option<Mask> {
        fill_external_contours(&self.threshold_inverse(image))
    }
}

impl Default for ThresholdContourMask {
    fn default() -> Self {
        Self::new(DEFAULT_BLUR_KERNEL_SIZE)
    }
}

/// Fill every outermost contour of a binary image
///
/// The image is traced inside a one-pixel background frame so that regions
/// touching the image edge still produce an outer contour. Contours nested
/// inside another region are covered by their ancestor's fill. Returns
/// `None` when the binary image has no contours at all.
#[must_use]
pub fn fill_external_contours(binary: &GrayImage) -> Option<Mask> {
    let (width, height) = binary.dimensions();
    let mut framed = GrayImage::new(width + 2, height + 2);
    image::imageops::replace(&mut framed, binary, 1, 1);

    let external: Vec<Vec<Point<i32>>> = find_contours::<i32>(&framed)
        .into_iter()
        .filter(|c| c.parent.is_none())
        .map(|c| {
            c.points
                .iter()
                .map(|p| Point::new(p.x - 1, p.y - 1))
                .collect()
        })
        .collect();

    if external.is_empty() {
        return None;
    }
    debug!(count = external.len(), "Filling external contours");

    let mut filled = GrayImage::new(width, height);
    for points in &external {
        let polygon = polygon_from_contour(points);
        if polygon.len() >= 3 {
            draw_polygon_mut(&mut filled, &polygon, FOREGROUND);
        }
        // Boundary pixels belong to the region regardless of polygon rasterization
        for point in points {
            if let (Ok(x), Ok(y)) = (u32::try_from(point.x), u32::try_from(point.y)) {
                if x < width && y < height {
                    filled.put_pixel(x, y, FOREGROUND);
                }
            }
        }
    }

    Some(Mask::from_luma(&filled))
}

/// Drop consecutive duplicates and a closing point equal to the first
fn polygon_from_contour(points: &[Point<i32>]) -> Vec<Point<i32>> {
    let mut polygon: Vec<Point<i32>> = Vec::with_capacity(points.len());
    for point in points {
        if polygon.last() != Some(point) {
            polygon.push(*point);
        }
    }
    while polygon.len() > 1 && polygon.first() == polygon.last() {
        polygon.pop();
    }
    polygon
}

impl RemovalMethod for ThresholdContourMask {
    fn kind(&self) -> MethodKind {
        MethodKind::ThresholdContour
    }

    fn attempt(&self, image: &DynamicImage) -> RemovalResult {
        let Some(mask) = self.build_mask(image) else {
            return RemovalResult::failure("no contours found in thresholded image");
        };

        match mask.inverted().apply_as_alpha(image) {
            Ok(rgba) => RemovalResult::Success(rgba),
            Err(e) => RemovalResult::failure(e.to_string()),
        }
    }
}
