//! Brightness cutoff mask

use super::{MethodKind, RemovalMethod};
use crate::types::{Mask, RemovalResult};
use image::{ColorType, DynamicImage, GenericImageView};

/// Default cutoff on a 0-255 scale
pub const DEFAULT_BRIGHTNESS_CUTOFF: u8 = 240;

/// Marks a pixel as foreground when every color channel is strictly below
/// the cutoff
///
/// Grayscale images compare their single channel. The method always yields a
/// mask for a decoded image, possibly all background or all foreground, so
/// it is a best-effort heuristic rather than a segmentation guarantee.
#[derive(Debug, Clone, Copy)]
pub struct BrightnessMask {
    cutoff: u8,
}

impl BrightnessMask {
    #[must_use]
    pub fn new(cutoff: u8) -> Self {
        Self { cutoff }
    }

    #[must_use]
    pub fn cutoff(&self) -> u8 {
        self.cutoff
    }

    /// Build the foreground mask without applying it
    #[must_use]
    pub fn build_mask(&self, image: &DynamicImage) -> Mask {
        let (width, height) = image.dimensions();

        if is_grayscale(image.color()) {
            let luma = image.to_luma8();
            Mask::from_fn(width, height, |x, y| luma.get_pixel(x, y)[0] < self.cutoff)
        } else {
            let rgb = image.to_rgb8();
            Mask::from_fn(width, height, |x, y| {
                rgb.get_pixel(x, y).0.iter().all(|c| *c < self.cutoff)
            })
        }
    }
}

impl Default for BrightnessMask {
    fn default() -> Self {
        Self::new(DEFAULT_BRIGHTNESS_CUTOFF)
    }
}

fn is_grayscale(color: ColorType) -> bool {
    matches!(
        color,
        ColorType::L8 | ColorType::La8 | ColorType::L16 | ColorType::La16
    )
}

impl RemovalMethod for BrightnessMask {
    fn kind(&self) -> MethodKind {
        MethodKind::Brightness
    }

    fn attempt(&self, image: &DynamicImage) -> RemovalResult {
        let mask = self.build_mask(image);
        log::debug!(
            "Brightness mask (cutoff {}): {} of {} pixels foreground",
            self.cutoff,
            mask.foreground_count(),
            u64::from(image.width()) * u64::from(image.height())
        );

        match mask.apply_as_alpha(image) {
            Ok(rgba) => RemovalResult::Success(rgba),
            Err(e) => RemovalResult::failure(e.to_string()),
        }
    }
}
