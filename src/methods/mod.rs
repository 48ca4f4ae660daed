//! Background removal methods
//!
//! Each method turns a decoded image into a foreground-isolated RGBA image or
//! reports why it could not:
//! - Neural segmentation (external model behind the [`Segmenter`] boundary)
//! - Threshold + contour mask (classical CV fallback)
//! - Brightness mask (simplest numeric fallback)
//! - Alpha composite (degenerate fallback, no mask is computed)

pub mod brightness;
pub mod composite;
pub mod neural;
pub mod threshold;

#[cfg(feature = "tract")]
pub mod tract;

#[cfg(test)]
pub mod test_utils;

pub use self::brightness::BrightnessMask;
pub use self::composite::AlphaCompositeNoOp;
pub use self::neural::{NeuralSegmentation, Segmenter};
pub use self::threshold::ThresholdContourMask;

#[cfg(feature = "tract")]
pub use self::tract::TractSegmenter;

use crate::{config::RemovalConfig, error::BgRemovalError, types::RemovalResult};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identity of a removal method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MethodKind {
    /// Pretrained foreground segmentation model
    Neural,
    /// Otsu threshold with filled external contours
    ThresholdContour,
    /// Fixed per-channel brightness cutoff
    Brightness,
    /// RGBA conversion composited on a transparent canvas
    AlphaComposite,
}

impl MethodKind {
    /// Every method, highest quality first
    pub const ALL: [MethodKind; 4] = [
        MethodKind::Neural,
        MethodKind::ThresholdContour,
        MethodKind::Brightness,
        MethodKind::AlphaComposite,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Neural => "neural",
            Self::ThresholdContour => "threshold-contour",
            Self::Brightness => "brightness",
            Self::AlphaComposite => "alpha-composite",
        }
    }

    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Neural => "Neural foreground segmentation (ONNX model)",
            Self::ThresholdContour => "Otsu threshold with filled external contours",
            Self::Brightness => "Per-channel brightness cutoff",
            Self::AlphaComposite => "RGBA composite without a mask (removes nothing)",
        }
    }
}

impl fmt::Display for MethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MethodKind {
    type Err = BgRemovalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "neural" | "rembg" | "model" => Ok(Self::Neural),
            "threshold-contour" | "threshold" | "contour" => Ok(Self::ThresholdContour),
            "brightness" | "simple" => Ok(Self::Brightness),
            "alpha-composite" | "composite" => Ok(Self::AlphaComposite),
            other => Err(BgRemovalError::invalid_config(format!(
                "Unknown removal method '{}'. Valid methods: {}",
                other,
                MethodKind::ALL
                    .iter()
                    .map(MethodKind::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
        }
    }
}

/// A single algorithm attempting to isolate the foreground of an image
pub trait RemovalMethod {
    /// Which method this is
    fn kind(&self) -> MethodKind;

    /// Attempt background removal
    ///
    /// Returns `Success` with an RGBA image of the input's dimensions, or
    /// `Failure` with a diagnostic reason.
    fn attempt(&self, image: &DynamicImage) -> RemovalResult;
}

/// Construct the method for `kind` using the settings in `config`
#[must_use]
pub fn create_method(kind: MethodKind, config: &RemovalConfig) -> Box<dyn RemovalMethod> {
    match kind {
        MethodKind::Neural => Box::new(NeuralSegmentation::from_config(config)),
        MethodKind::ThresholdContour => {
            Box::new(ThresholdContourMask::new(config.blur_kernel_size))
        },
        MethodKind::Brightness => Box::new(BrightnessMask::new(config.brightness_cutoff)),
        MethodKind::AlphaComposite => Box::new(AlphaCompositeNoOp),
    }
}
