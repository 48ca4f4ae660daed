//! Neural segmentation method
//!
//! The model itself sits behind the [`Segmenter`] boundary: encoded image
//! bytes go in, encoded RGBA PNG bytes come out, or an error. Every error on
//! that boundary (model missing, decode failure, inference failure) becomes a
//! [`RemovalResult::Failure`] so the chain can move on.

use super::{MethodKind, RemovalMethod};
use crate::{
    config::RemovalConfig,
    error::Result,
    services::ImageIOService,
    types::RemovalResult,
};
use image::{DynamicImage, GenericImageView};
use instant::Instant;

/// Opaque foreground segmentation dependency
pub trait Segmenter {
    /// Short backend name used in logs
    fn name(&self) -> &str;

    /// Segment encoded image bytes into encoded RGBA PNG bytes
    ///
    /// # Errors
    /// - Model unavailable or failing to load
    /// - Input bytes that cannot be decoded
    /// - Inference failures
    fn segment(&self, image_bytes: &[u8]) -> Result<Vec<u8>>;
}

/// Removal method delegating to a [`Segmenter`]
pub struct NeuralSegmentation {
    segmenter: Option<Box<dyn Segmenter>>,
    unavailable_reason: String,
}

impl NeuralSegmentation {
    /// Wrap an explicit segmenter
    #[must_use]
    pub fn with_segmenter(segmenter: Box<dyn Segmenter>) -> Self {
        Self {
            segmenter: Some(segmenter),
            unavailable_reason: String::new(),
        }
    }

    /// A neural method with no backend; every attempt fails with `reason`
    #[must_use]
    pub fn unavailable<S: Into<String>>(reason: S) -> Self {
        Self {
            segmenter: None,
            unavailable_reason: reason.into(),
        }
    }

    /// Build from configuration
    ///
    /// With the `tract` feature the model is loaded lazily from
    /// `config.model_path` (or the default cache location) on first use.
    #[must_use]
    pub fn from_config(config: &RemovalConfig) -> Self {
        #[cfg(feature = "tract")]
        {
            Self::with_segmenter(Box::new(super::TractSegmenter::from_config(config)))
        }

        #[cfg(not(feature = "tract"))]
        {
            let _ = config;
            Self::unavailable("model unavailable: built without a neural backend")
        }
    }

    /// Whether a backend is attached
    #[must_use]
    pub fn has_segmenter(&self) -> bool {
        self.segmenter.is_some()
    }

    fn run_segmenter(segmenter: &dyn Segmenter, image: &DynamicImage) -> Result<image::RgbaImage> {
        let input = ImageIOService::encode_png(&image.to_rgba8())?;
        let output = segmenter.segment(&input)?;
        let decoded = ImageIOService::decode_bytes(&output)?;
        Ok(decoded.to_rgba8())
    }
}

impl std::fmt::Debug for NeuralSegmentation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NeuralSegmentation")
            .field("segmenter", &self.segmenter.as_ref().map(|s| s.name().to_string()))
            .finish()
    }
}

impl RemovalMethod for NeuralSegmentation {
    fn kind(&self) -> MethodKind {
        MethodKind::Neural
    }

    fn attempt(&self, image: &DynamicImage) -> RemovalResult {
        let Some(segmenter) = self.segmenter.as_deref() else {
            return RemovalResult::failure(self.unavailable_reason.clone());
        };

        let start = Instant::now();
        match Self::run_segmenter(segmenter, image) {
            Ok(rgba) if rgba.dimensions() == image.dimensions() => {
                log::debug!(
                    "Segmenter '{}' finished in {}ms",
                    segmenter.name(),
                    start.elapsed().as_millis()
                );
                RemovalResult::Success(rgba)
            },
            Ok(rgba) => RemovalResult::failure(format!(
                "segmenter '{}' returned {}x{} for a {}x{} input",
                segmenter.name(),
                rgba.width(),
                rgba.height(),
                image.width(),
                image.height()
            )),
            Err(e) => RemovalResult::failure(e.to_string()),
        }
    }
}
