//! Core types for background removal operations

use crate::{
    error::{BgRemovalError, Result},
    methods::MethodKind,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, Utc};
use image::{DynamicImage, GenericImageView, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Outcome of a single removal method
///
/// On success the image is RGBA with the same dimensions as the input.
#[derive(Debug, Clone)]
pub enum RemovalResult {
    /// Foreground-isolated RGBA image
    Success(RgbaImage),
    /// Diagnostic reason the method could not produce a result
    Failure(String),
}

impl RemovalResult {
    /// Create a failure with the given reason
    pub fn failure<S: Into<String>>(reason: S) -> Self {
        Self::Failure(reason.into())
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Convert into a `Result`, attributing a failure to `method`
    pub fn into_result(self, method: MethodKind) -> Result<RgbaImage> {
        match self {
            Self::Success(rgba) => Ok(rgba),
            Self::Failure(reason) => Err(BgRemovalError::MethodFailure(MethodFailure::new(
                method, reason,
            ))),
        }
    }
}

/// A removal method that did not produce a result, with its reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodFailure {
    pub method: MethodKind,
    pub reason: String,
}

impl MethodFailure {
    pub fn new<S: Into<String>>(method: MethodKind, reason: S) -> Self {
        Self {
            method,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for MethodFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.method, self.reason)
    }
}

/// Binary foreground/background mask
///
/// Dimensions always match the image the mask was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    data: Vec<bool>,
    dimensions: (u32, u32),
}

impl Mask {
    /// Build a mask by classifying every pixel position
    pub fn from_fn<F>(width: u32, height: u32, mut is_foreground: F) -> Self
    where
        F: FnMut(u32, u32) -> bool,
    {
        let mut data = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                data.push(is_foreground(x, y));
            }
        }
        Self {
            data,
            dimensions: (width, height),
        }
    }

    /// Build a mask from a grayscale buffer where non-zero means foreground
    #[must_use]
    pub fn from_luma(image: &image::GrayImage) -> Self {
        Self {
            data: image.pixels().map(|p| p[0] != 0).collect(),
            dimensions: image.dimensions(),
        }
    }

    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }

    /// Whether the pixel at `(x, y)` is foreground; out of bounds is background
    #[must_use]
    pub fn is_foreground(&self, x: u32, y: u32) -> bool {
        let (width, height) = self.dimensions;
        if x >= width || y >= height {
            return false;
        }
        self.data
            .get(y as usize * width as usize + x as usize)
            .copied()
            .unwrap_or(false)
    }

    /// Number of foreground pixels
    #[must_use]
    pub fn foreground_count(&self) -> usize {
        self.data.iter().filter(|v| **v).count()
    }

    /// Swap foreground and background
    #[must_use]
    pub fn inverted(mut self) -> Self {
        for value in &mut self.data {
            *value = !*value;
        }
        self
    }

    /// Merge the mask as an alpha channel over the source color channels
    ///
    /// Foreground pixels get alpha 255, background pixels alpha 0. Color
    /// channels are copied unchanged.
    pub fn apply_as_alpha(&self, image: &DynamicImage) -> Result<RgbaImage> {
        if image.dimensions() != self.dimensions {
            return Err(BgRemovalError::invalid_config(format!(
                "Mask dimensions {:?} do not match image dimensions {:?}",
                self.dimensions,
                image.dimensions()
            )));
        }

        let mut rgba = image.to_rgba8();
        for (pixel, foreground) in rgba.pixels_mut().zip(&self.data) {
            pixel[3] = if *foreground { 255 } else { 0 };
        }
        Ok(rgba)
    }
}

/// Result of running the method chain on one image
#[derive(Debug, Clone)]
pub struct RemovalOutput {
    /// RGBA image with background pixels made transparent
    pub image: RgbaImage,
    /// Method that produced the image
    pub method: MethodKind,
    /// Methods that were tried and failed before `method` succeeded
    pub failed_attempts: Vec<MethodFailure>,
    /// Wall time spent in the chain
    pub elapsed_ms: u64,
}

impl RemovalOutput {
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Encode the result as PNG, preserving the alpha channel
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        crate::services::ImageIOService::encode_png(&self.image)
    }

    /// Encode the result as a `data:image/png;base64,...` URL
    pub fn to_data_url(&self) -> Result<String> {
        let png = self.to_png_bytes()?;
        Ok(format!("data:image/png;base64,{}", BASE64.encode(png)))
    }

    /// Save the result as PNG with alpha channel
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        crate::services::ImageIOService::save_png(&self.image, path)
    }
}

/// A batch entry that could not be processed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailure {
    pub file_name: String,
    pub reason: String,
}

/// Aggregate outcome of a batch run
///
/// `succeeded + failed == total` and `failures.len() == failed` hold at all
/// times; only the batch processor records entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<FileFailure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl BatchSummary {
    pub(crate) fn started() -> Self {
        Self {
            started_at: Some(Utc::now()),
            ..Self::default()
        }
    }

    pub(crate) fn record_success(&mut self) {
        self.total += 1;
        self.succeeded += 1;
    }

    pub(crate) fn record_failure<S: Into<String>, R: Into<String>>(
        &mut self,
        file_name: S,
        reason: R,
    ) {
        self.total += 1;
        self.failed += 1;
        self.failures.push(FileFailure {
            file_name: file_name.into(),
            reason: reason.into(),
        });
    }

    pub(crate) fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// True when every attempted file succeeded
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Serialize the summary as pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Batch summary")?;
        writeln!(f, "  Total:     {}", self.total)?;
        writeln!(f, "  Succeeded: {}", self.succeeded)?;
        write!(f, "  Failed:    {}", self.failed)?;
        if !self.failures.is_empty() {
            writeln!(f)?;
            write!(f, "  Failed files:")?;
            for failure in &self.failures {
                writeln!(f)?;
                write!(f, "    - {}: {}", failure.file_name, failure.reason)?;
            }
        }
        Ok(())
    }
}
