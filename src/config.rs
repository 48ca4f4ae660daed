//! Configuration types for background removal operations

use crate::{
    error::{BgRemovalError, Result},
    methods::{brightness::DEFAULT_BRIGHTNESS_CUTOFF, threshold::DEFAULT_BLUR_KERNEL_SIZE, MethodKind},
    services::format::{DEFAULT_OUTPUT_DIR_NAME, DEFAULT_OUTPUT_SUFFIX},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default square input size of the segmentation model
pub const DEFAULT_MODEL_INPUT_SIZE: u32 = 1024;

const MAX_BLUR_KERNEL_SIZE: u32 = 31;

/// Configuration for the removal chain and batch output naming
///
/// Loadable from JSON; missing keys take their defaults and unknown keys are
/// rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RemovalConfig {
    /// Methods to try, highest priority first
    pub methods: Vec<MethodKind>,

    /// Brightness method cutoff (0-255)
    pub brightness_cutoff: u8,

    /// Threshold method blur kernel side (odd, 3-31)
    pub blur_kernel_size: u32,

    /// ONNX model for the neural method (None = default cache location)
    pub model_path: Option<PathBuf>,

    /// Square model input side in pixels
    pub model_input_size: u32,

    /// Per-channel normalization mean on a 0-1 scale
    pub normalization_mean: [f32; 3],

    /// Per-channel normalization standard deviation on a 0-1 scale
    pub normalization_std: [f32; 3],

    /// Suffix appended to the input's base name for outputs
    pub output_suffix: String,

    /// Batch destination directory name inside the source directory
    pub output_dir_name: String,
}

impl Default for RemovalConfig {
    fn default() -> Self {
        Self {
            methods: vec![
                MethodKind::Neural,
                MethodKind::ThresholdContour,
                MethodKind::Brightness,
            ],
            brightness_cutoff: DEFAULT_BRIGHTNESS_CUTOFF,
            blur_kernel_size: DEFAULT_BLUR_KERNEL_SIZE,
            model_path: None,
            model_input_size: DEFAULT_MODEL_INPUT_SIZE,
            normalization_mean: [0.5, 0.5, 0.5],
            normalization_std: [1.0, 1.0, 1.0],
            output_suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
            output_dir_name: DEFAULT_OUTPUT_DIR_NAME.to_string(),
        }
    }
}

impl RemovalConfig {
    /// Create a new configuration builder
    ///
    /// # Examples
    /// ```rust
    /// use bgremove_chain::{MethodKind, RemovalConfig};
    ///
    /// let config = RemovalConfig::builder()
    ///     .methods(vec![MethodKind::ThresholdContour, MethodKind::Brightness])
    ///     .brightness_cutoff(230)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.methods.len(), 2);
    /// ```
    #[must_use]
    pub fn builder() -> RemovalConfigBuilder {
        RemovalConfigBuilder::default()
    }

    /// Load and validate a JSON configuration file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        if !path_ref.exists() {
            return Err(BgRemovalError::input_not_found(path_ref));
        }

        let contents = std::fs::read_to_string(path_ref)?;
        let config: Self = serde_json::from_str(&contents).map_err(|e| {
            BgRemovalError::invalid_config(format!(
                "Failed to parse '{}': {e}",
                path_ref.display()
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Model location used when `model_path` is unset
    #[must_use]
    pub fn default_model_path() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("bgremove")
            .join("models")
            .join("model.onnx")
    }

    /// Configured model path, or the default location
    #[must_use]
    pub fn resolved_model_path(&self) -> PathBuf {
        self.model_path
            .clone()
            .unwrap_or_else(Self::default_model_path)
    }

    /// Validate all configuration parameters
    ///
    /// # Errors
    /// - Empty or duplicated method list
    /// - Even blur kernel, or one outside 3-31
    /// - Model input size outside 32-4096
    /// - Zero or negative normalization standard deviation
    /// - Empty output suffix, or a directory name containing separators
    pub fn validate(&self) -> Result<()> {
        if self.methods.is_empty() {
            return Err(BgRemovalError::invalid_config(
                "At least one removal method must be configured",
            ));
        }
        for (i, method) in self.methods.iter().enumerate() {
            if self.methods.iter().skip(i + 1).any(|m| m == method) {
                return Err(BgRemovalError::invalid_config(format!(
                    "Removal method '{method}' is listed more than once"
                )));
            }
        }

        if self.blur_kernel_size % 2 == 0
            || !(3..=MAX_BLUR_KERNEL_SIZE).contains(&self.blur_kernel_size)
        {
            return Err(BgRemovalError::config_value_error(
                "blur kernel size",
                self.blur_kernel_size,
                "odd, 3-31",
            ));
        }

        if !(32..=4096).contains(&self.model_input_size) {
            return Err(BgRemovalError::config_value_error(
                "model input size",
                self.model_input_size,
                "32-4096",
            ));
        }

        if self.normalization_std.iter().any(|s| *s <= 0.0 || !s.is_finite()) {
            return Err(BgRemovalError::config_value_error(
                "normalization std",
                format!("{:?}", self.normalization_std),
                "finite and > 0",
            ));
        }

        if self.output_suffix.is_empty() {
            return Err(BgRemovalError::invalid_config(
                "Output suffix must not be empty",
            ));
        }

        if self.output_dir_name.is_empty()
            || self.output_dir_name.contains(['/', '\\'])
        {
            return Err(BgRemovalError::config_value_error(
                "output directory name",
                &self.output_dir_name,
                "a single non-empty path component",
            ));
        }

        Ok(())
    }
}

/// Builder for `RemovalConfig`
#[derive(Debug, Default)]
pub struct RemovalConfigBuilder {
    config: RemovalConfig,
}

impl RemovalConfigBuilder {
    /// Set the method priority order
    #[must_use]
    pub fn methods(mut self, methods: Vec<MethodKind>) -> Self {
        self.config.methods = methods;
        self
    }

    #[must_use]
    pub fn brightness_cutoff(mut self, cutoff: u8) -> Self {
        self.config.brightness_cutoff = cutoff;
        self
    }

    #[must_use]
    pub fn blur_kernel_size(mut self, size: u32) -> Self {
        self.config.blur_kernel_size = size;
        self
    }

    /// Set the ONNX model path for the neural method
    #[must_use]
    pub fn model_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.model_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn model_input_size(mut self, size: u32) -> Self {
        self.config.model_input_size = size;
        self
    }

    /// Set normalization mean and standard deviation
    #[must_use]
    pub fn normalization(mut self, mean: [f32; 3], std: [f32; 3]) -> Self {
        self.config.normalization_mean = mean;
        self.config.normalization_std = std;
        self
    }

    #[must_use]
    pub fn output_suffix<S: Into<String>>(mut self, suffix: S) -> Self {
        self.config.output_suffix = suffix.into();
        self
    }

    #[must_use]
    pub fn output_dir_name<S: Into<String>>(mut self, name: S) -> Self {
        self.config.output_dir_name = name.into();
        self
    }

    /// Build the configuration, validating it
    pub fn build(self) -> Result<RemovalConfig> {
        let config = self.config;
        config.validate()?;
        Ok(config)
    }
}
