//! Error types for background removal operations

use crate::types::MethodFailure;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for background removal operations
pub type Result<T> = std::result::Result<T, BgRemovalError>;

/// Error kinds surfaced by the removal chain, the batch processor and the
/// single-file entry points
#[derive(Error, Debug)]
pub enum BgRemovalError {
    /// Source file or directory does not exist
    #[error("Input not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// Extension outside the supported set, or the bytes could not be decoded
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A single removal method could not produce a result; the chain turns
    /// these into entries of [`BgRemovalError::AllMethodsExhausted`]
    #[error("{0}")]
    MethodFailure(MethodFailure),

    /// Every method in the chain failed for a given image
    #[error("All removal methods failed: {}", summarize_failures(.failures))]
    AllMethodsExhausted {
        /// One entry per attempted method, in attempt order
        failures: Vec<MethodFailure>,
    },

    /// Destination path could not be created or written
    #[error("Failed to write '{}': {reason}", .path.display())]
    WriteFailure {
        /// Path that could not be written
        path: PathBuf,
        /// Underlying cause
        reason: String,
    },

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Neural model loading or inference errors
    #[error("Model error: {0}")]
    Model(String),

    /// JSON encoding of reports
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Input/output errors not covered by a more specific kind
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image codec errors
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),
}

fn summarize_failures(failures: &[MethodFailure]) -> String {
    if failures.is_empty() {
        return "no methods were configured".to_string();
    }
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl BgRemovalError {
    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new unsupported format error
    pub fn unsupported_format<S: Into<String>>(format: S) -> Self {
        Self::UnsupportedFormat(format.into())
    }

    /// Create a new model error
    pub fn model<S: Into<String>>(msg: S) -> Self {
        Self::Model(msg.into())
    }

    /// Create a new input-not-found error
    pub fn input_not_found<P: AsRef<Path>>(path: P) -> Self {
        Self::InputNotFound(path.as_ref().to_path_buf())
    }

    /// Create a write failure for `path` with the underlying cause
    pub fn write_failure<P: AsRef<Path>, E: std::fmt::Display>(path: P, error: E) -> Self {
        Self::WriteFailure {
            path: path.as_ref().to_path_buf(),
            reason: error.to_string(),
        }
    }

    /// Create image decoding error with format context
    pub fn decode_error<P: AsRef<Path>>(path: P, error: &image::ImageError) -> Self {
        let path_ref = path.as_ref();
        let extension = path_ref
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown");

        Self::UnsupportedFormat(format!(
            "Failed to decode '{}' (format: {}): {}",
            path_ref.display(),
            extension,
            error
        ))
    }

    /// Create model error with troubleshooting context
    pub fn model_error_with_context<P: AsRef<Path>>(
        operation: &str,
        model_path: P,
        error: &str,
        suggestions: &[&str],
    ) -> Self {
        let path_display = model_path.as_ref().display();
        let suggestion_text = if suggestions.is_empty() {
            String::new()
        } else {
            format!(" Suggestions: {}", suggestions.join(", "))
        };

        Self::Model(format!(
            "Failed to {} model '{}': {}.{}",
            operation, path_display, error, suggestion_text
        ))
    }

    /// Create configuration error with valid ranges
    pub fn config_value_error<T: std::fmt::Display>(
        parameter: &str,
        value: T,
        valid_range: &str,
    ) -> Self {
        Self::InvalidConfig(format!(
            "Invalid {}: {} (valid range: {})",
            parameter, value, valid_range
        ))
    }

    /// Individual method failures carried by this error, if any
    #[must_use]
    pub fn method_failures(&self) -> &[MethodFailure] {
        match self {
            Self::AllMethodsExhausted { failures } => failures,
            Self::MethodFailure(failure) => std::slice::from_ref(failure),
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::methods::MethodKind;

    #[test]
    fn test_error_creation() {
        let err = BgRemovalError::invalid_config("test config error");
        assert!(matches!(err, BgRemovalError::InvalidConfig(_)));

        let err = BgRemovalError::unsupported_format("TIFF");
        assert!(matches!(err, BgRemovalError::UnsupportedFormat(_)));

        let err = BgRemovalError::input_not_found("/missing/dir");
        assert!(matches!(err, BgRemovalError::InputNotFound(_)));
    }

    #[test]
    fn test_error_display() {
        let err = BgRemovalError::invalid_config("brightness cutoff must be positive");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: brightness cutoff must be positive"
        );

        let err = BgRemovalError::input_not_found("/photos/cat.jpg");
        assert_eq!(err.to_string(), "Input not found: /photos/cat.jpg");
    }

    #[test]
    fn test_json_errors_convert_to_serialization() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: BgRemovalError = json_err.into();
        assert!(matches!(err, BgRemovalError::Serialization(_)));
        assert!(err.to_string().starts_with("Serialization error"));
    }

    #[test]
    fn test_exhausted_lists_every_reason() {
        let err = BgRemovalError::AllMethodsExhausted {
            failures: vec![
                MethodFailure::new(MethodKind::Neural, "model unavailable"),
                MethodFailure::new(MethodKind::ThresholdContour, "no contours found"),
            ],
        };

        let message = err.to_string();
        assert!(message.contains("model unavailable"));
        assert!(message.contains("no contours found"));
        assert_eq!(err.method_failures().len(), 2);
    }

    #[test]
    fn test_exhausted_with_no_methods() {
        let err = BgRemovalError::AllMethodsExhausted { failures: vec![] };
        assert!(err.to_string().contains("no methods were configured"));
        assert!(err.method_failures().is_empty());
    }

    #[test]
    fn test_write_failure_context() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = BgRemovalError::write_failure("/readonly/out.png", io_error);
        let message = err.to_string();
        assert!(message.contains("/readonly/out.png"));
        assert!(message.contains("access denied"));
    }

    #[test]
    fn test_enhanced_error_context() {
        let err = BgRemovalError::model_error_with_context(
            "load",
            Path::new("/models/missing.onnx"),
            "file not found",
            &["check --model", "place a model in the cache directory"],
        );
        let message = err.to_string();
        assert!(message.contains("load"));
        assert!(message.contains("/models/missing.onnx"));
        assert!(message.contains("Suggestions"));

        let err = BgRemovalError::config_value_error("blur_kernel_size", 4, "odd values >= 3");
        let message = err.to_string();
        assert!(message.contains("blur_kernel_size"));
        assert!(message.contains("odd values >= 3"));
    }
}
