#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]

//! # Background Removal Fallback Chain
//!
//! Removes the background of raster images by trying a prioritized list of
//! methods until one succeeds:
//!
//! 1. **Neural segmentation** through a pure Rust ONNX model (`tract` feature)
//! 2. **Threshold + contour mask**: Otsu threshold, filled external contours
//! 3. **Brightness mask**: per-channel cutoff
//! 4. **Alpha composite** (opt-in): adds an opaque alpha channel, removes nothing
//!
//! Output is always RGBA encoded as PNG. A batch processor runs the chain over
//! every supported image in a directory and reports an aggregate summary.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bgremove_chain::{remove_background_from_file, MethodChain, RemovalConfig};
//! use std::path::Path;
//!
//! let config = RemovalConfig::builder()
//!     .model_path("models/isnet.onnx")
//!     .build()?;
//! let chain = MethodChain::from_config(&config);
//!
//! let written = remove_background_from_file(Path::new("photo.jpg"), None, &chain)?;
//! println!("Saved {}", written.display());
//! # Ok::<(), bgremove_chain::BgRemovalError>(())
//! ```
//!
//! ## Batch processing
//!
//! ```rust,no_run
//! use bgremove_chain::{BatchConfig, BatchProcessor, MethodChain, RemovalConfig};
//! use std::path::Path;
//!
//! let chain = MethodChain::from_config(&RemovalConfig::default());
//! let processor = BatchProcessor::new(chain, BatchConfig::default());
//! let summary = processor.run(Path::new("photos"), Path::new("photos/no_background"))?;
//! println!("{summary}");
//! # Ok::<(), bgremove_chain::BgRemovalError>(())
//! ```
//!
//! ### Feature Flags
//!
//! - `tract` (default): neural segmentation backend
//! - `cli` (default): command-line interface, progress bars and tracing setup
//! - `webp-support` (default): WebP decoding
//! - `tracing-json`, `tracing-files`: extra CLI log outputs

pub mod batch;
pub mod chain;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod methods;
pub mod services;
#[cfg(feature = "cli")]
pub mod tracing_config;
pub mod types;

use std::path::{Path, PathBuf};

pub use batch::{BatchConfig, BatchProcessor};
pub use chain::MethodChain;
pub use config::{RemovalConfig, RemovalConfigBuilder};
pub use error::{BgRemovalError, Result};
pub use methods::{
    AlphaCompositeNoOp, BrightnessMask, MethodKind, NeuralSegmentation, RemovalMethod, Segmenter,
    ThresholdContourMask,
};
pub use services::{
    ConsoleProgressReporter, ImageIOService, NoOpProgressReporter, OutputNaming,
    ProgressReporter, SUPPORTED_EXTENSIONS,
};
pub use types::{
    BatchSummary, FileFailure, Mask, MethodFailure, RemovalOutput, RemovalResult,
};

#[cfg(feature = "tract")]
pub use methods::TractSegmenter;

#[cfg(feature = "cli")]
pub use tracing_config::{init_cli_tracing, TracingConfig, TracingFormat};

/// Remove the background from encoded image bytes
///
/// Suitable for uploads and other in-memory sources. Any supported input
/// format is accepted.
///
/// # Errors
/// - `UnsupportedFormat` when the bytes cannot be decoded
/// - `AllMethodsExhausted` when no method in the chain succeeds
///
/// # Examples
/// ```rust,no_run
/// use bgremove_chain::{remove_background_from_bytes, MethodChain, RemovalConfig};
///
/// # fn example(upload: Vec<u8>) -> bgremove_chain::Result<String> {
/// let chain = MethodChain::from_config(&RemovalConfig::default());
/// let output = remove_background_from_bytes(&upload, &chain)?;
/// output.to_data_url()
/// # }
/// ```
pub fn remove_background_from_bytes(bytes: &[u8], chain: &MethodChain) -> Result<RemovalOutput> {
    let image = ImageIOService::decode_bytes(bytes)?;
    chain.run(&image)
}

/// Remove the background from an image file and write the PNG result
///
/// Without an explicit `output`, the result is written next to the input as
/// `{baseName}_nobg.png`. Returns the path that was written.
///
/// # Errors
/// - `InputNotFound` when `input` does not exist
/// - `UnsupportedFormat` for an unsupported extension or undecodable file
/// - `AllMethodsExhausted` when no method in the chain succeeds
/// - `WriteFailure` when the output cannot be written
pub fn remove_background_from_file(
    input: &Path,
    output: Option<&Path>,
    chain: &MethodChain,
) -> Result<PathBuf> {
    remove_background_from_file_with_naming(input, output, chain, &OutputNaming::default())
}

/// [`remove_background_from_file`] with an explicit naming policy for the
/// default output path
pub fn remove_background_from_file_with_naming(
    input: &Path,
    output: Option<&Path>,
    chain: &MethodChain,
    naming: &OutputNaming,
) -> Result<PathBuf> {
    let image = ImageIOService::load_image(input)?;
    let result = chain.run(&image)?;

    let output_path = output.map_or_else(|| naming.sibling_output_path(input), Path::to_path_buf);
    result.save_png(&output_path)?;
    tracing::info!(
        input = %input.display(),
        output = %output_path.display(),
        method = %result.method,
        "Background removed"
    );
    Ok(output_path)
}
