//! Directory batch processing
//!
//! Files are processed sequentially in the directory's listing order. A
//! file's failure is recorded in the [`BatchSummary`] and never aborts the
//! batch; only a missing source or an uncreatable destination is fatal.

use crate::{
    chain::MethodChain,
    error::{BgRemovalError, Result},
    services::{
        progress::FileOutcome, ImageIOService, NoOpProgressReporter, OutputNaming,
        ProgressReporter,
    },
    types::BatchSummary,
};
use std::path::{Path, PathBuf};
use tracing::{info, info_span, instrument, warn};
use walkdir::WalkDir;

/// Batch settings passed in at construction
pub struct BatchConfig {
    /// Output naming policy
    pub naming: OutputNaming,
    /// Optional glob applied to file names after the extension filter
    pub pattern: Option<glob::Pattern>,
    /// Receives per-file events
    pub reporter: Box<dyn ProgressReporter>,
}

impl BatchConfig {
    /// Compile and set the file name filter
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self> {
        let compiled = glob::Pattern::new(pattern).map_err(|e| {
            BgRemovalError::invalid_config(format!("Invalid file pattern '{pattern}': {e}"))
        })?;
        self.pattern = Some(compiled);
        Ok(self)
    }

    #[must_use]
    pub fn with_reporter(mut self, reporter: Box<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    #[must_use]
    pub fn with_naming(mut self, naming: OutputNaming) -> Self {
        self.naming = naming;
        self
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            naming: OutputNaming::default(),
            pattern: None,
            reporter: Box::new(NoOpProgressReporter),
        }
    }
}

impl std::fmt::Debug for BatchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchConfig")
            .field("naming", &self.naming)
            .field("pattern", &self.pattern.as_ref().map(glob::Pattern::as_str))
            .finish_non_exhaustive()
    }
}

/// Drives a [`MethodChain`] over every supported image in a directory
#[derive(Debug)]
pub struct BatchProcessor {
    chain: MethodChain,
    config: BatchConfig,
}

impl BatchProcessor {
    #[must_use]
    pub fn new(chain: MethodChain, config: BatchConfig) -> Self {
        Self { chain, config }
    }

    #[must_use]
    pub fn chain(&self) -> &MethodChain {
        &self.chain
    }

    /// Supported files directly inside `source`, in listing order
    ///
    /// Subdirectories are not descended into, symlinks are followed, and
    /// unsupported extensions are skipped silently.
    pub fn collect_inputs(&self, source: &Path) -> Result<Vec<PathBuf>> {
        if !source.is_dir() {
            return Err(BgRemovalError::input_not_found(source));
        }

        let mut inputs = Vec::new();
        let walker = WalkDir::new(source)
            .follow_links(true)
            .min_depth(1)
            .max_depth(1);
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                // Broken links and unreadable entries are skipped like other non-images
                Err(e) if e.depth() > 0 => {
                    warn!(error = %e, "Skipping unreadable directory entry");
                    continue;
                },
                Err(e) => {
                    return Err(BgRemovalError::Io(std::io::Error::new(
                        std::io::ErrorKind::Other,
                        format!("Failed to list '{}': {e}", source.display()),
                    )));
                },
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if !ImageIOService::is_supported_extension(path) {
                continue;
            }
            if let Some(pattern) = &self.config.pattern {
                let name = entry.file_name().to_string_lossy();
                if !pattern.matches(&name) {
                    continue;
                }
            }
            inputs.push(path.to_path_buf());
        }
        Ok(inputs)
    }

    /// Process every supported image in `source`, writing PNG outputs into
    /// `destination`
    ///
    /// # Errors
    /// - `InputNotFound` when `source` is not an existing directory
    /// - `WriteFailure` when `destination` cannot be created
    #[instrument(
        name = "batch_processing",
        skip(self, source, destination),
        fields(source = %source.display())
    )]
    pub fn run(&self, source: &Path, destination: &Path) -> Result<BatchSummary> {
        let inputs = self.collect_inputs(source)?;
        std::fs::create_dir_all(destination)
            .map_err(|e| BgRemovalError::write_failure(destination, e))?;

        let total = inputs.len();
        info!(files = total, destination = %destination.display(), "Starting batch");
        self.config.reporter.batch_started(total);

        let mut summary = BatchSummary::started();
        for (index, input) in inputs.iter().enumerate() {
            self.config.reporter.file_started(index + 1, total, input);

            let file_name = input
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            match self.process_file(input, destination) {
                Ok(output_path) => {
                    info!(file = %file_name, output = %output_path.display(), "File processed");
                    summary.record_success();
                    self.config.reporter.file_finished(input, FileOutcome::Succeeded);
                },
                Err(e) => {
                    let reason = e.to_string();
                    warn!(file = %file_name, %reason, "File failed");
                    self.config
                        .reporter
                        .file_finished(input, FileOutcome::Failed(&reason));
                    summary.record_failure(file_name, reason);
                },
            }
        }
        summary.finish();

        info!(
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Batch complete"
        );
        self.config.reporter.batch_finished(&summary);
        Ok(summary)
    }

    /// Decode, run the chain and write one file; nothing is written on failure
    fn process_file(&self, input: &Path, destination: &Path) -> Result<PathBuf> {
        let span = info_span!("file_processing", file = %input.display());
        let _guard = span.enter();

        let image = ImageIOService::load_image(input)?;
        let output = self.chain.run(&image)?;
        drop(image);

        let output_path = self.config.naming.output_path_in(input, destination);
        output.save_png(&output_path)?;
        Ok(output_path)
    }
}
