//! Batch progress reporting
//!
//! The batch processor reports each file's start and outcome through a
//! [`ProgressReporter`]. Reporters observe only; they never influence which
//! files are processed or how.

use crate::types::BatchSummary;
use std::path::Path;

/// Outcome of a single batch entry as seen by a reporter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome<'a> {
    Succeeded,
    Failed(&'a str),
}

/// Trait for reporting batch progress
pub trait ProgressReporter: Send + Sync {
    /// Called once the number of matching files is known
    fn batch_started(&self, _total: usize) {}

    /// Called before the chain runs for `path` (1-based `index`)
    fn file_started(&self, index: usize, total: usize, path: &Path);

    /// Called after the file's outcome is recorded
    fn file_finished(&self, path: &Path, outcome: FileOutcome<'_>);

    /// Called with the final summary
    fn batch_finished(&self, summary: &BatchSummary);
}

/// No-op progress reporter for when progress reporting is disabled
#[derive(Debug, Default)]
pub struct NoOpProgressReporter;

impl ProgressReporter for NoOpProgressReporter {
    fn file_started(&self, _index: usize, _total: usize, _path: &Path) {}

    fn file_finished(&self, _path: &Path, _outcome: FileOutcome<'_>) {}

    fn batch_finished(&self, _summary: &BatchSummary) {}
}

/// Reporter writing one log line per event
#[derive(Debug, Default)]
pub struct ConsoleProgressReporter {
    verbose: bool,
}

impl ConsoleProgressReporter {
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ProgressReporter for ConsoleProgressReporter {
    fn batch_started(&self, total: usize) {
        log::info!("Processing {total} file(s)");
    }

    fn file_started(&self, index: usize, total: usize, path: &Path) {
        if self.verbose {
            log::info!("[{index}/{total}] {}", path.display());
        }
    }

    fn file_finished(&self, path: &Path, outcome: FileOutcome<'_>) {
        match outcome {
            FileOutcome::Succeeded => log::info!("Processed {}", path.display()),
            FileOutcome::Failed(reason) => log::warn!("Failed {}: {reason}", path.display()),
        }
    }

    fn batch_finished(&self, summary: &BatchSummary) {
        log::info!(
            "Batch complete: {} succeeded, {} failed of {}",
            summary.succeeded,
            summary.failed,
            summary.total
        );
    }
}

#[cfg(feature = "cli")]
mod indicatif_reporter {
    use super::{FileOutcome, ProgressReporter};
    use crate::types::BatchSummary;
    use indicatif::{ProgressBar, ProgressStyle};
    use std::path::Path;

    /// Terminal progress bar for batch runs
    #[derive(Debug)]
    pub struct IndicatifProgressReporter {
        bar: ProgressBar,
    }

    impl IndicatifProgressReporter {
        #[must_use]
        pub fn new() -> Self {
            let bar = ProgressBar::new(0);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            Self { bar }
        }
    }

    impl Default for IndicatifProgressReporter {
        fn default() -> Self {
            Self::new()
        }
    }

    impl ProgressReporter for IndicatifProgressReporter {
        fn batch_started(&self, total: usize) {
            self.bar.set_length(total as u64);
        }

        fn file_started(&self, _index: usize, _total: usize, path: &Path) {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            self.bar.set_message(name);
        }

        fn file_finished(&self, path: &Path, outcome: FileOutcome<'_>) {
            if let FileOutcome::Failed(reason) = outcome {
                self.bar
                    .println(format!("Failed {}: {reason}", path.display()));
            }
            self.bar.inc(1);
        }

        fn batch_finished(&self, summary: &BatchSummary) {
            self.bar.finish_with_message(format!(
                "{} succeeded, {} failed",
                summary.succeeded, summary.failed
            ));
        }
    }
}

#[cfg(feature = "cli")]
pub use indicatif_reporter::IndicatifProgressReporter;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_batch_started_is_optional() {
        let reporter = NoOpProgressReporter;
        reporter.batch_started(3);
        reporter.file_started(1, 3, Path::new("a.png"));
        reporter.file_finished(Path::new("a.png"), FileOutcome::Succeeded);
        reporter.batch_finished(&BatchSummary::default());
    }

    #[test]
    fn test_console_reporter_does_not_panic() {
        let reporter = ConsoleProgressReporter::new(true);
        reporter.batch_started(1);
        reporter.file_started(1, 1, Path::new("a.png"));
        reporter.file_finished(Path::new("a.png"), FileOutcome::Succeeded);
        reporter.batch_finished(&BatchSummary::default());
    }
}
