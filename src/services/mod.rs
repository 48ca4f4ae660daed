//! Services separating file I/O, output naming and progress reporting from
//! the removal logic

pub mod format;
pub mod io;
pub mod progress;

pub use format::OutputNaming;
pub use io::{ImageIOService, SUPPORTED_EXTENSIONS};
pub use progress::{ConsoleProgressReporter, FileOutcome, NoOpProgressReporter, ProgressReporter};

#[cfg(feature = "cli")]
pub use progress::IndicatifProgressReporter;
