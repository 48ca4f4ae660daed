//! Tracing configuration for the CLI
//!
//! The library only emits events and spans; installing a subscriber is left
//! to the application. Events sent through the `log` facade are bridged into
//! the same subscriber. Console output goes to stderr so stdout stays free
//! for data URLs and JSON summaries.

use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Configuration for tracing output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracingFormat {
    /// Human-readable console output with colors (default for CLI)
    Console,
    /// Compact console output without colors for CI environments
    Compact,
    /// JSON structured logging
    #[cfg(feature = "tracing-json")]
    Json,
}

/// Configuration for tracing output destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TracingOutput {
    /// Output to stderr (default)
    Console,
    /// Output to a file
    #[cfg(feature = "tracing-files")]
    File(std::path::PathBuf),
    /// Output to both stderr and a file
    #[cfg(feature = "tracing-files")]
    Both(std::path::PathBuf),
}

impl TracingOutput {
    fn writes_console(&self) -> bool {
        match self {
            Self::Console => true,
            #[cfg(feature = "tracing-files")]
            Self::File(_) => false,
            #[cfg(feature = "tracing-files")]
            Self::Both(_) => true,
        }
    }
}

/// Keeps background log writers alive; drop it only at process exit
#[derive(Debug, Default)]
#[must_use]
pub struct TracingGuard {
    #[cfg(feature = "tracing-files")]
    _file: Option<tracing_appender::non_blocking::WorkerGuard>,
}

/// Tracing configuration builder
#[derive(Debug)]
pub struct TracingConfig {
    /// Verbosity level (maps to log levels)
    pub verbosity: u8,
    /// Output format
    pub format: TracingFormat,
    /// Output destination
    pub output: TracingOutput,
    /// Environment filter string (overrides verbosity if set)
    pub env_filter: Option<String>,
    /// Session ID for correlation
    pub session_id: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            verbosity: 0,
            format: TracingFormat::Console,
            output: TracingOutput::Console,
            env_filter: None,
            session_id: None,
        }
    }
}

impl TracingConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set verbosity level (0-2+)
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_output(mut self, output: TracingOutput) -> Self {
        self.output = output;
        self
    }

    /// Set custom environment filter
    #[must_use]
    pub fn with_env_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Set session ID for run correlation
    #[must_use]
    pub fn with_session_id<S: Into<String>>(mut self, session_id: S) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Convert verbosity level to tracing filter string
    #[must_use]
    pub fn verbosity_to_filter(&self) -> &'static str {
        match self.verbosity {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    /// Install the global subscriber
    ///
    /// Fails if a global subscriber is already set or the filter is invalid.
    pub fn init(self) -> anyhow::Result<TracingGuard> {
        let filter = match &self.env_filter {
            Some(env_filter) => EnvFilter::try_new(env_filter)?,
            None => EnvFilter::try_new(self.verbosity_to_filter())?,
        };

        #[allow(unused_mut)]
        let mut guard = TracingGuard::default();
        let mut layers: Vec<BoxedLayer> = Vec::new();

        if self.output.writes_console() {
            layers.push(console_layer(self.format));
        }

        #[cfg(feature = "tracing-files")]
        if let TracingOutput::File(path) | TracingOutput::Both(path) = &self.output {
            use tracing_appender::{non_blocking, rolling};

            let file_appender = rolling::never(
                path.parent().unwrap_or_else(|| std::path::Path::new(".")),
                path.file_name()
                    .unwrap_or_else(|| std::ffi::OsStr::new("bgremove.log")),
            );
            let (file_writer, worker_guard) = non_blocking(file_appender);
            guard._file = Some(worker_guard);

            let file_layer: BoxedLayer = match self.format {
                TracingFormat::Console | TracingFormat::Compact => fmt::layer()
                    .with_ansi(false)
                    .with_writer(file_writer)
                    .compact()
                    .boxed(),
                #[cfg(feature = "tracing-json")]
                TracingFormat::Json => fmt::layer()
                    .json()
                    .with_writer(file_writer)
                    .with_current_span(true)
                    .with_span_list(true)
                    .boxed(),
            };
            layers.push(file_layer);
        }

        tracing_subscriber::registry()
            .with(layers)
            .with(filter)
            .try_init()?;

        if let Some(session_id) = &self.session_id {
            tracing::info!(session_id = %session_id, "Background removal session started");
        }

        Ok(guard)
    }
}

fn console_layer(format: TracingFormat) -> BoxedLayer {
    match format {
        TracingFormat::Console => fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false)
            .with_level(true)
            .compact()
            .boxed(),
        TracingFormat::Compact => fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .with_target(false)
            .compact()
            .boxed(),
        #[cfg(feature = "tracing-json")]
        TracingFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(true)
            .with_span_list(true)
            .boxed(),
    }
}

/// Initialize tracing with CLI-friendly defaults and a fresh session id
pub fn init_cli_tracing(verbosity: u8, format: TracingFormat) -> anyhow::Result<TracingGuard> {
    let session_id = uuid::Uuid::new_v4().to_string();

    TracingConfig::new()
        .with_verbosity(verbosity)
        .with_format(format)
        .with_session_id(session_id)
        .init()
}
