//! Background removal CLI tool
//!
//! A file input is processed on its own and any error exits non-zero. A
//! directory input runs the batch processor, prints the summary and exits
//! zero regardless of per-file failures.

use super::config::CliConfigBuilder;
use crate::{
    batch::BatchProcessor,
    chain::MethodChain,
    config::RemovalConfig,
    methods::MethodKind,
    remove_background_from_file_with_naming,
    services::{ImageIOService, OutputNaming},
    tracing_config::{init_cli_tracing, TracingFormat},
};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::{debug, info};

/// Remove image backgrounds with a neural model and classical fallbacks
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "bgremove")]
pub struct Cli {
    /// Input image file, or a directory for batch processing
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output file (single input) or destination directory (batch)
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Comma-separated method order (neural, threshold-contour, brightness, alpha-composite)
    #[arg(long, value_delimiter = ',', value_name = "METHODS")]
    pub methods: Option<Vec<MethodKind>>,

    /// ONNX model for the neural method [default: platform cache directory]
    #[arg(short, long, value_name = "PATH")]
    pub model: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Glob applied to file names in batch mode (e.g. "*.jpg")
    #[arg(long)]
    pub pattern: Option<String>,

    /// Write the batch summary as JSON to this file
    #[arg(long, value_name = "FILE")]
    pub summary_json: Option<PathBuf>,

    /// Print the result as a PNG data URL instead of writing a file
    #[arg(long)]
    pub data_url: bool,

    /// Show a progress bar during batch processing
    #[arg(long)]
    pub progress: bool,

    /// Log output format
    #[arg(long, value_enum, default_value_t = CliLogFormat::Console)]
    pub log_format: CliLogFormat,

    /// Enable verbose logging (-v: DEBUG, -vv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliLogFormat {
    Console,
    Compact,
    #[cfg(feature = "tracing-json")]
    Json,
}

impl From<CliLogFormat> for TracingFormat {
    fn from(format: CliLogFormat) -> Self {
        match format {
            CliLogFormat::Console => Self::Console,
            CliLogFormat::Compact => Self::Compact,
            #[cfg(feature = "tracing-json")]
            CliLogFormat::Json => Self::Json,
        }
    }
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();

    let _tracing_guard = init_cli_tracing(cli.verbose, cli.log_format.into())
        .context("Failed to initialize tracing")?;

    if !cli.input.exists() {
        anyhow::bail!("Input not found: {}", cli.input.display());
    }
    CliConfigBuilder::validate_cli(&cli).context("Invalid CLI arguments")?;

    let config = CliConfigBuilder::from_cli(&cli).context("Failed to build configuration")?;
    let chain = MethodChain::from_config(&config);
    info!(methods = ?chain.method_kinds(), "Starting background removal");
    debug!(?config, "Resolved configuration");

    if cli.input.is_dir() {
        run_batch(&cli, &config, chain)
    } else {
        run_single(&cli, &config, &chain)
    }
}

fn run_single(cli: &Cli, config: &RemovalConfig, chain: &MethodChain) -> Result<()> {
    if cli.data_url {
        let image = ImageIOService::load_image(&cli.input)
            .with_context(|| format!("Failed to load {}", cli.input.display()))?;
        let output = chain
            .run(&image)
            .with_context(|| format!("Failed to process {}", cli.input.display()))?;
        println!("{}", output.to_data_url()?);
        return Ok(());
    }

    let naming = OutputNaming::new(config.output_suffix.clone());
    let written =
        remove_background_from_file_with_naming(&cli.input, cli.output.as_deref(), chain, &naming)
            .with_context(|| format!("Failed to process {}", cli.input.display()))?;
    println!("{}", written.display());
    Ok(())
}

fn run_batch(cli: &Cli, config: &RemovalConfig, chain: MethodChain) -> Result<()> {
    let destination = CliConfigBuilder::batch_destination(cli, config);
    let batch_config = CliConfigBuilder::batch_config(cli, config)?;
    let processor = BatchProcessor::new(chain, batch_config);

    let summary = processor
        .run(&cli.input, &destination)
        .with_context(|| format!("Batch processing of {} failed", cli.input.display()))?;

    println!("{summary}");
    println!("Output directory: {}", destination.display());

    if let Some(path) = &cli.summary_json {
        std::fs::write(path, summary.to_json()?)
            .with_context(|| format!("Failed to write summary to {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_defaults() {
        let cli = Cli::parse_from(["bgremove", "photo.jpg"]);
        assert_eq!(cli.input, PathBuf::from("photo.jpg"));
        assert!(cli.output.is_none());
        assert!(cli.methods.is_none());
        assert!(!cli.data_url);
        assert_eq!(cli.log_format, CliLogFormat::Console);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_cli_parses_method_list() {
        let cli = Cli::parse_from(["bgremove", "dir", "--methods", "neural,brightness", "-vv"]);
        assert_eq!(
            cli.methods,
            Some(vec![MethodKind::Neural, MethodKind::Brightness])
        );
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_rejects_unknown_method() {
        assert!(Cli::try_parse_from(["bgremove", "dir", "--methods", "grabcut"]).is_err());
    }
}
