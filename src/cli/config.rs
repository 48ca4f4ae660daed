//! Conversion of CLI arguments into library configuration

use crate::cli::main_impl::Cli;
use crate::{
    batch::BatchConfig,
    config::RemovalConfig,
    services::{ConsoleProgressReporter, IndicatifProgressReporter, OutputNaming},
};
use anyhow::{Context, Result};
use std::path::PathBuf;

pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Configuration file (if any) with command-line overrides applied
    pub(crate) fn from_cli(cli: &Cli) -> Result<RemovalConfig> {
        let mut config = match &cli.config {
            Some(path) => RemovalConfig::from_json_file(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
            None => RemovalConfig::default(),
        };

        if let Some(methods) = &cli.methods {
            config.methods.clone_from(methods);
        }
        if let Some(model) = &cli.model {
            config.model_path = Some(model.clone());
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    /// Batch settings for directory input
    pub(crate) fn batch_config(cli: &Cli, config: &RemovalConfig) -> Result<BatchConfig> {
        let mut batch = BatchConfig::default()
            .with_naming(OutputNaming::new(config.output_suffix.clone()));

        batch = if cli.progress {
            batch.with_reporter(Box::new(IndicatifProgressReporter::new()))
        } else {
            batch.with_reporter(Box::new(ConsoleProgressReporter::new(cli.verbose > 0)))
        };

        if let Some(pattern) = &cli.pattern {
            batch = batch.with_pattern(pattern).context("Invalid --pattern")?;
        }
        Ok(batch)
    }

    /// Batch destination: `--output`, or the configured subdirectory of the source
    pub(crate) fn batch_destination(cli: &Cli, config: &RemovalConfig) -> PathBuf {
        cli.output
            .clone()
            .unwrap_or_else(|| cli.input.join(&config.output_dir_name))
    }

    /// Reject flag combinations that only make sense for one mode
    pub(crate) fn validate_cli(cli: &Cli) -> Result<()> {
        let is_dir = cli.input.is_dir();
        if is_dir && cli.data_url {
            anyhow::bail!("--data-url is only supported for single-file input");
        }
        if !is_dir && (cli.pattern.is_some() || cli.summary_json.is_some()) {
            anyhow::bail!("--pattern and --summary-json require a directory input");
        }
        if cli.data_url && cli.output.is_some() {
            anyhow::bail!("--data-url and --output cannot be combined");
        }
        Ok(())
    }
}
