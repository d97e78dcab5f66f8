//! CLI context: configuration, logging and the audit pipeline

use std::path::Path;

use anyhow::{Context, Result};

use a11ypilot::{AuditPipeline, Config, create_pipeline, init_tracing};

use crate::Cli;
use crate::output::OutputWriter;

/// Everything a command needs, built once per invocation
pub struct CliContext {
    pub config: Config,
    pub pipeline: AuditPipeline,
    pub output: OutputWriter,
}

impl CliContext {
    pub fn new(cli: &Cli) -> Result<Self> {
        let mut config = Self::load_config(cli.config.as_deref())?;

        if cli.verbose {
            config.logging.level = "debug".to_string();
        } else if cli.quiet {
            config.logging.level = "error".to_string();
        }
        init_tracing(&config.logging).context("Failed to initialize logging")?;

        let pipeline = create_pipeline(&config).map_err(|e| anyhow::anyhow!(e.user_message()))?;
        let output = OutputWriter::new(cli.format, cli.output.clone());

        Ok(Self {
            config,
            pipeline,
            output,
        })
    }

    fn load_config(path: Option<&Path>) -> Result<Config> {
        match path {
            Some(path) => Config::load_from(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display())),
            None => Config::load().context("Failed to load configuration"),
        }
    }
}
