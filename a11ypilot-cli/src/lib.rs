//! a11ypilot CLI - accessibility audits from the command line
//!
//! - `scan`: crawl a site, score every violation and propose fixes
//! - `page`: scan a single page without crawling or scoring
//! - `detect`: report the UI framework a page is built with

pub mod commands;
mod context;
mod output;

pub use context::CliContext;
pub use output::{OutputFormat, OutputWriter};

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// a11ypilot - WCAG scanning and remediation planning
#[derive(Parser, Debug)]
#[command(
    name = "a11ypilot",
    version,
    about = "Accessibility (WCAG) scanning and remediation planning",
    long_about = "a11ypilot crawls a site, merges rule-engine and heuristic findings, ranks \
                  every violation by legal, user and business impact, and proposes code fixes.\n\n\
                  Scoring and fixes use a reasoning service when A11YPILOT__LLM__OPENAI__API_KEY \
                  (or the Azure equivalent) is set, and deterministic rules otherwise."
)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Configuration file path
    #[arg(long, global = true, env = "A11YPILOT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl a site and build a prioritized remediation plan
    #[command(visible_alias = "s")]
    Scan(commands::scan::ScanArgs),

    /// Scan a single page
    #[command(visible_alias = "p")]
    Page(commands::page::PageArgs),

    /// Detect the UI framework of a page
    #[command(visible_alias = "d")]
    Detect(commands::detect::DetectArgs),
}

/// CLI application runner
pub struct CliApp {
    cli: Cli,
    context: CliContext,
}

impl CliApp {
    pub fn new(cli: Cli) -> anyhow::Result<Self> {
        let context = CliContext::new(&cli)?;
        Ok(Self { cli, context })
    }

    /// Run the selected command and return the process exit code
    pub async fn run(self) -> anyhow::Result<i32> {
        match self.cli.command {
            Commands::Scan(ref args) => commands::scan::run(&self.context, args).await,
            Commands::Page(ref args) => commands::page::run(&self.context, args).await,
            Commands::Detect(ref args) => commands::detect::run(&self.context, args).await,
        }
    }
}

/// Process exit codes
pub mod exit_codes {
    /// Audit completed
    pub const SUCCESS: i32 = 0;
    /// Configuration could not be loaded or is invalid
    pub const CONFIG_ERROR: i32 = 1;
    /// The seed page could not be scanned, or the request was rejected
    pub const SCAN_FAILED: i32 = 2;
    /// Internal error
    pub const INTERNAL_ERROR: i32 = 99;
}
