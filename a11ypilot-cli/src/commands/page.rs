//! Page command - scan one page without crawling

use anyhow::Result;
use clap::Args;

use a11ypilot_core::domain::audit::{FrameworkPreference, ScanOptions};

use crate::context::CliContext;
use crate::exit_codes;
use crate::output::render_page;

/// Arguments for the page command
#[derive(Args, Debug)]
pub struct PageArgs {
    /// Page URL (http or https)
    pub url: String,

    /// Sample page load timing
    #[arg(long)]
    pub performance: bool,

    /// Skip the heuristic checks
    #[arg(long)]
    pub no_custom_rules: bool,

    /// Framework to assume instead of detecting it
    #[arg(long, default_value = "auto")]
    pub framework: FrameworkPreference,
}

pub async fn run(ctx: &CliContext, args: &PageArgs) -> Result<i32> {
    let options = ScanOptions {
        max_pages: 1,
        crawl_depth: 0,
        include_performance: args.performance,
        custom_rules: !args.no_custom_rules,
        framework: args.framework,
    };

    match ctx.pipeline.scan_page(&args.url, &options).await {
        Ok(result) => {
            ctx.output.emit(&result, render_page)?;
            Ok(exit_codes::SUCCESS)
        }
        Err(e) => Ok(super::report_failure(&e)),
    }
}
