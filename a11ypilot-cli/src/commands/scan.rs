//! Scan command - crawl, score and plan fixes

use anyhow::Result;
use clap::Args;
use tokio_util::sync::CancellationToken;

use a11ypilot_core::domain::audit::{FrameworkPreference, ScanOptions, SiteContext};

use crate::context::CliContext;
use crate::exit_codes;
use crate::output::render_plan;

/// Arguments for the scan command
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Seed URL (http or https)
    pub url: String,

    /// Page budget including the seed (defaults to crawl.default_max_pages)
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// Link depth followed from the seed; 0 scans only the seed
    #[arg(long, default_value_t = 1)]
    pub depth: u32,

    /// Sample page load timing
    #[arg(long)]
    pub performance: bool,

    /// Skip the heuristic checks and rely on the rule engine alone
    #[arg(long)]
    pub no_custom_rules: bool,

    /// Framework for fix suggestions: auto, react, vue, angular or vanilla
    #[arg(long, default_value = "auto")]
    pub framework: FrameworkPreference,

    /// Industry of the site, used when scoring
    #[arg(long, default_value = "general")]
    pub industry: String,

    /// Traffic volume: low, medium, high or an estimate
    #[arg(long, default_value = "medium")]
    pub traffic: String,

    /// Regions the site serves
    #[arg(long, value_delimiter = ',', default_value = "US")]
    pub regions: Vec<String>,

    /// How the site makes money
    #[arg(long, default_value = "unknown")]
    pub revenue_model: String,

    /// Violations found in earlier audits of this site
    #[arg(long, default_value_t = 0)]
    pub prior_violations: u32,
}

impl ScanArgs {
    pub fn scan_options(&self, default_max_pages: usize) -> ScanOptions {
        ScanOptions {
            max_pages: self.max_pages.unwrap_or(default_max_pages),
            crawl_depth: self.depth,
            include_performance: self.performance,
            custom_rules: !self.no_custom_rules,
            framework: self.framework,
        }
    }

    pub fn site_context(&self) -> SiteContext {
        SiteContext {
            industry: self.industry.clone(),
            traffic_volume: self.traffic.clone(),
            target_regions: self.regions.clone(),
            revenue_model: self.revenue_model.clone(),
            prior_violation_count: self.prior_violations,
        }
    }
}

/// Run the scan command
pub async fn run(ctx: &CliContext, args: &ScanArgs) -> Result<i32> {
    let options = args.scan_options(ctx.config.crawl.default_max_pages);
    let site = args.site_context();

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling remaining pages");
            on_interrupt.cancel();
        }
    });

    match ctx.pipeline.run(&args.url, &options, &site, cancel).await {
        Ok(plan) => {
            ctx.output.emit(&plan, render_plan)?;
            Ok(exit_codes::SUCCESS)
        }
        Err(e) => Ok(super::report_failure(&e)),
    }
}
