//! Detect command - framework fingerprinting

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use a11ypilot_core::domain::audit::Framework;

use crate::context::CliContext;
use crate::exit_codes;

/// Arguments for the detect command
#[derive(Args, Debug)]
pub struct DetectArgs {
    /// Page URL (http or https)
    pub url: String,
}

#[derive(Debug, Serialize)]
struct Detection<'a> {
    url: &'a str,
    framework: Framework,
}

pub async fn run(ctx: &CliContext, args: &DetectArgs) -> Result<i32> {
    match ctx.pipeline.detect(&args.url).await {
        Ok(framework) => {
            let detection = Detection {
                url: &args.url,
                framework,
            };
            ctx.output
                .emit(&detection, |d| format!("{}: {}", d.url, d.framework))?;
            Ok(exit_codes::SUCCESS)
        }
        Err(e) => Ok(super::report_failure(&e)),
    }
}
