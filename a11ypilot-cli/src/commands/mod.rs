//! CLI command implementations

pub mod detect;
pub mod page;
pub mod scan;

use a11ypilot::PipelineError;

use crate::exit_codes;

/// Report a failed audit on stderr and pick the exit code
pub(crate) fn report_failure(error: &PipelineError) -> i32 {
    tracing::error!(error = %error, "Audit failed");
    eprintln!("{}", error.user_message());
    match error {
        PipelineError::Setup { .. } => exit_codes::CONFIG_ERROR,
        PipelineError::Rejected(_) | PipelineError::Scan(_) => exit_codes::SCAN_FAILED,
    }
}
