//! Report rendering for the terminal and for files

use std::fmt::Write as _;
use std::io::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;

use a11ypilot_core::domain::audit::{Provenance, RemediationPlan, ScanResult, Violation};

/// Report format
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable summary
    #[default]
    Text,
    /// Full JSON document
    Json,
}

/// Writes reports to stdout or to the `--output` file
pub struct OutputWriter {
    format: OutputFormat,
    path: Option<PathBuf>,
}

impl OutputWriter {
    pub fn new(format: OutputFormat, path: Option<PathBuf>) -> Self {
        Self { format, path }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Render `value` as JSON or with `text`, then write it out
    pub fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce(&T) -> String) -> Result<()> {
        let rendered = match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(value).context("Failed to serialize report")?
            }
            OutputFormat::Text => text(value),
        };

        match self.path {
            Some(ref path) => std::fs::write(path, format!("{}\n", rendered))
                .with_context(|| format!("Failed to write report to {}", path.display())),
            None => {
                let mut stdout = std::io::stdout().lock();
                writeln!(stdout, "{}", rendered).context("Failed to write report")
            }
        }
    }
}

fn violation_line(out: &mut String, violation: &Violation) {
    let priority = violation
        .priority
        .map(|p| format!(" [{} {:.1}]", p, violation.priority_score.unwrap_or_default()))
        .unwrap_or_default();
    let _ = writeln!(
        out,
        "  - {:<9} {}{} ({}, {} element(s))",
        violation.impact.as_str(),
        violation.description,
        priority,
        violation.wcag_reference,
        violation.element_count
    );
}

/// Text summary of a remediation plan
pub fn render_plan(plan: &RemediationPlan) -> String {
    let scan = &plan.scan;
    let mut out = String::new();

    let _ = writeln!(out, "Accessibility audit: {}", scan.url);
    let _ = writeln!(
        out,
        "Pages scanned: {}   Score: {}/100   Duration: {} ms",
        scan.pages_scanned, scan.accessibility_score, scan.scan_duration_ms
    );
    let _ = writeln!(
        out,
        "Priorities: {} critical, {} high, {} medium, {} low (scored by {})",
        plan.summary.critical,
        plan.summary.high,
        plan.summary.medium,
        plan.summary.low,
        match plan.scoring_source {
            Provenance::Ai => "reasoning service",
            Provenance::Fallback => "deterministic rules",
        }
    );

    if scan.violations.is_empty() {
        let _ = writeln!(out, "\nNo violations found.");
        return out;
    }

    let _ = writeln!(out, "\nRemediation order:");
    for (rank, id) in plan.ordered_violation_ids.iter().enumerate() {
        let Some(violation) = scan.violations.iter().find(|v| &v.id == id) else {
            continue;
        };
        let _ = write!(out, "{:>3}.", rank + 1);
        violation_line(&mut out, violation);
        if let Some(ref deadline) = violation.compliance_deadline {
            let _ = writeln!(out, "       deadline: {}", deadline);
        }
        if let Some(fix) = plan.fixes.iter().find(|f| &f.violation_id == id) {
            let _ = writeln!(out, "       fix ({}): {}", fix.framework.as_str(), fix.explanation);
        }
    }
    out
}

/// Text summary of a single-page scan
pub fn render_page(result: &ScanResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Page: {}", result.url);
    let _ = writeln!(
        out,
        "Title: {}   Framework: {}   Duration: {} ms",
        result.metadata.title, result.metadata.framework, result.scan_duration_ms
    );
    if let Some(ref metrics) = result.performance_metrics {
        let _ = writeln!(
            out,
            "Performance: {:.1}/100 (load {} ms, TTFB {} ms)",
            metrics.performance_score, metrics.load_time_ms, metrics.time_to_first_byte_ms
        );
    }
    let _ = writeln!(
        out,
        "Violations: {}   Passes: {}   Needs review: {}",
        result.violations.len(),
        result.passes.len(),
        result.incomplete.len()
    );
    for violation in &result.violations {
        violation_line(&mut out, violation);
    }
    out
}
