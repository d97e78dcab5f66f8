//! Folding crawl results into one aggregated scan

use chrono::Utc;
use url::Url;
use uuid::Uuid;

use a11ypilot_core::domain::audit::{AggregatedScan, PageSummary, PerformanceMetrics, ScanResult};

use crate::infrastructure::{accessibility_score, merge_all};

/// Combine per-page results; violations across pages are deduplicated
pub fn aggregate(seed: &Url, results: &[ScanResult], scan_duration_ms: u64) -> AggregatedScan {
    let pages = results
        .iter()
        .map(|r| PageSummary {
            url: r.url.clone(),
            violation_count: r.violations.len(),
            scan_duration_ms: r.scan_duration_ms,
        })
        .collect();

    let violations = merge_all(results.iter().map(|r| r.violations.clone()));
    let samples: Vec<PerformanceMetrics> = results
        .iter()
        .filter_map(|r| r.performance_metrics.clone())
        .collect();

    AggregatedScan {
        id: Uuid::new_v4(),
        url: seed.to_string(),
        timestamp: results.first().map(|r| r.timestamp).unwrap_or_else(Utc::now),
        pages_scanned: results.len(),
        pages,
        accessibility_score: accessibility_score(&violations),
        violations,
        passes: results.iter().flat_map(|r| r.passes.iter().cloned()).collect(),
        incomplete: results.iter().flat_map(|r| r.incomplete.iter().cloned()).collect(),
        performance_metrics: PerformanceMetrics::average(&samples),
        scan_duration_ms,
    }
}
