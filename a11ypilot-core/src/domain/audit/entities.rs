//! Audit entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::value_objects::{
    ComplianceLevel, FixFramework, Framework, Impact, Priority, Provenance, Viewport,
};

/// One affected DOM occurrence of a violation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationNode {
    /// Serialized HTML of the offending element
    pub html: String,
    /// CSS-selector-like path to the element
    pub target: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_summary: Option<String>,
}

impl ViolationNode {
    pub fn new(html: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            target: vec![target.into()],
            failure_summary: None,
        }
    }

    pub fn with_failure_summary(mut self, summary: impl Into<String>) -> Self {
        self.failure_summary = Some(summary.into());
        self
    }
}

/// One detected accessibility defect
///
/// `element_count` mirrors `nodes.len()`; the builder methods keep it in sync
/// and [`Violation::refresh_element_count`] restores it after direct edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub id: String,
    pub description: String,
    pub help_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_url: Option<String>,
    pub impact: Impact,
    pub wcag_reference: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub nodes: Vec<ViolationNode>,
    #[serde(default)]
    pub element_count: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_risk_score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_impact_score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_risk_score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_complexity: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliance_deadline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_justification: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fix_recommendations: Vec<String>,
}

impl Violation {
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        impact: Impact,
        wcag_reference: impl Into<String>,
    ) -> Self {
        let description = description.into();
        Self {
            id: id.into(),
            help_text: description.clone(),
            description,
            help_url: None,
            impact,
            wcag_reference: wcag_reference.into(),
            tags: Vec::new(),
            nodes: Vec::new(),
            element_count: 0,
            legal_risk_score: None,
            user_impact_score: None,
            business_risk_score: None,
            technical_complexity: None,
            priority_score: None,
            priority: None,
            compliance_deadline: None,
            business_justification: None,
            fix_recommendations: Vec::new(),
        }
    }

    pub fn with_help(mut self, help_text: impl Into<String>, help_url: Option<String>) -> Self {
        self.help_text = help_text.into();
        self.help_url = help_url;
        self
    }

    /// Add a classification tag; duplicates are ignored
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
        self
    }

    pub fn with_node(mut self, node: ViolationNode) -> Self {
        self.nodes.push(node);
        self.element_count = self.nodes.len();
        self
    }

    pub fn with_nodes(mut self, nodes: impl IntoIterator<Item = ViolationNode>) -> Self {
        self.nodes.extend(nodes);
        self.element_count = self.nodes.len();
        self
    }

    pub fn refresh_element_count(&mut self) {
        self.element_count = self.nodes.len();
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Whether the scoring engine has populated this violation
    pub fn is_scored(&self) -> bool {
        self.priority_score.is_some()
    }
}

/// Sampled page timing and weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub time_to_first_byte_ms: u64,
    pub load_time_ms: u64,
    pub document_bytes: u64,
    pub stylesheet_bytes: u64,
    pub resource_count: u32,
    pub dom_node_count: u32,
    /// 0-100, 100 at or under one second of load time
    pub performance_score: f64,
}

impl PerformanceMetrics {
    /// Linear score: 100 at <= 1s load, 0 at >= 10s
    pub fn score_for_load_time(load_time_ms: u64) -> f64 {
        const FAST_MS: f64 = 1_000.0;
        const SLOW_MS: f64 = 10_000.0;

        let load = load_time_ms as f64;
        if load <= FAST_MS {
            100.0
        } else if load >= SLOW_MS {
            0.0
        } else {
            let score = 100.0 * (SLOW_MS - load) / (SLOW_MS - FAST_MS);
            (score * 10.0).round() / 10.0
        }
    }

    /// Field-wise mean of several samples
    pub fn average(samples: &[PerformanceMetrics]) -> Option<PerformanceMetrics> {
        if samples.is_empty() {
            return None;
        }
        let n = samples.len() as u64;
        let mean = |f: fn(&PerformanceMetrics) -> u64| samples.iter().map(f).sum::<u64>() / n;
        let score = samples.iter().map(|s| s.performance_score).sum::<f64>() / n as f64;

        Some(PerformanceMetrics {
            time_to_first_byte_ms: mean(|s| s.time_to_first_byte_ms),
            load_time_ms: mean(|s| s.load_time_ms),
            document_bytes: mean(|s| s.document_bytes),
            stylesheet_bytes: mean(|s| s.stylesheet_bytes),
            resource_count: mean(|s| s.resource_count as u64) as u32,
            dom_node_count: mean(|s| s.dom_node_count as u64) as u32,
            performance_score: (score * 10.0).round() / 10.0,
        })
    }
}

/// Page-level metadata recorded with each scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanMetadata {
    pub title: String,
    pub user_agent: String,
    pub viewport: Viewport,
    pub framework: Framework,
}

/// Output of scanning one page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub url: String,
    pub timestamp: DateTime<Utc>,
    pub scan_duration_ms: u64,
    pub violations: Vec<Violation>,
    pub passes: Vec<Violation>,
    pub incomplete: Vec<Violation>,
    pub metadata: ScanMetadata,
    pub performance_metrics: Option<PerformanceMetrics>,
}

/// Per-page line in an aggregated scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSummary {
    pub url: String,
    pub violation_count: usize,
    pub scan_duration_ms: u64,
}

/// Crawl results folded into one record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedScan {
    pub id: Uuid,
    pub url: String,
    pub timestamp: DateTime<Utc>,
    pub pages_scanned: usize,
    pub pages: Vec<PageSummary>,
    pub violations: Vec<Violation>,
    pub passes: Vec<Violation>,
    pub incomplete: Vec<Violation>,
    pub performance_metrics: Option<PerformanceMetrics>,
    /// 0-100, penalised per violation by impact
    pub accessibility_score: u32,
    pub scan_duration_ms: u64,
}

/// Scores and guidance for one violation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AIAnalysis {
    pub violation_id: String,
    pub legal_risk_score: u8,
    pub user_impact_score: u8,
    pub business_risk_score: u8,
    pub technical_complexity: u8,
    pub priority_score: f64,
    pub priority: Priority,
    pub compliance_level: ComplianceLevel,
    pub risk_level: String,
    pub compliance_deadline: String,
    pub business_justification: String,
    pub fix_recommendations: Vec<String>,
    pub estimated_effort: String,
    pub business_value: String,
    pub source: Provenance,
}

/// Before/after summary attached to a code fix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixImpact {
    pub before: String,
    pub after: String,
}

/// One remediation proposal for exactly one violation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeFix {
    pub violation_id: String,
    pub framework: FixFramework,
    pub original_code: String,
    pub fixed_code: String,
    pub explanation: String,
    pub implementation_steps: Vec<String>,
    pub testing_recommendations: Vec<String>,
    pub browser_compatibility: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<FixImpact>,
    pub source: Provenance,
}

/// Count of scored violations per priority bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PrioritySummary {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl PrioritySummary {
    pub fn from_analyses(analyses: &[AIAnalysis]) -> Self {
        let mut summary = Self::default();
        for analysis in analyses {
            match analysis.priority {
                Priority::Critical => summary.critical += 1,
                Priority::High => summary.high += 1,
                Priority::Medium => summary.medium += 1,
                Priority::Low => summary.low += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low
    }
}

/// End-to-end audit output: scored scan, fixes and remediation order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemediationPlan {
    pub scan: AggregatedScan,
    pub fixes: Vec<CodeFix>,
    /// Violation ids by priority score, highest first
    pub ordered_violation_ids: Vec<String>,
    pub summary: PrioritySummary,
    pub scoring_source: Provenance,
}
