//! Audit value objects

use serde::{Deserialize, Serialize};

/// Violation severity, ordered from most to least severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Critical,
    Serious,
    Moderate,
    Minor,
    /// Any value the rule evaluator reports that is not one of the above
    #[serde(other)]
    Unknown,
}

impl Impact {
    /// Sort rank: lower is more severe, unrecognized values sort last
    pub fn rank(&self) -> u8 {
        match self {
            Impact::Critical => 0,
            Impact::Serious => 1,
            Impact::Moderate => 2,
            Impact::Minor => 3,
            Impact::Unknown => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Impact::Critical => "critical",
            Impact::Serious => "serious",
            Impact::Moderate => "moderate",
            Impact::Minor => "minor",
            Impact::Unknown => "unknown",
        }
    }

    /// Parse leniently; anything unrecognized maps to `Unknown`
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "critical" => Impact::Critical,
            "serious" => Impact::Serious,
            "moderate" => Impact::Moderate,
            "minor" => Impact::Minor,
            _ => Impact::Unknown,
        }
    }
}

impl std::fmt::Display for Impact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Remediation priority derived from the weighted priority score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    /// Bucket a priority score (1.0 - 10.0)
    pub fn from_score(score: f64) -> Self {
        if score >= 8.0 {
            Priority::Critical
        } else if score >= 6.0 {
            Priority::High
        } else if score >= 4.0 {
            Priority::Medium
        } else {
            Priority::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Legal compliance urgency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComplianceLevel {
    Critical,
    High,
    Medium,
    Low,
}

impl ComplianceLevel {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "critical" => Some(ComplianceLevel::Critical),
            "high" => Some(ComplianceLevel::High),
            "medium" => Some(ComplianceLevel::Medium),
            "low" => Some(ComplianceLevel::Low),
            _ => None,
        }
    }
}

/// UI framework detected on a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    React,
    Vue,
    Angular,
    #[default]
    Vanilla,
}

impl Framework {
    pub fn as_str(&self) -> &'static str {
        match self {
            Framework::React => "react",
            Framework::Vue => "vue",
            Framework::Angular => "angular",
            Framework::Vanilla => "vanilla",
        }
    }
}

impl std::fmt::Display for Framework {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Caller's framework choice: detect automatically or force one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FrameworkPreference {
    #[default]
    Auto,
    React,
    Vue,
    Angular,
    Vanilla,
}

impl FrameworkPreference {
    /// The forced framework, or `None` when detection should run
    pub fn forced(&self) -> Option<Framework> {
        match self {
            FrameworkPreference::Auto => None,
            FrameworkPreference::React => Some(Framework::React),
            FrameworkPreference::Vue => Some(Framework::Vue),
            FrameworkPreference::Angular => Some(Framework::Angular),
            FrameworkPreference::Vanilla => Some(Framework::Vanilla),
        }
    }
}

impl std::str::FromStr for FrameworkPreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(FrameworkPreference::Auto),
            "react" => Ok(FrameworkPreference::React),
            "vue" => Ok(FrameworkPreference::Vue),
            "angular" => Ok(FrameworkPreference::Angular),
            "vanilla" | "html" => Ok(FrameworkPreference::Vanilla),
            other => Err(format!("unknown framework '{}'", other)),
        }
    }
}

/// Framework a code fix is written for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixFramework {
    React,
    Vue,
    Angular,
    Html,
}

impl From<Framework> for FixFramework {
    fn from(framework: Framework) -> Self {
        match framework {
            Framework::React => FixFramework::React,
            Framework::Vue => FixFramework::Vue,
            Framework::Angular => FixFramework::Angular,
            Framework::Vanilla => FixFramework::Html,
        }
    }
}

impl FixFramework {
    pub fn as_str(&self) -> &'static str {
        match self {
            FixFramework::React => "react",
            FixFramework::Vue => "vue",
            FixFramework::Angular => "angular",
            FixFramework::Html => "html",
        }
    }
}

/// Where a score or fix came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Produced by the external reasoning service
    Ai,
    /// Produced by the deterministic, network-independent rules
    Fallback,
}

/// Browser viewport dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// Scan configuration supplied per call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScanOptions {
    /// Page budget for a crawl, seed included (>= 1)
    pub max_pages: usize,
    /// Link depth followed from the seed; 0 scans only the seed
    pub crawl_depth: u32,
    /// Sample page timing metrics
    pub include_performance: bool,
    /// Run the heuristic check suite in addition to the rule evaluator
    pub custom_rules: bool,
    /// Framework override, or auto-detection
    pub framework: FrameworkPreference,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_pages: 1,
            crawl_depth: 1,
            include_performance: false,
            custom_rules: true,
            framework: FrameworkPreference::Auto,
        }
    }
}

/// Invalid per-call scan options
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OptionsError {
    #[error("maxPages must be at least 1 (got {0})")]
    MaxPagesTooSmall(usize),
}

impl ScanOptions {
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.max_pages < 1 {
            return Err(OptionsError::MaxPagesTooSmall(self.max_pages));
        }
        Ok(())
    }
}

/// Caller-supplied business context used only as scoring input
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteContext {
    pub industry: String,
    /// "low", "medium", "high" or a free-form estimate
    pub traffic_volume: String,
    pub target_regions: Vec<String>,
    pub revenue_model: String,
    pub prior_violation_count: u32,
}

impl Default for SiteContext {
    fn default() -> Self {
        Self {
            industry: "general".to_string(),
            traffic_volume: "medium".to_string(),
            target_regions: vec!["US".to_string()],
            revenue_model: "unknown".to_string(),
            prior_violation_count: 0,
        }
    }
}

/// Context for fix generation
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ScanContext {
    /// Explicit framework; `Auto` defers to the detected signals
    pub framework: FrameworkPreference,
    /// Framework detected on each scanned page
    pub detected_frameworks: Vec<Framework>,
    /// URL the violations were found on
    pub url: Option<String>,
}
