//! Priority scoring
//!
//! Every violation gets legal-risk, user-impact, business-risk and
//! technical-complexity scores plus a weighted priority. The reasoning service
//! is asked once per call; anything short of a complete, parseable answer
//! drops the whole call to the deterministic rules below.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use a11ypilot_core::config::LlmConfig;
use a11ypilot_core::domain::audit::{
    AIAnalysis, ComplianceLevel, Impact, Priority, Provenance, SiteContext, Violation,
};

use crate::domain::{CompletionRequest, LlmError, LlmProvider};
use crate::infrastructure::ResponseParser;
use crate::infrastructure::prompts::{PromptBuilder, SCORING_SYSTEM_PROMPT};

const MID_SCALE: u8 = 5;

const LEGAL_KEYWORDS: &[&str] = &["keyboard", "focus", "aria", "label", "title"];
const COMPLEXITY_KEYWORDS: &[&str] = &["dynamic", "javascript", "react", "framework", "custom"];

/// Weighted priority, rounded to one decimal.
///
/// `0.35·legal + 0.35·user + 0.20·business + 0.10·(10 − complexity)`; the sum
/// is formed in hundredths so the rounding is exact.
pub fn priority_score(legal: u8, user: u8, business: u8, complexity: u8) -> f64 {
    let hundredths = 35 * legal as u32
        + 35 * user as u32
        + 20 * business as u32
        + 10 * (10 - complexity.min(10)) as u32;
    ((hundredths + 5) / 10) as f64 / 10.0
}

fn clamp_score(value: Option<f64>) -> u8 {
    match value {
        Some(v) if v.is_finite() => v.round().clamp(1.0, 10.0) as u8,
        _ => MID_SCALE,
    }
}

fn compliance_deadline(priority: Priority) -> &'static str {
    match priority {
        Priority::Critical => "Immediate (within 7 days)",
        Priority::High => "Within 30 days",
        Priority::Medium => "Within 90 days",
        Priority::Low => "Next release cycle",
    }
}

fn risk_level(priority: Priority) -> &'static str {
    match priority {
        Priority::Critical => "Severe",
        Priority::High => "High",
        Priority::Medium => "Moderate",
        Priority::Low => "Low",
    }
}

fn business_value(priority: Priority) -> &'static str {
    match priority {
        Priority::Critical => "Removes a barrier that blocks users from completing core tasks",
        Priority::High => "Noticeably improves task completion for assistive technology users",
        Priority::Medium => "Improves usability and reduces compliance exposure",
        Priority::Low => "Polishes the experience and keeps the audit trail clean",
    }
}

fn estimated_effort(complexity: u8) -> &'static str {
    match complexity {
        0..=3 => "1-2 hours",
        4..=6 => "Half a day",
        _ => "1-3 days",
    }
}

fn fallback_recommendations(violation: &Violation) -> Vec<String> {
    let mut steps = vec![violation.help_text.clone()];
    if let Some(ref url) = violation.help_url {
        steps.push(format!("Follow the remediation guidance at {}", url));
    }
    steps.push("Verify the fix with keyboard-only navigation and a screen reader".to_string());
    steps.push(format!("Add an automated regression check for {}", violation.wcag_reference));
    steps
}

fn fallback_justification(violation: &Violation, context: &SiteContext) -> String {
    format!(
        "{} issue affecting {} element(s) on a {} site; conflicts with {}.",
        capitalize(violation.impact.as_str()),
        violation.element_count,
        context.industry,
        violation.wcag_reference
    )
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Network-free scoring from impact and description keywords.
///
/// Deterministic: the same violation and context always give the same result.
pub fn fallback_analysis(violation: &Violation, context: &SiteContext) -> AIAnalysis {
    let (legal, user, business, complexity) = match violation.impact {
        Impact::Critical => (8, 9, 7, 4),
        Impact::Serious => (6, 7, 5, 4),
        Impact::Moderate => (4, 5, 4, 3),
        Impact::Minor => (2, 3, 2, 2),
        Impact::Unknown => (3, 4, 3, 3),
    };

    let description = violation.description.to_lowercase();
    let mentions = |keywords: &[&str]| keywords.iter().any(|k| description.contains(k));

    let legal = if matches!(violation.impact, Impact::Critical | Impact::Serious)
        && mentions(LEGAL_KEYWORDS)
    {
        (legal + 2).min(10)
    } else {
        legal
    };
    let complexity = if mentions(COMPLEXITY_KEYWORDS) {
        (complexity + 3).min(10)
    } else {
        complexity
    };

    let score = priority_score(legal, user, business, complexity);
    let priority = Priority::from_score(score);

    AIAnalysis {
        violation_id: violation.id.clone(),
        legal_risk_score: legal,
        user_impact_score: user,
        business_risk_score: business,
        technical_complexity: complexity,
        priority_score: score,
        priority,
        compliance_level: ComplianceLevel::Medium,
        risk_level: risk_level(priority).to_string(),
        compliance_deadline: compliance_deadline(priority).to_string(),
        business_justification: fallback_justification(violation, context),
        fix_recommendations: fallback_recommendations(violation),
        estimated_effort: estimated_effort(complexity).to_string(),
        business_value: business_value(priority).to_string(),
        source: Provenance::Fallback,
    }
}

/// Copy scoring fields onto index-aligned violations
pub fn apply_analyses(violations: &mut [Violation], analyses: &[AIAnalysis]) {
    for (violation, analysis) in violations.iter_mut().zip(analyses) {
        if violation.id != analysis.violation_id {
            debug!(violation = %violation.id, analysis = %analysis.violation_id, "Analysis id differs from violation id");
        }
        violation.legal_risk_score = Some(analysis.legal_risk_score);
        violation.user_impact_score = Some(analysis.user_impact_score);
        violation.business_risk_score = Some(analysis.business_risk_score);
        violation.technical_complexity = Some(analysis.technical_complexity);
        violation.priority_score = Some(analysis.priority_score);
        violation.priority = Some(analysis.priority);
        violation.compliance_deadline = Some(analysis.compliance_deadline.clone());
        violation.business_justification = Some(analysis.business_justification.clone());
        violation.fix_recommendations = analysis.fix_recommendations.clone();
    }
}

/// One scored entry as the model returns it
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ModelScore {
    violation_id: Option<String>,
    legal_risk_score: Option<f64>,
    user_impact_score: Option<f64>,
    business_risk_score: Option<f64>,
    technical_complexity: Option<f64>,
    compliance_level: Option<String>,
    risk_level: Option<String>,
    compliance_deadline: Option<String>,
    business_justification: Option<String>,
    fix_recommendations: Option<Vec<String>>,
    estimated_effort: Option<String>,
    business_value: Option<String>,
}

/// Pair each violation with an entry: by `violationId` first, else by position.
///
/// A positional entry is only used when its id is absent or names no input
/// violation. `None` when any violation is left without an entry.
pub(crate) fn align_entries<'a, T>(
    entries: &'a [T],
    entry_id: impl Fn(&T) -> Option<&str>,
    violations: &[&Violation],
) -> Option<Vec<&'a T>> {
    let known: HashSet<&str> = violations.iter().map(|v| v.id.as_str()).collect();
    let by_id: HashMap<&str, &T> = entries
        .iter()
        .filter_map(|entry| entry_id(entry).map(|id| (id, entry)))
        .collect();

    violations
        .iter()
        .enumerate()
        .map(|(position, violation)| {
            by_id.get(violation.id.as_str()).copied().or_else(|| {
                entries
                    .get(position)
                    .filter(|entry| entry_id(*entry).is_none_or(|id| !known.contains(id)))
            })
        })
        .collect()
}

fn text_or(value: &Option<String>, neutral: impl FnOnce() -> String) -> String {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(neutral)
}

fn analysis_from_model(violation: &Violation, entry: &ModelScore, context: &SiteContext) -> AIAnalysis {
    let legal = clamp_score(entry.legal_risk_score);
    let user = clamp_score(entry.user_impact_score);
    let business = clamp_score(entry.business_risk_score);
    let complexity = clamp_score(entry.technical_complexity);
    let score = priority_score(legal, user, business, complexity);
    let priority = Priority::from_score(score);

    AIAnalysis {
        violation_id: violation.id.clone(),
        legal_risk_score: legal,
        user_impact_score: user,
        business_risk_score: business,
        technical_complexity: complexity,
        priority_score: score,
        priority,
        compliance_level: entry
            .compliance_level
            .as_deref()
            .and_then(ComplianceLevel::parse)
            .unwrap_or(ComplianceLevel::Medium),
        risk_level: text_or(&entry.risk_level, || risk_level(priority).to_string()),
        compliance_deadline: text_or(&entry.compliance_deadline, || {
            compliance_deadline(priority).to_string()
        }),
        business_justification: text_or(&entry.business_justification, || {
            fallback_justification(violation, context)
        }),
        fix_recommendations: entry
            .fix_recommendations
            .clone()
            .filter(|steps| !steps.is_empty())
            .unwrap_or_else(|| fallback_recommendations(violation)),
        estimated_effort: text_or(&entry.estimated_effort, || {
            estimated_effort(complexity).to_string()
        }),
        business_value: text_or(&entry.business_value, || business_value(priority).to_string()),
        source: Provenance::Ai,
    }
}

/// Scores and where they came from
#[derive(Debug, Clone)]
pub struct ScoringOutcome {
    /// One analysis per input violation, same order
    pub analyses: Vec<AIAnalysis>,
    pub source: Provenance,
}

/// Priority scoring engine
pub struct ScoreViolationsUseCase {
    provider: Option<Arc<dyn LlmProvider>>,
    config: LlmConfig,
}

impl ScoreViolationsUseCase {
    /// `provider` is `None` when no reasoning service is configured
    pub fn new(provider: Option<Arc<dyn LlmProvider>>, config: LlmConfig) -> Self {
        Self { provider, config }
    }

    /// Score every violation. Never fails: errors become fallback scoring.
    #[instrument(skip(self, violations, context), fields(violations = violations.len()))]
    pub async fn execute(&self, violations: &[Violation], context: &SiteContext) -> ScoringOutcome {
        if violations.is_empty() {
            return ScoringOutcome {
                analyses: Vec::new(),
                source: Provenance::Fallback,
            };
        }

        if let Some(ref provider) = self.provider {
            match self.score_with_provider(provider.as_ref(), violations, context).await {
                Ok(analyses) => {
                    info!(scored = analyses.len(), "Violations scored by reasoning service");
                    return ScoringOutcome {
                        analyses,
                        source: Provenance::Ai,
                    };
                }
                Err(e) => {
                    warn!(error = %e, "AI scoring failed, using deterministic scoring for all violations");
                }
            }
        }

        ScoringOutcome {
            analyses: violations
                .iter()
                .map(|v| fallback_analysis(v, context))
                .collect(),
            source: Provenance::Fallback,
        }
    }

    async fn score_with_provider(
        &self,
        provider: &dyn LlmProvider,
        violations: &[Violation],
        context: &SiteContext,
    ) -> Result<Vec<AIAnalysis>, LlmError> {
        let refs: Vec<&Violation> = violations.iter().collect();
        let model = self
            .config
            .scoring_model
            .as_deref()
            .unwrap_or(&self.config.default_model);

        let request = CompletionRequest::new()
            .with_system(SCORING_SYSTEM_PROMPT)
            .with_user(PromptBuilder::build_scoring_prompt(&refs, context))
            .with_model(model)
            .with_temperature(self.config.temperature)
            .with_max_tokens(self.config.max_tokens);

        let response = tokio::time::timeout(self.config.timeout(), provider.complete(request))
            .await
            .map_err(|_| LlmError::timeout(self.config.timeout_seconds))??;

        if response.is_truncated() {
            debug!("Scoring response hit the token limit");
        }

        let entries: Vec<ModelScore> = ResponseParser::parse_json(response.text())?;
        let aligned = align_entries(&entries, |e| e.violation_id.as_deref(), &refs).ok_or_else(|| {
            LlmError::InvalidResponse(format!(
                "expected {} scored entries, got {} that could not all be matched",
                violations.len(),
                entries.len()
            ))
        })?;

        Ok(violations
            .iter()
            .zip(aligned)
            .map(|(violation, entry)| analysis_from_model(violation, entry, context))
            .collect())
    }
}
