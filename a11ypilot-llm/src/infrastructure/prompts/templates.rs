use serde::Serialize;

use a11ypilot_core::domain::audit::{FixFramework, SiteContext, Violation};

pub const SCORING_SYSTEM_PROMPT: &str = r#"You are an accessibility compliance analyst. You rank WCAG violations by legal exposure, user impact, business risk and remediation effort for a specific business.
Respond with JSON only."#;

pub const SCORING_PROMPT: &str = r#"## Business Context
- Industry: {industry}
- Traffic volume: {traffic_volume}
- Target regions: {target_regions}
- Revenue model: {revenue_model}
- Prior violations on record: {prior_violation_count}

## Violations
```json
{violations_json}
```

## Your Task
Return a JSON array with exactly one object per violation, in the same order, using this shape:

```json
[
  {
    "violationId": "the id from the input",
    "legalRiskScore": 1-10,
    "userImpactScore": 1-10,
    "businessRiskScore": 1-10,
    "technicalComplexity": 1-10,
    "complianceLevel": "Critical | High | Medium | Low",
    "riskLevel": "short phrase",
    "complianceDeadline": "recommended deadline",
    "businessJustification": "one or two sentences",
    "fixRecommendations": ["step", "step"],
    "estimatedEffort": "e.g. 2-4 hours",
    "businessValue": "one sentence"
  }
]
```

Higher technicalComplexity means harder to fix.
"#;

pub const CODE_FIX_SYSTEM_PROMPT: &str = r#"You are an expert front-end accessibility engineer. You write minimal, production-ready code changes that fix WCAG violations without changing behaviour.
Respond with JSON only."#;

pub const CODE_FIX_PROMPT: &str = r#"Target framework: {framework}

## Violations
```json
{violations_json}
```

## Your Task
Return a JSON array with one object per violation, in the same order, using this shape:

```json
[
  {
    "violationId": "the id from the input",
    "originalCode": "the offending markup",
    "fixedCode": "the corrected markup or component code",
    "explanation": "why the change fixes the violation",
    "implementationSteps": ["step", "step"],
    "testingRecommendations": ["check", "check"],
    "browserCompatibility": "support notes",
    "impact": {"before": "experience before", "after": "experience after"}
  }
]
```
"#;

/// What the model sees of a violation
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ViolationDigest<'a> {
    violation_id: &'a str,
    description: &'a str,
    help: &'a str,
    impact: &'a str,
    wcag_reference: &'a str,
    element_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    sample_html: Option<&'a str>,
}

impl<'a> From<&'a Violation> for ViolationDigest<'a> {
    fn from(violation: &'a Violation) -> Self {
        Self {
            violation_id: &violation.id,
            description: &violation.description,
            help: &violation.help_text,
            impact: violation.impact.as_str(),
            wcag_reference: &violation.wcag_reference,
            element_count: violation.element_count,
            sample_html: violation.nodes.first().map(|n| n.html.as_str()),
        }
    }
}

fn digest_json(violations: &[&Violation]) -> String {
    let digests: Vec<ViolationDigest<'_>> = violations.iter().map(|v| ViolationDigest::from(*v)).collect();
    serde_json::to_string_pretty(&digests).unwrap_or_else(|_| "[]".to_string())
}

pub struct PromptBuilder;

impl PromptBuilder {
    pub fn build_scoring_prompt(violations: &[&Violation], context: &SiteContext) -> String {
        SCORING_PROMPT
            .replace("{industry}", &context.industry)
            .replace("{traffic_volume}", &context.traffic_volume)
            .replace("{target_regions}", &context.target_regions.join(", "))
            .replace("{revenue_model}", &context.revenue_model)
            .replace(
                "{prior_violation_count}",
                &context.prior_violation_count.to_string(),
            )
            .replace("{violations_json}", &digest_json(violations))
    }

    pub fn build_fix_prompt(violations: &[&Violation], framework: FixFramework) -> String {
        CODE_FIX_PROMPT
            .replace("{framework}", framework.as_str())
            .replace("{violations_json}", &digest_json(violations))
    }
}
