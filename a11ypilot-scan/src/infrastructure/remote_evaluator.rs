//! Remote axe-compatible rule evaluator
//!
//! Posts the rendered page to an evaluation service that runs axe-core and
//! returns its standard result shape.

use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use a11ypilot_core::config::EvaluatorConfig;
use a11ypilot_core::domain::audit::{Impact, Violation, ViolationNode};

use crate::domain::{DomSnapshot, RuleEvaluation, RuleEvaluationError, RuleEvaluator};

static RE_WCAG_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^wcag(\d)(\d)(\d{1,2})$").unwrap());

#[derive(Debug, Serialize)]
struct EvaluateRequest<'a> {
    url: &'a str,
    html: &'a str,
    stylesheets: &'a [String],
    tags: &'a [String],
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct AxeResults {
    violations: Vec<AxeRule>,
    passes: Vec<AxeRule>,
    incomplete: Vec<AxeRule>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AxeRule {
    id: String,
    #[serde(default)]
    impact: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    help: String,
    #[serde(default)]
    help_url: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    nodes: Vec<AxeNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AxeNode {
    #[serde(default)]
    html: String,
    #[serde(default)]
    target: Vec<serde_json::Value>,
    #[serde(default)]
    failure_summary: Option<String>,
}

/// Rule evaluator that delegates to an HTTP evaluation service
pub struct RemoteRuleEvaluator {
    client: reqwest::Client,
    endpoint: Url,
}

impl RemoteRuleEvaluator {
    pub fn new(config: &EvaluatorConfig) -> Result<Self, RuleEvaluationError> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| RuleEvaluationError::Transport(format!("invalid endpoint: {}", e)))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| RuleEvaluationError::Transport(e.to_string()))?;

        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl RuleEvaluator for RemoteRuleEvaluator {
    #[instrument(skip(self, snapshot, tags), fields(url = %snapshot.url))]
    async fn evaluate(
        &self,
        snapshot: &DomSnapshot,
        tags: &[String],
    ) -> Result<RuleEvaluation, RuleEvaluationError> {
        let request = EvaluateRequest {
            url: snapshot.url.as_str(),
            html: &snapshot.html,
            stylesheets: &snapshot.stylesheets,
            tags,
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| RuleEvaluationError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RuleEvaluationError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let results: AxeResults = response
            .json()
            .await
            .map_err(|e| RuleEvaluationError::InvalidResponse(e.to_string()))?;

        debug!(
            violations = results.violations.len(),
            passes = results.passes.len(),
            incomplete = results.incomplete.len(),
            "Rule evaluation completed"
        );

        Ok(RuleEvaluation {
            violations: results.violations.into_iter().map(to_violation).collect(),
            passes: results.passes.into_iter().map(to_violation).collect(),
            incomplete: results.incomplete.into_iter().map(to_violation).collect(),
        })
    }
}

fn to_violation(rule: AxeRule) -> Violation {
    let impact = rule
        .impact
        .as_deref()
        .map(Impact::parse)
        .unwrap_or(Impact::Unknown);
    let help_text = if rule.help.is_empty() {
        rule.description.clone()
    } else {
        rule.help.clone()
    };
    let nodes = rule.nodes.into_iter().map(|node| ViolationNode {
        html: node.html,
        target: node.target.iter().map(target_to_string).collect(),
        failure_summary: node.failure_summary,
    });

    let mut violation = Violation::new(
        format!("axe:{}", rule.id),
        rule.description,
        impact,
        wcag_reference(&rule.tags),
    )
    .with_help(help_text, rule.help_url)
    .with_tag("axe")
    .with_nodes(nodes);

    for tag in rule.tags {
        violation = violation.with_tag(tag);
    }
    violation
}

/// Targets are strings, or nested arrays when crossing iframes and shadow roots
fn target_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(parts) => parts
            .iter()
            .map(target_to_string)
            .collect::<Vec<_>>()
            .join(" >>> "),
        other => other.to_string(),
    }
}

/// `wcag143` becomes `WCAG 1.4.3`; rules without a criterion tag are best practices
pub fn wcag_reference(tags: &[String]) -> String {
    tags.iter()
        .find_map(|tag| {
            RE_WCAG_TAG
                .captures(tag)
                .map(|caps| format!("WCAG {}.{}.{}", &caps[1], &caps[2], &caps[3]))
        })
        .unwrap_or_else(|| "Best Practice".to_string())
}
