//! Fix suggestions
//!
//! Violations are sent to the reasoning service in fixed-size batches. A batch
//! that fails, times out or returns an unusable answer is filled from the
//! deterministic templates; other batches are unaffected.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use a11ypilot_core::config::LlmConfig;
use a11ypilot_core::domain::audit::{
    CodeFix, FixFramework, FixImpact, Provenance, ScanContext, Violation,
};

use super::score_violations::align_entries;
use crate::domain::{CompletionRequest, LlmError, LlmProvider};
use crate::infrastructure::ResponseParser;
use crate::infrastructure::prompts::{CODE_FIX_SYSTEM_PROMPT, PromptBuilder};

/// Lower temperature for code generation
const CODE_TEMPERATURE: f64 = 0.2;

const FRAMEWORK_SIGNALS: &[(FixFramework, &[&str])] = &[
    (
        FixFramework::React,
        &["react", "data-reactroot", "data-reactid", "classname="],
    ),
    (FixFramework::Vue, &["vue", "data-v-", "v-if=", "v-for=", "v-bind:"]),
    (
        FixFramework::Angular,
        &["angular", "_ngcontent-", "_nghost-", "ng-version", "*ngif", "[ngclass]"],
    ),
];

/// The framework a violation's tags or markup point to, if any
fn framework_signal(violation: &Violation) -> Option<FixFramework> {
    let tags: Vec<String> = violation.tags.iter().map(|t| t.to_lowercase()).collect();
    let markup: Vec<String> = violation.nodes.iter().map(|n| n.html.to_lowercase()).collect();

    FRAMEWORK_SIGNALS.iter().find_map(|(framework, markers)| {
        let tagged = tags.iter().any(|t| markers.contains(&t.as_str()));
        let in_markup = markup
            .iter()
            .any(|html| markers.iter().any(|m| html.contains(m)));
        (tagged || in_markup).then_some(*framework)
    })
}

/// Explicit choice, else the most common signal across violations and scanned
/// pages (React > Vue > Angular on ties), else HTML
pub fn resolve_framework(violations: &[Violation], context: &ScanContext) -> FixFramework {
    if let Some(forced) = context.framework.forced() {
        return forced.into();
    }

    let page_signals = context
        .detected_frameworks
        .iter()
        .map(|&framework| FixFramework::from(framework));

    let mut votes = [0usize; 3];
    for framework in violations.iter().filter_map(framework_signal).chain(page_signals) {
        if let Some(slot) = FRAMEWORK_SIGNALS.iter().position(|(f, _)| *f == framework) {
            votes[slot] += 1;
        }
    }

    let mut best: Option<(FixFramework, usize)> = None;
    for ((framework, _), count) in FRAMEWORK_SIGNALS.iter().zip(votes) {
        if count > 0 && best.is_none_or(|(_, top)| count > top) {
            best = Some((*framework, count));
        }
    }
    best.map(|(framework, _)| framework).unwrap_or(FixFramework::Html)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FixCategory {
    Contrast,
    AriaLabel,
    Focus,
    Landmark,
}

impl FixCategory {
    fn classify(description: &str) -> Self {
        let description = description.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| description.contains(w));

        if has(&["contrast"]) {
            FixCategory::Contrast
        } else if has(&["aria", "label"]) {
            FixCategory::AriaLabel
        } else if has(&["focus", "keyboard"]) {
            FixCategory::Focus
        } else {
            FixCategory::Landmark
        }
    }

    fn fixed_code(&self, framework: FixFramework) -> &'static str {
        use FixCategory::*;
        use FixFramework::*;

        match (*self, framework) {
            (Contrast, React) => {
                "const styles = { color: '#1a1a1a', backgroundColor: '#ffffff' };\n\n<p style={styles}>Readable body text</p>"
            }
            (Contrast, Vue) => {
                "<template>\n  <p class=\"readable\">Readable body text</p>\n</template>\n\n<style scoped>\n.readable { color: #1a1a1a; background-color: #ffffff; }\n</style>"
            }
            (Contrast, Angular) => {
                "<p class=\"readable\">Readable body text</p>\n\n/* component.css */\n.readable { color: #1a1a1a; background-color: #ffffff; }"
            }
            (Contrast, Html) => {
                "<style>\n  .readable { color: #1a1a1a; background-color: #ffffff; }\n</style>\n<p class=\"readable\">Readable body text</p>"
            }
            (AriaLabel, React) => {
                "<label htmlFor=\"email\">Email address</label>\n<input id=\"email\" type=\"email\" aria-required=\"true\" />"
            }
            (AriaLabel, Vue) => {
                "<template>\n  <label :for=\"fieldId\">Email address</label>\n  <input :id=\"fieldId\" v-model=\"email\" type=\"email\" aria-required=\"true\" />\n</template>"
            }
            (AriaLabel, Angular) => {
                "<label for=\"email\">Email address</label>\n<input id=\"email\" type=\"email\" formControlName=\"email\" [attr.aria-required]=\"true\" />"
            }
            (AriaLabel, Html) => {
                "<label for=\"email\">Email address</label>\n<input id=\"email\" type=\"email\" aria-required=\"true\">"
            }
            (Focus, React) => {
                "/* focus.css */\n:focus-visible { outline: 3px solid #005fcc; outline-offset: 2px; }\n\n<button type=\"button\" onClick={open}>Open menu</button>"
            }
            (Focus, Vue) => {
                "<template>\n  <button type=\"button\" @click=\"open\">Open menu</button>\n</template>\n\n<style>\n:focus-visible { outline: 3px solid #005fcc; outline-offset: 2px; }\n</style>"
            }
            (Focus, Angular) => {
                "<button type=\"button\" (click)=\"open()\">Open menu</button>\n\n/* styles.css */\n:focus-visible { outline: 3px solid #005fcc; outline-offset: 2px; }"
            }
            (Focus, Html) => {
                "<style>\n  :focus-visible { outline: 3px solid #005fcc; outline-offset: 2px; }\n</style>\n<button type=\"button\">Open menu</button>"
            }
            (Landmark, React) => {
                "<>\n  <a className=\"skip-link\" href=\"#main\">Skip to main content</a>\n  <nav aria-label=\"Primary\">{links}</nav>\n  <main id=\"main\">{children}</main>\n</>"
            }
            (Landmark, Vue) => {
                "<template>\n  <a class=\"skip-link\" href=\"#main\">Skip to main content</a>\n  <nav aria-label=\"Primary\"><slot name=\"nav\" /></nav>\n  <main id=\"main\"><slot /></main>\n</template>"
            }
            (Landmark, Angular) => {
                "<a class=\"skip-link\" href=\"#main\">Skip to main content</a>\n<nav aria-label=\"Primary\"><app-nav></app-nav></nav>\n<main id=\"main\"><router-outlet></router-outlet></main>"
            }
            (Landmark, Html) => {
                "<a class=\"skip-link\" href=\"#main\">Skip to main content</a>\n<nav aria-label=\"Primary\">...</nav>\n<main id=\"main\">...</main>"
            }
        }
    }

    fn explanation(&self) -> &'static str {
        match self {
            FixCategory::Contrast => {
                "Text colors are raised to at least a 4.5:1 contrast ratio against their background so low-vision users can read them."
            }
            FixCategory::AriaLabel => {
                "Each control gets a programmatically associated label so screen readers announce its purpose."
            }
            FixCategory::Focus => {
                "Interactive elements are native, keyboard-operable controls with a clearly visible focus indicator."
            }
            FixCategory::Landmark => {
                "Content is wrapped in semantic landmarks with a skip link so assistive technology users can navigate by region."
            }
        }
    }

    fn implementation_steps(&self) -> Vec<String> {
        let steps: &[&str] = match self {
            FixCategory::Contrast => &[
                "Identify the foreground and background colors of the affected text",
                "Pick a text color with at least 4.5:1 contrast (3:1 for large text)",
                "Update the shared design tokens rather than individual elements",
            ],
            FixCategory::AriaLabel => &[
                "Give every form control a visible <label> tied to it by id",
                "Use aria-label or aria-labelledby only where a visible label is not possible",
                "Mark required fields with aria-required",
            ],
            FixCategory::Focus => &[
                "Replace clickable non-interactive elements with <button> or <a>",
                "Define a :focus-visible outline that meets 3:1 contrast",
                "Remove any outline: none rules that hide focus",
            ],
            FixCategory::Landmark => &[
                "Wrap primary content in <main> and navigation in <nav>",
                "Add a skip link as the first focusable element",
                "Give repeated landmarks distinct aria-label values",
            ],
        };
        steps.iter().map(|s| s.to_string()).collect()
    }

    fn testing_recommendations(&self) -> Vec<String> {
        let checks: &[&str] = match self {
            FixCategory::Contrast => &[
                "Measure the new color pair with a contrast checker",
                "Re-run the accessibility scan on the page",
            ],
            FixCategory::AriaLabel => &[
                "Tab to each control with a screen reader and confirm the announced name",
                "Re-run the accessibility scan on the page",
            ],
            FixCategory::Focus => &[
                "Navigate the page with Tab and Shift+Tab only",
                "Confirm the focus ring is visible on every interactive element",
            ],
            FixCategory::Landmark => &[
                "List landmarks with a screen reader rotor",
                "Activate the skip link and confirm focus moves to main content",
            ],
        };
        checks.iter().map(|s| s.to_string()).collect()
    }

    fn impact(&self) -> FixImpact {
        let (before, after) = match self {
            FixCategory::Contrast => ("Low-vision users struggle to read the text", "Text is legible for low-vision users"),
            FixCategory::AriaLabel => ("Screen readers announce an unnamed control", "Screen readers announce the control's purpose"),
            FixCategory::Focus => ("Keyboard users lose track of where they are", "Keyboard focus is always visible"),
            FixCategory::Landmark => ("Assistive technology users must traverse every element", "Users jump straight to the region they need"),
        };
        FixImpact {
            before: before.to_string(),
            after: after.to_string(),
        }
    }
}

/// Deterministic template fix; `fixed_code` is never empty
pub fn template_fix(violation: &Violation, framework: FixFramework) -> CodeFix {
    let category = FixCategory::classify(&violation.description);
    let original_code = violation
        .nodes
        .first()
        .map(|n| n.html.clone())
        .filter(|html| !html.trim().is_empty())
        .unwrap_or_else(|| format!("<!-- {} -->", violation.description));

    CodeFix {
        violation_id: violation.id.clone(),
        framework,
        original_code,
        fixed_code: category.fixed_code(framework).to_string(),
        explanation: category.explanation().to_string(),
        implementation_steps: category.implementation_steps(),
        testing_recommendations: category.testing_recommendations(),
        browser_compatibility: "Supported in all current browsers; :focus-visible requires Safari 15.4 or later"
            .to_string(),
        impact: Some(category.impact()),
        source: Provenance::Fallback,
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ModelFix {
    violation_id: Option<String>,
    original_code: Option<String>,
    fixed_code: String,
    explanation: String,
    implementation_steps: Vec<String>,
    testing_recommendations: Vec<String>,
    browser_compatibility: Option<String>,
    impact: Option<FixImpact>,
}

/// Fix-suggestion generator
pub struct GenerateFixesUseCase {
    provider: Option<Arc<dyn LlmProvider>>,
    config: LlmConfig,
}

impl GenerateFixesUseCase {
    /// `provider` is `None` when no reasoning service is configured
    pub fn new(provider: Option<Arc<dyn LlmProvider>>, config: LlmConfig) -> Self {
        Self { provider, config }
    }

    /// One fix per violation, in input order. Never fails.
    #[instrument(skip(self, violations, context), fields(violations = violations.len()))]
    pub async fn execute(&self, violations: &[Violation], context: &ScanContext) -> Vec<CodeFix> {
        if violations.is_empty() {
            return Vec::new();
        }

        let framework = resolve_framework(violations, context);
        let batch_size = self.config.fixes.batch_size.max(1);
        let max_concurrent = self.config.fixes.max_concurrent_batches.max(1);

        let batches: Vec<Vec<CodeFix>> = stream::iter(violations.chunks(batch_size).enumerate())
            .map(|(index, batch)| self.fix_batch(index, batch, framework))
            .buffered(max_concurrent)
            .collect()
            .await;

        let fixes: Vec<CodeFix> = batches.into_iter().flatten().collect();
        let from_ai = fixes.iter().filter(|f| f.source == Provenance::Ai).count();
        info!(
            fixes = fixes.len(),
            from_ai,
            framework = framework.as_str(),
            "Fix suggestions generated"
        );
        fixes
    }

    async fn fix_batch(&self, index: usize, batch: &[Violation], framework: FixFramework) -> Vec<CodeFix> {
        if let Some(ref provider) = self.provider {
            match self.request_fixes(provider.as_ref(), batch, framework).await {
                Ok(fixes) => return fixes,
                Err(e) => {
                    warn!(batch = index, size = batch.len(), error = %e, "AI fix batch failed, using templates");
                }
            }
        }

        batch.iter().map(|v| template_fix(v, framework)).collect()
    }

    async fn request_fixes(
        &self,
        provider: &dyn LlmProvider,
        batch: &[Violation],
        framework: FixFramework,
    ) -> Result<Vec<CodeFix>, LlmError> {
        let refs: Vec<&Violation> = batch.iter().collect();
        let model = self
            .config
            .code_fix_model
            .as_deref()
            .unwrap_or(&self.config.default_model);

        let request = CompletionRequest::new()
            .with_system(CODE_FIX_SYSTEM_PROMPT)
            .with_user(PromptBuilder::build_fix_prompt(&refs, framework))
            .with_model(model)
            .with_temperature(CODE_TEMPERATURE)
            .with_max_tokens(self.config.max_tokens);

        let response = tokio::time::timeout(self.config.timeout(), provider.complete(request))
            .await
            .map_err(|_| LlmError::timeout(self.config.timeout_seconds))??;

        let entries: Vec<ModelFix> = ResponseParser::parse_json(response.text())?;
        let aligned = align_entries(&entries, |e| e.violation_id.as_deref(), &refs)
            .ok_or_else(|| LlmError::InvalidResponse("fix entries do not cover the batch".to_string()))?;

        if aligned.iter().any(|fix| fix.fixed_code.trim().is_empty()) {
            return Err(LlmError::InvalidResponse("fix entry without fixedCode".to_string()));
        }
        debug!(fixes = aligned.len(), "AI fix batch parsed");

        Ok(batch
            .iter()
            .zip(aligned)
            .map(|(violation, entry)| {
                let fallback = template_fix(violation, framework);
                CodeFix {
                    violation_id: violation.id.clone(),
                    framework,
                    original_code: entry
                        .original_code
                        .clone()
                        .filter(|s| !s.trim().is_empty())
                        .unwrap_or(fallback.original_code),
                    fixed_code: entry.fixed_code.clone(),
                    explanation: if entry.explanation.trim().is_empty() {
                        fallback.explanation
                    } else {
                        entry.explanation.clone()
                    },
                    implementation_steps: entry.implementation_steps.clone(),
                    testing_recommendations: entry.testing_recommendations.clone(),
                    browser_compatibility: entry
                        .browser_compatibility
                        .clone()
                        .unwrap_or(fallback.browser_compatibility),
                    impact: entry.impact.clone(),
                    source: Provenance::Ai,
                }
            })
            .collect())
    }
}
