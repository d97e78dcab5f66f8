//! Heuristic check suite
//!
//! Hand-written checks that supplement the rule evaluator. Each check is a
//! pure function over a parsed DOM snapshot. A failing check is logged and
//! skipped; it never aborts the suite or the page scan.

pub mod aria;
pub mod contrast;
pub mod css;
pub mod focus;
pub mod forms;
pub mod headings;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use a11ypilot_core::domain::audit::{Framework, Impact, Violation, ViolationNode};

use crate::domain::{DomSnapshot, HeuristicCheckError};
use css::StyleRule;

pub use aria::RoleNameCheck;
pub use contrast::ContrastApproximationCheck;
pub use focus::{FocusIndicatorCheck, ModalFocusCheck};
pub use forms::{FormControlCheck, FormErrorHandlingCheck};
pub use headings::{HeadingOrderCheck, SkipNavigationCheck};

/// Everything a check may inspect
pub struct CheckContext<'a> {
    pub document: &'a Html,
    pub snapshot: &'a DomSnapshot,
    /// Inline `<style>` blocks followed by linked stylesheets
    pub rules: &'a [StyleRule],
    pub framework: Framework,
}

/// One supplementary accessibility heuristic
pub trait HeuristicCheck: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether the check runs for pages built with `framework`
    fn applies_to(&self, _framework: Framework) -> bool {
        true
    }

    fn run(&self, ctx: &CheckContext<'_>) -> Result<Vec<Violation>, HeuristicCheckError>;
}

/// Ordered collection of heuristic checks
pub struct HeuristicSuite {
    checks: Vec<Box<dyn HeuristicCheck>>,
}

impl Default for HeuristicSuite {
    fn default() -> Self {
        Self::standard()
    }
}

impl HeuristicSuite {
    /// Every built-in check
    pub fn standard() -> Self {
        Self::with_checks(vec![
            Box::new(RoleNameCheck),
            Box::new(ContrastApproximationCheck),
            Box::new(HeadingOrderCheck),
            Box::new(SkipNavigationCheck),
            Box::new(FormControlCheck),
            Box::new(FormErrorHandlingCheck),
            Box::new(FocusIndicatorCheck),
            Box::new(ModalFocusCheck),
        ])
    }

    pub fn with_checks(checks: Vec<Box<dyn HeuristicCheck>>) -> Self {
        Self { checks }
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Run every applicable check; failures are logged and skipped
    pub fn run(&self, snapshot: &DomSnapshot, framework: Framework) -> Vec<Violation> {
        let document = Html::parse_document(&snapshot.html);
        let rules = collect_rules(&document, snapshot);
        let ctx = CheckContext {
            document: &document,
            snapshot,
            rules: &rules,
            framework,
        };

        let mut findings = Vec::new();
        for check in &self.checks {
            if !check.applies_to(framework) {
                debug!(check = check.name(), framework = %framework, "Heuristic skipped for framework");
                continue;
            }
            match check.run(&ctx) {
                Ok(found) => {
                    debug!(check = check.name(), count = found.len(), "Heuristic completed");
                    findings.extend(found);
                }
                Err(e) => {
                    warn!(check = check.name(), url = %snapshot.url, error = %e, "Heuristic check failed, skipping");
                }
            }
        }
        findings
    }
}

fn collect_rules(document: &Html, snapshot: &DomSnapshot) -> Vec<StyleRule> {
    let mut rules = Vec::new();
    if let Ok(style) = Selector::parse("style") {
        for block in document.select(&style) {
            rules.extend(css::parse_stylesheet(&block.text().collect::<String>()));
        }
    }
    for sheet in &snapshot.stylesheets {
        rules.extend(css::parse_stylesheet(sheet));
    }
    rules
}

pub(crate) fn selector(css: &str) -> Result<Selector, HeuristicCheckError> {
    Selector::parse(css).map_err(|e| HeuristicCheckError::Selector {
        selector: css.to_string(),
        message: e.to_string(),
    })
}

/// Violation carrying the heuristic tags
pub(crate) fn finding(
    rule: &str,
    description: &str,
    help: &str,
    impact: Impact,
    wcag: &str,
    category: &str,
) -> Violation {
    Violation::new(format!("heuristic:{}", rule), description, impact, wcag)
        .with_help(help, None)
        .with_tag("heuristic")
        .with_tag(category)
}

const SNIPPET_LIMIT: usize = 250;

/// Node for an element: truncated outer HTML plus a selector path
pub(crate) fn node_for(element: ElementRef<'_>) -> ViolationNode {
    let html = element.html();
    let html = if html.len() > SNIPPET_LIMIT {
        let mut cut = SNIPPET_LIMIT;
        while !html.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}...", &html[..cut])
    } else {
        html
    };
    ViolationNode::new(html, selector_path(element))
}

/// `tag#id` / `tag.class` segments from the outermost meaningful ancestor down
pub(crate) fn selector_path(element: ElementRef<'_>) -> String {
    let mut segments = Vec::new();
    let mut current = Some(element);

    while let Some(el) = current {
        let value = el.value();
        let name = value.name();
        if name == "html" || name == "body" {
            break;
        }
        if let Some(id) = value.id() {
            segments.push(format!("{}#{}", name, id));
            break;
        }
        match value.classes().next() {
            Some(class) => segments.push(format!("{}.{}", name, class)),
            None => segments.push(name.to_string()),
        }
        current = el.parent().and_then(ElementRef::wrap);
    }

    if segments.is_empty() {
        return element.value().name().to_string();
    }
    segments.reverse();
    segments.join(" > ")
}

/// Non-empty attribute value
pub(crate) fn has_text_attr(element: ElementRef<'_>, attr: &str) -> bool {
    element
        .value()
        .attr(attr)
        .is_some_and(|v| !v.trim().is_empty())
}
