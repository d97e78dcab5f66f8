//! Heading structure and bypass-block checks

use a11ypilot_core::domain::audit::{Impact, Violation};

use super::{CheckContext, HeuristicCheck, finding, node_for, selector};
use crate::domain::HeuristicCheckError;

/// Heading levels must not jump by more than one step
pub struct HeadingOrderCheck;

impl HeuristicCheck for HeadingOrderCheck {
    fn name(&self) -> &'static str {
        "heading-order"
    }

    fn run(&self, ctx: &CheckContext<'_>) -> Result<Vec<Violation>, HeuristicCheckError> {
        let headings = selector("h1, h2, h3, h4, h5, h6")?;

        let mut previous: Option<u8> = None;
        let mut nodes = Vec::new();

        for heading in ctx.document.select(&headings) {
            let level = heading
                .value()
                .name()
                .strip_prefix('h')
                .and_then(|n| n.parse::<u8>().ok())
                .ok_or_else(|| HeuristicCheckError::Evaluation {
                    check: self.name().to_string(),
                    message: format!("unexpected heading tag '{}'", heading.value().name()),
                })?;

            if let Some(prev) = previous
                && level > prev + 1
            {
                nodes.push(node_for(heading).with_failure_summary(format!(
                    "Heading level {} follows level {}",
                    level, prev
                )));
            }
            previous = Some(level);
        }

        if nodes.is_empty() {
            return Ok(Vec::new());
        }

        Ok(vec![
            finding(
                "heading-skipped",
                "Heading levels skip one or more ranks",
                "Nest headings in order (h1, h2, h3...) without skipping levels.",
                Impact::Moderate,
                "WCAG 1.3.1",
                "structure",
            )
            .with_nodes(nodes),
        ])
    }
}

/// The page must offer a way to bypass repeated blocks
pub struct SkipNavigationCheck;

impl HeuristicCheck for SkipNavigationCheck {
    fn name(&self) -> &'static str {
        "skip-navigation"
    }

    fn run(&self, ctx: &CheckContext<'_>) -> Result<Vec<Violation>, HeuristicCheckError> {
        let landmark = selector("main, [role=\"main\"]")?;
        if ctx.document.select(&landmark).next().is_some() {
            return Ok(Vec::new());
        }

        let in_page_links = selector("a[href^=\"#\"]")?;
        let has_skip_link = ctx.document.select(&in_page_links).any(|link| {
            let text = link.text().collect::<String>().to_lowercase();
            let label = link.value().attr("aria-label").unwrap_or_default().to_lowercase();
            text.contains("skip") || label.contains("skip")
        });
        if has_skip_link {
            return Ok(Vec::new());
        }

        Ok(vec![finding(
            "bypass-blocks",
            "Page has no skip link or main landmark",
            "Add a \"Skip to main content\" link or wrap the primary content in a <main> landmark.",
            Impact::Moderate,
            "WCAG 2.4.1",
            "structure",
        )])
    }
}
