//! Focus management checks

use a11ypilot_core::domain::audit::{Impact, Violation};

use super::{CheckContext, HeuristicCheck, finding, node_for, selector};
use crate::domain::HeuristicCheckError;

const OUTLINE_PROPERTIES: &[&str] = &["outline", "outline-style", "outline-width"];

/// At least one `:focus` rule must draw a visible outline
pub struct FocusIndicatorCheck;

impl HeuristicCheck for FocusIndicatorCheck {
    fn name(&self) -> &'static str {
        "focus-indicator"
    }

    fn run(&self, ctx: &CheckContext<'_>) -> Result<Vec<Violation>, HeuristicCheckError> {
        let has_visible_focus = ctx
            .rules
            .iter()
            .filter(|rule| rule.selectors.iter().any(|s| s.contains(":focus")))
            .any(|rule| {
                rule.declarations
                    .iter()
                    .any(|(name, value)| OUTLINE_PROPERTIES.contains(&name.as_str()) && is_visible_outline(value))
            });

        if has_visible_focus {
            return Ok(Vec::new());
        }

        Ok(vec![finding(
            "focus-visible",
            "No visible focus indicator is defined",
            "Add :focus (or :focus-visible) styles with a visible outline for interactive elements.",
            Impact::Serious,
            "WCAG 2.4.7",
            "keyboard",
        )])
    }
}

/// Dialogs must contain something that can take focus
pub struct ModalFocusCheck;

impl HeuristicCheck for ModalFocusCheck {
    fn name(&self) -> &'static str {
        "modal-focus-trap"
    }

    fn run(&self, ctx: &CheckContext<'_>) -> Result<Vec<Violation>, HeuristicCheckError> {
        let dialogs = selector("dialog, [role=\"dialog\"], [role=\"alertdialog\"], [aria-modal=\"true\"]")?;
        let focusable = selector(
            "a[href], button:not([disabled]), input:not([type=\"hidden\"]):not([disabled]), \
             select:not([disabled]), textarea:not([disabled]), [tabindex]:not([tabindex=\"-1\"]), \
             [contenteditable=\"true\"]",
        )?;

        let nodes: Vec<_> = ctx
            .document
            .select(&dialogs)
            .filter(|dialog| dialog.select(&focusable).next().is_none())
            .map(node_for)
            .collect();

        if nodes.is_empty() {
            return Ok(Vec::new());
        }

        Ok(vec![
            finding(
                "modal-no-focusable",
                "Modal dialog contains no focusable elements",
                "Give each dialog at least one focusable control and move focus into it when it opens.",
                Impact::Serious,
                "WCAG 2.1.1",
                "keyboard",
            )
            .with_nodes(nodes),
        ])
    }
}

fn is_visible_outline(value: &str) -> bool {
    let value = value.trim();
    !(value.is_empty()
        || value == "none"
        || value == "0"
        || value == "0px"
        || value.starts_with("none ")
        || value.starts_with("0 ")
        || value.starts_with("0px "))
}
