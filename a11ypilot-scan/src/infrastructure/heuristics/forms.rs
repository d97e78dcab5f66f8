//! Form accessibility checks

use std::collections::HashSet;

use scraper::ElementRef;

use a11ypilot_core::domain::audit::{Impact, Violation};

use super::{CheckContext, HeuristicCheck, finding, has_text_attr, node_for, selector};
use crate::domain::HeuristicCheckError;

const UNLABELABLE_INPUT_TYPES: &[&str] = &["hidden", "submit", "button", "reset", "image"];

/// Labels for every control, and `aria-required` on required ones
pub struct FormControlCheck;

impl HeuristicCheck for FormControlCheck {
    fn name(&self) -> &'static str {
        "form-controls"
    }

    fn run(&self, ctx: &CheckContext<'_>) -> Result<Vec<Violation>, HeuristicCheckError> {
        let controls = selector("input, select, textarea")?;
        let labels = selector("label[for]")?;

        let labelled_ids: HashSet<&str> = ctx
            .document
            .select(&labels)
            .filter_map(|label| label.value().attr("for"))
            .map(str::trim)
            .collect();

        let mut unlabeled = Vec::new();
        let mut unannounced = Vec::new();

        for control in ctx.document.select(&controls) {
            if !is_labelable(control) {
                continue;
            }
            if !has_label(control, &labelled_ids) {
                unlabeled.push(node_for(control));
            }
            let value = control.value();
            if value.attr("required").is_some() && value.attr("aria-required").is_none() {
                unannounced.push(node_for(control));
            }
        }

        let mut findings = Vec::new();
        if !unlabeled.is_empty() {
            findings.push(
                finding(
                    "form-control-name",
                    "Form control has no accessible name",
                    "Associate each form control with a <label for>, wrap it in a <label>, or give it an aria-label.",
                    Impact::Serious,
                    "WCAG 3.3.2",
                    "forms",
                )
                .with_nodes(unlabeled),
            );
        }
        if !unannounced.is_empty() {
            findings.push(
                finding(
                    "required-not-announced",
                    "Required form field is not announced as required",
                    "Add aria-required=\"true\" alongside the required attribute.",
                    Impact::Minor,
                    "WCAG 3.3.3",
                    "forms",
                )
                .with_nodes(unannounced),
            );
        }
        Ok(findings)
    }
}

/// Forms that submit must have somewhere to report errors
pub struct FormErrorHandlingCheck;

impl HeuristicCheck for FormErrorHandlingCheck {
    fn name(&self) -> &'static str {
        "form-error-handling"
    }

    fn run(&self, ctx: &CheckContext<'_>) -> Result<Vec<Violation>, HeuristicCheckError> {
        let forms = selector("form")?;
        let submit = selector(
            "button:not([type]), button[type=\"submit\"], input[type=\"submit\"], input[type=\"image\"]",
        )?;
        let feedback = selector(
            "[role=\"alert\"], [aria-live], [aria-invalid], [aria-errormessage], [aria-describedby]",
        )?;

        let nodes: Vec<_> = ctx
            .document
            .select(&forms)
            .filter(|form| form.select(&submit).next().is_some())
            .filter(|form| form.select(&feedback).next().is_none() && !has_error_hook(*form))
            .map(node_for)
            .collect();

        if nodes.is_empty() {
            return Ok(Vec::new());
        }

        Ok(vec![
            finding(
                "form-error-feedback",
                "Form has no error feedback mechanism",
                "Provide an error summary or inline messages announced through role=\"alert\" or aria-live.",
                Impact::Moderate,
                "WCAG 3.3.1",
                "forms",
            )
            .with_nodes(nodes),
        ])
    }
}

fn is_labelable(control: ElementRef<'_>) -> bool {
    let value = control.value();
    if value.name() != "input" {
        return true;
    }
    let kind = value.attr("type").unwrap_or("text").trim().to_lowercase();
    !UNLABELABLE_INPUT_TYPES.contains(&kind.as_str())
}

fn has_label(control: ElementRef<'_>, labelled_ids: &HashSet<&str>) -> bool {
    if has_text_attr(control, "aria-label") || has_text_attr(control, "aria-labelledby") {
        return true;
    }
    if let Some(id) = control.value().id()
        && labelled_ids.contains(id)
    {
        return true;
    }
    control
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| ancestor.value().name() == "label")
}

/// Any descendant whose id or class mentions "error"
fn has_error_hook(form: ElementRef<'_>) -> bool {
    form.descendants().filter_map(ElementRef::wrap).any(|el| {
        let value = el.value();
        value.id().is_some_and(|id| id.to_lowercase().contains("error"))
            || value.classes().any(|c| c.to_lowercase().contains("error"))
    })
}
