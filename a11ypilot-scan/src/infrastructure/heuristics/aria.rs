//! Framework-specific ARIA check

use a11ypilot_core::domain::audit::{Framework, Impact, Violation};

use super::{CheckContext, HeuristicCheck, finding, has_text_attr, node_for, selector};
use crate::domain::HeuristicCheckError;

/// Component libraries frequently attach a `role` without wiring up a name.
pub struct RoleNameCheck;

impl HeuristicCheck for RoleNameCheck {
    fn name(&self) -> &'static str {
        "role-accessible-name"
    }

    fn applies_to(&self, framework: Framework) -> bool {
        framework == Framework::React
    }

    fn run(&self, ctx: &CheckContext<'_>) -> Result<Vec<Violation>, HeuristicCheckError> {
        let with_role = selector("[role]")?;

        let nodes: Vec<_> = ctx
            .document
            .select(&with_role)
            .filter(|el| {
                let role = el.value().attr("role").unwrap_or_default().trim();
                !matches!(role, "" | "presentation" | "none")
            })
            .filter(|el| !has_text_attr(*el, "aria-label") && !has_text_attr(*el, "aria-labelledby"))
            .map(node_for)
            .collect();

        if nodes.is_empty() {
            return Ok(Vec::new());
        }

        Ok(vec![
            finding(
                "react-role-name",
                "Element with an explicit role has no accessible name",
                "Give every element with a role an aria-label or aria-labelledby so assistive technology can announce it.",
                Impact::Moderate,
                "WCAG 4.1.2",
                "aria",
            )
            .with_tag("react")
            .with_nodes(nodes),
        ])
    }
}
