//! Contrast approximation
//!
//! Resolves foreground and background colors from inline styles and simple
//! stylesheet rules, then looks the pair up in a table of combinations known
//! to fail WCAG AA for body text. It does not compute contrast ratios.

use std::collections::HashMap;

use scraper::{ElementRef, Node, Selector};

use a11ypilot_core::domain::audit::{Impact, Violation};

use super::css::{self, StyleRule};
use super::{CheckContext, HeuristicCheck, finding, node_for};
use crate::domain::HeuristicCheckError;

/// Text smaller than this (in px) counts as small
const LARGE_TEXT_PX: f32 = 16.0;

/// (foreground, background) pairs known to fall below 4.5:1
const LOW_CONTRAST_PAIRS: &[(&str, &str)] = &[
    ("#ffffff", "#ffff00"),
    ("#ffff00", "#ffffff"),
    ("#ffffe0", "#ffffff"),
    ("#eeeeee", "#ffffff"),
    ("#dddddd", "#ffffff"),
    ("#dcdcdc", "#ffffff"),
    ("#d3d3d3", "#ffffff"),
    ("#cccccc", "#ffffff"),
    ("#c0c0c0", "#ffffff"),
    ("#bbbbbb", "#ffffff"),
    ("#aaaaaa", "#ffffff"),
    ("#a9a9a9", "#ffffff"),
    ("#999999", "#ffffff"),
    ("#ffffff", "#cccccc"),
    ("#ffffff", "#aaaaaa"),
    ("#ffffff", "#87ceeb"),
    ("#ffffff", "#90ee90"),
    ("#ffffff", "#ffa500"),
    ("#808080", "#000000"),
    ("#696969", "#000000"),
    ("#666666", "#000000"),
    ("#333333", "#000000"),
    ("#000000", "#333333"),
    ("#0000ff", "#000080"),
    ("#ff0000", "#008000"),
    ("#008000", "#ff0000"),
];

const SKIPPED_TAGS: &[&str] = &["head", "script", "style", "noscript", "template", "title"];

#[derive(Debug, Clone)]
struct TextStyle {
    color: String,
    background: String,
    font_px: f32,
    bold: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            color: "#000000".to_string(),
            background: "#ffffff".to_string(),
            font_px: LARGE_TEXT_PX,
            bold: false,
        }
    }
}

pub struct ContrastApproximationCheck;

impl HeuristicCheck for ContrastApproximationCheck {
    fn name(&self) -> &'static str {
        "contrast-approximation"
    }

    fn run(&self, ctx: &CheckContext<'_>) -> Result<Vec<Violation>, HeuristicCheckError> {
        let compiled = compile_rules(ctx.rules);
        let mut styles = HashMap::new();
        let mut nodes = Vec::new();

        for node in ctx.document.root_element().descendants() {
            let Some(element) = ElementRef::wrap(node) else {
                continue;
            };
            if SKIPPED_TAGS.contains(&element.value().name()) {
                continue;
            }

            let parent_style = element
                .parent()
                .and_then(|p| styles.get(&p.id()).cloned())
                .unwrap_or_default();
            let style = resolve(element, &parent_style, &compiled);

            if has_own_text(element)
                && style.font_px < LARGE_TEXT_PX
                && !style.bold
                && is_low_contrast(&style.color, &style.background)
            {
                nodes.push(node_for(element).with_failure_summary(format!(
                    "Text color {} on background {} at {}px",
                    style.color, style.background, style.font_px
                )));
            }
            styles.insert(element.id(), style);
        }

        if nodes.is_empty() {
            return Ok(Vec::new());
        }

        Ok(vec![
            finding(
                "low-contrast-text",
                "Small text uses a low-contrast color combination",
                "Use a darker foreground or lighter background so small text reaches a 4.5:1 contrast ratio.",
                Impact::Moderate,
                "WCAG 1.4.3",
                "contrast",
            )
            .with_nodes(nodes),
        ])
    }
}

/// Compile the selectors we can match; pseudo-classes and unparsable selectors are ignored
fn compile_rules(rules: &[StyleRule]) -> Vec<(Selector, &StyleRule)> {
    rules
        .iter()
        .flat_map(|rule| {
            rule.selectors
                .iter()
                .filter(|s| !s.contains(':'))
                .filter_map(|s| Selector::parse(s).ok())
                .map(move |selector| (selector, rule))
        })
        .collect()
}

fn resolve(element: ElementRef<'_>, parent: &TextStyle, rules: &[(Selector, &StyleRule)]) -> TextStyle {
    let mut style = TextStyle {
        color: parent.color.clone(),
        background: parent.background.clone(),
        font_px: parent.font_px,
        bold: parent.bold,
    };

    match element.value().name() {
        "b" | "strong" | "th" => style.bold = true,
        "h1" => (style.font_px, style.bold) = (32.0, true),
        "h2" => (style.font_px, style.bold) = (24.0, true),
        "h3" => (style.font_px, style.bold) = (18.72, true),
        "h4" | "h5" | "h6" => style.bold = true,
        "small" => style.font_px = parent.font_px * 0.833,
        _ => {}
    }

    let mut declarations: Vec<(String, String)> = rules
        .iter()
        .filter(|(selector, _)| selector.matches(&element))
        .flat_map(|(_, rule)| rule.declarations.iter().cloned())
        .collect();
    if let Some(inline) = element.value().attr("style") {
        declarations.extend(css::parse_declarations(inline));
    }

    for (property, value) in declarations {
        match property.as_str() {
            "color" => {
                if let Some(color) = css::normalize_color(&value) {
                    style.color = color;
                }
            }
            "background-color" | "background" => {
                if let Some(color) = css::color_in_shorthand(&value) {
                    style.background = color;
                }
            }
            "font-size" => {
                if let Some(px) = css::font_size_px(&value, parent.font_px) {
                    style.font_px = px;
                }
            }
            "font-weight" => style.bold = css::is_bold_weight(&value),
            _ => {}
        }
    }
    style
}

fn has_own_text(element: ElementRef<'_>) -> bool {
    element
        .children()
        .any(|child| matches!(child.value(), Node::Text(text) if !text.trim().is_empty()))
}

fn is_low_contrast(foreground: &str, background: &str) -> bool {
    LOW_CONTRAST_PAIRS
        .iter()
        .any(|(fg, bg)| *fg == foreground && *bg == background)
}
