//! Minimal stylesheet reading for the heuristics
//!
//! This is not a CSS engine: it understands flat rules (including those
//! nested one level inside `@media`), declarations and color values, which
//! is all the contrast and focus approximations need.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());
static RE_RULE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([^{}@;]+)\{([^{}]*)\}").unwrap());
static RE_RGB: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^rgba?\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*(?:,\s*([\d.]+)\s*)?\)$")
        .unwrap()
});

/// One style rule: raw selector list plus its declarations
#[derive(Debug, Clone, PartialEq)]
pub struct StyleRule {
    pub selectors: Vec<String>,
    pub declarations: Vec<(String, String)>,
}

impl StyleRule {
    pub fn get(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .rev()
            .find(|(name, _)| name == property)
            .map(|(_, value)| value.as_str())
    }
}

/// Parse every flat rule from a stylesheet
pub fn parse_stylesheet(css: &str) -> Vec<StyleRule> {
    let css = RE_COMMENT.replace_all(css, "");
    RE_RULE
        .captures_iter(&css)
        .filter_map(|caps| {
            let selectors: Vec<String> = caps[1]
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if selectors.is_empty() {
                return None;
            }
            Some(StyleRule {
                selectors,
                declarations: parse_declarations(&caps[2]),
            })
        })
        .collect()
}

/// Parse a declaration block or a `style` attribute
pub fn parse_declarations(block: &str) -> Vec<(String, String)> {
    block
        .split(';')
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            let name = name.trim().to_lowercase();
            let value = value
                .trim()
                .trim_end_matches("!important")
                .trim()
                .to_lowercase();
            if name.is_empty() || value.is_empty() {
                None
            } else {
                Some((name, value))
            }
        })
        .collect()
}

/// Normalize a color value to `#rrggbb`; `None` for transparent or unknown values
pub fn normalize_color(value: &str) -> Option<String> {
    let value = value.trim().to_lowercase();

    if let Some(hex) = value.strip_prefix('#') {
        return match hex.len() {
            3 if hex.chars().all(|c| c.is_ascii_hexdigit()) => {
                let expanded: String = hex.chars().flat_map(|c| [c, c]).collect();
                Some(format!("#{}", expanded))
            }
            6 if hex.chars().all(|c| c.is_ascii_hexdigit()) => Some(format!("#{}", hex)),
            _ => None,
        };
    }

    if let Some(caps) = RE_RGB.captures(&value) {
        if let Some(alpha) = caps.get(4)
            && alpha.as_str().parse::<f32>().unwrap_or(1.0) == 0.0
        {
            return None;
        }
        let channel = |i: usize| caps[i].parse::<u16>().ok().map(|c| c.min(255));
        return Some(format!(
            "#{:02x}{:02x}{:02x}",
            channel(1)?,
            channel(2)?,
            channel(3)?
        ));
    }

    let hex = match value.as_str() {
        "black" => "#000000",
        "white" => "#ffffff",
        "gray" | "grey" => "#808080",
        "darkgray" | "darkgrey" => "#a9a9a9",
        "silver" => "#c0c0c0",
        "lightgray" | "lightgrey" => "#d3d3d3",
        "gainsboro" => "#dcdcdc",
        "whitesmoke" => "#f5f5f5",
        "dimgray" | "dimgrey" => "#696969",
        "yellow" => "#ffff00",
        "red" => "#ff0000",
        "green" => "#008000",
        "lime" => "#00ff00",
        "blue" => "#0000ff",
        "navy" => "#000080",
        "skyblue" => "#87ceeb",
        "lightgreen" => "#90ee90",
        "lightyellow" => "#ffffe0",
        "orange" => "#ffa500",
        _ => return None,
    };
    Some(hex.to_string())
}

/// First color token found in a `background` shorthand
pub fn color_in_shorthand(value: &str) -> Option<String> {
    if let Some(color) = normalize_color(value) {
        return Some(color);
    }
    value.split_whitespace().find_map(normalize_color)
}

/// Resolve a `font-size` value against the parent size, in pixels
pub fn font_size_px(value: &str, parent_px: f32) -> Option<f32> {
    let value = value.trim();
    let number = |suffix: &str| value.strip_suffix(suffix)?.trim().parse::<f32>().ok();

    if let Some(px) = number("px") {
        return Some(px);
    }
    if let Some(rem) = number("rem") {
        return Some(rem * 16.0);
    }
    if let Some(em) = number("em") {
        return Some(em * parent_px);
    }
    if let Some(pt) = number("pt") {
        return Some(pt * 4.0 / 3.0);
    }
    if let Some(pct) = number("%") {
        return Some(pct * parent_px / 100.0);
    }
    match value {
        "xx-small" => Some(9.0),
        "x-small" => Some(10.0),
        "small" | "smaller" => Some(13.0),
        "medium" => Some(16.0),
        "large" | "larger" => Some(18.0),
        "x-large" => Some(24.0),
        "xx-large" => Some(32.0),
        _ => None,
    }
}

/// Whether a `font-weight` value renders bold
pub fn is_bold_weight(value: &str) -> bool {
    match value.trim() {
        "bold" | "bolder" => true,
        other => other.parse::<u16>().is_ok_and(|w| w >= 600),
    }
}
