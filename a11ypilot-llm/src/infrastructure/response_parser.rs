//! JSON extraction from model output
//!
//! Models wrap payloads in markdown fences or narrative text; these helpers
//! find the JSON regardless.

use serde::de::DeserializeOwned;

use crate::domain::LlmError;

pub struct ResponseParser;

impl ResponseParser {
    /// Parse a JSON value from a model response.
    ///
    /// Strategy order:
    /// 1) The full trimmed content.
    /// 2) A ```json fenced block.
    /// 3) Any fenced block.
    /// 4) The first valid JSON object or array in the text.
    pub fn parse_json<T: DeserializeOwned>(content: &str) -> Result<T, LlmError> {
        let trimmed = content.trim();
        if let Ok(parsed) = serde_json::from_str::<T>(trimmed) {
            return Ok(parsed);
        }

        let candidates = [
            Self::extract_fenced_block(trimmed, Some("json")),
            Self::extract_fenced_block(trimmed, None),
            Self::extract_first_json_value(trimmed),
        ];
        for json in candidates.into_iter().flatten() {
            if let Ok(parsed) = serde_json::from_str::<T>(&json) {
                return Ok(parsed);
            }
        }

        Err(LlmError::InvalidResponse(
            "Failed to extract valid JSON from LLM response".to_string(),
        ))
    }

    /// Uses `serde_json::Deserializer` to find the end of a valid JSON prefix
    pub fn extract_first_json_value(content: &str) -> Option<String> {
        for (idx, ch) in content.char_indices() {
            if ch == '{' || ch == '[' {
                let candidate = &content[idx..];
                let mut de =
                    serde_json::Deserializer::from_str(candidate).into_iter::<serde_json::Value>();
                if let Some(Ok(_)) = de.next() {
                    let end = de.byte_offset();
                    if end > 0 && end <= candidate.len() {
                        return Some(candidate[..end].to_string());
                    }
                }
            }
        }
        None
    }

    fn extract_fenced_block(content: &str, language: Option<&str>) -> Option<String> {
        const FENCE: &str = "```";
        let mut search = content;

        loop {
            let start = search.find(FENCE)?;
            let after_start = &search[start + FENCE.len()..];
            let line_end = after_start.find('\n')?;
            let lang_tag = after_start[..line_end].trim();
            let rest = &after_start[line_end + 1..];

            if let Some(expected) = language
                && !lang_tag.eq_ignore_ascii_case(expected)
            {
                search = after_start;
                continue;
            }

            let end = rest.find(FENCE)?;
            return Some(rest[..end].trim().to_string());
        }
    }
}
