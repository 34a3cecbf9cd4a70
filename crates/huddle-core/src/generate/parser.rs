//! Parser for generated plan responses.
//!
//! Generators are asked for `{"items": [...]}` but in practice wrap it in a
//! Markdown fence or a sentence of preamble. The parser finds the JSON
//! payload, decodes the items, and resets anything that only the store may
//! assign (`id`, `savedAt`) so every result starts ephemeral.

use thiserror::Error;

use huddle_db::models::PlanningItem;

/// Errors from decoding a plan response.
#[derive(Debug, Error)]
pub enum PlanResponseError {
    #[error("response contains no JSON object")]
    NoJson,

    #[error("response JSON does not match the plan schema: {0}")]
    Schema(#[from] serde_json::Error),
}

/// Decode the planning items in a generator response.
pub fn parse_plan_response(text: &str) -> Result<Vec<PlanningItem>, PlanResponseError> {
    let payload = extract_json(text).ok_or(PlanResponseError::NoJson)?;

    let value: serde_json::Value = serde_json::from_str(payload)?;
    let items: Vec<PlanningItem> = match value {
        serde_json::Value::Object(mut map) if map.contains_key("items") => {
            serde_json::from_value(map.remove("items").unwrap_or_default())?
        }
        value @ serde_json::Value::Array(_) => serde_json::from_value(value)?,
        other => vec![serde_json::from_value(other)?],
    };

    Ok(items
        .into_iter()
        .map(|mut item| {
            item.id = None;
            item.saved_at = None;
            item
        })
        .collect())
}

/// Locate the JSON payload inside `text`.
///
/// Prefers the contents of the first fenced code block; otherwise takes
/// the span from the first `{` or `[` to the matching last `}` or `]`.
fn extract_json(text: &str) -> Option<&str> {
    let text = text.trim();

    if let Some(start) = text.find("```") {
        let after = &text[start + 3..];
        // Skip an info string such as `json`.
        let body_start = after.find('\n').map_or(0, |i| i + 1);
        let body = &after[body_start..];
        if let Some(end) = body.find("```") {
            let inner = body[..end].trim();
            if !inner.is_empty() {
                return Some(inner);
            }
        }
    }

    let open = text.find(['{', '['])?;
    let close_char = if text[open..].starts_with('{') { '}' } else { ']' };
    let close = text.rfind(close_char)?;
    (close > open).then(|| &text[open..=close])
}
