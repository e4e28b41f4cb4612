//! Response Validation
//!
//! Models frequently wrap JSON in code fences, surround it with prose, or
//! leave a trailing comma behind. Extraction tolerates those; it never tries
//! to complete truncated output, since a half-written document is worse than
//! a failed request the user can retry.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::types::{ErrorCategory, LeadError, LlmError, Result};

/// Extract and parse JSON from an LLM reply
pub fn extract_json_from_response(content: &str) -> Result<Value> {
    let cleaned = strip_code_fences(content.trim().trim_start_matches('\u{feff}'));

    if let Ok(value) = serde_json::from_str::<Value>(cleaned) {
        return Ok(value);
    }
    debug!("Direct JSON parse failed, attempting cleanup");

    let candidate = outermost_json(cleaned).unwrap_or(cleaned);
    for attempt in [candidate.to_string(), remove_trailing_commas(candidate)] {
        if let Ok(value) = serde_json::from_str::<Value>(&attempt) {
            warn!("JSON recovered from loosely formatted reply");
            return Ok(value);
        }
    }

    Err(LlmError::new(
        ErrorCategory::ParseError,
        format!(
            "Reply is not valid JSON. Content preview: {}...",
            cleaned.chars().take(200).collect::<String>()
        ),
    )
    .into())
}

/// Deserialize a JSON value into `T`, naming `what` on failure
pub fn parse_response<T: DeserializeOwned>(value: Value, what: &str) -> Result<T> {
    serde_json::from_value(value).map_err(|e| {
        LeadError::from(LlmError::new(
            ErrorCategory::ParseError,
            format!("Reply does not match the {} shape: {}", what, e),
        ))
    })
}

fn strip_code_fences(s: &str) -> &str {
    let mut body = s;
    if body.starts_with("```") {
        body = match body.find('\n') {
            Some(newline) => &body[newline + 1..],
            None => body.trim_start_matches('`'),
        };
    }
    body.trim_end().trim_end_matches("```").trim()
}

/// Slice from the first `{`/`[` to its matching closer, ignoring brackets inside strings
fn outermost_json(s: &str) -> Option<&str> {
    let start = s.find(['{', '['])?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape = false;

    for (offset, ch) in s[start..].char_indices() {
        if escape {
            escape = false;
            continue;
        }
        match ch {
            '\\' if in_string => escape = true,
            '"' => in_string = !in_string,
            '{' | '[' if !in_string => depth += 1,
            '}' | ']' if !in_string => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&s[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Drop commas that directly precede `]` or `}` outside strings
fn remove_trailing_commas(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    let mut in_string = false;
    let mut escape = false;

    for (i, &ch) in chars.iter().enumerate() {
        if escape {
            escape = false;
        } else if ch == '\\' && in_string {
            escape = true;
        } else if ch == '"' {
            in_string = !in_string;
        } else if ch == ',' && !in_string {
            let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
            if matches!(next, Some(']') | Some('}')) {
                continue;
            }
        }
        out.push(ch);
    }
    out
}
