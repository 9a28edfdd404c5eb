//! Parsing of small JSON records out of free-form model output.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

/// Deserialize the first JSON object found in `raw`.
///
/// Tolerates markdown code fences and prose around the object.
pub fn parse_structured<T: DeserializeOwned>(raw: &str) -> Result<T> {
    let candidate = extract_json_object(raw)
        .with_context(|| format!("No JSON object in model output: {:?}", truncate(raw, 200)))?;
    serde_json::from_str(candidate)
        .with_context(|| format!("Malformed structured output: {:?}", truncate(candidate, 200)))
}

/// Slice from the first `{` to its matching `}`, skipping braces inside strings.
fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in raw[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
