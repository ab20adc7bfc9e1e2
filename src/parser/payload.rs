use serde_json::Value;

use crate::error::{Error, Result};

const EXCERPT_CHARS: usize = 120;

/// Parse a model reply that should be JSON but may arrive wrapped in a
/// Markdown code fence or surrounded by prose.
pub fn parse_json_reply(raw: &str) -> Result<Value> {
    let body = strip_code_fence(raw);

    match serde_json::from_str(body) {
        Ok(v) => Ok(v),
        Err(first_err) => {
            // Fall back to the outermost object.
            let (Some(start), Some(end)) = (body.find('{'), body.rfind('}')) else {
                return Err(parse_error(raw, &first_err));
            };
            if end <= start {
                return Err(parse_error(raw, &first_err));
            }
            serde_json::from_str(&body[start..=end]).map_err(|e| parse_error(raw, &e))
        }
    }
}

/// Remove a surrounding ``` / ```json fence, if any.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string (e.g. "json") on the opening line.
    let rest = match rest.find('\n') {
        Some(nl) if !rest[..nl].trim().contains(char::is_whitespace) => &rest[nl + 1..],
        Some(_) => rest,
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };

    rest.trim().trim_end_matches('`').trim()
}

fn parse_error(raw: &str, err: &serde_json::Error) -> Error {
    let excerpt: String = raw.trim().chars().take(EXCERPT_CHARS).collect();
    Error::Parse(format!("{} (payload starts: {:?})", err, excerpt))
}
