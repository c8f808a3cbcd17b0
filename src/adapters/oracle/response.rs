//! Decoding oracle replies into correction responses.

use crate::domain::errors::OracleError;
use crate::domain::models::CorrectionResponse;

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// Decode the first ```json block of `text`, or the whole text when there is none.
pub fn decode_response(text: &str) -> Result<CorrectionResponse, OracleError> {
    if text.trim().is_empty() {
        return Err(OracleError::EmptyResponse);
    }

    let payload = extract_json_block(text).unwrap_or_else(|| strip_code_fence(text));

    serde_json::from_str(payload).map_err(|e| {
        OracleError::Parse(format!(
            "{e} (response starts with: {:?})",
            preview(text, 200)
        ))
    })
}

/// Contents of the first fenced block tagged `json` (any casing).
fn extract_json_block(text: &str) -> Option<&str> {
    // ASCII lowercasing keeps byte offsets valid for `text`.
    let lowered = text.to_ascii_lowercase();
    let start = lowered.find(JSON_FENCE)? + JSON_FENCE.len();
    let end = start + lowered[start..].find(FENCE)?;
    Some(text[start..end].trim())
}

/// Body of a reply that is wrapped in an untagged fence, else the trimmed reply.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    if !(trimmed.starts_with(FENCE) && trimmed.ends_with(FENCE) && trimmed.len() > 2 * FENCE.len()) {
        return trimmed;
    }

    let start = trimmed.find('\n').map_or(FENCE.len(), |pos| pos + 1);
    let end = trimmed.len() - FENCE.len();
    if start >= end {
        return trimmed;
    }
    trimmed[start..end].trim()
}

fn preview(text: &str, max_chars: usize) -> String {
    text.trim().chars().take(max_chars).collect()
}
