// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Normalization and typed decoding of reasoning-service responses.
//!
//! Every orchestrator operation demands JSON-only output, but models wrap
//! answers in markdown code fences often enough that stripping them is part
//! of the boundary contract. Stripping is a standalone step preceding the
//! parser; decoding goes straight into a strongly-typed result or fails, so
//! raw untyped maps never travel further into the system.

use serde::de::DeserializeOwned;

use crate::domain::intelligence::IntelligenceError;

/// Best-effort removal of markdown code-fence wrapping (``` / ```json).
///
/// Returns the inner body when the text is fenced, the trimmed input
/// otherwise. Never fails: text that only resembles a fence is passed
/// through for the parser to judge.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string ("json", "JSON", ...) up to the first newline.
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };

    match body.rfind("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

/// Decode a reasoning-service response into `T`, stripping fences first.
/// Failure is a ParseError carrying the operation name, so callers can tell
/// which stage of which operation went wrong.
pub fn decode<T: DeserializeOwned>(
    operation: &'static str,
    text: &str,
) -> Result<T, IntelligenceError> {
    let body = strip_code_fences(text);
    serde_json::from_str(body).map_err(|e| IntelligenceError::Parse {
        operation,
        detail: format!("{} in response: {}", e, truncate(body, 200)),
    })
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_bare_json_passes_through() {
        assert_eq!(strip_code_fences(r#"{"a": 1}"#), r#"{"a": 1}"#);
        assert_eq!(strip_code_fences("  [1, 2]  "), "[1, 2]");
    }

    #[test]
    fn test_json_fence_is_stripped() {
        let fenced = "```json\n{\"confidence\": 0.7}\n```";
        assert_eq!(strip_code_fences(fenced), "{\"confidence\": 0.7}");
    }

    #[test]
    fn test_anonymous_fence_is_stripped() {
        let fenced = "```\n[{\"title\": \"x\"}]\n```";
        assert_eq!(strip_code_fences(fenced), "[{\"title\": \"x\"}]");
    }

    #[test]
    fn test_unterminated_fence_still_yields_body() {
        let fenced = "```json\n{\"a\": 1}";
        assert_eq!(strip_code_fences(fenced), "{\"a\": 1}");
    }

    #[test]
    fn test_decode_reports_operation_on_failure() {
        let err = decode::<Value>("wander", "here are some ideas!").unwrap_err();
        match err {
            crate::domain::intelligence::IntelligenceError::Parse { operation, .. } => {
                assert_eq!(operation, "wander");
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_through_fence() {
        let fenced = "```json\n{\"answer\": 42}\n```";
        let value: Value = decode("validate", fenced).unwrap();
        assert_eq!(value["answer"], 42);
    }
}
