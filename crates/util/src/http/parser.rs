//! # Response Decoding
//!
//! This module decides how a received response body should be decoded and
//! performs the decoding. Inference looks only at the `content-type` header;
//! decoding never leaves a body undrained, falling back to text whenever the
//! strategy cannot be inferred.

use refetch_types::{HttpResponse, ResultType, ResultTypeHint};
use serde_json::Value;
use thiserror::Error;

/// Infer a decoding strategy from a `content-type` header value.
///
/// Only the exact value `application/json` maps to JSON. Any content type
/// containing `text` maps to text. Everything else (including a missing
/// header) yields `None`.
///
/// # Example
/// ```rust
/// use refetch_types::ResultType;
/// use refetch_util::http::infer_result_type;
///
/// assert_eq!(infer_result_type(Some("application/json")), Some(ResultType::Json));
/// assert_eq!(infer_result_type(Some("text/html")), Some(ResultType::Text));
/// assert_eq!(infer_result_type(Some("image/png")), None);
/// assert_eq!(infer_result_type(None), None);
/// ```
pub fn infer_result_type(content_type: Option<&str>) -> Option<ResultType> {
    let content_type = content_type?;
    if content_type == "application/json" {
        return Some(ResultType::Json);
    }
    if content_type.contains("text") {
        return Some(ResultType::Text);
    }
    None
}

/// Choose the decoding strategy for a response.
///
/// The hint matching the response's `ok` flag is selected (`result_type` for
/// 2xx, `error_result_type` otherwise). A fixed hint is used as-is; `infer`
/// inspects the content type and falls back to text.
pub fn select_result_type(response: &HttpResponse, result_type: ResultTypeHint, error_result_type: ResultTypeHint) -> ResultType {
    let hint = if response.ok() { result_type } else { error_result_type };
    hint.fixed()
        .or_else(|| infer_result_type(response.content_type()))
        .unwrap_or(ResultType::Text)
}

/// Decode a response body with the given strategy.
///
/// Text bodies are decoded lossily into a JSON string. JSON bodies are parsed
/// strictly; see [`parse_response_json_strict`].
///
/// # Errors
/// Returns a [`JsonParseError`] when a JSON body is malformed.
pub fn decode_response_body(response: &HttpResponse, result_type: ResultType) -> Result<Value, JsonParseError> {
    let text = String::from_utf8_lossy(&response.body);
    match result_type {
        ResultType::Text => Ok(Value::String(text.into_owned())),
        ResultType::Json => parse_response_json_strict(&text, Some(response.status)),
    }
}

/// Parse HTTP response text into JSON, providing detailed errors on failure.
///
/// This helper performs strict JSON deserialization and decorates any parsing
/// error with context about the originating HTTP status code plus a truncated
/// preview of the response body.
///
/// # Arguments
/// * `text` - The raw HTTP response body text
/// * `status` - Optional HTTP status code for error context
///
/// # Errors
/// Returns a [`JsonParseError`] describing the parse failure. The message
/// includes the original serde error and up to 200 characters of the response
/// body (with whitespace collapsed).
pub fn parse_response_json_strict(text: &str, status: Option<u16>) -> Result<Value, JsonParseError> {
    serde_json::from_str::<Value>(text).map_err(|error| {
        let status_note = status
            .map(|code| format!("status {code}"))
            .unwrap_or_else(|| "unknown status".to_string());
        let preview = truncate_response_preview(text, 200);

        JsonParseError::new(status_note, error, preview)
    })
}

fn truncate_response_preview(text: &str, limit: usize) -> String {
    if text.trim().is_empty() {
        return "<empty>".to_string();
    }

    let mut preview = String::new();
    for ch in text.chars() {
        if preview.len() >= limit {
            preview.push_str("...");
            break;
        }
        match ch {
            '\n' | '\r' | '\t' => {
                if !preview.ends_with(' ') {
                    preview.push(' ');
                }
            }
            _ => preview.push(ch),
        }
    }

    preview.trim().to_string()
}

/// Error returned when strict JSON parsing of an HTTP response fails.
#[derive(Debug, Error)]
#[error("failed to parse JSON response ({status_note}): {source}. body preview: {body_preview}")]
pub struct JsonParseError {
    status_note: String,
    #[source]
    source: serde_json::Error,
    body_preview: String,
}

impl JsonParseError {
    /// Create a new [`JsonParseError`] with contextual information.
    pub fn new(status_note: String, source: serde_json::Error, body_preview: String) -> Self {
        Self {
            status_note,
            source,
            body_preview,
        }
    }

    /// Access the truncated response preview captured during parsing.
    pub fn body_preview(&self) -> &str {
        &self.body_preview
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(status: u16, content_type: &str, body: &str) -> HttpResponse {
        HttpResponse::new(status, [("content-type".to_string(), content_type.to_string())], body)
    }

    #[test]
    fn infers_text_for_text_like_content_types() {
        for content_type in ["text/html", "text/xml", "text/plain;charset=UTF-8"] {
            assert_eq!(infer_result_type(Some(content_type)), Some(ResultType::Text), "{content_type}");
        }
    }

    #[test]
    fn json_inference_requires_exact_match() {
        assert_eq!(infer_result_type(Some("application/json")), Some(ResultType::Json));
        assert_eq!(infer_result_type(Some("application/json; charset=utf-8")), None);
        assert_eq!(infer_result_type(Some("nonexistent-mime-type")), None);
    }

    #[test]
    fn explicit_success_hint_wins_on_ok_response() {
        let ok = response(200, "text/plain", r#"{"who":"let the dogs out"}"#);
        assert_eq!(select_result_type(&ok, ResultTypeHint::Json, ResultTypeHint::Text), ResultType::Json);
    }

    #[test]
    fn error_hint_applies_to_unsuccessful_response() {
        let forbidden = response(403, "application/json", "Can't touch this!");
        assert_eq!(select_result_type(&forbidden, ResultTypeHint::Json, ResultTypeHint::Text), ResultType::Text);
    }

    #[test]
    fn unknown_content_type_falls_back_to_text() {
        let binary = response(200, "application/octet-stream", "raw");
        assert_eq!(select_result_type(&binary, ResultTypeHint::Infer, ResultTypeHint::Infer), ResultType::Text);
        assert_eq!(decode_response_body(&binary, ResultType::Text).unwrap(), json!("raw"));
    }

    #[test]
    fn inferred_decoding_on_either_path() {
        let text_ok = response(200, "text/plain", "Gimme Gimme Gimme!");
        let json_missing = response(404, "application/json", r#"{"and":"no one heard at all"}"#);

        let result_type = select_result_type(&text_ok, ResultTypeHint::Infer, ResultTypeHint::Infer);
        assert_eq!(decode_response_body(&text_ok, result_type).unwrap(), json!("Gimme Gimme Gimme!"));

        let result_type = select_result_type(&json_missing, ResultTypeHint::Infer, ResultTypeHint::Infer);
        assert_eq!(
            decode_response_body(&json_missing, result_type).unwrap(),
            json!({"and": "no one heard at all"})
        );
    }

    #[test]
    fn strict_parse_reports_status_and_preview() {
        let error = parse_response_json_strict("{\n\"broken\": ", Some(502)).expect_err("malformed json");
        let message = error.to_string();
        assert!(message.contains("status 502"));
        assert_eq!(error.body_preview(), "{ \"broken\":");
    }

    #[test]
    fn empty_body_preview_is_marked() {
        let error = parse_response_json_strict("", None).expect_err("empty body is not json");
        assert_eq!(error.body_preview(), "<empty>");
        assert!(error.to_string().contains("unknown status"));
    }
}
