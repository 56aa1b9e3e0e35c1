//! # Text Processing Utilities
//!
//! Redaction helpers used before request details reach logs or terminal
//! output. Header values are redacted by name; free-form text is scanned for
//! credential-looking assignments.

use once_cell::sync::Lazy;
use refetch_types::Headers;
use regex::Regex;

const REDACTED: &str = "[REDACTED]";

/// Header names whose values are always hidden.
const SENSITIVE_HEADER_NAMES: &[&str] = &["authorization", "proxy-authorization", "cookie", "set-cookie"];

/// Fragments that mark a header name as carrying a credential.
const SENSITIVE_HEADER_FRAGMENTS: &[&str] = &["token", "secret", "api-key", "apikey", "password"];

static REDACT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(authorization:\s*)([^\s,;]+(?:\s+[^\s,;]+)?)()",
        r"(?i)(\b[A-Z0-9_]*(?:KEY|TOKEN|SECRET|PASSWORD)=)([^\s&]+)()",
        r#"(?i)("(?:[a-z0-9_-]*(?:key|token|secret|password))"\s*:\s*")([^"]+)(")"#,
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).expect("redaction pattern should compile"))
    .collect()
});

/// Redacts values that look like secrets in a string.
///
/// # Example
/// ```rust
/// use refetch_util::redact_sensitive;
///
/// assert_eq!(redact_sensitive("API_KEY=abc123 TOKEN=xyz789"), "API_KEY=[REDACTED] TOKEN=[REDACTED]");
/// assert_eq!(redact_sensitive("Authorization: Bearer secret123"), "Authorization: [REDACTED]");
/// ```
pub fn redact_sensitive(input: &str) -> String {
    redact_sensitive_with(input, REDACTED)
}

/// Redacts sensitive-looking values, using a custom replacement token.
pub fn redact_sensitive_with(input: &str, replacement: &str) -> String {
    let mut redacted = input.to_string();

    for pattern in REDACT_PATTERNS.iter() {
        redacted = pattern
            .replace_all(&redacted, |captures: &regex::Captures| {
                let prefix = captures.get(1).map(|m| m.as_str()).unwrap_or("");
                let suffix = captures.get(3).map(|m| m.as_str()).unwrap_or("");
                format!("{prefix}{replacement}{suffix}")
            })
            .to_string();
    }

    redacted
}

/// Whether a header's value should be hidden from logs.
pub fn is_sensitive_header(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    SENSITIVE_HEADER_NAMES.contains(&name.as_str()) || SENSITIVE_HEADER_FRAGMENTS.iter().any(|fragment| name.contains(fragment))
}

/// Copy of `headers` with credential-bearing values replaced.
pub fn redact_headers(headers: &Headers) -> Headers {
    headers
        .iter()
        .map(|(name, value)| {
            let value = if is_sensitive_header(name) {
                REDACTED.to_string()
            } else {
                redact_sensitive(value)
            };
            (name.clone(), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_shell_style_assignments() {
        assert_eq!(redact_sensitive("DATABASE_PASSWORD=hunter2 PORT=5432"), "DATABASE_PASSWORD=[REDACTED] PORT=5432");
    }

    #[test]
    fn redacts_json_style_entries() {
        let input = r#"{"access_token": "abc.def", "name": "demo"}"#;
        assert_eq!(redact_sensitive(input), r#"{"access_token": "[REDACTED]", "name": "demo"}"#);
    }

    #[test]
    fn custom_replacement_is_used() {
        assert_eq!(redact_sensitive_with("TOKEN=xyz", "***"), "TOKEN=***");
    }

    #[test]
    fn header_redaction_is_name_based() {
        let headers = Headers::from([
            ("Authorization".to_string(), "Bearer abc".to_string()),
            ("x-access-token".to_string(), "GIMME_ACCESS".to_string()),
            ("content-type".to_string(), "application/json".to_string()),
        ]);
        let redacted = redact_headers(&headers);
        assert_eq!(redacted["Authorization"], REDACTED);
        assert_eq!(redacted["x-access-token"], REDACTED);
        assert_eq!(redacted["content-type"], "application/json");
    }
}
