//! Query-string construction for assembled requests.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use refetch_types::Params;
use serde_json::Value;

/// Characters escaped inside query keys and values: only those that would end
/// the query or make the URL invalid. Values are otherwise passed through
/// as given, so pre-encoded input such as `a%20b` is not encoded again.
const QUERY_COMPONENT: &AsciiSet = &CONTROLS.add(b' ').add(b'"').add(b'#').add(b'<').add(b'>').add(b'`');

/// Render a single parameter value the way it appears after `=`.
///
/// Strings render bare, arrays render their items joined by `,`, and every
/// other JSON value renders as its JSON text (`2`, `true`, `null`).
pub fn render_query_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Array(items) => items.iter().map(render_query_value).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

/// Render params as `key=value` pairs joined by `&`, preserving insertion order.
pub fn build_query_string(params: &Params) -> String {
    params
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                utf8_percent_encode(key, QUERY_COMPONENT),
                utf8_percent_encode(&render_query_value(value), QUERY_COMPONENT)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Append the rendered query string to `base_url`.
///
/// No `?` is added when there are no params.
///
/// # Example
/// ```rust
/// use refetch_types::Params;
/// use refetch_util::http::build_request_url;
/// use serde_json::json;
///
/// let params = Params::from([("a".to_string(), json!("Apple")), ("B".to_string(), json!(2))]);
/// assert_eq!(build_request_url("http://www.test.com", &params), "http://www.test.com?a=Apple&B=2");
/// assert_eq!(build_request_url("http://www.test.com/", &Params::new()), "http://www.test.com/");
/// ```
pub fn build_request_url(base_url: &str, params: &Params) -> String {
    let query = build_query_string(params);
    if query.is_empty() {
        return base_url.to_string();
    }
    format!("{base_url}?{query}")
}
