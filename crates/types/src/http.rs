//! HTTP vocabulary shared by the resolver, assembler and transports.

use std::{fmt, str::FromStr};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Query parameters in declaration order.
pub type Params = IndexMap<String, Value>;

/// Request headers in declaration order.
pub type Headers = IndexMap<String, String>;

/// Methods that never carry a request body.
pub const NON_BODY_HTTP_METHODS: &[HttpMethod] = &[HttpMethod::Get, HttpMethod::Head];

/// Supported HTTP methods.
///
/// Parsing is case-insensitive, so `"post"`, `"Post"` and `"POST"` all map to
/// [`HttpMethod::Post`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Patch,
    Delete,
    Put,
    Head,
}

impl HttpMethod {
    /// Canonical upper-case method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Put => "PUT",
            HttpMethod::Head => "HEAD",
        }
    }

    /// Whether a request body may be attached for this method.
    pub fn allows_body(&self) -> bool {
        !NON_BODY_HTTP_METHODS.contains(self)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a method name is not one of [`HttpMethod`]'s variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMethodError(pub String);

impl fmt::Display for UnknownMethodError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported HTTP method: {}", self.0)
    }
}

impl std::error::Error for UnknownMethodError {}

impl FromStr for HttpMethod {
    type Err = UnknownMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            "PUT" => Ok(HttpMethod::Put),
            "HEAD" => Ok(HttpMethod::Head),
            _ => Err(UnknownMethodError(s.to_string())),
        }
    }
}

impl TryFrom<String> for HttpMethod {
    type Error = UnknownMethodError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HttpMethod> for String {
    fn from(method: HttpMethod) -> Self {
        method.as_str().to_string()
    }
}

/// Concrete decoding strategy for a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultType {
    Json,
    Text,
}

/// Caller preference for decoding, configured separately for success and error paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultTypeHint {
    Json,
    Text,
    /// Decide from the response `content-type`.
    #[default]
    Infer,
}

impl ResultTypeHint {
    /// The fixed strategy this hint names, or `None` for [`ResultTypeHint::Infer`].
    pub fn fixed(&self) -> Option<ResultType> {
        match self {
            ResultTypeHint::Json => Some(ResultType::Json),
            ResultTypeHint::Text => Some(ResultType::Text),
            ResultTypeHint::Infer => None,
        }
    }
}

impl FromStr for ResultTypeHint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ResultTypeHint::Json),
            "text" => Ok(ResultTypeHint::Text),
            "infer" => Ok(ResultTypeHint::Infer),
            other => Err(format!("unknown result type '{other}' (expected json, text or infer)")),
        }
    }
}

/// A transport-ready request produced by the request assembler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssembledRequest {
    pub method: HttpMethod,
    /// Full URL including the rendered query string.
    pub url: String,
    pub headers: Headers,
    /// Serialized body; always `None` for methods in [`NON_BODY_HTTP_METHODS`].
    pub body: Option<String>,
}

/// A fully received HTTP response.
///
/// Header names are stored lower-cased so lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Build a response, normalizing header names to lower case.
    pub fn new(status: u16, headers: impl IntoIterator<Item = (String, String)>, body: impl Into<Vec<u8>>) -> Self {
        let headers = headers
            .into_iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value))
            .collect();
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// `true` for 2xx statuses.
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}
