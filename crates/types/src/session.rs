//! Session-facing types: request declarations, state snapshots and outcomes.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::{FieldValue, Headers, HttpMethod, Params};

/// Declarative description of a request.
///
/// One instance is supplied when a session is created (the base config) and
/// another may be supplied per trigger (see [`TriggerArgs`]). Every field is
/// optional; absent fields fall back to the other layer during merging.
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    pub url: Option<FieldValue<String>>,
    pub method: Option<HttpMethod>,
    pub params: Option<FieldValue<Params>>,
    /// `Value::Null` is an explicit null body, distinct from an absent field.
    pub body: Option<FieldValue<Value>>,
    pub headers: Option<FieldValue<Headers>>,
}

/// Per-trigger override configuration, merged on top of the base config.
pub type TriggerArgs = RequestConfig;

impl RequestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(FieldValue::literal(url.into()));
        self
    }

    pub fn url_with<F>(mut self, producer: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.url = Some(FieldValue::producer(producer));
        self
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn params(mut self, params: Params) -> Self {
        self.params = Some(FieldValue::literal(params));
        self
    }

    pub fn params_with<F>(mut self, producer: F) -> Self
    where
        F: Fn() -> Params + Send + Sync + 'static,
    {
        self.params = Some(FieldValue::producer(producer));
        self
    }

    /// Add a single query parameter. When params come from a producer, the
    /// entry is layered on top of each produced mapping.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params = Some(extend_mapping(self.params.take(), key.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<Value>) -> Self {
        self.body = Some(FieldValue::literal(body.into()));
        self
    }

    pub fn body_with<F>(mut self, producer: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.body = Some(FieldValue::producer(producer));
        self
    }

    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers = Some(FieldValue::literal(headers));
        self
    }

    pub fn headers_with<F>(mut self, producer: F) -> Self
    where
        F: Fn() -> Headers + Send + Sync + 'static,
    {
        self.headers = Some(FieldValue::producer(producer));
        self
    }

    /// Add a single header, layered the same way as [`RequestConfig::param`].
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers = Some(extend_mapping(self.headers.take(), name.into(), value.into()));
        self
    }
}

fn extend_mapping<V>(field: Option<FieldValue<IndexMap<String, V>>>, key: String, value: V) -> FieldValue<IndexMap<String, V>>
where
    V: Clone + Send + Sync + 'static,
{
    match field {
        None => FieldValue::Literal(IndexMap::from([(key, value)])),
        Some(FieldValue::Literal(mut mapping)) => {
            mapping.insert(key, value);
            FieldValue::Literal(mapping)
        }
        Some(FieldValue::Producer(producer)) => FieldValue::producer(move || {
            let mut mapping = producer();
            mapping.insert(key.clone(), value.clone());
            mapping
        }),
    }
}

/// Immutable snapshot of a fetch session.
///
/// Each lifecycle transition replaces the snapshot wholesale. After a settled
/// trigger at most one of `data` and `error` is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionState {
    pub data: Option<Value>,
    pub error: Option<Value>,
    /// `true` strictly between trigger start and completion.
    pub loading: bool,
    /// Set by the first completed trigger; cleared only by `reset`.
    pub fetched: bool,
}

impl SessionState {
    /// Initial state for a session seeded with `initial_data`.
    pub fn initial(initial_data: Option<Value>) -> Self {
        Self {
            data: initial_data,
            ..Self::default()
        }
    }
}

/// Result of one trigger: exactly one of result or error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FetchOutcome {
    /// Decoded (and transformed) success payload.
    #[serde(rename = "result")]
    Success(Value),
    /// Transport-classified error payload.
    #[serde(rename = "error")]
    Failure(Value),
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }

    pub fn result(&self) -> Option<&Value> {
        match self {
            FetchOutcome::Success(value) => Some(value),
            FetchOutcome::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&Value> {
        match self {
            FetchOutcome::Success(_) => None,
            FetchOutcome::Failure(value) => Some(value),
        }
    }

    /// Split into the `(result, error)` pair.
    pub fn into_parts(self) -> (Option<Value>, Option<Value>) {
        match self {
            FetchOutcome::Success(value) => (Some(value), None),
            FetchOutcome::Failure(value) => (None, Some(value)),
        }
    }
}
