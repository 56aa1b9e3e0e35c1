//! Caller-supplied transforms applied at each pipeline stage.
//!
//! Every hook receives the value produced by the previous stage and returns
//! its replacement. Hooks are fallible; an error rejects the trigger with
//! [`FetchError::Hook`] naming the stage.

use std::{fmt, sync::Arc};

use refetch_types::{AssembledRequest, Headers, HttpResponse, Params};
use serde_json::Value;

use crate::error::{FetchError, HookStage};

/// A single transform.
pub type Hook<T> = Arc<dyn Fn(T) -> anyhow::Result<T> + Send + Sync>;

/// The full set of optional transforms for a session.
#[derive(Clone, Default)]
pub struct Transforms {
    pub request_url: Option<Hook<String>>,
    pub request_params: Option<Hook<Params>>,
    pub request_body: Option<Hook<Option<Value>>>,
    pub request_headers: Option<Hook<Headers>>,
    pub request: Option<Hook<AssembledRequest>>,
    pub response: Option<Hook<HttpResponse>>,
    pub result: Option<Hook<Value>>,
    pub error: Option<Hook<Value>>,
}

impl Transforms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_url<F>(mut self, hook: F) -> Self
    where
        F: Fn(String) -> anyhow::Result<String> + Send + Sync + 'static,
    {
        self.request_url = Some(Arc::new(hook));
        self
    }

    pub fn request_params<F>(mut self, hook: F) -> Self
    where
        F: Fn(Params) -> anyhow::Result<Params> + Send + Sync + 'static,
    {
        self.request_params = Some(Arc::new(hook));
        self
    }

    pub fn request_body<F>(mut self, hook: F) -> Self
    where
        F: Fn(Option<Value>) -> anyhow::Result<Option<Value>> + Send + Sync + 'static,
    {
        self.request_body = Some(Arc::new(hook));
        self
    }

    pub fn request_headers<F>(mut self, hook: F) -> Self
    where
        F: Fn(Headers) -> anyhow::Result<Headers> + Send + Sync + 'static,
    {
        self.request_headers = Some(Arc::new(hook));
        self
    }

    pub fn request<F>(mut self, hook: F) -> Self
    where
        F: Fn(AssembledRequest) -> anyhow::Result<AssembledRequest> + Send + Sync + 'static,
    {
        self.request = Some(Arc::new(hook));
        self
    }

    pub fn response<F>(mut self, hook: F) -> Self
    where
        F: Fn(HttpResponse) -> anyhow::Result<HttpResponse> + Send + Sync + 'static,
    {
        self.response = Some(Arc::new(hook));
        self
    }

    pub fn result<F>(mut self, hook: F) -> Self
    where
        F: Fn(Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.result = Some(Arc::new(hook));
        self
    }

    pub fn error<F>(mut self, hook: F) -> Self
    where
        F: Fn(Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.error = Some(Arc::new(hook));
        self
    }
}

impl fmt::Debug for Transforms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transforms")
            .field("request_url", &self.request_url.is_some())
            .field("request_params", &self.request_params.is_some())
            .field("request_body", &self.request_body.is_some())
            .field("request_headers", &self.request_headers.is_some())
            .field("request", &self.request.is_some())
            .field("response", &self.response.is_some())
            .field("result", &self.result.is_some())
            .field("error", &self.error.is_some())
            .finish()
    }
}

/// Run `hook` on `value` when present, tagging failures with `stage`.
pub(crate) fn apply_hook<T>(hook: Option<&Hook<T>>, stage: HookStage, value: T) -> Result<T, FetchError> {
    match hook {
        Some(hook) => hook(value).map_err(|source| FetchError::Hook { stage, source }),
        None => Ok(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn missing_hook_passes_value_through() {
        let value = apply_hook::<String>(None, HookStage::RequestUrl, "http://a".into()).expect("identity");
        assert_eq!(value, "http://a");
    }

    #[test]
    fn failing_hook_reports_its_stage() {
        let transforms = Transforms::new().result(|_| Err(anyhow!("boom")));
        let error = apply_hook(transforms.result.as_ref(), HookStage::Result, Value::Null).expect_err("hook fails");
        assert_eq!(error.hook_stage(), Some(HookStage::Result));
        assert_eq!(error.to_string(), "transformResult failed: boom");
    }

    #[test]
    fn debug_lists_configured_hooks() {
        let transforms = Transforms::new().request_headers(Ok);
        let rendered = format!("{transforms:?}");
        assert!(rendered.contains("request_headers: true"));
        assert!(rendered.contains("error: false"));
    }
}
