//! The fetch step of a trigger: send the assembled request and classify the
//! decoded payload as a result or an error.
//!
//! [`TransportFetcher`] is the default. Sessions may be configured with any
//! other [`Fetcher`]; a replacement owns sending and decoding entirely and
//! receives the same resolved fields.

use std::sync::Arc;

use async_trait::async_trait;
use refetch_api::HttpTransport;
use refetch_types::{AssembledRequest, FetchOutcome, Headers, HttpMethod, HttpResponse, Params, ResultTypeHint};
use refetch_util::http::{decode_response_body, select_result_type};
use serde_json::Value;
use tracing::debug;

use crate::{
    error::{FetchError, HookStage},
    hooks::{Hook, apply_hook},
};

/// Everything a fetcher needs for one trigger.
#[derive(Debug, Clone)]
pub struct FetcherArgs {
    /// The assembled request after `transformRequest`.
    pub request: AssembledRequest,
    /// Resolved URL without the query string.
    pub url: String,
    pub method: HttpMethod,
    pub headers: Headers,
    pub params: Params,
    pub body: Option<Value>,
    pub result_type: ResultTypeHint,
    pub error_result_type: ResultTypeHint,
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, args: FetcherArgs) -> Result<FetchOutcome, FetchError>;
}

/// Adapter turning an async closure into a [`Fetcher`].
pub struct FnFetcher<F>(F);

/// Wrap `fetch` as a [`Fetcher`].
///
/// ```ignore
/// let fetcher = fetcher_fn(|args: FetcherArgs| async move {
///     Ok(FetchOutcome::Success(serde_json::json!({ "url": args.url })))
/// });
/// ```
pub fn fetcher_fn<F, Fut>(fetch: F) -> FnFetcher<F>
where
    F: Fn(FetcherArgs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<FetchOutcome>> + Send + 'static,
{
    FnFetcher(fetch)
}

#[async_trait]
impl<F, Fut> Fetcher for FnFetcher<F>
where
    F: Fn(FetcherArgs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<FetchOutcome>> + Send + 'static,
{
    async fn fetch(&self, args: FetcherArgs) -> Result<FetchOutcome, FetchError> {
        (self.0)(args).await.map_err(FetchError::Fetcher)
    }
}

/// Sends through an [`HttpTransport`] and decodes by content type.
pub struct TransportFetcher {
    transport: Arc<dyn HttpTransport>,
    transform_response: Option<Hook<HttpResponse>>,
}

impl TransportFetcher {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            transform_response: None,
        }
    }

    pub fn with_transform_response(mut self, hook: Option<Hook<HttpResponse>>) -> Self {
        self.transform_response = hook;
        self
    }
}

#[async_trait]
impl Fetcher for TransportFetcher {
    async fn fetch(&self, args: FetcherArgs) -> Result<FetchOutcome, FetchError> {
        let response = self.transport.send(&args.request).await?;
        let response = apply_hook(self.transform_response.as_ref(), HookStage::Response, response)?;

        let result_type = select_result_type(&response, args.result_type, args.error_result_type);
        debug!(status = response.status, ?result_type, content_type = ?response.content_type(), "decoding response");
        let payload = decode_response_body(&response, result_type)?;

        Ok(if response.ok() {
            FetchOutcome::Success(payload)
        } else {
            FetchOutcome::Failure(payload)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use refetch_api::TransportError;
    use serde_json::json;

    struct Canned(HttpResponse);

    #[async_trait]
    impl HttpTransport for Canned {
        async fn send(&self, _request: &AssembledRequest) -> Result<HttpResponse, TransportError> {
            Ok(self.0.clone())
        }
    }

    fn args(result_type: ResultTypeHint) -> FetcherArgs {
        FetcherArgs {
            request: AssembledRequest {
                method: HttpMethod::Get,
                url: "http://api.test/x".into(),
                headers: Headers::new(),
                body: None,
            },
            url: "http://api.test/x".into(),
            method: HttpMethod::Get,
            headers: Headers::new(),
            params: Params::new(),
            body: None,
            result_type,
            error_result_type: ResultTypeHint::Infer,
        }
    }

    fn response(status: u16, content_type: &str, body: &str) -> HttpResponse {
        HttpResponse::new(status, [("Content-Type".to_string(), content_type.to_string())], body.as_bytes())
    }

    #[tokio::test]
    async fn ok_response_is_a_success() {
        let fetcher = TransportFetcher::new(Arc::new(Canned(response(200, "application/json", r#"{"x":1}"#))));
        let outcome = fetcher.fetch(args(ResultTypeHint::Json)).await.expect("fetches");
        assert_eq!(outcome, FetchOutcome::Success(json!({"x": 1})));
    }

    #[tokio::test]
    async fn error_status_is_a_failure_not_an_err() {
        let fetcher = TransportFetcher::new(Arc::new(Canned(response(404, "application/json", r#"{"message":"missing"}"#))));
        let outcome = fetcher.fetch(args(ResultTypeHint::Infer)).await.expect("fetches");
        assert_eq!(outcome, FetchOutcome::Failure(json!({"message": "missing"})));
    }

    #[tokio::test]
    async fn unknown_content_type_decodes_as_text() {
        let fetcher = TransportFetcher::new(Arc::new(Canned(response(200, "application/octet-stream", "raw"))));
        let outcome = fetcher.fetch(args(ResultTypeHint::Infer)).await.expect("fetches");
        assert_eq!(outcome, FetchOutcome::Success(json!("raw")));
    }

    #[tokio::test]
    async fn malformed_json_is_a_decode_error() {
        let fetcher = TransportFetcher::new(Arc::new(Canned(response(200, "application/json", "{oops"))));
        let error = fetcher.fetch(args(ResultTypeHint::Infer)).await.expect_err("body is not json");
        assert!(matches!(error, FetchError::Decode(_)));
    }

    #[tokio::test]
    async fn response_transform_runs_before_decoding() {
        let hook: Hook<HttpResponse> = Arc::new(|mut response: HttpResponse| {
            response.body = br#"{"rewritten":true}"#.to_vec();
            Ok(response)
        });
        let fetcher = TransportFetcher::new(Arc::new(Canned(response(200, "application/json", "{}")))).with_transform_response(Some(hook));
        let outcome = fetcher.fetch(args(ResultTypeHint::Json)).await.expect("fetches");
        assert_eq!(outcome.result(), Some(&json!({"rewritten": true})));
    }

    #[tokio::test]
    async fn closure_fetchers_see_resolved_fields() {
        let fetcher = fetcher_fn(|args: FetcherArgs| async move { anyhow::Ok(FetchOutcome::Success(json!({"url": args.url}))) });
        let outcome = fetcher.fetch(args(ResultTypeHint::Infer)).await.expect("fetches");
        assert_eq!(outcome.result(), Some(&json!({"url": "http://api.test/x"})));
    }
}
