//! HTTP transport for refetch sessions.
//!
//! The engine never talks to the network directly. It hands an
//! [`AssembledRequest`] to an [`HttpTransport`] and receives a fully buffered
//! [`HttpResponse`]. The default implementation, [`ReqwestTransport`], wraps a
//! configured `reqwest::Client`:
//!
//! - Timeouts and User-Agent come from [`ClientConfig`] (optionally read from the environment)
//! - Default headers are applied unless the request sets the same header
//! - Response header names are normalized to lower case
//!
//! Retries, caching and streaming are deliberately absent; callers that need
//! them supply their own transport.
//!
//! # Example
//!
//! ```ignore
//! use refetch_api::{ClientConfig, HttpTransport, ReqwestTransport};
//! use refetch_types::{AssembledRequest, Headers, HttpMethod};
//!
//! async fn fetch_status() -> anyhow::Result<()> {
//!     let transport = ReqwestTransport::new(ClientConfig::from_env())?;
//!     let request = AssembledRequest {
//!         method: HttpMethod::Get,
//!         url: "http://localhost:8080/health".into(),
//!         headers: Headers::new(),
//!         body: None,
//!     };
//!     let response = transport.send(&request).await?;
//!     println!("status: {}", response.status);
//!     Ok(())
//! }
//! ```

mod config;

pub use config::{ClientConfig, TIMEOUT_ENV_VAR, USER_AGENT_ENV_VAR};

use async_trait::async_trait;
use refetch_types::{AssembledRequest, Headers, HttpMethod, HttpResponse};
use reqwest::{
    Client, Method, Url,
    header::{HeaderMap, HeaderName, HeaderValue},
};
use thiserror::Error;
use tracing::debug;

/// Errors raised while sending a request or receiving its response.
///
/// A non-2xx status is not an error at this layer; it arrives as a normal
/// [`HttpResponse`].
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("invalid request URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid header '{name}'")]
    InvalidHeader { name: String },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// The transport primitive: send one request, return the buffered response.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: &AssembledRequest) -> Result<HttpResponse, TransportError>;
}

/// Default transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    /// Build a transport from a [`ClientConfig`].
    pub fn new(config: ClientConfig) -> Result<Self, TransportError> {
        let default_headers = header_map(&config.default_headers)?;
        let http = Client::builder()
            .default_headers(default_headers)
            .user_agent(config.user_agent)
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(TransportError::ClientBuild)?;
        Ok(Self { http })
    }

    /// Build a transport from [`ClientConfig::from_env`].
    pub fn from_env() -> Result<Self, TransportError> {
        Self::new(ClientConfig::from_env())
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &AssembledRequest) -> Result<HttpResponse, TransportError> {
        let url = Url::parse(&request.url).map_err(|source| TransportError::InvalidUrl {
            url: request.url.clone(),
            source,
        })?;
        debug!(method = %request.method, %url, has_body = request.body.is_some(), "sending request");

        let mut builder = self
            .http
            .request(to_reqwest_method(request.method), url)
            .headers(header_map(&request.headers)?);
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(|source| TransportError::Request {
            url: request.url.clone(),
            source,
        })?;

        let status = response.status().as_u16();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|value| (name.as_str().to_string(), value.to_string())))
            .collect();
        let body = response.bytes().await.map_err(|source| TransportError::Body {
            url: request.url.clone(),
            source,
        })?;

        debug!(status, bytes = body.len(), "response received");
        Ok(HttpResponse::new(status, headers, body.to_vec()))
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Head => Method::HEAD,
    }
}

/// Convert resolved headers into a `HeaderMap`, rejecting names or values
/// that are not valid on the wire.
fn header_map(headers: &Headers) -> Result<HeaderMap, TransportError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|_| TransportError::InvalidHeader { name: name.clone() })?;
        let header_value = HeaderValue::from_str(value).map_err(|_| TransportError::InvalidHeader { name: name.clone() })?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}
