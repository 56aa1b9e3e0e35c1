//! Request files: a YAML or JSON document describing the base request.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use refetch_engine::SessionConfig;
use refetch_types::{Headers, HttpMethod, Params, RequestConfig, ResultTypeHint};
use serde::Deserialize;
use serde_json::Value;

/// Base request loaded from `--file`.
///
/// ```yaml
/// url: https://api.example.com/items
/// method: post
/// params:
///   page: 2
/// headers:
///   accept: application/json
/// body:
///   name: apple
/// result_type: json
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestFile {
    pub url: Option<String>,
    pub method: Option<HttpMethod>,
    #[serde(default)]
    pub params: Params,
    #[serde(default)]
    pub headers: Headers,
    pub body: Option<Value>,
    #[serde(default)]
    pub result_type: ResultTypeHint,
    #[serde(default)]
    pub error_result_type: ResultTypeHint,
    pub initial_data: Option<Value>,
}

impl RequestFile {
    /// Load a request file, choosing the format from the extension.
    ///
    /// `.json` files are parsed as JSON; anything else as YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).with_context(|| format!("failed to read request file {}", path.display()))?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            serde_json::from_str(&content).with_context(|| format!("failed to parse JSON request file {}", path.display()))
        } else {
            serde_yaml::from_str(&content).with_context(|| format!("failed to parse YAML request file {}", path.display()))
        }
    }

    /// Convert into the base session configuration.
    pub fn into_session_config(self) -> SessionConfig {
        let mut request = RequestConfig::new();
        if let Some(url) = self.url {
            request = request.url(url);
        }
        if let Some(method) = self.method {
            request = request.method(method);
        }
        if !self.params.is_empty() {
            request = request.params(self.params);
        }
        if !self.headers.is_empty() {
            request = request.headers(self.headers);
        }
        if let Some(body) = self.body {
            request = request.body(body);
        }

        let mut config = SessionConfig::new(request)
            .result_type(self.result_type)
            .error_result_type(self.error_result_type);
        config.initial_data = self.initial_data;
        config
    }
}
