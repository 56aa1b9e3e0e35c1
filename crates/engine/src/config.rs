//! Session configuration and reactivity switches.

use std::{fmt, sync::Arc};

use refetch_api::HttpTransport;
use refetch_types::{RequestConfig, ResultTypeHint};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{fetcher::Fetcher, hooks::Transforms};

/// Independent switches for automatic triggering. All default to `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactivityFlags {
    pub trigger_on_load: bool,
    pub trigger_on_url_change: bool,
    pub trigger_on_param_change: bool,
    pub trigger_on_body_change: bool,
    pub trigger_on_query_args_change: bool,
}

impl Default for ReactivityFlags {
    fn default() -> Self {
        Self {
            trigger_on_load: true,
            trigger_on_url_change: true,
            trigger_on_param_change: true,
            trigger_on_body_change: true,
            trigger_on_query_args_change: true,
        }
    }
}

impl ReactivityFlags {
    /// Flags with every automatic trigger switched off.
    pub fn manual() -> Self {
        Self {
            trigger_on_load: false,
            trigger_on_url_change: false,
            trigger_on_param_change: false,
            trigger_on_body_change: false,
            trigger_on_query_args_change: false,
        }
    }
}

/// Everything a [`FetchSession`](crate::FetchSession) is created from.
#[derive(Clone, Default)]
pub struct SessionConfig {
    pub request: RequestConfig,
    pub result_type: ResultTypeHint,
    pub error_result_type: ResultTypeHint,
    pub initial_data: Option<Value>,
    pub reactivity: ReactivityFlags,
    pub transforms: Transforms,
    /// Replaces the default transport-and-decode step entirely.
    pub fetcher: Option<Arc<dyn Fetcher>>,
    /// Transport used by the default fetcher. A reqwest client configured
    /// from the environment is used when absent.
    pub transport: Option<Arc<dyn HttpTransport>>,
}

impl SessionConfig {
    pub fn new(request: RequestConfig) -> Self {
        Self {
            request,
            ..Self::default()
        }
    }

    pub fn result_type(mut self, hint: ResultTypeHint) -> Self {
        self.result_type = hint;
        self
    }

    pub fn error_result_type(mut self, hint: ResultTypeHint) -> Self {
        self.error_result_type = hint;
        self
    }

    pub fn initial_data(mut self, data: impl Into<Value>) -> Self {
        self.initial_data = Some(data.into());
        self
    }

    pub fn reactivity(mut self, flags: ReactivityFlags) -> Self {
        self.reactivity = flags;
        self
    }

    pub fn transforms(mut self, transforms: Transforms) -> Self {
        self.transforms = transforms;
        self
    }

    pub fn fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("request", &self.request)
            .field("result_type", &self.result_type)
            .field("error_result_type", &self.error_result_type)
            .field("initial_data", &self.initial_data)
            .field("reactivity", &self.reactivity)
            .field("transforms", &self.transforms)
            .field("fetcher", &self.fetcher.is_some())
            .field("transport", &self.transport.is_some())
            .finish()
    }
}
