use std::fmt;

use refetch_api::TransportError;
use refetch_util::http::JsonParseError;
use thiserror::Error;

/// Pipeline stage a caller-supplied transform belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookStage {
    RequestUrl,
    RequestParams,
    RequestBody,
    RequestHeaders,
    Request,
    Response,
    Result,
    Error,
}

impl fmt::Display for HookStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HookStage::RequestUrl => "transformRequestUrl",
            HookStage::RequestParams => "transformRequestParams",
            HookStage::RequestBody => "transformRequestBody",
            HookStage::RequestHeaders => "transformRequestHeaders",
            HookStage::Request => "transformRequest",
            HookStage::Response => "transformResponse",
            HookStage::Result => "transformResult",
            HookStage::Error => "transformError",
        };
        f.write_str(name)
    }
}

/// Failures that reject a trigger.
///
/// Responses with a non-2xx status are not represented here: they settle the
/// session with an `error` value instead.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("failed to decode response body: {0}")]
    Decode(#[from] JsonParseError),

    #[error("{stage} failed: {source}")]
    Hook {
        stage: HookStage,
        #[source]
        source: anyhow::Error,
    },

    #[error("fetcher failed: {0}")]
    Fetcher(#[from] anyhow::Error),
}

impl FetchError {
    /// Stage of the failing transform, when a transform caused the error.
    pub fn hook_stage(&self) -> Option<HookStage> {
        match self {
            FetchError::Hook { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}
