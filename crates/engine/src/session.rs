//! Fetch session lifecycle.
//!
//! A [`FetchSession`] owns the session state and runs triggers:
//!
//! 1. Merge the base config with the trigger overrides and resolve producers
//! 2. Assemble the request and apply `transformRequest`
//! 3. Publish a loading snapshot
//! 4. Run the fetcher (default: send, `transformResponse`, decode)
//! 5. Apply `transformResult` or `transformError` and settle
//!
//! State is published as immutable [`SessionState`] snapshots through a
//! `tokio::sync::watch` channel. Triggers are not serialized: overlapping
//! triggers each settle independently and the last one to finish wins.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Instant,
};

use refetch_api::{ReqwestTransport, TransportError};
use refetch_types::{FetchOutcome, SessionState, TriggerArgs};
use refetch_util::{redact_headers, redact_sensitive};
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    assemble::assemble_request,
    config::SessionConfig,
    error::{FetchError, HookStage},
    fetcher::{Fetcher, FetcherArgs, TransportFetcher},
    hooks::apply_hook,
    merge::resolve_request,
};

pub struct FetchSession {
    config: SessionConfig,
    fetcher: Arc<dyn Fetcher>,
    state: watch::Sender<SessionState>,
    next_trigger_id: AtomicU64,
}

impl FetchSession {
    /// Create a session in the idle state, seeded with `initial_data`.
    ///
    /// # Errors
    /// Fails only when no fetcher or transport is configured and the default
    /// reqwest client cannot be built.
    pub fn new(config: SessionConfig) -> Result<Self, TransportError> {
        let fetcher: Arc<dyn Fetcher> = match (&config.fetcher, &config.transport) {
            (Some(fetcher), _) => Arc::clone(fetcher),
            (None, Some(transport)) => {
                Arc::new(TransportFetcher::new(Arc::clone(transport)).with_transform_response(config.transforms.response.clone()))
            }
            (None, None) => Arc::new(
                TransportFetcher::new(Arc::new(ReqwestTransport::from_env()?)).with_transform_response(config.transforms.response.clone()),
            ),
        };
        let (state, _) = watch::channel(SessionState::initial(config.initial_data.clone()));

        Ok(Self {
            config,
            fetcher,
            state,
            next_trigger_id: AtomicU64::new(0),
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current snapshot.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state transition.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Deserialize the current data into `T`. Returns `Ok(None)` when no data is set.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<Option<T>, serde_json::Error> {
        self.state.borrow().data.clone().map(serde_json::from_value::<T>).transpose()
    }

    /// Resolve, merge and assemble the request a trigger with `args` would send.
    ///
    /// Runs every request-side transform but does not touch session state.
    pub fn prepare(&self, args: &TriggerArgs) -> Result<FetcherArgs, FetchError> {
        let transforms = &self.config.transforms;
        let resolved = resolve_request(&self.config.request, args, transforms)?;
        let request = apply_hook(transforms.request.as_ref(), HookStage::Request, assemble_request(&resolved))?;

        Ok(FetcherArgs {
            request,
            url: resolved.url,
            method: resolved.method,
            headers: resolved.headers,
            params: resolved.params,
            body: resolved.body,
            result_type: self.config.result_type,
            error_result_type: self.config.error_result_type,
        })
    }

    /// Run one request/response cycle.
    ///
    /// Responses classified as errors settle the session with `error` set and
    /// are returned as [`FetchOutcome::Failure`]. Every other failure returns
    /// `Err`; if the session had entered loading it leaves loading with its
    /// previous `data`, `error` and `fetched` intact.
    pub async fn trigger(&self, args: TriggerArgs) -> Result<FetchOutcome, FetchError> {
        let trigger_id = self.next_trigger_id.fetch_add(1, Ordering::Relaxed) + 1;
        let started = Instant::now();

        let fetcher_args = self.prepare(&args).inspect_err(|error| {
            warn!(trigger_id, %error, "failed to prepare request");
        })?;
        debug!(
            trigger_id,
            method = %fetcher_args.request.method,
            url = %redact_sensitive(&fetcher_args.request.url),
            headers = ?redact_headers(&fetcher_args.request.headers),
            has_body = fetcher_args.request.body.is_some(),
            "request assembled"
        );

        self.transition(|current| SessionState {
            loading: true,
            ..current.clone()
        });

        let outcome = match self.fetcher.fetch(fetcher_args).await.and_then(|outcome| self.transform_outcome(outcome)) {
            Ok(outcome) => outcome,
            Err(error) => {
                self.transition(|current| SessionState {
                    loading: false,
                    ..current.clone()
                });
                warn!(trigger_id, %error, elapsed_ms = started.elapsed().as_millis() as u64, "trigger failed");
                return Err(error);
            }
        };

        let (data, error) = outcome.clone().into_parts();
        self.transition(|_| SessionState {
            data,
            error,
            loading: false,
            fetched: true,
        });
        info!(
            trigger_id,
            success = outcome.is_success(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "trigger settled"
        );

        Ok(outcome)
    }

    /// Restore the initial data, clear the error and mark the session unfetched.
    ///
    /// Does not cancel an in-flight trigger, which may still overwrite the state.
    pub fn reset(&self) {
        let initial_data = self.config.initial_data.clone();
        self.transition(|current| SessionState {
            data: initial_data,
            error: None,
            loading: current.loading,
            fetched: false,
        });
    }

    /// Drop data and error without restoring the initial data or touching `fetched`.
    pub fn clear(&self) {
        self.transition(|current| SessionState {
            data: None,
            error: None,
            ..current.clone()
        });
    }

    fn transform_outcome(&self, outcome: FetchOutcome) -> Result<FetchOutcome, FetchError> {
        let transforms = &self.config.transforms;
        Ok(match outcome {
            FetchOutcome::Success(result) => FetchOutcome::Success(apply_hook(transforms.result.as_ref(), HookStage::Result, result)?),
            FetchOutcome::Failure(error) => FetchOutcome::Failure(apply_hook(transforms.error.as_ref(), HookStage::Error, error)?),
        })
    }

    /// Replace the snapshot with one computed from the current value, under the channel lock.
    fn transition(&self, next: impl FnOnce(&SessionState) -> SessionState) {
        self.state.send_modify(|state| *state = next(state));
    }
}
