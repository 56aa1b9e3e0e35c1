//! Automatic triggering.
//!
//! [`ReactivityPolicy`] is plain decision logic: fed the watched inputs on
//! every evaluation, it answers whether a trigger should fire. The first
//! evaluation is the activation and fires only when `trigger_on_load` is set.
//! Later evaluations fire when a watched dimension changed by value and its
//! flag is enabled. Several changed dimensions in one evaluation yield one
//! trigger.
//!
//! [`SessionDriver`] binds a policy to a [`FetchSession`]. A host reactive
//! layer calls [`SessionDriver::render`] after each of its updates, or
//! publishes [`Render`] values on a `watch` channel consumed by
//! [`SessionDriver::spawn_watch`].

use std::sync::{Arc, Mutex, PoisonError};

use refetch_types::{FetchOutcome, Params, RequestConfig, TriggerArgs};
use serde_json::Value;
use tokio::{sync::watch, task::JoinHandle};
use tracing::debug;

use crate::{
    config::ReactivityFlags,
    error::FetchError,
    merge::{merge_body, merge_mapping, merge_url},
    session::FetchSession,
};

/// Values whose changes may cause an automatic trigger.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WatchedInputs {
    pub url: String,
    pub params: Params,
    pub body: Option<Value>,
    /// Caller-declared identity of the query arguments.
    pub query_key: Option<Value>,
}

impl WatchedInputs {
    /// Resolve the watched fields of `base` layered with `args`.
    ///
    /// Transforms are not applied; they belong to the trigger itself.
    pub fn resolve(base: &RequestConfig, args: &TriggerArgs, query_key: Option<Value>) -> Self {
        Self {
            url: merge_url(base.url.as_ref(), args.url.as_ref()),
            params: merge_mapping(base.params.as_ref(), args.params.as_ref()),
            body: merge_body(base.body.as_ref(), args.body.as_ref()),
            query_key,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchedDimension {
    Url,
    Params,
    Body,
    QueryArgs,
}

/// Why the policy asked for a trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerCause {
    Load,
    Changed(Vec<WatchedDimension>),
}

#[derive(Debug, Default)]
pub struct ReactivityPolicy {
    activated: bool,
    last: WatchedInputs,
}

impl ReactivityPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_activated(&self) -> bool {
        self.activated
    }

    /// Record `inputs` and decide whether to trigger.
    ///
    /// Inputs are recorded even when the matching flag is disabled, so enabling
    /// a flag later does not fire for a change that already happened.
    pub fn evaluate(&mut self, flags: &ReactivityFlags, inputs: &WatchedInputs) -> Option<TriggerCause> {
        if !self.activated {
            self.activated = true;
            self.last = inputs.clone();
            return flags.trigger_on_load.then_some(TriggerCause::Load);
        }

        let previous = std::mem::replace(&mut self.last, inputs.clone());
        let changed: Vec<WatchedDimension> = [
            (WatchedDimension::Url, flags.trigger_on_url_change, previous.url != inputs.url),
            (WatchedDimension::Params, flags.trigger_on_param_change, previous.params != inputs.params),
            (WatchedDimension::Body, flags.trigger_on_body_change, previous.body != inputs.body),
            (
                WatchedDimension::QueryArgs,
                flags.trigger_on_query_args_change,
                previous.query_key != inputs.query_key,
            ),
        ]
        .into_iter()
        .filter(|(_, enabled, changed)| *enabled && *changed)
        .map(|(dimension, _, _)| dimension)
        .collect();

        (!changed.is_empty()).then_some(TriggerCause::Changed(changed))
    }
}

/// One update from the host reactive layer.
#[derive(Debug, Clone, Default)]
pub struct Render {
    pub flags: ReactivityFlags,
    /// Arguments an automatic trigger is fired with.
    pub args: TriggerArgs,
    pub query_key: Option<Value>,
}

impl Render {
    pub fn new(flags: ReactivityFlags) -> Self {
        Self {
            flags,
            ..Self::default()
        }
    }

    pub fn args(mut self, args: TriggerArgs) -> Self {
        self.args = args;
        self
    }

    pub fn query_key(mut self, key: impl Into<Value>) -> Self {
        self.query_key = Some(key.into());
        self
    }
}

pub type TriggerHandle = JoinHandle<Result<FetchOutcome, FetchError>>;

pub struct SessionDriver {
    session: Arc<FetchSession>,
    policy: Mutex<ReactivityPolicy>,
}

impl SessionDriver {
    pub fn new(session: Arc<FetchSession>) -> Self {
        Self {
            session,
            policy: Mutex::new(ReactivityPolicy::new()),
        }
    }

    pub fn session(&self) -> &Arc<FetchSession> {
        &self.session
    }

    /// Evaluate the policy for `render`, spawning a trigger when it fires.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn render(&self, render: &Render) -> Option<TriggerHandle> {
        let inputs = WatchedInputs::resolve(&self.session.config().request, &render.args, render.query_key.clone());
        let cause = self
            .policy
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .evaluate(&render.flags, &inputs)?;
        debug!(?cause, url = %inputs.url, "automatic trigger");

        let session = Arc::clone(&self.session);
        let args = render.args.clone();
        Some(tokio::spawn(async move { session.trigger(args).await }))
    }

    /// Evaluate every render published on `renders` until the sender is dropped.
    ///
    /// The value present when the watch starts counts as the first render.
    pub fn spawn_watch(self: Arc<Self>, mut renders: watch::Receiver<Render>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                let render = renders.borrow_and_update().clone();
                self.render(&render);
                if renders.changed().await.is_err() {
                    break;
                }
            }
        })
    }
}
