//! # Refetch Engine
//!
//! The engine turns a declarative request description into a stateful fetch
//! session that can be triggered manually or automatically.
//!
//! ## Key Features
//!
//! - **Layered resolution**: base config and per-trigger overrides, each field a literal or a producer
//! - **Request assembly**: query strings, JSON bodies, body suppression for GET/HEAD
//! - **Response decoding**: `json`/`text`/`infer` hints for success and error paths
//! - **Lifecycle**: `trigger`, `reset` and `clear` over immutable [`SessionState`] snapshots
//! - **Reactivity**: trigger-on-load and trigger-on-change policy bound to a session
//!
//! ## Usage
//!
//! ```rust,no_run
//! use refetch_engine::{FetchSession, SessionConfig};
//! use refetch_types::{RequestConfig, ResultTypeHint, TriggerArgs};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let request = RequestConfig::new().url("https://api.example.com/items").param("page", 1);
//! let session = FetchSession::new(SessionConfig::new(request).result_type(ResultTypeHint::Json))?;
//!
//! let outcome = session.trigger(TriggerArgs::new().param("page", 2)).await?;
//! println!("success: {}", outcome.is_success());
//! println!("state: {:?}", session.state());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **`merge`**: merging base and override fields, with request-side transforms
//! - **`assemble`**: building the transport-ready request
//! - **`fetcher`**: the fetch step and its default transport-backed implementation
//! - **`session`**: the trigger lifecycle and state publication
//! - **`reactivity`**: automatic trigger policy and the session driver

pub mod assemble;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod hooks;
pub mod merge;
pub mod reactivity;
pub mod session;

pub use assemble::assemble_request;
pub use config::{ReactivityFlags, SessionConfig};
pub use error::{FetchError, HookStage};
pub use fetcher::{Fetcher, FetcherArgs, FnFetcher, TransportFetcher, fetcher_fn};
pub use hooks::{Hook, Transforms};
pub use merge::{ResolvedRequest, merge_body, merge_mapping, merge_url, resolve_request};
pub use reactivity::{ReactivityPolicy, Render, SessionDriver, TriggerCause, TriggerHandle, WatchedDimension, WatchedInputs};
pub use refetch_types::SessionState;
pub use session::FetchSession;
