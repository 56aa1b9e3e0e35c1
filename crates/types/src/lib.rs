//! Shared type definitions for the refetch workspace.
//!
//! - [`field`]: literal-or-producer configuration fields
//! - [`http`]: methods, decoding hints, assembled requests and received responses
//! - [`session`]: request declarations, session snapshots and trigger outcomes

pub mod field;
pub mod http;
pub mod session;

pub use field::{FieldValue, resolve_field};
pub use http::{
    AssembledRequest, Headers, HttpMethod, HttpResponse, NON_BODY_HTTP_METHODS, Params, ResultType, ResultTypeHint, UnknownMethodError,
};
pub use session::{FetchOutcome, RequestConfig, SessionState, TriggerArgs};
