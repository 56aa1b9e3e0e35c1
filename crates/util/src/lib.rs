//! Helpers shared by the refetch engine, transport and CLI.
//!
//! - [`http`]: query-string rendering plus response-type inference and decoding
//! - [`text_processing`]: secret redaction for logs and terminal output

pub mod http;
pub mod text_processing;

pub use text_processing::{is_sensitive_header, redact_headers, redact_sensitive, redact_sensitive_with};
