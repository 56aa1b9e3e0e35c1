//! Request assembly: resolved fields into a transport-ready request.

use refetch_types::AssembledRequest;
use refetch_util::http::build_request_url;

use crate::merge::ResolvedRequest;

const CONTENT_TYPE: &str = "content-type";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Build the transport-ready request from resolved fields.
///
/// The query string is appended to the URL. A body is serialized as JSON only
/// when one was resolved and the method accepts a body; in that case a JSON
/// `content-type` is added unless the headers already carry one.
pub fn assemble_request(resolved: &ResolvedRequest) -> AssembledRequest {
    let mut headers = resolved.headers.clone();
    let body = resolved
        .body
        .as_ref()
        .filter(|_| resolved.method.allows_body())
        .map(|body| body.to_string());

    if body.is_some() && !headers.keys().any(|name| name.eq_ignore_ascii_case(CONTENT_TYPE)) {
        headers.insert(CONTENT_TYPE.to_string(), JSON_CONTENT_TYPE.to_string());
    }

    AssembledRequest {
        method: resolved.method,
        url: build_request_url(&resolved.url, &resolved.params),
        headers,
        body,
    }
}
