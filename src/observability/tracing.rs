//! Request spans.
//!
//! Every served request gets one span carrying its method, path and
//! `x-request-id`, so log lines from handlers correlate with the caller.

use axum::body::Body;
use axum::http::Request;
use tracing::Span;

use crate::http::request::request_id;

/// `TraceLayer` span factory.
pub fn make_request_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id(request.headers()),
    )
}
