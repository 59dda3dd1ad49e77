//! Request metrics middleware.
//!
//! Times each routed request from entry into the router until the handler's
//! response (success or rejection) is ready.

use std::time::Instant;

use axum::body::Body;
use axum::extract::MatchedPath;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::observability::metrics;

/// Record `mock_requests_total` and `mock_request_duration_seconds` for a request.
///
/// The endpoint label is the route template (`/users/{id}`), not the raw path.
pub async fn track_requests(request: Request<Body>, next: Next) -> Response {
    let endpoint = match request.extensions().get::<MatchedPath>() {
        Some(path) => path.as_str().to_string(),
        None => request.uri().path().to_string(),
    };

    let start = Instant::now();
    let response = next.run(request).await;
    metrics::record_request(&endpoint, response.status().as_u16(), start.elapsed());

    response
}
