//! Resilient HTTP client subsystem.
//!
//! # Data Flow
//! ```text
//! test / CLI call (relative path)
//!     → url.rs (join normalized base URL + path)
//!     → session.rs (default headers, timeout, pooled reqwest client)
//!     → resilience (retry decision, backoff / Retry-After wait)
//!     → response.rs (status, headers, body, elapsed) back to the caller
//! ```

pub mod response;
pub mod session;
pub mod url;

pub use response::ApiResponse;
pub use session::{session_headers, ClientError, RequestOptions, ResilientClient, X_REQUEST_ID};
pub use url::join_url;
