//! Mock API subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID set / propagated)
//!     → middleware.rs (per-route request metrics)
//!     → handlers.rs (read-only lookups in the seed dataset)
//!     → response.rs (structured error bodies)
//!     → Send to client
//! ```

pub mod handlers;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use response::{ApiError, ErrorBody};
pub use server::{AppState, MockServer};
