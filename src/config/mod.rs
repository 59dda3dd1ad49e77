//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! .env file / config file (TOML)
//!     → loader.rs (parse & deserialize, apply env overrides)
//!     → validation.rs (semantic checks)
//!     → HarnessConfig (validated, immutable)
//!     → server and client constructed from it
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_from_env, ConfigError};
pub use schema::{ClientConfig, HarnessConfig, ObservabilityConfig, RetryConfig, ServerConfig};
pub use validation::ValidationError;
