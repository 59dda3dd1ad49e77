//! Seed data subsystem.
//!
//! # Data Flow
//! ```text
//! mock/seed.json (or configured seed_path)
//!     → loader.rs (parse, check invariants, order newest first)
//!     → SeedDataset (immutable)
//!     → shared via Arc to every request handler
//! ```
//!
//! # Design Decisions
//! - Loaded exactly once at startup; never mutated afterwards
//! - No locking: there is no writer after load
//! - Invariant violations fail startup instead of being served

pub mod loader;
pub mod timestamp;
pub mod types;

pub use loader::{SeedError, SeedViolation};
pub use timestamp::{is_iso_utc, not_future, parse_iso_utc};
pub use types::{Difficulty, ProblemEntry, ProblemStats, SeedDataset, UserRecord};
