//! Seed loading and load-time invariant checks.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::seed::timestamp::is_iso_utc;
use crate::seed::types::SeedDataset;

/// The dataset shipped with the crate.
const EMBEDDED_SEED: &str = include_str!("../../mock/seed.json");

/// Error type for seed loading.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("IO error reading seed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Seed is not valid JSON for the dataset schema: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Seed violates dataset invariants: {}", join_violations(.0))]
    Invalid(Vec<SeedViolation>),
}

/// A single broken dataset invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedViolation {
    SolvedExceedsTotal { num_solved: u64, num_total: u64 },
    DuplicateUserId(i64),
    BadTimestamp { index: usize, timestamp: String },
}

impl fmt::Display for SeedViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedViolation::SolvedExceedsTotal { num_solved, num_total } => {
                write!(f, "num_solved {} exceeds num_total {}", num_solved, num_total)
            }
            SeedViolation::DuplicateUserId(id) => write!(f, "duplicate user id {}", id),
            SeedViolation::BadTimestamp { index, timestamp } => {
                write!(
                    f,
                    "recently_solved[{}] timestamp '{}' is not YYYY-MM-DDTHH:MM:SSZ",
                    index, timestamp
                )
            }
        }
    }
}

fn join_violations(violations: &[SeedViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl SeedDataset {
    /// Parse and validate a dataset, ordering `recently_solved` newest first.
    pub fn from_json_str(raw: &str) -> Result<Self, SeedError> {
        let mut dataset: SeedDataset = serde_json::from_str(raw)?;
        dataset.validate().map_err(SeedError::Invalid)?;

        // Strict-format timestamps order lexicographically; the sort is
        // stable so equal timestamps keep their file order.
        dataset
            .problems
            .recently_solved
            .sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        Ok(dataset)
    }

    /// Read the dataset from `path`.
    pub fn load(path: &Path) -> Result<Self, SeedError> {
        let raw = fs::read_to_string(path)?;
        let dataset = Self::from_json_str(&raw)?;
        tracing::info!(
            path = %path.display(),
            users = dataset.users.len(),
            recently_solved = dataset.problems.recently_solved.len(),
            "Seed dataset loaded"
        );
        Ok(dataset)
    }

    /// The dataset compiled into the crate from `mock/seed.json`.
    pub fn embedded() -> Result<Self, SeedError> {
        Self::from_json_str(EMBEDDED_SEED)
    }

    fn validate(&self) -> Result<(), Vec<SeedViolation>> {
        let mut violations = Vec::new();

        let stats = &self.problems;
        if stats.num_solved > stats.num_total {
            violations.push(SeedViolation::SolvedExceedsTotal {
                num_solved: stats.num_solved,
                num_total: stats.num_total,
            });
        }

        for (index, entry) in stats.recently_solved.iter().enumerate() {
            if !is_iso_utc(&entry.timestamp) {
                violations.push(SeedViolation::BadTimestamp {
                    index,
                    timestamp: entry.timestamp.clone(),
                });
            }
        }

        let mut seen = HashSet::new();
        for user in &self.users {
            if !seen.insert(user.id) {
                violations.push(SeedViolation::DuplicateUserId(user.id));
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}
