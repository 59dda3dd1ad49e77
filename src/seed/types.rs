//! Seed dataset types.
//!
//! Descriptive fields the service does not interpret (titles, usernames, ...)
//! are kept in `extra` and serialized back verbatim.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The complete, immutable dataset served by the mock service.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SeedDataset {
    pub problems: ProblemStats,
    pub users: Vec<UserRecord>,
}

impl SeedDataset {
    /// Find a user by id (linear scan).
    pub fn find_user(&self, id: i64) -> Option<&UserRecord> {
        self.users.iter().find(|u| u.id == id)
    }
}

/// Problem statistics plus the recently solved list, newest first.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProblemStats {
    pub num_total: u64,
    pub num_solved: u64,
    pub recently_solved: Vec<ProblemEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// A solved problem. `timestamp` is `YYYY-MM-DDTHH:MM:SSZ`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProblemEntry {
    pub difficulty: Difficulty,
    pub timestamp: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UserRecord {
    pub id: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_opaque_fields_round_trip() {
        let raw = json!({"id": 7, "username": "x", "ranking": 3});
        let user: UserRecord = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(user.id, 7);
        assert_eq!(user.extra["username"], "x");
        assert_eq!(serde_json::to_value(&user).unwrap(), raw);
    }

    #[test]
    fn test_unknown_difficulty_rejected() {
        let raw = json!({"difficulty": "Insane", "timestamp": "2024-01-01T00:00:00Z"});
        assert!(serde_json::from_value::<ProblemEntry>(raw).is_err());
    }
}
