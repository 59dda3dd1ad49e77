//! Endpoint handlers.
//!
//! Handlers only read the shared dataset; each request is independent.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::seed::{ProblemStats, UserRecord};

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
}

/// `GET /health`: readiness probe.
pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus { status: "ok" })
}

/// `GET /problems`: problem stats and the recently solved list, as stored.
pub async fn problems(State(state): State<AppState>) -> Json<ProblemStats> {
    Json(state.seed.problems.clone())
}

/// `GET /users/{id}`: a seeded user, or a structured 404.
pub async fn user_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<UserRecord>, ApiError> {
    match state.seed.find_user(id) {
        Some(user) => Ok(Json(user.clone())),
        None => {
            tracing::debug!(user_id = id, "User not found");
            Err(ApiError::UserNotFound { id })
        }
    }
}
