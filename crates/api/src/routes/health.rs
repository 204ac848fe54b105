//! Liveness probe mounted at the root, outside `/api/v1`.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when PostgreSQL does not answer.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Days the roster projects ahead of today.
    pub roster_window_days: u32,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = match presenca_db::health_check(&state.pool).await {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(error = %err, "Database health check failed");
            false
        }
    };

    Json(HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        roster_window_days: state.roster.config().window_days,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
