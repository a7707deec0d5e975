//! Health check endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use database::room;
use serde::Serialize;
use tracing::warn;

use crate::state::AppState;

#[derive(Serialize)]
pub struct Health {
    pub status: &'static str,
}

/// Reports `ok` while the database answers.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Health>) {
    match room::count_rooms(state.db.pool()).await {
        Ok(_) => (StatusCode::OK, Json(Health { status: "ok" })),
        Err(e) => {
            warn!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(Health {
                    status: "unavailable",
                }),
            )
        }
    }
}
