use super::AppState;
use crate::core::error::Result;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Unavailable,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: &'static str,
    pub timestamp: String,
}

/// Health check endpoint
///
/// Answers 503 with status `unavailable` when the database does not respond.
pub async fn health_check(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let probe = state
        .db
        .execute(|conn| Ok(conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?))
        .await;

    let (status_code, status) = match probe {
        Ok(_) => (StatusCode::OK, HealthStatus::Ok),
        Err(e) => {
            tracing::error!(error = %e, "Database health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, HealthStatus::Unavailable)
        }
    };

    let response = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now().to_rfc3339(),
    };

    Ok((status_code, Json(response)))
}
