/// Health check endpoint
///
/// Verifies the server is running and the database is reachable.
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "database": "connected"
/// }
/// ```

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Application version
    pub version: String,

    /// Database status
    pub database: String,
}

/// Health check handler
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let database_status = match taskboard_shared::db::pool::health_check(&state.db).await {
        Ok(()) => "connected",
        Err(_) => "disconnected",
    };

    Ok(Json(HealthResponse {
        status: if database_status == "connected" {
            "healthy".to_string()
        } else {
            "degraded".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database_status.to_string(),
    }))
}
