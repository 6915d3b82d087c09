/// User directory endpoints
///
/// All endpoints require JWT authentication. Reads only; identity fields
/// are immutable once the account exists.
///
/// # Endpoints
///
/// - `GET /v1/users` - List all users
/// - `GET /v1/users/me` - Current caller's account
/// - `GET /v1/users/:id` - Get user by id

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Json,
};
use taskboard_shared::{auth::middleware::AuthContext, models::user::User};
use uuid::Uuid;

/// List all users
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    let users = User::list_all(&state.db).await?;
    Ok(Json(users))
}

/// Get the authenticated caller's account
pub async fn get_current_user(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<User>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// Get a user by id
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<User>> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User not found: {}", id)))?;

    Ok(Json(user))
}
