/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /v1/auth/register` - Register a new user
/// - `POST /v1/auth/login` - Login with username or email
/// - `POST /v1/auth/refresh` - Refresh the access token

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::{jwt, password},
    models::user::{CreateUser, User},
};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Login name
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Display name
    #[validate(length(min = 1, max = 100, message = "Full name must be 1-100 characters"))]
    pub full_name: String,

    /// Password (also checked for strength)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Login request
///
/// The identifier matches against username first, then email.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username or email address
    #[validate(length(min = 1, message = "Username or email is required"))]
    pub username_or_email: String,

    /// Password
    pub password: String,
}

/// Token pair response for register and login
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    /// User ID
    pub user_id: String,

    /// Access token (24h)
    pub access_token: String,

    /// Refresh token (30d)
    pub refresh_token: String,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token
    pub refresh_token: String,
}

/// Refresh token response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// New access token (24h)
    pub access_token: String,
}

fn issue_token_pair(state: &AppState, user_id: uuid::Uuid) -> ApiResult<TokenResponse> {
    let access_claims = jwt::Claims::new(user_id, jwt::TokenType::Access);
    let refresh_claims = jwt::Claims::new(user_id, jwt::TokenType::Refresh);

    Ok(TokenResponse {
        user_id: user_id.to_string(),
        access_token: jwt::create_token(&access_claims, state.jwt_secret())?,
        refresh_token: jwt::create_token(&refresh_claims, state.jwt_secret())?,
    })
}

/// Register a new user
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed
/// - `409 Conflict`: Username or email already exists
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<TokenResponse>> {
    req.validate().map_err(ApiError::from_validation)?;

    password::validate_password_strength(&req.password).map_err(|message| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "password".to_string(),
            message,
        }])
    })?;

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            username: req.username,
            email: req.email,
            full_name: req.full_name,
            password_hash,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    Ok(Json(issue_token_pair(&state, user.id)?))
}

/// Login with username or email
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown identifier or wrong password
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    req.validate().map_err(ApiError::from_validation)?;

    let user = match User::find_by_username(&state.db, &req.username_or_email).await? {
        Some(user) => Some(user),
        None => User::find_by_email(&state.db, &req.username_or_email).await?,
    };

    // Same message for unknown user and wrong password
    let user = user.ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(issue_token_pair(&state, user.id)?))
}

/// Exchange a refresh token for a new access token
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid or expired refresh token
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let claims = jwt::validate_refresh_token(&req.refresh_token, state.jwt_secret())?;

    let access_claims = jwt::Claims::new(claims.sub, jwt::TokenType::Access);
    let access_token = jwt::create_token(&access_claims, state.jwt_secret())?;

    Ok(Json(RefreshResponse { access_token }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let req = RegisterRequest {
            username: "al".to_string(),
            email: "not-an-email".to_string(),
            full_name: "Alice Doe".to_string(),
            password: "password1".to_string(),
        };

        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("username"));
        assert!(errors.field_errors().contains_key("email"));

        let req = RegisterRequest {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            full_name: "Alice Doe".to_string(),
            password: "password1".to_string(),
        };
        assert!(req.validate().is_ok());
    }
}
