/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// All handlers return `Result<T, ApiError>` which converts to the
/// appropriate HTTP status code.
///
/// # Status mapping
///
/// | Variant            | Status |
/// |--------------------|--------|
/// | `BadRequest`       | 400    |
/// | `Unauthorized`     | 401    |
/// | `Forbidden`        | 403    |
/// | `NotFound`         | 404    |
/// | `Conflict`         | 409    |
/// | `ValidationError`  | 422    |
/// | `InternalError`    | 500    |

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400) - e.g., out-of-range progress or priority
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403) - caller lacks ownership or membership
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409) - e.g., duplicate username or email
    Conflict(String),

    /// Unprocessable entity (422) - request-shape validation errors
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "bad_request", "not_found")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Builds a 422 validation error from `validator` derive output
    pub fn from_validation(errors: validator::ValidationErrors) -> Self {
        let details: Vec<ValidationErrorDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();

        ApiError::ValidationError(details)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                // Unique constraint violations surface as conflicts
                if let Some(constraint) = db_err.constraint() {
                    if constraint.contains("username") {
                        return ApiError::Conflict("Username already exists".to_string());
                    }
                    if constraint.contains("email") {
                        return ApiError::Conflict("Email already exists".to_string());
                    }
                    return ApiError::Conflict(format!("Constraint violation: {}", constraint));
                }

                ApiError::InternalError(format!("Database error: {}", db_err))
            }
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Convert authorization errors to API errors
impl From<taskboard_shared::auth::authorization::AuthzError> for ApiError {
    fn from(err: taskboard_shared::auth::authorization::AuthzError) -> Self {
        use taskboard_shared::auth::authorization::AuthzError;

        match err {
            AuthzError::NotOwner => {
                ApiError::Forbidden("Only the project owner may perform this operation".to_string())
            }
            AuthzError::NoAccess => ApiError::Forbidden("No access to this project".to_string()),
            AuthzError::DatabaseError(err) => {
                ApiError::InternalError(format!("Database error: {}", err))
            }
        }
    }
}

/// Convert JWT errors to API errors
impl From<taskboard_shared::auth::jwt::JwtError> for ApiError {
    fn from(err: taskboard_shared::auth::jwt::JwtError) -> Self {
        use taskboard_shared::auth::jwt::JwtError;

        match err {
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            JwtError::InvalidIssuer => ApiError::Unauthorized("Invalid token issuer".to_string()),
            _ => ApiError::Unauthorized(format!("Invalid token: {}", err)),
        }
    }
}

/// Convert password errors to API errors
impl From<taskboard_shared::auth::password::PasswordError> for ApiError {
    fn from(err: taskboard_shared::auth::password::PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("Task not found".to_string());
        assert_eq!(err.to_string(), "Not found: Task not found");
    }

    #[test]
    fn test_validation_error() {
        let errors = vec![
            ValidationErrorDetail {
                field: "email".to_string(),
                message: "Invalid email format".to_string(),
            },
            ValidationErrorDetail {
                field: "password".to_string(),
                message: "Password too short".to_string(),
            },
        ];

        let err = ApiError::ValidationError(errors);
        assert_eq!(err.to_string(), "Validation failed: 2 errors");
    }

    #[test]
    fn test_authz_error_maps_to_forbidden() {
        use taskboard_shared::auth::authorization::AuthzError;

        let err: ApiError = AuthzError::NotOwner.into();
        assert!(matches!(err, ApiError::Forbidden(_)));

        let err: ApiError = AuthzError::NoAccess.into();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: ApiError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
