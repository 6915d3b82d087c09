/// Authenticated-caller context
///
/// The API server's JWT middleware validates the Bearer token on each
/// request and injects an [`AuthContext`] into the request extensions.
/// Handlers extract it as an argument and pass the caller id explicitly
/// into every model and authorization call; nothing downstream reads
/// identity from ambient state.
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::middleware::AuthContext;
///
/// async fn handler(auth: AuthContext) -> String {
///     format!("Hello, user {}!", auth.user_id)
/// }
/// ```

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::Claims;

/// Authentication context added to request extensions
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,
}

impl AuthContext {
    /// Creates an auth context for a resolved user
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }

    /// Creates an auth context from validated JWT claims
    pub fn from_claims(claims: &Claims) -> Self {
        Self { user_id: claims.sub }
    }
}

/// Extracts the auth context placed in request extensions by the JWT layer
///
/// Rejects with 401 when a handler behind no auth layer tries to use it.
#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .copied()
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::TokenType;

    #[test]
    fn test_from_claims() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, TokenType::Access);

        let auth = AuthContext::from_claims(&claims);
        assert_eq!(auth.user_id, user_id);
    }
}
