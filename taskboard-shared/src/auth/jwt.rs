/// JWT token generation and validation
///
/// Tokens are signed with HS256 and carry the caller's user id as the
/// subject. Two token types exist: short-lived access tokens for API
/// authentication and long-lived refresh tokens for obtaining new access
/// tokens.
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::jwt::{create_token, validate_token, Claims, TokenType};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let user_id = Uuid::new_v4();
/// let secret = "secret-key-at-least-32-bytes-long!!";
///
/// let claims = Claims::new(user_id, TokenType::Access);
/// let token = create_token(&claims, secret)?;
///
/// let validated = validate_token(&token, secret)?;
/// assert_eq!(validated.sub, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const ISSUER: &str = "taskboard";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Invalid issuer
    #[error("Invalid token issuer")]
    InvalidIssuer,
}

/// Token type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Access token (short-lived, 24 hours)
    Access,

    /// Refresh token (long-lived, 30 days)
    Refresh,
}

impl TokenType {
    /// Gets default expiration duration for token type
    pub fn default_expiration(&self) -> Duration {
        match self {
            TokenType::Access => Duration::hours(24),
            TokenType::Refresh => Duration::days(30),
        }
    }
}

/// JWT claims
///
/// Standard claims (`sub`, `iss`, `iat`, `exp`, `nbf`) plus the token type.
/// The subject is the authenticated user's id; there is no other ambient
/// identity in a token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user ID
    pub sub: Uuid,

    /// Issuer - always "taskboard"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Token type (custom claim)
    pub token_type: TokenType,
}

impl Claims {
    /// Creates new claims with the default expiration for the token type
    pub fn new(user_id: Uuid, token_type: TokenType) -> Self {
        Self::with_expiration(user_id, token_type, token_type.default_expiration())
    }

    /// Creates claims with a custom expiration
    pub fn with_expiration(user_id: Uuid, token_type: TokenType, expires_in: Duration) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;

        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
            token_type,
        }
    }

    /// Checks if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Creates a signed JWT token from claims
///
/// # Errors
///
/// Returns `JwtError::CreateError` if encoding fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a JWT token and extracts its claims
///
/// Verifies the signature, expiration, not-before time, and issuer.
///
/// # Errors
///
/// Returns an error if the signature is invalid, the token has expired,
/// the issuer does not match, or the token is malformed.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

/// Validates a token and checks it is an access token
pub fn validate_access_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let claims = validate_token(token, secret)?;

    if claims.token_type != TokenType::Access {
        return Err(JwtError::ValidationError(
            "Expected access token, got refresh token".to_string(),
        ));
    }

    Ok(claims)
}

/// Validates a token and checks it is a refresh token
pub fn validate_refresh_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let claims = validate_token(token, secret)?;

    if claims.token_type != TokenType::Refresh {
        return Err(JwtError::ValidationError(
            "Expected refresh token, got access token".to_string(),
        ));
    }

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_token_round_trip() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, TokenType::Access);

        let token = create_token(&claims, SECRET).unwrap();
        let validated = validate_token(&token, SECRET).unwrap();

        assert_eq!(validated.sub, user_id);
        assert_eq!(validated.iss, "taskboard");
        assert_eq!(validated.token_type, TokenType::Access);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let claims = Claims::new(Uuid::new_v4(), TokenType::Access);
        let token = create_token(&claims, SECRET).unwrap();

        assert!(validate_token(&token, "different-secret-also-32-bytes!!").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let claims =
            Claims::with_expiration(Uuid::new_v4(), TokenType::Access, Duration::seconds(-120));
        assert!(claims.is_expired());

        let token = create_token(&claims, SECRET).unwrap();
        assert!(matches!(validate_token(&token, SECRET), Err(JwtError::Expired)));
    }

    #[test]
    fn test_token_type_enforced() {
        let refresh = Claims::new(Uuid::new_v4(), TokenType::Refresh);
        let token = create_token(&refresh, SECRET).unwrap();

        assert!(validate_refresh_token(&token, SECRET).is_ok());
        assert!(validate_access_token(&token, SECRET).is_err());
    }
}
