/// Session tokens
///
/// The session cookie carries a signed HS256 JWT whose subject is the user
/// id. Sessions last 30 days. Signing always uses the first configured
/// secret; validation accepts any of them, so secrets can be rotated by
/// prepending a new one.
///
/// # Example
///
/// ```
/// use swft_shared::auth::session::{create_session_token, validate_session_token};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secrets = vec!["a-very-long-secret-of-at-least-32-bytes!".to_string()];
/// let user_id = Uuid::new_v4();
///
/// let token = create_session_token(user_id, &secrets)?;
/// let claims = validate_session_token(&token, &secrets)?;
/// assert_eq!(claims.sub, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "__session";

/// Issuer claim stamped on every session token
pub const SESSION_ISSUER: &str = "swft";

/// Session lifetime
pub fn session_ttl() -> Duration {
    Duration::days(30)
}

/// Error type for session token operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No secret configured to sign with
    #[error("No session secret configured")]
    MissingSecret,

    /// Failed to create token
    #[error("Failed to create session token: {0}")]
    CreateError(String),

    /// Token has expired
    #[error("Session has expired")]
    Expired,

    /// Signature, issuer or format check failed under every secret
    #[error("Invalid session token: {0}")]
    Invalid(String),
}

/// Session token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject - user ID
    pub sub: Uuid,

    /// Issuer - always "swft"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl SessionClaims {
    /// Creates claims expiring after the default session lifetime
    pub fn new(user_id: Uuid) -> Self {
        Self::with_expiration(user_id, session_ttl())
    }

    /// Creates claims with a custom lifetime
    pub fn with_expiration(user_id: Uuid, expires_in: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            iss: SESSION_ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
        }
    }
}

/// Signs claims with the primary (first) secret
pub fn sign_claims(claims: &SessionClaims, secrets: &[String]) -> Result<String, SessionError> {
    let secret = secrets.first().ok_or(SessionError::MissingSecret)?;
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&Header::new(Algorithm::HS256), claims, &key)
        .map_err(|e| SessionError::CreateError(e.to_string()))
}

/// Creates a session token for a user
pub fn create_session_token(user_id: Uuid, secrets: &[String]) -> Result<String, SessionError> {
    sign_claims(&SessionClaims::new(user_id), secrets)
}

/// Validates a session token against every configured secret
///
/// # Errors
///
/// - `SessionError::Expired` if the signature is valid but the token expired
/// - `SessionError::Invalid` if no secret validates the token
pub fn validate_session_token(
    token: &str,
    secrets: &[String],
) -> Result<SessionClaims, SessionError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[SESSION_ISSUER]);
    validation.leeway = 0;

    let mut last_error = SessionError::MissingSecret;

    for secret in secrets {
        let key = DecodingKey::from_secret(secret.as_bytes());

        match decode::<SessionClaims>(token, &key, &validation) {
            Ok(data) => return Ok(data.claims),
            Err(e) => {
                last_error = match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        return Err(SessionError::Expired)
                    }
                    _ => SessionError::Invalid(e.to_string()),
                };
            }
        }
    }

    Err(last_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secrets() -> Vec<String> {
        vec!["test-secret-key-at-least-32-bytes-long".to_string()]
    }

    #[test]
    fn test_session_roundtrip() {
        let user_id = Uuid::new_v4();
        let token = create_session_token(user_id, &secrets()).unwrap();

        let claims = validate_session_token(&token, &secrets()).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.iss, SESSION_ISSUER);
        assert_eq!(claims.exp - claims.iat, session_ttl().num_seconds());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = create_session_token(Uuid::new_v4(), &secrets()).unwrap();
        let other = vec!["another-secret-key-at-least-32-bytes".to_string()];

        assert!(matches!(
            validate_session_token(&token, &other),
            Err(SessionError::Invalid(_))
        ));
    }

    #[test]
    fn test_rotated_secret_still_validates() {
        let old = secrets();
        let token = create_session_token(Uuid::new_v4(), &old).unwrap();

        let rotated = vec![
            "brand-new-primary-secret-32-bytes-long".to_string(),
            old[0].clone(),
        ];
        assert!(validate_session_token(&token, &rotated).is_ok());
    }

    #[test]
    fn test_expired_session() {
        let claims = SessionClaims::with_expiration(Uuid::new_v4(), Duration::seconds(-3600));
        let token = sign_claims(&claims, &secrets()).unwrap();

        assert!(matches!(
            validate_session_token(&token, &secrets()),
            Err(SessionError::Expired)
        ));
    }

    #[test]
    fn test_garbage_token() {
        assert!(validate_session_token("not.a.jwt", &secrets()).is_err());
    }

    #[test]
    fn test_signing_requires_a_secret() {
        assert!(matches!(
            create_session_token(Uuid::new_v4(), &[]),
            Err(SessionError::MissingSecret)
        ));
    }
}
