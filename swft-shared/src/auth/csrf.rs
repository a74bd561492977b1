/// CSRF tokens (signed double-submit)
///
/// A token is 32 random bytes, hex encoded. The `csrf` cookie holds
/// `token.signature` where the signature is HMAC-SHA256 of the token under
/// the primary session secret. Every mutating form repeats the bare token in
/// its `csrf` field. A request passes when:
///
/// 1. the form field is present,
/// 2. the cookie is present and its signature verifies under one of the
///    configured secrets,
/// 3. the cookie's token equals the form field (compared in constant time).
///
/// # Example
///
/// ```
/// use swft_shared::auth::csrf::{generate_token, sign_token, validate};
///
/// let secrets = vec!["a-very-long-secret-of-at-least-32-bytes!".to_string()];
/// let token = generate_token();
/// let cookie = sign_token(&token, &secrets).unwrap();
///
/// assert!(validate(Some(&cookie), Some(&token), &secrets).is_ok());
/// assert!(validate(Some(&cookie), Some("forged"), &secrets).is_err());
/// ```

use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Name of the CSRF cookie
pub const CSRF_COOKIE: &str = "csrf";

/// Name of the form field carrying the token
pub const CSRF_FIELD: &str = "csrf";

/// Number of random bytes in a token
const TOKEN_BYTES: usize = 32;

/// Error type for CSRF validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CsrfError {
    /// No secret configured to sign with
    #[error("No CSRF secret configured")]
    MissingSecret,

    /// Form did not include a token
    #[error("Missing CSRF token in form data")]
    MissingToken,

    /// Request did not carry the CSRF cookie
    #[error("Missing CSRF cookie")]
    MissingCookie,

    /// Cookie value is malformed or its signature doesn't verify
    #[error("Invalid CSRF cookie signature")]
    InvalidSignature,

    /// Cookie and form tokens differ
    #[error("CSRF token does not match cookie")]
    Mismatch,
}

/// Generates a fresh random token
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn mac_for(secret: &str, token: &str) -> Option<HmacSha256> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(token.as_bytes());
    Some(mac)
}

/// Produces the cookie value `token.signature` using the primary secret
pub fn sign_token(token: &str, secrets: &[String]) -> Result<String, CsrfError> {
    let secret = secrets.first().ok_or(CsrfError::MissingSecret)?;
    let mac = mac_for(secret, token).ok_or(CsrfError::MissingSecret)?;
    let signature = hex::encode(mac.finalize().into_bytes());

    Ok(format!("{}.{}", token, signature))
}

/// Returns the token inside a signed cookie value if any secret verifies it
pub fn unsign_token<'a>(cookie_value: &'a str, secrets: &[String]) -> Result<&'a str, CsrfError> {
    let (token, signature) = cookie_value
        .rsplit_once('.')
        .ok_or(CsrfError::InvalidSignature)?;
    let signature = hex::decode(signature).map_err(|_| CsrfError::InvalidSignature)?;

    let verified = secrets.iter().any(|secret| {
        mac_for(secret, token).is_some_and(|mac| mac.verify_slice(&signature).is_ok())
    });

    if verified {
        Ok(token)
    } else {
        Err(CsrfError::InvalidSignature)
    }
}

/// Validates a submitted token against the signed cookie
pub fn validate(
    cookie_value: Option<&str>,
    form_token: Option<&str>,
    secrets: &[String],
) -> Result<(), CsrfError> {
    let form_token = form_token
        .filter(|t| !t.is_empty())
        .ok_or(CsrfError::MissingToken)?;
    let cookie_value = cookie_value.ok_or(CsrfError::MissingCookie)?;

    let cookie_token = unsign_token(cookie_value, secrets)?;

    if bool::from(cookie_token.as_bytes().ct_eq(form_token.as_bytes())) {
        Ok(())
    } else {
        Err(CsrfError::Mismatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secrets() -> Vec<String> {
        vec!["test-secret-key-at-least-32-bytes-long".to_string()]
    }

    #[test]
    fn test_generate_token_shape() {
        let token = generate_token();

        assert_eq!(token.len(), TOKEN_BYTES * 2);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_token());
    }

    #[test]
    fn test_valid_token() {
        let token = generate_token();
        let cookie = sign_token(&token, &secrets()).unwrap();

        assert_eq!(unsign_token(&cookie, &secrets()), Ok(token.as_str()));
        assert_eq!(validate(Some(&cookie), Some(&token), &secrets()), Ok(()));
    }

    #[test]
    fn test_missing_parts() {
        let token = generate_token();
        let cookie = sign_token(&token, &secrets()).unwrap();

        assert_eq!(
            validate(Some(&cookie), None, &secrets()),
            Err(CsrfError::MissingToken)
        );
        assert_eq!(
            validate(Some(&cookie), Some(""), &secrets()),
            Err(CsrfError::MissingToken)
        );
        assert_eq!(
            validate(None, Some(&token), &secrets()),
            Err(CsrfError::MissingCookie)
        );
    }

    #[test]
    fn test_mismatched_token() {
        let cookie = sign_token(&generate_token(), &secrets()).unwrap();

        assert_eq!(
            validate(Some(&cookie), Some(&generate_token()), &secrets()),
            Err(CsrfError::Mismatch)
        );
    }

    #[test]
    fn test_prefix_and_longer_tokens_mismatch() {
        let token = generate_token();
        let cookie = sign_token(&token, &secrets()).unwrap();

        let prefix = &token[..token.len() - 1];
        let longer = format!("{}0", token);

        assert_eq!(validate(Some(&cookie), Some(prefix), &secrets()), Err(CsrfError::Mismatch));
        assert_eq!(validate(Some(&cookie), Some(&longer), &secrets()), Err(CsrfError::Mismatch));
    }

    #[test]
    fn test_forged_cookie() {
        let token = generate_token();
        let forged = format!("{}.{}", token, "00".repeat(32));

        assert_eq!(
            validate(Some(&forged), Some(&token), &secrets()),
            Err(CsrfError::InvalidSignature)
        );
        assert_eq!(
            validate(Some(&token), Some(&token), &secrets()),
            Err(CsrfError::InvalidSignature)
        );
    }

    #[test]
    fn test_rotated_secret() {
        let token = generate_token();
        let cookie = sign_token(&token, &secrets()).unwrap();
        let rotated = vec![
            "brand-new-primary-secret-32-bytes-long".to_string(),
            secrets()[0].clone(),
        ];

        assert!(validate(Some(&cookie), Some(&token), &rotated).is_ok());
    }
}
