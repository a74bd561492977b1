/// Authentication primitives
///
/// - [`password`]: Argon2id hashing and verification
/// - [`session`]: signed session tokens carried in the `__session` cookie
/// - [`csrf`]: signed double-submit CSRF tokens
///
/// Session and CSRF signing both take the configured secret list: the first
/// secret signs, any of them verifies.

pub mod csrf;
pub mod password;
pub mod session;
