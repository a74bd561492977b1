/// API route handlers
///
/// Organized by resource:
///
/// - `health`: Liveness and store connectivity
/// - `csrf`: CSRF token issuance
/// - `auth`: Signup, login, logout, current user
/// - `users`: Public profile and project board loaders
/// - `projects`, `sections`, `tasks`: Mutation actions
///
/// Mutation actions share the same sequence: session (middleware), CSRF,
/// form validation, row lookup, owner check, a single write.

pub mod auth;
pub mod csrf;
pub mod health;
pub mod projects;
pub mod sections;
pub mod tasks;
pub mod users;

use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    middleware::session::CurrentUser,
};

/// Parses a row id from a form field; missing or malformed ids are 404s
pub(crate) fn parse_id(raw: &str, what: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::NotFound(format!("{} not found", what)))
}

/// Rejects actions on rows owned by someone else
pub(crate) fn ensure_owner(owner_id: Uuid, user: &CurrentUser, action: &str) -> ApiResult<()> {
    if owner_id == user.id() {
        Ok(())
    } else {
        tracing::warn!(user_id = %user.id(), owner_id = %owner_id, "{}", action);
        Err(ApiError::Forbidden(format!("Unauthorized to {}", action)))
    }
}

/// Create forms may name their owner; it has to be the session user
pub(crate) fn ensure_claimed_owner(claimed: Option<&str>, user: &CurrentUser) -> ApiResult<()> {
    match claimed.map(str::trim).filter(|c| !c.is_empty()) {
        None => Ok(()),
        Some(claimed) if Uuid::parse_str(claimed).ok() == Some(user.id()) => Ok(()),
        Some(_) => Err(ApiError::Forbidden(
            "Unauthorized to create for another user".to_string(),
        )),
    }
}
