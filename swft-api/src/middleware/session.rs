/// Session authentication
///
/// Protected routes run behind [`require_session`]: it reads the
/// `__session` cookie, validates the token against the configured secrets,
/// loads the user and stores it in the request extensions as
/// [`CurrentUser`]. Any failure, including a valid token for a user that no
/// longer exists, is a 401.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use swft_shared::{
    auth::session::{validate_session_token, SESSION_COOKIE},
    models::user::User,
};

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};

/// The authenticated user of the current request
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn id(&self) -> uuid::Uuid {
        self.0.id
    }
}

/// Resolves the session cookie to a user
pub async fn authenticate(state: &AppState, jar: &CookieJar) -> ApiResult<User> {
    let token = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Login required".to_string()))?;

    let claims = validate_session_token(token, state.secrets())?;

    state.store.find_user(claims.sub).await?.ok_or_else(|| {
        tracing::debug!(user_id = %claims.sub, "Session refers to a deleted user");
        ApiError::Unauthorized("Login required".to_string())
    })
}

/// Middleware guarding routes that need a logged-in user
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(&state, &jar).await?;

    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}
