/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /v1/auth/signup` - Create an account and start a session
/// - `POST /v1/auth/login` - Start a session
/// - `POST /v1/auth/logout` - End the session
/// - `GET /v1/me` - Current session user
///
/// Signup, login and logout are form actions: they check the CSRF token and
/// answer with the submission envelope. Successful signup and login set the
/// `__session` cookie.

use axum::{extract::State, Extension, Json};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use swft_shared::{
    auth::{password, session::create_session_token},
    models::user::{CreateUser, User},
    store::StoreError,
};
use validator::Validate;

use crate::{
    app::AppState,
    cookies::{removal_session_cookie, session_cookie},
    error::ApiResult,
    middleware::session::CurrentUser,
    submission::{ActionResponse, Submission},
};

/// Shown for any failed login, whichever part was wrong
pub const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Signup form
#[derive(Debug, Deserialize, Validate)]
pub struct SignupForm {
    #[serde(default)]
    #[validate(
        email(message = "Email is invalid"),
        length(min = 3, max = 100, message = "Email must be 3 to 100 characters")
    )]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 3, max = 15, message = "Username must be 3 to 15 characters"))]
    pub username: String,

    #[serde(default)]
    #[validate(length(min = 3, max = 30, message = "Name must be 3 to 30 characters"))]
    pub name: String,

    #[serde(default)]
    #[validate(length(min = 6, max = 30, message = "Password must be 6 to 30 characters"))]
    pub password: String,
}

/// Login form
#[derive(Debug, Deserialize, Validate)]
pub struct LoginForm {
    #[serde(default)]
    #[validate(email(message = "Email is invalid"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Create an account
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/signup
/// Content-Type: application/x-www-form-urlencoded
///
/// csrf=...&email=ada@example.com&username=ada&name=Ada+Lovelace&password=hunter22
/// ```
///
/// # Response
///
/// `success` with the new user as `data.user`, plus the session cookie.
///
/// # Errors
///
/// - `400` envelope: invalid fields, or the email/username is taken
/// - `403 Forbidden`: CSRF check failed
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    submission: Submission,
) -> ApiResult<(CookieJar, ActionResponse)> {
    submission.verify_csrf(&jar, state.secrets())?;

    let form = match submission.accept::<SignupForm>() {
        Ok(form) => form,
        Err(reply) => return Ok((jar, reply)),
    };

    let password_hash = password::hash_password(&form.password)?;

    let created = state
        .store
        .create_user(CreateUser {
            email: form.email.to_lowercase(),
            username: form.username,
            name: form.name,
            password_hash,
        })
        .await;

    let user = match created {
        Ok(user) => user,
        Err(StoreError::Conflict(field)) => {
            let message = if field == "username" {
                "A user already exists with this username"
            } else {
                "A user already exists with this email address"
            };
            return Ok((jar, submission.form_error(message)));
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(user_id = %user.id, username = %user.username, "User signed up");

    let jar = start_session(&state, jar, &user)?;
    Ok((jar, submission.success(Some(user_data(&user)))))
}

/// Log in with email and password
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/login
/// Content-Type: application/x-www-form-urlencoded
///
/// csrf=...&email=ada@example.com&password=hunter22
/// ```
///
/// # Errors
///
/// - `400` envelope: form-level "Invalid username or password"
/// - `403 Forbidden`: CSRF check failed
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    submission: Submission,
) -> ApiResult<(CookieJar, ActionResponse)> {
    submission.verify_csrf(&jar, state.secrets())?;

    let form = match submission.accept::<LoginForm>() {
        Ok(form) => form,
        Err(reply) => return Ok((jar, reply)),
    };

    let user = match state.store.find_user_by_email(&form.email).await? {
        Some(user) if password::verify_password(&form.password, &user.password_hash)? => user,
        _ => {
            tracing::warn!("Failed login attempt");
            return Ok((jar, submission.form_error(INVALID_CREDENTIALS)));
        }
    };

    tracing::info!(user_id = %user.id, "User logged in");

    let jar = start_session(&state, jar, &user)?;
    Ok((jar, submission.success(Some(user_data(&user)))))
}

/// End the session
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/logout
/// Content-Type: application/x-www-form-urlencoded
///
/// csrf=...
/// ```
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    submission: Submission,
) -> ApiResult<(CookieJar, ActionResponse)> {
    submission.verify_csrf(&jar, state.secrets())?;

    let jar = jar.add(removal_session_cookie(state.secure_cookies()));
    Ok((jar, submission.success(None)))
}

/// Current session user
///
/// # Endpoint
///
/// ```text
/// GET /v1/me
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: no valid session
pub async fn me(Extension(user): Extension<CurrentUser>) -> Json<User> {
    Json(user.0)
}

fn start_session(state: &AppState, jar: CookieJar, user: &User) -> ApiResult<CookieJar> {
    let token = create_session_token(user.id, state.secrets())?;
    Ok(jar.add(session_cookie(token, state.secure_cookies())))
}

fn user_data(user: &User) -> serde_json::Value {
    serde_json::json!({ "user": user })
}
