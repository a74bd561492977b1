/// Cookie builders
///
/// Both cookies are `HttpOnly`, `SameSite=Lax` and scoped to `/`. `Secure`
/// is set in production.

use axum_extra::extract::cookie::{Cookie, SameSite};
use swft_shared::auth::{csrf::CSRF_COOKIE, session::SESSION_COOKIE};
use time::Duration;

/// Session lifetime in days, matching the token expiry
const SESSION_DAYS: i64 = 30;

fn base(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// `__session` cookie carrying a signed session token
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    let mut cookie = base(SESSION_COOKIE, token, secure);
    cookie.set_max_age(Duration::days(SESSION_DAYS));
    cookie
}

/// Cookie that replaces and immediately expires the session
pub fn removal_session_cookie(secure: bool) -> Cookie<'static> {
    let mut cookie = base(SESSION_COOKIE, String::new(), secure);
    cookie.set_max_age(Duration::ZERO);
    cookie
}

/// `csrf` cookie carrying `token.signature`; lives as long as the browser session
pub fn csrf_cookie(signed: String, secure: bool) -> Cookie<'static> {
    base(CSRF_COOKIE, signed, secure)
}
