/// CSRF token issuance
///
/// # Endpoint
///
/// ```text
/// GET /v1/csrf
/// ```
///
/// Sets the signed `csrf` cookie and returns the bare token, which clients
/// put in the `csrf` field of every form they submit.
///
/// ```json
/// { "csrf": "9f2c..." }
/// ```

use axum::{extract::State, Json};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use swft_shared::auth::csrf::{generate_token, sign_token};

use crate::{app::AppState, cookies::csrf_cookie, error::ApiResult};

#[derive(Debug, Serialize, Deserialize)]
pub struct CsrfResponse {
    pub csrf: String,
}

pub async fn issue_token(
    State(state): State<AppState>,
    jar: CookieJar,
) -> ApiResult<(CookieJar, Json<CsrfResponse>)> {
    let token = generate_token();
    let signed = sign_token(&token, state.secrets())?;

    let jar = jar.add(csrf_cookie(signed, state.secure_cookies()));
    Ok((jar, Json(CsrfResponse { csrf: token })))
}
