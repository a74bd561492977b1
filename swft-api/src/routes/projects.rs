/// Project actions
///
/// - `POST /v1/projects` - Create a project owned by the session user

use axum::{extract::State, Extension};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use swft_shared::models::project::CreateProject;
use validator::Validate;

use super::ensure_claimed_owner;
use crate::{
    app::AppState,
    error::ApiResult,
    middleware::session::CurrentUser,
    submission::{ActionResponse, Submission},
};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectForm {
    #[serde(default)]
    #[validate(length(min = 1, max = 32, message = "Title must be 1 to 32 characters"))]
    pub title: String,

    pub owner_id: Option<String>,
}

/// Create a project
///
/// # Endpoint
///
/// ```text
/// POST /v1/projects
/// Content-Type: application/x-www-form-urlencoded
///
/// csrf=...&title=Launch
/// ```
///
/// # Response
///
/// `success` with the project as `data.project`.
///
/// # Errors
///
/// - `400` envelope: invalid title
/// - `403 Forbidden`: CSRF check failed, or `ownerId` is another user
pub async fn create_project(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
    submission: Submission,
) -> ApiResult<ActionResponse> {
    submission.verify_csrf(&jar, state.secrets())?;

    let form = match submission.accept::<CreateProjectForm>() {
        Ok(form) => form,
        Err(reply) => return Ok(reply),
    };
    ensure_claimed_owner(form.owner_id.as_deref(), &user)?;

    let project = state
        .store
        .create_project(CreateProject {
            title: form.title,
            owner_id: user.id(),
        })
        .await?;

    tracing::info!(project_id = %project.id, user_id = %user.id(), "Project created");
    Ok(submission.success(Some(serde_json::json!({ "project": project }))))
}
