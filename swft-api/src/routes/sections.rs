/// Section actions
///
/// - `POST /v1/sections` - Create a section at the end of a project
/// - `PUT /v1/sections/title` - Rename a section
/// - `DELETE /v1/sections` - Delete a section and its tasks

use axum::{extract::State, Extension};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use swft_shared::models::section::{CreateSection, UNTITLED_SECTION};
use validator::Validate;

use super::{ensure_claimed_owner, ensure_owner, parse_id};
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::session::CurrentUser,
    submission::{ActionResponse, Submission},
};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSectionForm {
    #[serde(default)]
    #[validate(length(min = 1, max = 32, message = "Title must be 1 to 32 characters"))]
    pub title: String,

    #[serde(default)]
    pub project_id: String,

    pub owner_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EditSectionTitleForm {
    #[serde(default)]
    pub section_id: String,

    #[serde(default)]
    #[validate(length(max = 32, message = "Title must be at most 32 characters"))]
    pub title: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSectionForm {
    #[serde(default)]
    pub section_id: String,
}

/// Create a section
///
/// # Endpoint
///
/// ```text
/// POST /v1/sections
/// Content-Type: application/x-www-form-urlencoded
///
/// csrf=...&title=Backlog&projectId=<uuid>&ownerId=<uuid>
/// ```
///
/// The section is placed after every existing section of the project.
///
/// # Errors
///
/// - `400` envelope: invalid title
/// - `403 Forbidden`: CSRF check failed, or the project (or `ownerId`) is
///   another user's
/// - `404 Not Found`: project missing
pub async fn create_section(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
    submission: Submission,
) -> ApiResult<ActionResponse> {
    submission.verify_csrf(&jar, state.secrets())?;

    let form = match submission.accept::<CreateSectionForm>() {
        Ok(form) => form,
        Err(reply) => return Ok(reply),
    };

    let project_id = parse_id(&form.project_id, "Project")?;
    let project = state
        .store
        .find_project(project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    ensure_owner(project.owner_id, &user, &format!("add sections to project {}", project.id))?;
    ensure_claimed_owner(form.owner_id.as_deref(), &user)?;

    let section = state
        .store
        .create_section(CreateSection {
            title: form.title,
            owner_id: user.id(),
            project_id: project.id,
        })
        .await?;

    tracing::info!(section_id = %section.id, project_id = %project.id, "Section created");
    Ok(submission.success(Some(serde_json::json!({ "section": section }))))
}

/// Rename a section
///
/// # Endpoint
///
/// ```text
/// PUT /v1/sections/title
/// Content-Type: application/x-www-form-urlencoded
///
/// csrf=...&sectionId=<uuid>&title=Doing
/// ```
///
/// An empty title stores "Untitled section".
///
/// # Errors
///
/// - `400` envelope: title longer than 32 characters
/// - `403 Forbidden`: CSRF check failed or not the owner
/// - `404 Not Found`: section missing
pub async fn edit_section_title(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
    submission: Submission,
) -> ApiResult<ActionResponse> {
    submission.verify_csrf(&jar, state.secrets())?;

    let form = match submission.accept::<EditSectionTitleForm>() {
        Ok(form) => form,
        Err(reply) => return Ok(reply),
    };

    let section_id = parse_id(&form.section_id, "Section")?;
    let section = state
        .store
        .find_section(section_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Section not found".to_string()))?;

    ensure_owner(section.owner_id, &user, &format!("edit section {}", section.id))?;

    let title = match form.title.trim() {
        "" => UNTITLED_SECTION,
        title => title,
    };

    let updated = state
        .store
        .rename_section(section.id, title)
        .await?
        .ok_or_else(|| ApiError::NotFound("Section not found".to_string()))?;

    Ok(submission.success(Some(serde_json::json!({ "section": updated }))))
}

/// Delete a section
///
/// The section's tasks are deleted with it.
///
/// # Endpoint
///
/// ```text
/// DELETE /v1/sections
/// Content-Type: application/x-www-form-urlencoded
///
/// csrf=...&sectionId=<uuid>
/// ```
///
/// # Errors
///
/// - `403 Forbidden`: CSRF check failed or not the owner
/// - `404 Not Found`: section missing
pub async fn delete_section(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
    submission: Submission,
) -> ApiResult<ActionResponse> {
    submission.verify_csrf(&jar, state.secrets())?;

    let form = match submission.accept::<DeleteSectionForm>() {
        Ok(form) => form,
        Err(reply) => return Ok(reply),
    };

    let section_id = parse_id(&form.section_id, "Section")?;
    let section = state
        .store
        .find_section(section_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Section not found".to_string()))?;

    ensure_owner(section.owner_id, &user, &format!("delete section {}", section.id))?;

    if !state.store.delete_section(section.id).await? {
        return Err(ApiError::NotFound("Section not found".to_string()));
    }

    tracing::info!(section_id = %section.id, "Section deleted");
    Ok(submission.success(None))
}
