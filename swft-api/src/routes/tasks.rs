/// Task actions
///
/// - `POST /v1/tasks` - Create a task in a section
/// - `DELETE /v1/tasks` - Delete one task
/// - `PUT /v1/tasks/title` - Rename a task
/// - `PUT /v1/tasks/description` - Set or clear a task description
/// - `PUT /v1/tasks/completion` - Toggle completion

use axum::{extract::State, Extension};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use swft_shared::models::task::{CreateTask, Task};
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
pub struct CreateTaskForm {
    #[serde(default)]
    #[validate(length(min = 1, max = 32, message = "Title must be 1 to 32 characters"))]
    pub title: String,

    #[serde(default)]
    pub section_id: String,

    pub owner_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TaskIdForm {
    #[serde(default)]
    pub task_id: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EditTaskTitleForm {
    #[serde(default)]
    pub task_id: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 32, message = "Title must be 1 to 32 characters"))]
    pub title: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EditTaskDescriptionForm {
    #[serde(default)]
    pub task_id: String,

    #[serde(default)]
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ToggleTaskForm {
    #[serde(default)]
    pub task_id: String,

    /// Completion state the client displays, `"true"` or `"false"`
    #[serde(default)]
    #[validate(custom(function = "validate_bool"))]
    pub completed: String,
}

fn validate_bool(value: &str) -> Result<(), validator::ValidationError> {
    match value {
        "true" | "false" => Ok(()),
        _ => {
            let mut error = validator::ValidationError::new("completed");
            error.message = Some("Completed must be true or false".into());
            Err(error)
        }
    }
}

/// Loads a task and checks it belongs to the session user
async fn owned_task(
    state: &AppState,
    user: &CurrentUser,
    raw_id: &str,
    action: &str,
) -> ApiResult<Task> {
    let task_id = parse_id(raw_id, "Task")?;
    let task = state
        .store
        .find_task(task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    ensure_owner(task.owner_id, user, &format!("{} task {}", action, task.id))?;
    Ok(task)
}

fn task_data(task: &Task) -> Option<serde_json::Value> {
    Some(serde_json::json!({ "task": task }))
}

/// Create a task
///
/// # Endpoint
///
/// ```text
/// POST /v1/tasks
/// Content-Type: application/x-www-form-urlencoded
///
/// csrf=...&title=Write+copy&sectionId=<uuid>&ownerId=<uuid>
/// ```
///
/// The task joins the section's project and sorts after the section's
/// existing tasks.
///
/// # Errors
///
/// - `400` envelope: invalid title
/// - `403 Forbidden`: CSRF check failed, or the section (or `ownerId`) is
///   another user's
/// - `404 Not Found`: section missing
pub async fn create_task(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
    submission: Submission,
) -> ApiResult<ActionResponse> {
    submission.verify_csrf(&jar, state.secrets())?;

    let form = match submission.accept::<CreateTaskForm>() {
        Ok(form) => form,
        Err(reply) => return Ok(reply),
    };

    let section_id = parse_id(&form.section_id, "Section")?;
    let section = state
        .store
        .find_section(section_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Section not found".to_string()))?;

    ensure_owner(section.owner_id, &user, &format!("add tasks to section {}", section.id))?;
    ensure_claimed_owner(form.owner_id.as_deref(), &user)?;

    let task = state
        .store
        .create_task(CreateTask {
            title: form.title,
            owner_id: user.id(),
            section_id: section.id,
            project_id: section.project_id,
        })
        .await?;

    tracing::info!(task_id = %task.id, section_id = %section.id, "Task created");
    Ok(submission.success(task_data(&task)))
}

/// Delete a task
///
/// # Endpoint
///
/// ```text
/// DELETE /v1/tasks
/// Content-Type: application/x-www-form-urlencoded
///
/// csrf=...&taskId=<uuid>
/// ```
///
/// # Errors
///
/// - `403 Forbidden`: CSRF check failed or not the owner
/// - `404 Not Found`: task missing
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
    submission: Submission,
) -> ApiResult<ActionResponse> {
    submission.verify_csrf(&jar, state.secrets())?;

    let form = match submission.accept::<TaskIdForm>() {
        Ok(form) => form,
        Err(reply) => return Ok(reply),
    };

    let task = owned_task(&state, &user, &form.task_id, "delete").await?;

    if !state.store.delete_task(task.id).await? {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    tracing::info!(task_id = %task.id, "Task deleted");
    Ok(submission.success(None))
}

/// Rename a task
///
/// # Endpoint
///
/// ```text
/// PUT /v1/tasks/title
/// Content-Type: application/x-www-form-urlencoded
///
/// csrf=...&taskId=<uuid>&title=Rewrite+copy
/// ```
///
/// # Errors
///
/// - `400` envelope: title empty or longer than 32 characters
/// - `403 Forbidden`: CSRF check failed or not the owner
/// - `404 Not Found`: task missing
pub async fn edit_task_title(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
    submission: Submission,
) -> ApiResult<ActionResponse> {
    submission.verify_csrf(&jar, state.secrets())?;

    let form = match submission.accept::<EditTaskTitleForm>() {
        Ok(form) => form,
        Err(reply) => return Ok(reply),
    };

    let task = owned_task(&state, &user, &form.task_id, "edit").await?;

    let updated = state
        .store
        .rename_task(task.id, &form.title)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(submission.success(task_data(&updated)))
}

/// Set or clear a task description
///
/// # Endpoint
///
/// ```text
/// PUT /v1/tasks/description
/// Content-Type: application/x-www-form-urlencoded
///
/// csrf=...&taskId=<uuid>&description=Blue+or+green
/// ```
///
/// An empty description clears it. Submitting the current value answers
/// `idle` without writing.
///
/// # Errors
///
/// - `400` envelope: description longer than 1000 characters
/// - `403 Forbidden`: CSRF check failed or not the owner
/// - `404 Not Found`: task missing
pub async fn edit_task_description(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
    submission: Submission,
) -> ApiResult<ActionResponse> {
    submission.verify_csrf(&jar, state.secrets())?;

    let form = match submission.accept::<EditTaskDescriptionForm>() {
        Ok(form) => form,
        Err(reply) => return Ok(reply),
    };

    let task = owned_task(&state, &user, &form.task_id, "edit").await?;

    let description = Some(form.description.as_str()).filter(|d| !d.is_empty());
    if description == task.description.as_deref() {
        return Ok(submission.idle());
    }

    let updated = state
        .store
        .set_task_description(task.id, description)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(submission.success(task_data(&updated)))
}

/// Toggle task completion
///
/// # Endpoint
///
/// ```text
/// PUT /v1/tasks/completion
/// Content-Type: application/x-www-form-urlencoded
///
/// csrf=...&taskId=<uuid>&completed=false
/// ```
///
/// `completed` is the state the client currently shows; the task is set to
/// its opposite. Replaying the same submission therefore writes the same
/// value again.
///
/// # Errors
///
/// - `400` envelope: `completed` missing or not `true`/`false`
/// - `403 Forbidden`: CSRF check failed or not the owner
/// - `404 Not Found`: task missing
pub async fn toggle_task_completion(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
    submission: Submission,
) -> ApiResult<ActionResponse> {
    submission.verify_csrf(&jar, state.secrets())?;

    let form = match submission.accept::<ToggleTaskForm>() {
        Ok(form) => form,
        Err(reply) => return Ok(reply),
    };

    let task = owned_task(&state, &user, &form.task_id, "edit").await?;
    let displayed = form.completed == "true";

    let updated = state
        .store
        .set_task_completed(task.id, !displayed)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(submission.success(task_data(&updated)))
}
