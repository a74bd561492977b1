/// Public loaders
///
/// # Endpoints
///
/// - `GET /v1/users/:username` - Profile: owner and their projects
/// - `GET /v1/users/:username/projects/:project_id` - Project board

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use swft_shared::{
    board::Board,
    models::{project::Project, user::UserSummary},
};
use uuid::Uuid;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};

/// Profile response
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub owner: UserSummary,
    pub projects: Vec<Project>,
}

/// User profile
///
/// # Response
///
/// ```json
/// {
///   "owner": { "id": "uuid", "name": "Ada Lovelace", "username": "ada" },
///   "projects": [{ "id": "uuid", "title": "Launch", "ownerId": "uuid", ... }]
/// }
/// ```
///
/// # Errors
///
/// - `404 Not Found`: unknown username
pub async fn profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Json<ProfileResponse>> {
    let owner = state
        .store
        .find_user_by_username(&username)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let projects = state.store.list_projects(owner.id).await?;

    Ok(Json(ProfileResponse {
        owner: UserSummary::from(&owner),
        projects,
    }))
}

/// Project board
///
/// Sections come back in order, each with its tasks in creation order.
///
/// # Response
///
/// ```json
/// {
///   "owner": { "id": "uuid", "name": "Ada Lovelace", "username": "ada" },
///   "project": { "id": "uuid", "title": "Launch", ... },
///   "sections": [
///     { "id": "uuid", "title": "To do", "order": 0, ..., "tasks": [ ... ] }
///   ]
/// }
/// ```
///
/// # Errors
///
/// - `404 Not Found`: unknown user or project, or the project belongs to
///   someone else
pub async fn project_board(
    State(state): State<AppState>,
    Path((username, project_id)): Path<(String, String)>,
) -> ApiResult<Json<Board>> {
    let not_found = || ApiError::NotFound("Project not found".to_string());

    let owner = state
        .store
        .find_user_by_username(&username)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let project_id = Uuid::parse_str(&project_id).map_err(|_| not_found())?;
    let project = state
        .store
        .find_project(project_id)
        .await?
        .filter(|p| p.owner_id == owner.id)
        .ok_or_else(not_found)?;

    let sections = state.store.list_sections(project.id).await?;
    let tasks = state.store.list_tasks(project.id).await?;

    Ok(Json(Board::from_parts(
        UserSummary::from(&owner),
        project,
        sections,
        tasks,
    )))
}
