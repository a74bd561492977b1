/// PostgreSQL-backed store
///
/// Thin adapter from the [`Store`] trait onto the sqlx models. Unique
/// constraint violations on `users` are reported as
/// [`StoreError::Conflict`] naming the offending field.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::db::pool::health_check;
use crate::models::{
    project::{CreateProject, Project},
    section::{CreateSection, Section},
    task::{CreateTask, Task},
    user::{CreateUser, User},
};

/// Store backed by a PostgreSQL connection pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying pool, for migrations and shutdown
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Maps unique violations on user columns to `Conflict`
fn map_user_conflict(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        if let Some(constraint) = db_err.constraint() {
            if constraint.contains("email") {
                return StoreError::Conflict("email".to_string());
            }
            if constraint.contains("username") {
                return StoreError::Conflict("username".to_string());
            }
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        health_check(&self.pool).await?;
        Ok(())
    }

    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        User::create(&self.pool, data)
            .await
            .map_err(map_user_conflict)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_username(&self.pool, username).await?)
    }

    async fn create_project(&self, data: CreateProject) -> StoreResult<Project> {
        Ok(Project::create(&self.pool, data).await?)
    }

    async fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        Ok(Project::find_by_id(&self.pool, id).await?)
    }

    async fn list_projects(&self, owner_id: Uuid) -> StoreResult<Vec<Project>> {
        Ok(Project::list_by_owner(&self.pool, owner_id).await?)
    }

    async fn create_section(&self, data: CreateSection) -> StoreResult<Section> {
        Ok(Section::create(&self.pool, data).await?)
    }

    async fn find_section(&self, id: Uuid) -> StoreResult<Option<Section>> {
        Ok(Section::find_by_id(&self.pool, id).await?)
    }

    async fn list_sections(&self, project_id: Uuid) -> StoreResult<Vec<Section>> {
        Ok(Section::list_by_project(&self.pool, project_id).await?)
    }

    async fn rename_section(&self, id: Uuid, title: &str) -> StoreResult<Option<Section>> {
        Ok(Section::update_title(&self.pool, id, title).await?)
    }

    async fn delete_section(&self, id: Uuid) -> StoreResult<bool> {
        Ok(Section::delete(&self.pool, id).await?)
    }

    async fn create_task(&self, data: CreateTask) -> StoreResult<Task> {
        Ok(Task::create(&self.pool, data).await?)
    }

    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        Ok(Task::find_by_id(&self.pool, id).await?)
    }

    async fn list_tasks(&self, project_id: Uuid) -> StoreResult<Vec<Task>> {
        Ok(Task::list_by_project(&self.pool, project_id).await?)
    }

    async fn rename_task(&self, id: Uuid, title: &str) -> StoreResult<Option<Task>> {
        Ok(Task::update_title(&self.pool, id, title).await?)
    }

    async fn set_task_description(
        &self,
        id: Uuid,
        description: Option<&str>,
    ) -> StoreResult<Option<Task>> {
        Ok(Task::update_description(&self.pool, id, description).await?)
    }

    async fn set_task_completed(&self, id: Uuid, completed: bool) -> StoreResult<Option<Task>> {
        Ok(Task::set_completed(&self.pool, id, completed).await?)
    }

    async fn delete_task(&self, id: Uuid) -> StoreResult<bool> {
        Ok(Task::delete(&self.pool, id).await?)
    }
}
