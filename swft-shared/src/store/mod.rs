/// Storage abstraction for SWFT
///
/// Route handlers depend on the [`Store`] trait rather than on a concrete
/// database, so the same handlers run against PostgreSQL in production and
/// against an in-memory store in tests and local demos.
///
/// # Implementations
///
/// - [`postgres::PgStore`]: sqlx/PostgreSQL, delegating to the `models` module
/// - [`memory::MemoryStore`]: process-local tables behind a `tokio::sync::RwLock`
///
/// # Contract
///
/// - Every method performs at most one write
/// - Lookups return `Ok(None)` for missing rows; they never error on absence
/// - Update and delete methods report whether the row existed
/// - Deleting a section deletes the tasks in it
/// - Sections are listed by position, tasks by creation order
///
/// # Example
///
/// ```
/// use swft_shared::store::{memory::MemoryStore, Store};
/// use swft_shared::models::project::CreateProject;
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// let project = store.create_project(CreateProject {
///     title: "Launch".to_string(),
///     owner_id: Uuid::new_v4(),
/// }).await?;
///
/// assert!(store.find_project(project.id).await?.is_some());
/// # Ok(())
/// # }
/// ```

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    project::{CreateProject, Project},
    section::{CreateSection, Section},
    task::{CreateTask, Task},
    user::{CreateUser, User},
};

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique field is already taken (the payload names the field)
    #[error("Conflict on {0}")]
    Conflict(String),

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// Typed CRUD access to users, projects, sections and tasks
#[async_trait]
pub trait Store: Send + Sync {
    /// Checks that the backing storage is reachable
    async fn ping(&self) -> StoreResult<()>;

    /// Creates a user; fails with `Conflict("email")` or `Conflict("username")`
    async fn create_user(&self, data: CreateUser) -> StoreResult<User>;

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    async fn create_project(&self, data: CreateProject) -> StoreResult<Project>;

    async fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>>;

    async fn list_projects(&self, owner_id: Uuid) -> StoreResult<Vec<Project>>;

    /// Appends a section to its project
    async fn create_section(&self, data: CreateSection) -> StoreResult<Section>;

    async fn find_section(&self, id: Uuid) -> StoreResult<Option<Section>>;

    async fn list_sections(&self, project_id: Uuid) -> StoreResult<Vec<Section>>;

    async fn rename_section(&self, id: Uuid, title: &str) -> StoreResult<Option<Section>>;

    /// Deletes a section and its tasks
    async fn delete_section(&self, id: Uuid) -> StoreResult<bool>;

    async fn create_task(&self, data: CreateTask) -> StoreResult<Task>;

    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>>;

    async fn list_tasks(&self, project_id: Uuid) -> StoreResult<Vec<Task>>;

    async fn rename_task(&self, id: Uuid, title: &str) -> StoreResult<Option<Task>>;

    async fn set_task_description(
        &self,
        id: Uuid,
        description: Option<&str>,
    ) -> StoreResult<Option<Task>>;

    async fn set_task_completed(&self, id: Uuid, completed: bool) -> StoreResult<Option<Task>>;

    /// Deletes exactly one task
    async fn delete_task(&self, id: Uuid) -> StoreResult<bool>;
}
