/// In-memory store
///
/// Keeps every table in a `Vec` behind one `tokio::sync::RwLock`. Rows stay
/// in insertion order, which doubles as creation order for tasks. Used by
/// the API integration tests and for running the server without a database.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::models::{
    project::{CreateProject, Project},
    section::{CreateSection, Section},
    task::{CreateTask, Task},
    user::{CreateUser, User},
};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    projects: Vec<Project>,
    sections: Vec<Section>,
    tasks: Vec<Task>,
}

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of task rows, across all projects
    pub async fn task_count(&self) -> usize {
        self.tables.read().await.tasks.len()
    }

    /// Total number of section rows, across all projects
    pub async fn section_count(&self) -> usize {
        self.tables.read().await.sections.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        let email = data.email.to_lowercase();

        if tables.users.iter().any(|u| u.email == email) {
            return Err(StoreError::Conflict("email".to_string()));
        }
        if tables.users.iter().any(|u| u.username == data.username) {
            return Err(StoreError::Conflict("username".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email,
            username: data.username,
            name: data.name,
            password_hash: data.password_hash,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let email = email.to_lowercase();
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn create_project(&self, data: CreateProject) -> StoreResult<Project> {
        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            title: data.title,
            owner_id: data.owner_id,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.projects.push(project.clone());
        Ok(project)
    }

    async fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        let tables = self.tables.read().await;
        Ok(tables.projects.iter().find(|p| p.id == id).cloned())
    }

    async fn list_projects(&self, owner_id: Uuid) -> StoreResult<Vec<Project>> {
        let tables = self.tables.read().await;
        Ok(tables
            .projects
            .iter()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn create_section(&self, data: CreateSection) -> StoreResult<Section> {
        let mut tables = self.tables.write().await;
        let position = tables
            .sections
            .iter()
            .filter(|s| s.project_id == data.project_id)
            .map(|s| s.position + 1)
            .max()
            .unwrap_or(0);

        let now = Utc::now();
        let section = Section {
            id: Uuid::new_v4(),
            title: data.title,
            owner_id: data.owner_id,
            project_id: data.project_id,
            position,
            created_at: now,
            updated_at: now,
        };
        tables.sections.push(section.clone());
        Ok(section)
    }

    async fn find_section(&self, id: Uuid) -> StoreResult<Option<Section>> {
        let tables = self.tables.read().await;
        Ok(tables.sections.iter().find(|s| s.id == id).cloned())
    }

    async fn list_sections(&self, project_id: Uuid) -> StoreResult<Vec<Section>> {
        let tables = self.tables.read().await;
        let mut sections: Vec<Section> = tables
            .sections
            .iter()
            .filter(|s| s.project_id == project_id)
            .cloned()
            .collect();
        // stable sort keeps insertion order among equal positions
        sections.sort_by_key(|s| s.position);
        Ok(sections)
    }

    async fn rename_section(&self, id: Uuid, title: &str) -> StoreResult<Option<Section>> {
        let mut tables = self.tables.write().await;
        Ok(tables.sections.iter_mut().find(|s| s.id == id).map(|section| {
            section.title = title.to_string();
            section.updated_at = Utc::now();
            section.clone()
        }))
    }

    async fn delete_section(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.sections.len();
        tables.sections.retain(|s| s.id != id);
        if tables.sections.len() == before {
            return Ok(false);
        }
        tables.tasks.retain(|t| t.section_id != id);
        Ok(true)
    }

    async fn create_task(&self, data: CreateTask) -> StoreResult<Task> {
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            title: data.title,
            description: None,
            completed: false,
            owner_id: data.owner_id,
            section_id: data.section_id,
            project_id: data.project_id,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.tasks.push(task.clone());
        Ok(task)
    }

    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        let tables = self.tables.read().await;
        Ok(tables.tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn list_tasks(&self, project_id: Uuid) -> StoreResult<Vec<Task>> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .iter()
            .filter(|t| t.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn rename_task(&self, id: Uuid, title: &str) -> StoreResult<Option<Task>> {
        self.update_task(id, |task| task.title = title.to_string())
            .await
    }

    async fn set_task_description(
        &self,
        id: Uuid,
        description: Option<&str>,
    ) -> StoreResult<Option<Task>> {
        self.update_task(id, |task| task.description = description.map(str::to_string))
            .await
    }

    async fn set_task_completed(&self, id: Uuid, completed: bool) -> StoreResult<Option<Task>> {
        self.update_task(id, |task| task.completed = completed)
            .await
    }

    async fn delete_task(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.tasks.iter().position(|t| t.id == id) {
            Some(index) => {
                tables.tasks.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl MemoryStore {
    async fn update_task<F>(&self, id: Uuid, apply: F) -> StoreResult<Option<Task>>
    where
        F: FnOnce(&mut Task) + Send,
    {
        let mut tables = self.tables.write().await;
        Ok(tables.tasks.iter_mut().find(|t| t.id == id).map(|task| {
            apply(task);
            task.updated_at = Utc::now();
            task.clone()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> (MemoryStore, User, Project) {
        let store = MemoryStore::new();
        let user = store
            .create_user(CreateUser {
                email: "Ada@Example.com".to_string(),
                username: "ada".to_string(),
                name: "Ada".to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap();
        let project = store
            .create_project(CreateProject {
                title: "Launch".to_string(),
                owner_id: user.id,
            })
            .await
            .unwrap();
        (store, user, project)
    }

    async fn add_section(store: &MemoryStore, user: &User, project: &Project, title: &str) -> Section {
        store
            .create_section(CreateSection {
                title: title.to_string(),
                owner_id: user.id,
                project_id: project.id,
            })
            .await
            .unwrap()
    }

    async fn add_task(store: &MemoryStore, section: &Section, title: &str) -> Task {
        store
            .create_task(CreateTask {
                title: title.to_string(),
                owner_id: section.owner_id,
                section_id: section.id,
                project_id: section.project_id,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_email_is_lowercased_and_unique() {
        let (store, user, _) = seeded().await;
        assert_eq!(user.email, "ada@example.com");

        let found = store.find_user_by_email("ADA@example.COM").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));

        let duplicate = store
            .create_user(CreateUser {
                email: "ada@example.com".to_string(),
                username: "other".to_string(),
                name: "Other".to_string(),
                password_hash: "hash".to_string(),
            })
            .await;
        assert!(matches!(duplicate, Err(StoreError::Conflict(field)) if field == "email"));
    }

    #[tokio::test]
    async fn test_username_is_unique() {
        let (store, _, _) = seeded().await;

        let duplicate = store
            .create_user(CreateUser {
                email: "grace@example.com".to_string(),
                username: "ada".to_string(),
                name: "Grace".to_string(),
                password_hash: "hash".to_string(),
            })
            .await;
        assert!(matches!(duplicate, Err(StoreError::Conflict(field)) if field == "username"));
    }

    #[tokio::test]
    async fn test_sections_are_appended_in_order() {
        let (store, user, project) = seeded().await;

        let todo = add_section(&store, &user, &project, "To do").await;
        let doing = add_section(&store, &user, &project, "Doing").await;
        assert_eq!(todo.position, 0);
        assert_eq!(doing.position, 1);

        let titles: Vec<String> = store
            .list_sections(project.id)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.title)
            .collect();
        assert_eq!(titles, vec!["To do", "Doing"]);
    }

    #[tokio::test]
    async fn test_delete_section_removes_its_tasks_only() {
        let (store, user, project) = seeded().await;
        let todo = add_section(&store, &user, &project, "To do").await;
        let done = add_section(&store, &user, &project, "Done").await;
        add_task(&store, &todo, "one").await;
        add_task(&store, &todo, "two").await;
        let kept = add_task(&store, &done, "three").await;

        assert!(store.delete_section(todo.id).await.unwrap());

        let remaining = store.list_tasks(project.id).await.unwrap();
        assert_eq!(remaining, vec![kept]);
        assert!(!store.delete_section(todo.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_task_removes_exactly_one_row() {
        let (store, user, project) = seeded().await;
        let section = add_section(&store, &user, &project, "To do").await;
        let first = add_task(&store, &section, "one").await;
        add_task(&store, &section, "two").await;

        assert!(store.delete_task(first.id).await.unwrap());
        assert_eq!(store.task_count().await, 1);
        assert!(!store.delete_task(first.id).await.unwrap());
        assert_eq!(store.task_count().await, 1);
    }

    #[tokio::test]
    async fn test_task_updates() {
        let (store, user, project) = seeded().await;
        let section = add_section(&store, &user, &project, "To do").await;
        let task = add_task(&store, &section, "draft").await;

        let renamed = store.rename_task(task.id, "final").await.unwrap().unwrap();
        assert_eq!(renamed.title, "final");

        let described = store
            .set_task_description(task.id, Some("notes"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(described.description.as_deref(), Some("notes"));

        let cleared = store.set_task_description(task.id, None).await.unwrap().unwrap();
        assert!(cleared.description.is_none());

        let completed = store.set_task_completed(task.id, true).await.unwrap().unwrap();
        assert!(completed.completed);

        assert!(store.rename_task(Uuid::new_v4(), "x").await.unwrap().is_none());
    }
}
