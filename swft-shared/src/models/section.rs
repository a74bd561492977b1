/// Section model and database operations
///
/// Sections are ordered columns within a project ("To do", "Backlog", ...).
/// New sections are appended: their position is one past the highest
/// position already used in the project.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE sections (
///     id UUID PRIMARY KEY,
///     title VARCHAR(32) NOT NULL,
///     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     position INTEGER NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Tasks reference their section with `ON DELETE CASCADE`, so deleting a
/// section removes its tasks in the same statement.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Title written when a section is renamed to an empty string
pub const UNTITLED_SECTION: &str = "Untitled section";

/// Ordered grouping of tasks within a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: Uuid,
    pub title: String,
    pub owner_id: Uuid,
    pub project_id: Uuid,

    /// 0-based order within the project
    #[serde(rename = "order")]
    pub position: i32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a section
#[derive(Debug, Clone)]
pub struct CreateSection {
    pub title: String,
    pub owner_id: Uuid,
    pub project_id: Uuid,
}

const SECTION_COLUMNS: &str =
    "id, title, owner_id, project_id, position, created_at, updated_at";

impl Section {
    /// Creates a section at the end of its project
    pub async fn create(pool: &PgPool, data: CreateSection) -> Result<Self, sqlx::Error> {
        let section = sqlx::query_as::<_, Section>(&format!(
            r#"
            INSERT INTO sections (id, title, owner_id, project_id, position)
            SELECT $1, $2, $3, $4, COALESCE(MAX(position) + 1, 0)
            FROM sections
            WHERE project_id = $4
            RETURNING {SECTION_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(data.title)
        .bind(data.owner_id)
        .bind(data.project_id)
        .fetch_one(pool)
        .await?;

        Ok(section)
    }

    /// Finds a section by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let section = sqlx::query_as::<_, Section>(&format!(
            "SELECT {SECTION_COLUMNS} FROM sections WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(section)
    }

    /// Lists a project's sections in display order
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let sections = sqlx::query_as::<_, Section>(&format!(
            r#"
            SELECT {SECTION_COLUMNS}
            FROM sections
            WHERE project_id = $1
            ORDER BY position ASC, created_at ASC
            "#
        ))
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(sections)
    }

    /// Renames a section
    ///
    /// Returns the updated section, or None if it doesn't exist.
    pub async fn update_title(
        pool: &PgPool,
        id: Uuid,
        title: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let section = sqlx::query_as::<_, Section>(&format!(
            r#"
            UPDATE sections
            SET title = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {SECTION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(title)
        .fetch_optional(pool)
        .await?;

        Ok(section)
    }

    /// Deletes a section together with its tasks
    ///
    /// Returns true if the section existed.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sections WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
