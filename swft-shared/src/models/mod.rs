/// Database models for SWFT
///
/// Each model owns its SQL and exposes async CRUD helpers over a `PgPool`.
/// Handlers don't call these directly; they go through the
/// [`Store`](crate::store::Store) trait, whose PostgreSQL implementation
/// delegates here.
///
/// # Models
///
/// - `user`: Accounts (email, username, Argon2id password hash)
/// - `project`: Projects owned by a user
/// - `section`: Ordered sections within a project
/// - `task`: Tasks within a section

pub mod project;
pub mod section;
pub mod task;
pub mod user;
