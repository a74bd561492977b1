//! # SWFT Shared Library
//!
//! Types, storage and auth primitives used by the SWFT API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their SQL
//! - `store`: Storage trait with PostgreSQL and in-memory implementations
//! - `db`: Connection pool and migrations
//! - `auth`: Password hashing, session tokens, CSRF tokens
//! - `board`: Project board, optimistic view and inline edit state

pub mod auth;
pub mod board;
pub mod db;
pub mod models;
pub mod store;

/// Current version of the SWFT shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
