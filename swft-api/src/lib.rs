//! # SWFT API Server Library
//!
//! Core of the SWFT API server: a form-driven JSON API for users, projects,
//! sections and tasks.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `cookies`: Session and CSRF cookie builders
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Security headers and session authentication
//! - `routes`: API route handlers
//! - `submission`: Form parsing and the action response envelope

pub mod app;
pub mod config;
pub mod cookies;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod submission;
