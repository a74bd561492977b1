/// Middleware for the API server
///
/// - `security`: security response headers
/// - `session`: session cookie authentication for protected routes

pub mod security;
pub mod session;
