/// PostgreSQL plumbing
///
/// - `pool`: connection pool creation, health check and shutdown
/// - `migrations`: embedded schema migrations
///
/// Row-level queries live on the models; handlers reach them through
/// [`crate::store::PgStore`].

pub mod migrations;
pub mod pool;
