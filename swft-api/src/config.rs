/// Configuration management for the API server
///
/// This module loads configuration from environment variables and provides
/// a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `SESSION_SECRET`: Comma-separated signing secrets, each at least 32
///   characters (required). The first one signs new sessions and CSRF
///   cookies; all of them are accepted when verifying.
/// - `APP_ENV`: `production` marks cookies `Secure` and enables HSTS
/// - `CORS_ORIGINS`: Comma-separated allowed origins, `*` for any (default: `*`)
/// - `LOG_FORMAT`: `json` for JSON logs (read in `main`)
/// - `RUST_LOG`: Log filter (default: `swft_api=debug,tower_http=debug`)
///
/// # Example
///
/// ```no_run
/// use swft_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use std::env;

/// Minimum length of each session secret
pub const MIN_SECRET_LEN: usize = 32;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Session and CSRF signing configuration
    pub session: SessionConfig,

    /// Whether the server runs in production
    pub production: bool,

    /// Allowed CORS origins; empty means any origin
    pub cors_origins: Vec<String>,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Signing secrets, primary first
    ///
    /// Rotate by prepending a new secret and dropping the oldest once every
    /// session signed with it has expired.
    pub secrets: Vec<String>,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value does
    /// not parse.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let api_port = env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let session_secret = env::var("SESSION_SECRET")
            .map_err(|_| anyhow::anyhow!("SESSION_SECRET environment variable is required"))?;
        let secrets = parse_secrets(&session_secret)?;

        let production = env::var("APP_ENV")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let cors_origins = parse_origins(&env::var("CORS_ORIGINS").unwrap_or_default());

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            session: SessionConfig { secrets },
            production,
            cors_origins,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

/// Splits `SESSION_SECRET` into its secrets
pub fn parse_secrets(raw: &str) -> anyhow::Result<Vec<String>> {
    let secrets: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if secrets.is_empty() {
        anyhow::bail!("SESSION_SECRET must contain at least one secret");
    }
    if secrets.iter().any(|s| s.len() < MIN_SECRET_LEN) {
        anyhow::bail!(
            "Each SESSION_SECRET entry must be at least {} characters long",
            MIN_SECRET_LEN
        );
    }

    Ok(secrets)
}

/// Splits `CORS_ORIGINS`; `*` or an empty value allows any origin
pub fn parse_origins(raw: &str) -> Vec<String> {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if origins.iter().any(|o| o == "*") {
        Vec::new()
    } else {
        origins
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_bind_address() {
        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/test".to_string(),
                max_connections: 10,
            },
            session: SessionConfig {
                secrets: vec![SECRET.to_string()],
            },
            production: false,
            cors_origins: Vec::new(),
        };

        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_parse_secrets() {
        let raw = format!("{} , {}-old", SECRET, SECRET);
        let secrets = parse_secrets(&raw).unwrap();

        assert_eq!(secrets.len(), 2);
        assert_eq!(secrets[0], SECRET);
        assert_eq!(secrets[1], format!("{}-old", SECRET));
    }

    #[test]
    fn test_parse_secrets_rejects_short_or_empty() {
        assert!(parse_secrets("").is_err());
        assert!(parse_secrets(" , ").is_err());
        assert!(parse_secrets(&format!("{},short", SECRET)).is_err());
    }

    #[test]
    fn test_parse_origins() {
        assert!(parse_origins("").is_empty());
        assert!(parse_origins("*").is_empty());
        assert_eq!(
            parse_origins("https://swft.app, http://localhost:3000"),
            vec!["https://swft.app", "http://localhost:3000"]
        );
    }
}
