/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use swft_api::{app::{build_router, AppState}, config::Config};
/// use swft_shared::store::memory::MemoryStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(Arc::new(MemoryStore::new()), config);
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    error::ApiError,
    middleware::{security::SecurityHeadersLayer, session::require_session},
    routes,
};
use axum::{
    http::{header, HeaderValue, Method},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use std::{any::Any, sync::Arc};
use swft_shared::store::Store;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned into each handler via Axum's `State` extractor; both fields are
/// behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Persistence backend
    pub store: Arc<dyn Store>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    /// Session and CSRF signing secrets, primary first
    pub fn secrets(&self) -> &[String] {
        &self.config.session.secrets
    }

    /// Whether cookies get the `Secure` attribute
    pub fn secure_cookies(&self) -> bool {
        self.config.production
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET /health                                  # public
/// └── /v1/
///     ├── GET  /csrf                               # public, issues CSRF cookie
///     ├── /auth/
///     │   ├── POST /signup                         # public, CSRF
///     │   ├── POST /login                          # public, CSRF
///     │   └── POST /logout                         # public, CSRF
///     ├── GET  /users/:username                    # public profile
///     ├── GET  /users/:username/projects/:id       # public board
///     ├── GET  /me                                 # session
///     ├── POST /projects                           # session, CSRF
///     ├── /sections                                # session, CSRF
///     │   ├── POST   /
///     │   ├── DELETE /
///     │   └── PUT    /title
///     └── /tasks                                   # session, CSRF
///         ├── POST   /
///         ├── DELETE /
///         ├── PUT    /title
///         ├── PUT    /description
///         └── PUT    /completion
/// ```
///
/// Anything else is a 404 JSON error.
///
/// # Middleware Stack
///
/// Applied in order (outermost first):
/// 1. Panic catching (generic 500 body)
/// 2. Security headers
/// 3. CORS
/// 4. Logging (tower-http TraceLayer)
/// 5. Session authentication (protected routes only)
pub fn build_router(state: AppState) -> Router {
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/signup", post(routes::auth::signup))
        .route("/login", post(routes::auth::login))
        .route("/logout", post(routes::auth::logout));

    let public_routes = Router::new()
        .route("/csrf", get(routes::csrf::issue_token))
        .route("/users/:username", get(routes::users::profile))
        .route(
            "/users/:username/projects/:project_id",
            get(routes::users::project_board),
        )
        .nest("/auth", auth_routes);

    let section_routes = Router::new()
        .route(
            "/",
            post(routes::sections::create_section).delete(routes::sections::delete_section),
        )
        .route("/title", put(routes::sections::edit_section_title));

    let task_routes = Router::new()
        .route(
            "/",
            post(routes::tasks::create_task).delete(routes::tasks::delete_task),
        )
        .route("/title", put(routes::tasks::edit_task_title))
        .route("/description", put(routes::tasks::edit_task_description))
        .route("/completion", put(routes::tasks::toggle_task_completion));

    // route_layer so unknown paths still fall through to the 404 handler
    let protected_routes = Router::new()
        .route("/me", get(routes::auth::me))
        .route("/projects", post(routes::projects::create_project))
        .nest("/sections", section_routes)
        .nest("/tasks", task_routes)
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    let v1_routes = Router::new().merge(public_routes).merge(protected_routes);

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .fallback(not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .layer(SecurityHeadersLayer::new(state.config.production))
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

/// Permissive CORS when no origins are configured, otherwise an allow-list
/// with credentials so the session cookie travels
fn cors_layer(config: &Config) -> CorsLayer {
    if config.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");

    ApiError::InternalError(format!("Handler panicked: {}", detail)).into_response()
}
