#![allow(dead_code)]

//! Common test utilities for integration tests
//!
//! Every test gets its own router over a fresh in-memory store, a logged-in
//! user and a CSRF token/cookie pair. Helpers build form-encoded requests
//! carrying those cookies and decode JSON responses.

use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use swft_api::app::{build_router, AppState};
use swft_api::config::{ApiConfig, Config, DatabaseConfig, SessionConfig};
use swft_shared::auth::{csrf, password::hash_password, session::create_session_token};
use swft_shared::models::{
    project::{CreateProject, Project},
    section::{CreateSection, Section},
    task::{CreateTask, Task},
    user::{CreateUser, User},
};
use swft_shared::store::{memory::MemoryStore, Store};
use tower::Service as _;

pub const SECRET: &str = "integration-test-secret-32-bytes-long!";
pub const PASSWORD: &str = "hunter22";

/// Test context containing all necessary resources
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub app: axum::Router,
    pub config: Config,
    pub user: User,
    pub session: String,
    pub csrf_token: String,
    pub csrf_cookie: String,
}

pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database: DatabaseConfig {
            url: "postgresql://unused".to_string(),
            max_connections: 1,
        },
        session: SessionConfig {
            secrets: vec![SECRET.to_string()],
        },
        production: false,
        cors_origins: Vec::new(),
    }
}

impl TestContext {
    pub async fn new() -> Self {
        let config = test_config();
        let store = Arc::new(MemoryStore::new());

        let state = AppState::new(store.clone(), config.clone());
        let app = build_router(state);

        let (user, session) = register(&store, &config, "ada").await;

        let csrf_token = csrf::generate_token();
        let csrf_cookie = csrf::sign_token(&csrf_token, &config.session.secrets).unwrap();

        TestContext {
            store,
            app,
            config,
            user,
            session,
            csrf_token,
            csrf_cookie,
        }
    }

    /// Registers another user and signs a session for them
    pub async fn create_user(&self, username: &str) -> (User, String) {
        register(&self.store, &self.config, username).await
    }

    pub async fn project(&self, owner: &User, title: &str) -> Project {
        self.store
            .create_project(CreateProject {
                title: title.to_string(),
                owner_id: owner.id,
            })
            .await
            .unwrap()
    }

    pub async fn section(&self, project: &Project, title: &str) -> Section {
        self.store
            .create_section(CreateSection {
                title: title.to_string(),
                owner_id: project.owner_id,
                project_id: project.id,
            })
            .await
            .unwrap()
    }

    pub async fn task(&self, section: &Section, title: &str) -> Task {
        self.store
            .create_task(CreateTask {
                title: title.to_string(),
                owner_id: section.owner_id,
                section_id: section.id,
                project_id: section.project_id,
            })
            .await
            .unwrap()
    }

    /// Cookie header with the given session and the context's CSRF cookie
    pub fn cookies(&self, session: Option<&str>) -> String {
        match session {
            Some(session) => format!("__session={}; csrf={}", session, self.csrf_cookie),
            None => format!("csrf={}", self.csrf_cookie),
        }
    }

    /// Form action as the context user, with a valid CSRF token
    pub async fn action(&self, method: Method, uri: &str, fields: &[(&str, &str)]) -> (StatusCode, Value) {
        self.action_as(&self.session, method, uri, fields).await
    }

    /// Form action as another session, with a valid CSRF token
    pub async fn action_as(
        &self,
        session: &str,
        method: Method,
        uri: &str,
        fields: &[(&str, &str)],
    ) -> (StatusCode, Value) {
        let mut all = vec![("csrf", self.csrf_token.as_str())];
        all.extend_from_slice(fields);

        let request = form_request(method, uri, Some(self.cookies(Some(session))), &all);
        let (status, body, _) = self.send(request).await;
        (status, body)
    }

    pub async fn get(&self, uri: &str, cookie: Option<String>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(Method::GET).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let (status, body, _) = self.send(builder.body(Body::empty()).unwrap()).await;
        (status, body)
    }

    /// Runs a request through the router, returning status, JSON body and headers
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value, HeaderMap) {
        let response = self.app.clone().call(request).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or_else(|_| {
                panic!("Non-JSON body ({}): {}", status, String::from_utf8_lossy(&body))
            })
        };

        (status, json, headers)
    }
}

/// Inserts a user with [`PASSWORD`] straight into the store
async fn register(store: &MemoryStore, config: &Config, username: &str) -> (User, String) {
    let user = store
        .create_user(CreateUser {
            email: format!("{}@example.com", username),
            username: username.to_string(),
            name: format!("{} Test", username),
            password_hash: hash_password(PASSWORD).unwrap(),
        })
        .await
        .unwrap();
    let session = create_session_token(user.id, &config.session.secrets).unwrap();
    (user, session)
}

/// Builds a form-encoded request
pub fn form_request(
    method: Method,
    uri: &str,
    cookie: Option<String>,
    fields: &[(&str, &str)],
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(encode_form(fields))).unwrap()
}

pub fn encode_form(fields: &[(&str, &str)]) -> String {
    serde_urlencoded::to_string(fields).unwrap()
}

/// Every `Set-Cookie` header value
pub fn set_cookies(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

/// Value of the named cookie among `Set-Cookie` headers
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    set_cookies(headers).into_iter().find_map(|c| {
        let pair = c.split(';').next()?;
        let (n, v) = pair.split_once('=')?;
        (n.trim() == name).then(|| v.trim().to_string())
    })
}
