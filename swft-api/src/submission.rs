/// Form submissions and the action response envelope
///
/// Every mutating route receives a form-encoded body and answers with:
///
/// ```json
/// {
///   "status": "success" | "error" | "idle",
///   "submission": {
///     "intent": "submit",
///     "payload": { "title": "Backlog", "projectId": "..." },
///     "error": { "title": ["Title must be at most 32 characters"] }
///   },
///   "data": { ... }
/// }
/// ```
///
/// Handlers take [`Submission`] as an extractor. A body that is missing or
/// not form-encoded reads as an empty form, so it fails the CSRF check with
/// a 403 like any other tokenless request.
///
/// The `csrf` and `intent` fields are split off before parsing. An intent
/// other than `submit` (for example `validate/title`) only validates, and the
/// reply is `idle` whatever the outcome. Form-level errors are stored under
/// the empty key. `payload` never contains the password.
///
/// | status    | HTTP |
/// |-----------|------|
/// | `success` | 200  |
/// | `idle`    | 200  |
/// | `error`   | 400  |

use std::collections::{BTreeMap, HashMap};
use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Form, Json,
};
use axum_extra::extract::CookieJar;
use serde::{de::DeserializeOwned, Serialize};
use swft_shared::auth::csrf::{self, CSRF_COOKIE, CSRF_FIELD};
use validator::{Validate, ValidationErrors};

use crate::error::ApiResult;

/// Intent that performs the write
pub const SUBMIT_INTENT: &str = "submit";

const INTENT_FIELD: &str = "intent";

/// Fields never echoed back
const SECRET_FIELDS: &[&str] = &["password"];

/// Field name → messages; `""` holds form-level errors
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Outcome of an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Success,
    Error,
    Idle,
}

impl SubmissionStatus {
    pub fn status_code(self) -> StatusCode {
        match self {
            SubmissionStatus::Success | SubmissionStatus::Idle => StatusCode::OK,
            SubmissionStatus::Error => StatusCode::BAD_REQUEST,
        }
    }
}

/// Echo of what was submitted
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionReport {
    pub intent: String,
    pub payload: BTreeMap<String, String>,
    pub error: FieldErrors,
}

/// JSON reply of every mutating route
#[derive(Debug, Clone, Serialize)]
pub struct ActionResponse {
    pub status: SubmissionStatus,
    pub submission: SubmissionReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl IntoResponse for ActionResponse {
    fn into_response(self) -> Response {
        (self.status.status_code(), Json(self)).into_response()
    }
}

/// A parsed form body
#[derive(Debug, Clone)]
pub struct Submission {
    intent: String,
    csrf: Option<String>,
    fields: HashMap<String, String>,
}

impl Submission {
    /// Splits the CSRF token and intent off the raw form fields
    pub fn from_fields(mut fields: HashMap<String, String>) -> Self {
        let csrf = fields.remove(CSRF_FIELD);
        let intent = fields
            .remove(INTENT_FIELD)
            .filter(|i| !i.is_empty())
            .unwrap_or_else(|| SUBMIT_INTENT.to_string());

        Self {
            intent,
            csrf,
            fields,
        }
    }

    pub fn intent(&self) -> &str {
        &self.intent
    }

    pub fn is_submit(&self) -> bool {
        self.intent == SUBMIT_INTENT
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Checks the form token against the signed `csrf` cookie
    pub fn verify_csrf(&self, jar: &CookieJar, secrets: &[String]) -> ApiResult<()> {
        let cookie = jar.get(CSRF_COOKIE).map(|c| c.value());

        csrf::validate(cookie, self.csrf.as_deref(), secrets).map_err(|e| {
            tracing::warn!(error = %e, intent = %self.intent, "CSRF validation failed");
            e.into()
        })
    }

    /// Parses and validates the form
    ///
    /// Returns the ready-made reply when the action must stop here: `idle`
    /// for a non-submit intent, `error` for a submit with invalid fields.
    pub fn accept<T>(&self) -> Result<T, ActionResponse>
    where
        T: DeserializeOwned + Validate,
    {
        let parsed = self.parse::<T>();

        match parsed {
            Ok(form) if self.is_submit() => Ok(form),
            Ok(_) => Err(self.reply(SubmissionStatus::Idle, FieldErrors::new(), None)),
            Err(errors) if self.is_submit() => Err(self.reply(SubmissionStatus::Error, errors, None)),
            Err(errors) => Err(self.reply(SubmissionStatus::Idle, errors, None)),
        }
    }

    fn parse<T>(&self) -> Result<T, FieldErrors>
    where
        T: DeserializeOwned + Validate,
    {
        let value = serde_json::to_value(&self.fields)
            .map_err(|e| form_error_map(format!("Unreadable form: {}", e)))?;
        let form: T = serde_json::from_value(value)
            .map_err(|e| form_error_map(format!("Unreadable form: {}", e)))?;

        form.validate().map_err(|e| collect_errors(&e))?;
        Ok(form)
    }

    /// `success` with optional data
    pub fn success(&self, data: Option<serde_json::Value>) -> ActionResponse {
        self.reply(SubmissionStatus::Success, FieldErrors::new(), data)
    }

    /// `idle` with no errors, used when nothing needed writing
    pub fn idle(&self) -> ActionResponse {
        self.reply(SubmissionStatus::Idle, FieldErrors::new(), None)
    }

    /// `error` carrying a single form-level message
    pub fn form_error(&self, message: impl Into<String>) -> ActionResponse {
        self.reply(SubmissionStatus::Error, form_error_map(message), None)
    }

    /// `error` carrying a single field message
    pub fn field_error(&self, field: &str, message: impl Into<String>) -> ActionResponse {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), vec![message.into()]);
        self.reply(SubmissionStatus::Error, errors, None)
    }

    fn reply(
        &self,
        status: SubmissionStatus,
        error: FieldErrors,
        data: Option<serde_json::Value>,
    ) -> ActionResponse {
        let payload = self
            .fields
            .iter()
            .filter(|(name, _)| !SECRET_FIELDS.contains(&name.as_str()))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        ActionResponse {
            status,
            submission: SubmissionReport {
                intent: self.intent.clone(),
                payload,
                error,
            },
            data,
        }
    }
}

#[async_trait]
impl<S> FromRequest<S> for Submission
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let fields = match Form::<HashMap<String, String>>::from_request(req, state).await {
            Ok(Form(fields)) => fields,
            Err(rejection) => {
                tracing::debug!(error = %rejection, "Unreadable form body");
                HashMap::new()
            }
        };

        Ok(Self::from_fields(fields))
    }
}

fn form_error_map(message: impl Into<String>) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.insert(String::new(), vec![message.into()]);
    errors
}

/// Flattens validator output into field → messages
fn collect_errors(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let messages = errors
                .iter()
                .map(|error| {
                    error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Invalid value".to_string())
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct TitleForm {
        #[serde(default)]
        #[validate(length(min = 1, max = 5, message = "Title must be 1 to 5 characters"))]
        title: String,
    }

    fn submission(pairs: &[(&str, &str)]) -> Submission {
        Submission::from_fields(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_intent_defaults_to_submit() {
        let s = submission(&[("title", "ok"), ("csrf", "token")]);

        assert!(s.is_submit());
        assert_eq!(s.intent(), SUBMIT_INTENT);
        assert_eq!(s.field("csrf"), None);
        assert_eq!(s.field("title"), Some("ok"));
    }

    #[test]
    fn test_accept_valid_submit() {
        let form: TitleForm = submission(&[("title", "ok")]).accept().unwrap();
        assert_eq!(form.title, "ok");
    }

    #[test]
    fn test_invalid_submit_is_error() {
        let reply = submission(&[("title", "too long")])
            .accept::<TitleForm>()
            .unwrap_err();

        assert_eq!(reply.status, SubmissionStatus::Error);
        assert_eq!(reply.status.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            reply.submission.error.get("title"),
            Some(&vec!["Title must be 1 to 5 characters".to_string()])
        );
    }

    #[test]
    fn test_validate_intent_is_idle() {
        let invalid = submission(&[("title", ""), ("intent", "validate/title")])
            .accept::<TitleForm>()
            .unwrap_err();
        assert_eq!(invalid.status, SubmissionStatus::Idle);
        assert_eq!(invalid.submission.intent, "validate/title");
        assert!(invalid.submission.error.contains_key("title"));

        let valid = submission(&[("title", "ok"), ("intent", "validate")])
            .accept::<TitleForm>()
            .unwrap_err();
        assert_eq!(valid.status, SubmissionStatus::Idle);
        assert!(valid.submission.error.is_empty());
    }

    #[test]
    fn test_password_is_not_echoed() {
        let s = submission(&[("email", "ada@example.com"), ("password", "hunter22")]);
        let reply = s.form_error("Invalid username or password");

        assert!(!reply.submission.payload.contains_key("password"));
        assert_eq!(
            reply.submission.payload.get("email").map(String::as_str),
            Some("ada@example.com")
        );
        assert_eq!(
            reply.submission.error.get(""),
            Some(&vec!["Invalid username or password".to_string()])
        );
    }

    async fn extract(content_type: Option<&str>, body: &'static str) -> Submission {
        let mut builder = axum::http::Request::builder().method("POST").uri("/v1/tasks");
        if let Some(content_type) = content_type {
            builder = builder.header("content-type", content_type);
        }
        let request = builder.body(axum::body::Body::from(body)).unwrap();

        Submission::from_request(request, &()).await.unwrap()
    }

    #[tokio::test]
    async fn test_extracts_form_body() {
        let s = extract(
            Some("application/x-www-form-urlencoded"),
            "csrf=abc&taskId=42&intent=validate",
        )
        .await;

        assert_eq!(s.csrf.as_deref(), Some("abc"));
        assert_eq!(s.field("taskId"), Some("42"));
        assert_eq!(s.intent(), "validate");
    }

    #[tokio::test]
    async fn test_unreadable_body_is_empty_form() {
        let json = extract(Some("application/json"), r#"{"csrf":"abc","taskId":"42"}"#).await;
        assert_eq!(json.csrf, None);
        assert_eq!(json.field("taskId"), None);
        assert!(json.is_submit());

        let empty = extract(None, "").await;
        assert_eq!(empty.csrf, None);
        assert!(empty.fields.is_empty());
    }

    #[test]
    fn test_envelope_shape() {
        let reply = submission(&[("title", "ok")]).success(Some(serde_json::json!({ "id": 1 })));
        let json = serde_json::to_value(&reply).unwrap();

        assert_eq!(json["status"], "success");
        assert_eq!(json["submission"]["intent"], "submit");
        assert_eq!(json["submission"]["payload"]["title"], "ok");
        assert_eq!(json["data"]["id"], 1);

        let idle = serde_json::to_value(submission(&[]).idle()).unwrap();
        assert_eq!(idle["status"], "idle");
        assert!(idle.get("data").is_none());
    }
}
