use axum::{
    extract::rejection::JsonRejection,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::error;

pub type ApiResult<T> = Result<T, ApiError>;

/// One field-level validation failure: a location path, a human-readable
/// message and a machine-checkable kind, in the shape existing API clients
/// already parse out of 422 responses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldError {
    pub fn body(field: &str, msg: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            loc: vec!["body".into(), field.into()],
            msg: msg.into(),
            kind: kind.into(),
        }
    }

    pub fn query(param: &str, msg: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            loc: vec!["query".into(), param.into()],
            msg: msg.into(),
            kind: kind.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("validation failed")]
    Validation(Vec<FieldError>),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn validation(errors: Vec<FieldError>) -> Self {
        Self::Validation(errors)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "detail": detail }))).into_response()
            }
            ApiError::Unauthorized(detail) => (
                StatusCode::UNAUTHORIZED,
                [(header::WWW_AUTHENTICATE, "Bearer")],
                Json(json!({ "detail": detail })),
            )
                .into_response(),
            ApiError::NotFound(detail) => {
                (StatusCode::NOT_FOUND, Json(json!({ "detail": detail }))).into_response()
            }
            ApiError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "detail": errors })),
            )
                .into_response(),
            ApiError::Internal(err) => {
                error!(error = %err, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": "Internal Server Error" })),
                )
                    .into_response()
            }
        }
    }
}

/// Body deserialization failures become field-level 422s so a client sees
/// the same `{loc, msg, type}` entries for a mistyped field as it does for
/// an out-of-range one.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(err) => {
                ApiError::Validation(vec![field_error_from_body_text(&err.body_text())])
            }
            JsonRejection::JsonSyntaxError(_) => ApiError::Validation(vec![FieldError {
                loc: vec!["body".into()],
                msg: "JSON decode error".into(),
                kind: "json_invalid".into(),
            }]),
            other => ApiError::BadRequest(other.body_text()),
        }
    }
}

const DESERIALIZE_PREFIX: &str = "Failed to deserialize the JSON body into the target type: ";

/// The rejection body carries the offending field path ahead of the serde
/// message; split it back apart so the 422 entry points at the field.
fn field_error_from_body_text(text: &str) -> FieldError {
    let detail = text.strip_prefix(DESERIALIZE_PREFIX).unwrap_or(text);

    if let Some(idx) = detail.find("missing field `") {
        let rest = &detail[idx + "missing field `".len()..];
        if let Some(field) = rest.split('`').next() {
            return FieldError::body(field, "Field required", "missing");
        }
    }

    let (path, message) = match detail.split_once(": ") {
        Some((path, message)) => (path, message),
        None => ("", detail),
    };

    let mut loc = vec!["body".to_string()];
    if !path.is_empty() && path != "." {
        loc.push(path.to_string());
    }

    FieldError {
        loc,
        msg: message.to_string(),
        kind: classify_serde_message(message).to_string(),
    }
}

fn classify_serde_message(message: &str) -> &'static str {
    if message.contains("expected f64") || message.contains("expected f32") {
        "float_parsing"
    } else if message.contains("expected i64")
        || message.contains("expected i32")
        || message.contains("expected u64")
        || message.contains("expected u32")
    {
        "int_parsing"
    } else if message.contains("expected a string") {
        "string_type"
    } else if message.contains("expected a boolean") {
        "bool_parsing"
    } else if message.contains("could not be parsed")
        || message.contains("literal was not valid")
        || message.contains("unexpected trailing characters")
    {
        "datetime_parsing"
    } else {
        "value_error"
    }
}
