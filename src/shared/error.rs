//! Application Error Types
//!
//! The closed error taxonomy every operation reports through, with Axum
//! integration. Only the public message (and, for validation failures, the
//! field list) ever reaches a response body; console messages and details
//! are logged.

use std::any::Any;

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::infrastructure::metrics;

/// Public message shown for every system failure, whatever the cause.
pub const SYSTEM_PUBLIC_MESSAGE: &str = "Something went wrong, please try again later";

/// Public message for requests without a session.
pub const AUTHORIZATION_PUBLIC_MESSAGE: &str = "Authentication required";

/// Error kind, serialized as the `type` field of error bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    Validation,
    Duplicity,
    NotFound,
    Credentials,
    Authorization,
    System,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION",
            Self::Duplicity => "DUPLICITY",
            Self::NotFound => "NOT_FOUND",
            Self::Credentials => "CREDENTIALS",
            Self::Authorization => "AUTHORIZATION",
            Self::System => "SYSTEM",
        }
    }

    /// HTTP status the boundary maps this kind to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::Duplicity => StatusCode::CONFLICT,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Credentials | Self::Authorization => StatusCode::UNAUTHORIZED,
            Self::System => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field-level validation error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Application error type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Validation {
        message: String,
        details: Vec<FieldError>,
    },

    #[error("{message}")]
    Duplicity { message: String, fields: Vec<String> },

    #[error("{message}")]
    NotFound { message: String, key: String },

    #[error("{message} ({reason})")]
    Credentials { message: String, reason: String },

    #[error("{message}")]
    Authorization { message: String },

    #[error("System error: {console} ({details})")]
    System { console: String, details: String },
}

impl AppError {
    /// Validation failure carrying a list of field errors.
    pub fn validation(details: Vec<FieldError>) -> Self {
        Self::Validation {
            message: "Validation failed".into(),
            details,
        }
    }

    /// Validation failure on a single field.
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::validation(vec![FieldError::new(field, message)])
    }

    /// A uniqueness invariant would be violated by `fields` of a `label` record.
    pub fn duplicity(label: &str, fields: Vec<String>) -> Self {
        let message = if fields.is_empty() {
            format!("{} already exists", label)
        } else {
            format!("{} with the same {} already exists", label, fields.join(" or "))
        };
        Self::Duplicity { message, fields }
    }

    pub fn not_found(label: &str, key: impl Into<String>) -> Self {
        Self::NotFound {
            message: format!("{} not found", label),
            key: key.into(),
        }
    }

    pub fn credentials(message: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Credentials {
            message: message.into(),
            reason: reason.into(),
        }
    }

    pub fn authorization() -> Self {
        Self::Authorization {
            message: AUTHORIZATION_PUBLIC_MESSAGE.into(),
        }
    }

    pub fn system(console: impl Into<String>, details: impl Into<String>) -> Self {
        Self::System {
            console: console.into(),
            details: details.into(),
        }
    }

    /// Wrap a panic payload caught while running `operation`.
    pub fn from_panic(operation: &str, payload: Box<dyn Any + Send>) -> Self {
        let details = if let Some(message) = payload.downcast_ref::<&'static str>() {
            (*message).to_string()
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else {
            "non-string panic payload".to_string()
        };

        Self::system(format!("{} panicked", operation), details)
    }

    /// Wrap a blocking task that panicked or was cancelled.
    pub fn from_join(operation: &str, error: tokio::task::JoinError) -> Self {
        if error.is_panic() {
            Self::from_panic(operation, error.into_panic())
        } else {
            Self::system(format!("{} was cancelled", operation), error.to_string())
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Duplicity { .. } => ErrorKind::Duplicity,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Credentials { .. } => ErrorKind::Credentials,
            Self::Authorization { .. } => ErrorKind::Authorization,
            Self::System { .. } => ErrorKind::System,
        }
    }

    /// Message that is safe to show a user.
    pub fn public_message(&self) -> &str {
        match self {
            Self::Validation { message, .. }
            | Self::Duplicity { message, .. }
            | Self::NotFound { message, .. }
            | Self::Credentials { message, .. }
            | Self::Authorization { message } => message,
            Self::System { .. } => SYSTEM_PUBLIC_MESSAGE,
        }
    }

    /// Operator-facing diagnostics; never part of a response body.
    pub fn console_message(&self) -> String {
        match self {
            Self::Validation { details, .. } => details
                .iter()
                .map(|e| format!("{}: {}", e.field, e.message))
                .collect::<Vec<_>>()
                .join("; "),
            Self::Duplicity { fields, .. } => format!("conflicting fields: {}", fields.join(", ")),
            Self::NotFound { key, .. } => format!("lookup key: {}", key),
            Self::Credentials { reason, .. } => reason.clone(),
            Self::Authorization { message } => message.clone(),
            Self::System { console, details } => format!("{}: {}", console, details),
        }
    }

    /// Structured details payload.
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::Validation { details, .. } => serde_json::to_value(details).ok(),
            Self::Duplicity { fields, .. } => Some(serde_json::json!(fields)),
            Self::NotFound { key, .. } => Some(serde_json::json!(key)),
            Self::System { details, .. } => Some(serde_json::json!(details)),
            Self::Credentials { .. } | Self::Authorization { .. } => None,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::invalid_field("body", rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::invalid_field("query", rejection.body_text())
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

impl From<&AppError> for ErrorResponse {
    fn from(error: &AppError) -> Self {
        let details = match error {
            AppError::Validation { details, .. } => Some(details.clone()),
            _ => None,
        };

        Self {
            error: error.public_message().to_string(),
            kind: error.kind(),
            details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        metrics::record_error(kind.as_str());

        match kind {
            ErrorKind::System => {
                tracing::error!(kind = %kind, console = %self.console_message(), "Request failed")
            }
            _ => tracing::debug!(kind = %kind, console = %self.console_message(), "Request rejected"),
        }

        (kind.status_code(), Json(ErrorResponse::from(&self))).into_response()
    }
}
