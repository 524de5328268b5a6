//! Error types for the catalog API client.
//!
//! # Design
//! Every failure that reaches a view is reduced to one [`ErrorReport`]
//! (`message` + optional `status`). Backend bodies come in two flavours,
//! `{"error": "...", "code": 404}` and `{"code": "NOT_FOUND", "message": "..."}`,
//! and plain-text bodies from older handlers; [`ApiError::from_response`]
//! accepts all of them. Client-side validation failures are not `ApiError`s,
//! see `views::form::FieldError`.

use std::fmt;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::http::HttpResponse;

const GENERIC_MESSAGE: &str = "unknown request error";

/// Failures where no HTTP response was received.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("{0}")]
    Io(String),
}

/// Status attached to a normalized error.
///
/// Numeric backend codes and raw HTTP statuses share `Http`; string codes
/// such as `NOT_FOUND` are kept verbatim in `Code`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorStatus {
    Http(u16),
    Code(String),
}

impl fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorStatus::Http(status) => write!(f, "{status}"),
            ErrorStatus::Code(code) => f.write_str(code),
        }
    }
}

/// The uniform `{message, status}` structure surfaced by views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub message: String,
    pub status: Option<ErrorStatus>,
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            Some(status) => write!(f, "{} ({status})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Errors returned by `CatalogClient` build/parse methods and by `send`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The backend answered with a non-2xx status.
    #[error("{message}")]
    Backend {
        message: String,
        status: ErrorStatus,
        http_status: u16,
    },

    /// No response within the host's timeout.
    #[error("request timed out")]
    Timeout,

    /// The request never produced a response.
    #[error("{0}")]
    Transport(String),

    /// A 2xx body did not match any known shape.
    #[error("invalid response body: {0}")]
    Decode(String),

    /// The request payload could not be serialized to JSON.
    #[error("failed to encode request body: {0}")]
    Serialization(String),

    /// The configured base URL cannot host API paths.
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),
}

/// Fields are decoded loosely: a `code` or `error` of an unexpected JSON
/// type must not hide the text next to it.
#[derive(Deserialize)]
struct BackendErrorBody {
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    message: Option<Value>,
    #[serde(default)]
    code: Option<Value>,
}

/// Numeric codes that fit an HTTP status stay numeric, other numbers and
/// non-blank strings are kept as text. Anything else falls back to `fallback`.
fn code_status(code: Option<Value>, fallback: u16) -> ErrorStatus {
    match code {
        Some(Value::Number(number)) => match number.as_u64().map(u16::try_from) {
            Some(Ok(code)) => ErrorStatus::Http(code),
            _ => ErrorStatus::Code(number.to_string()),
        },
        Some(Value::String(code)) if !code.trim().is_empty() => ErrorStatus::Code(code),
        _ => ErrorStatus::Http(fallback),
    }
}

impl ApiError {
    /// Normalize a non-2xx response.
    pub fn from_response(response: &HttpResponse) -> Self {
        let body = serde_json::from_str::<BackendErrorBody>(&response.body).ok();

        let backend_message = body.as_ref().and_then(|b| {
            [b.error.as_ref(), b.message.as_ref()]
                .into_iter()
                .flatten()
                .filter_map(Value::as_str)
                .map(str::trim)
                .find(|m| !m.is_empty())
                .map(str::to_string)
        });
        let message = backend_message
            .unwrap_or_else(|| format!("request failed with status code {}", response.status));

        let status = code_status(body.and_then(|b| b.code), response.status);

        ApiError::Backend {
            message,
            status,
            http_status: response.status,
        }
    }

    pub fn http_status(&self) -> Option<u16> {
        match self {
            ApiError::Backend { http_status, .. } => Some(*http_status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.http_status() == Some(404)
    }

    /// Reduce to the `{message, status}` structure shown in banners.
    pub fn report(&self) -> ErrorReport {
        let status = match self {
            ApiError::Backend { status, .. } => Some(status.clone()),
            _ => None,
        };
        let mut message = self.to_string();
        if message.trim().is_empty() {
            message = GENERIC_MESSAGE.to_string();
        }
        ErrorReport { message, status }
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout => ApiError::Timeout,
            TransportError::Io(message) => ApiError::Transport(message),
        }
    }
}
