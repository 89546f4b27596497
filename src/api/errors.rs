use serde_json::Value;
use thiserror::Error;

/// Broad classes of failures callers branch on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// 404: render a not-found view.
    NotFound,
    /// 401: the visitor has to log in.
    Unauthenticated,
    /// 413: upload rejected for its size.
    PayloadTooLarge,
    /// 400/409 that the caller did not whitelist.
    Validation,
    /// No response at all (connection, timeout, TLS).
    Network,
    /// Any other status or an unreadable body.
    Server,
}

/// Structured failure of a backend call.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("{message} ({url})")]
pub struct ApiError {
    pub message: String,
    pub status: Option<u16>,
    pub url: String,
    pub details: Option<Value>,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn new(message: impl Into<String>, status: Option<u16>, url: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status,
            url: url.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Builds the error for an unexpected status, preferring the message the
    /// backend put in its body.
    pub fn from_status(status: u16, url: impl Into<String>, body: Option<Value>) -> Self {
        let message = body
            .as_ref()
            .and_then(body_message)
            .unwrap_or_else(|| default_message(status));
        let error = Self::new(message, Some(status), url);
        match body {
            Some(body) => error.with_details(body),
            None => error,
        }
    }

    pub fn kind(&self) -> ApiErrorKind {
        match self.status {
            None => ApiErrorKind::Network,
            Some(404) => ApiErrorKind::NotFound,
            Some(401) => ApiErrorKind::Unauthenticated,
            Some(413) => ApiErrorKind::PayloadTooLarge,
            Some(400) | Some(409) => ApiErrorKind::Validation,
            Some(_) => ApiErrorKind::Server,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ApiErrorKind::NotFound
    }

    pub fn is_unauthenticated(&self) -> bool {
        self.kind() == ApiErrorKind::Unauthenticated
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        let url = err.url().map(ToString::to_string).unwrap_or_default();
        let status = err.status().map(|status| status.as_u16());
        let message = if err.is_timeout() {
            "The server took too long to respond".to_string()
        } else if err.is_connect() {
            "Could not reach the server".to_string()
        } else if err.is_decode() {
            "The server sent an unreadable response".to_string()
        } else {
            format!("Request failed: {err}")
        };
        Self::new(message, status, url)
    }
}

/// Extracts a human readable message from common error body shapes.
pub fn body_message(body: &Value) -> Option<String> {
    ["detail", "message", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

fn default_message(status: u16) -> String {
    match status {
        401 => "Authentication required".to_string(),
        404 => "Not found".to_string(),
        413 => "The file is too large".to_string(),
        500..=599 => format!("The server failed to handle the request ({status})"),
        _ => format!("Unexpected response status {status}"),
    }
}
