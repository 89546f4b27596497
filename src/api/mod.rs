//! Client for the platform's REST backend.
//!
//! Every read and write the front end performs goes through the [`Api`]
//! trait so services can be exercised against [`mock::MockApi`].

use async_trait::async_trait;
use serde_json::Value;

pub mod errors;
pub mod http;
#[cfg(any(test, feature = "test-mocks"))]
pub mod mock;
pub mod query;

pub use errors::{ApiError, ApiErrorKind, ApiResult, body_message};
pub use http::RestClient;
pub use query::{QueryArgs, QueryValue};

/// Reserved key carrying the HTTP status inside a successful JSON body.
pub const STATUS_KEY: &str = "_status";

/// Statuses a request resolves with unless the caller says otherwise.
pub const DEFAULT_EXPECTED: &[u16] = &[200];

/// Parsed body of an accepted response.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiResponse {
    status: u16,
    body: Value,
}

impl ApiResponse {
    /// Tags object bodies with [`STATUS_KEY`].
    pub fn new(status: u16, mut body: Value) -> Self {
        if let Value::Object(fields) = &mut body {
            fields.insert(STATUS_KEY.to_string(), Value::from(status));
        }
        Self { status, body }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    pub fn into_body(self) -> Value {
        self.body
    }

    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// File forwarded to an upload endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait Api {
    /// GETs `path`; only 200 resolves.
    async fn get(&self, path: &str, query: &QueryArgs) -> ApiResult<ApiResponse>;

    /// POSTs `body` as JSON; any status in `expected` resolves.
    async fn post(&self, path: &str, body: Option<Value>, expected: &[u16])
    -> ApiResult<ApiResponse>;

    /// Sends `file` as the `file` part of a multipart POST.
    async fn upload(&self, path: &str, file: UploadFile) -> ApiResult<ApiResponse>;
}
