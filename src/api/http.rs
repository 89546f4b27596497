//! `reqwest` implementation of [`Api`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Method, RequestBuilder, Response, Url};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::api::{
    Api, ApiError, ApiResponse, ApiResult, DEFAULT_EXPECTED, QueryArgs, UploadFile,
};

/// Header correlating dashboard log lines with backend log lines.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Statuses an upload endpoint may answer with on success.
pub const UPLOAD_EXPECTED: &[u16] = &[200, 201];

const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// HTTP client bound to one API base URL and, optionally, one user token.
#[derive(Clone, Debug)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl RestClient {
    /// Creates an anonymous client. `timeout` bounds every request.
    pub fn new(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        let mut base = Url::parse(base_url).map_err(|err| {
            ApiError::new(format!("Invalid API url: {err}"), None, base_url)
        })?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base,
            token: None,
        })
    }

    /// Same connection pool, requests sent on behalf of the token's owner.
    pub fn authorized(&self, token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..self.clone()
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Prefixes relative paths with the API base and appends `query`.
    pub fn build_url(&self, path: &str, query: &QueryArgs) -> ApiResult<Url> {
        let parsed = if path.starts_with("http://") || path.starts_with("https://") {
            Url::parse(path)
        } else {
            self.base_url.join(path.trim_start_matches('/'))
        };
        let mut url = parsed.map_err(|err| {
            ApiError::new(format!("Invalid request path: {err}"), None, path)
        })?;

        let pairs = query.pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }

        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let request = self
            .http
            .request(method, url)
            .header(REQUEST_ID_HEADER, Uuid::new_v4().to_string());
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Accepts the response when its status is in `expected`.
    async fn read(response: Response, url: &str, expected: &[u16]) -> ApiResult<ApiResponse> {
        let status = response.status().as_u16();
        let text = response.text().await?;

        let parsed = if text.trim().is_empty() {
            Ok(Value::Object(Map::new()))
        } else {
            serde_json::from_str::<Value>(&text)
        };

        if expected.contains(&status) {
            return match parsed {
                Ok(body) => Ok(ApiResponse::new(status, body)),
                Err(err) => {
                    log::error!("Unreadable response from {url}: {err}");
                    Err(ApiError::new(
                        "The server sent an unreadable response",
                        Some(status),
                        url,
                    )
                    .with_details(Value::String(text)))
                }
            };
        }

        log::debug!("Unexpected status {status} from {url}");
        let details = parsed.unwrap_or(Value::String(text));
        Err(ApiError::from_status(status, url, Some(details)))
    }

    /// Streams `file` in chunks, reporting `(sent, total)` bytes as each
    /// chunk is handed to the connection.
    ///
    /// Dropping the returned future aborts the transfer.
    pub async fn upload_with_progress<F>(
        &self,
        path: &str,
        file: UploadFile,
        progress: F,
    ) -> ApiResult<ApiResponse>
    where
        F: Fn(u64, u64) + Send + Sync + 'static,
    {
        let url = self.build_url(path, &QueryArgs::new())?;
        let total = file.bytes.len() as u64;

        let chunks: Vec<Vec<u8>> = file
            .bytes
            .chunks(UPLOAD_CHUNK_SIZE)
            .map(<[u8]>::to_vec)
            .collect();
        let mut sent = 0u64;
        let stream = futures::stream::iter(chunks.into_iter().map(move |chunk| {
            sent += chunk.len() as u64;
            progress(sent, total);
            Ok::<Vec<u8>, std::io::Error>(chunk)
        }));

        let part = Part::stream_with_length(Body::wrap_stream(stream), total)
            .file_name(file.file_name)
            .mime_str(&file.content_type)?;
        let form = Form::new().part("file", part);

        log::debug!("UPLOAD {url} ({total} bytes)");
        let response = self
            .request(Method::POST, url.clone())
            .multipart(form)
            .send()
            .await?;
        Self::read(response, url.as_str(), UPLOAD_EXPECTED).await
    }
}

#[async_trait]
impl Api for RestClient {
    async fn get(&self, path: &str, query: &QueryArgs) -> ApiResult<ApiResponse> {
        let url = self.build_url(path, query)?;
        log::debug!("GET {url}");
        let response = self.request(Method::GET, url.clone()).send().await?;
        Self::read(response, url.as_str(), DEFAULT_EXPECTED).await
    }

    async fn post(
        &self,
        path: &str,
        body: Option<Value>,
        expected: &[u16],
    ) -> ApiResult<ApiResponse> {
        let url = self.build_url(path, &QueryArgs::new())?;
        log::debug!("POST {url}");
        let mut request = self.request(Method::POST, url.clone());
        if let Some(body) = &body {
            request = request.json(body);
        }
        let response = request.send().await?;
        Self::read(response, url.as_str(), expected).await
    }

    async fn upload(&self, path: &str, file: UploadFile) -> ApiResult<ApiResponse> {
        let file_name = file.file_name.clone();
        self.upload_with_progress(path, file, move |sent, total| {
            log::debug!("Uploading {file_name}: {sent}/{total} bytes");
        })
        .await
    }
}
