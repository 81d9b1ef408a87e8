//! Request model and the `Transport` seam between endpoints and HTTP.

use std::future::Future;
use std::sync::Arc;

use reqwest::{Client, Method};
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::debug;

use crate::envelope::RawResponse;
use crate::error::{ApiError, ApiResult};
use crate::session::SessionToken;

/// Path as it may appear in logs: reset tokens are masked.
pub fn loggable_path(path: &str) -> String {
    let path = path.trim_start_matches('/');
    match path.strip_prefix(crate::endpoints::RESET_PASSWORD) {
        Some(rest) if rest.starts_with('/') => {
            format!("{}/***", crate::endpoints::RESET_PASSWORD)
        }
        _ => path.to_string(),
    }
}

/// A file part of a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart {
        fields: Vec<(String, String)>,
        upload: Upload,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the configured base URL, without a leading slash.
    pub path: String,
    pub token: Option<SessionToken>,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            token: None,
            body: RequestBody::Empty,
        }
    }

    pub fn token(mut self, token: Option<SessionToken>) -> Self {
        self.token = token;
        self
    }

    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }
}

/// Sends one request and returns the raw answer. Implementations never
/// retry and impose no timeout of their own.
pub trait Transport: Send + Sync {
    fn send(&self, request: ApiRequest) -> impl Future<Output = ApiResult<RawResponse>> + Send;
}

impl<T: Transport> Transport for &T {
    fn send(&self, request: ApiRequest) -> impl Future<Output = ApiResult<RawResponse>> + Send {
        (**self).send(request)
    }
}

impl<T: Transport> Transport for Arc<T> {
    fn send(&self, request: ApiRequest) -> impl Future<Output = ApiResult<RawResponse>> + Send {
        (**self).send(request)
    }
}

/// reqwest-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("accept", HeaderValue::from_static("application/json"));

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> ApiResult<RawResponse> {
        let url = self.url(&request.path);
        let mut builder = self.client.request(request.method.clone(), &url);

        if let Some(token) = &request.token {
            builder = builder.bearer_auth(token.expose());
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart { fields, upload } => {
                let mut form = reqwest::multipart::Form::new();
                for (key, value) in fields {
                    form = form.text(key, value);
                }
                let part = reqwest::multipart::Part::bytes(upload.bytes)
                    .file_name(upload.file_name)
                    .mime_str(&upload.content_type)
                    .map_err(|e| ApiError::Network(format!("invalid upload type: {e}")))?;
                builder.multipart(form.part(upload.field, part))
            }
        };

        // reqwest errors carry the full URL, reset token included.
        let path = loggable_path(&request.path);
        debug!(method = %request.method, %path, "sending request");
        let response = builder.send().await.map_err(reqwest::Error::without_url)?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(reqwest::Error::without_url)?;
        debug!(method = %request.method, %path, status, "response received");

        Ok(RawResponse::from_text(status, &text))
    }
}
