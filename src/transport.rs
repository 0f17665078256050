//! HTTP transport seam.
//!
//! Connectors describe a request as an [`HttpRequest`] value and hand it to a
//! [`Transport`]. Production code uses [`ReqwestTransport`]; tests inject a
//! recording mock (see `test_utils`) or point the reqwest transport at a
//! mockito server.

use crate::error::ConnectorError;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::Value;

pub use reqwest::Method;

/// Normalises a host or instance setting into a base URL.
///
/// `acme.atlassian.net` becomes `https://acme.atlassian.net`; values that
/// already carry a scheme are kept (minus any trailing slash).
pub fn base_url(host: &str) -> String {
    let trimmed = host.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

/// Percent-encodes a value for interpolation into a URL path.
pub fn path_segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

#[derive(Clone, Debug, PartialEq)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

/// Whether `value` is usable as the content type of an upload part.
pub fn is_valid_content_type(value: &str) -> bool {
    Part::bytes(Vec::new()).mime_str(value).is_ok()
}

/// File part of a multipart upload.
#[derive(Clone, Debug, PartialEq)]
pub struct MultipartUpload {
    pub fields: Vec<(String, String)>,
    pub file_field: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl MultipartUpload {
    fn into_form(self) -> Result<Form, ConnectorError> {
        let mut part = Part::bytes(self.bytes).file_name(self.file_name);
        if let Some(content_type) = &self.content_type {
            part = part.mime_str(content_type).map_err(|e| {
                ConnectorError::Transport(format!("Invalid upload content type: {}", e))
            })?;
        }
        let mut form = Form::new();
        for (name, value) in self.fields {
            form = form.text(name, value);
        }
        Ok(form.part(self.file_field, part))
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Form(Vec<(String, String)>),
    Multipart(MultipartUpload),
}

/// A fully-described outbound request.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    /// URL without query string.
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub basic_auth: Option<BasicAuth>,
    pub body: RequestBody,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            basic_auth: None,
            body: RequestBody::Empty,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn patch(url: impl Into<String>) -> Self {
        Self::new(Method::PATCH, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::DELETE, url)
    }

    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    #[must_use]
    pub fn query(mut self, name: &str, value: &str) -> Self {
        self.query.push((name.to_string(), value.to_string()));
        self
    }

    /// Adds the query parameter only when a value is present.
    #[must_use]
    pub fn query_opt(self, name: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.query(name, v),
            None => self,
        }
    }

    #[must_use]
    pub fn basic_auth(mut self, username: &str, password: &str) -> Self {
        self.basic_auth = Some(BasicAuth {
            username: username.to_string(),
            password: password.to_string(),
        });
        self
    }

    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    #[must_use]
    pub fn form(mut self, pairs: Vec<(String, String)>) -> Self {
        self.body = RequestBody::Form(pairs);
        self
    }

    #[must_use]
    pub fn multipart(mut self, upload: MultipartUpload) -> Self {
        self.body = RequestBody::Multipart(upload);
        self
    }

    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// URL including the encoded query string. May contain credentials
    /// (Yext passes `api_key` as a query parameter); log `url` instead.
    pub fn full_url(&self) -> String {
        if self.query.is_empty() {
            return self.url.clone();
        }
        let encoded = serde_urlencoded::to_string(&self.query).unwrap_or_default();
        let separator = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{}{}", self.url, separator, encoded)
    }
}

/// A complete response: status, content type and the whole body.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type: None,
            body: body.into(),
        }
    }

    /// JSON response helper, mostly for mocks.
    pub fn json(status: u16, body: &Value) -> Self {
        Self {
            status,
            content_type: Some("application/json".to_string()),
            body: body.to_string().into_bytes(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_empty(&self) -> bool {
        self.body.iter().all(u8::is_ascii_whitespace)
    }

    pub fn parse_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Lossy UTF-8 body, truncated for log lines.
    pub fn text_snippet(&self, limit: usize) -> String {
        let text = String::from_utf8_lossy(&self.body);
        match text.char_indices().nth(limit) {
            Some((idx, _)) => format!("{}...", &text[..idx]),
            None => text.into_owned(),
        }
    }
}

/// Issues exactly one HTTP request per call; never retries.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ConnectorError>;
}

/// Transport backed by `reqwest`.
///
/// A client is built per call; no connection pool is shared between
/// invocations. Timeouts are the client defaults.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    user_agent: String,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::with_user_agent("flowlink-connector/1.0")
    }

    pub fn with_user_agent(user_agent: &str) -> Self {
        Self {
            user_agent: user_agent.to_string(),
        }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ConnectorError> {
        let client = Client::builder()
            .user_agent(&self.user_agent)
            .build()
            .map_err(|e| ConnectorError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        let full_url = request.full_url();
        tracing::debug!(method = %request.method, url = %request.url, "Sending request");

        let mut builder = client.request(request.method.clone(), &full_url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(auth) = &request.basic_auth {
            builder = builder.basic_auth(&auth.username, Some(&auth.password));
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(&body),
            RequestBody::Form(pairs) => builder.form(&pairs),
            RequestBody::Multipart(upload) => builder.multipart(upload.into_form()?),
        };

        // The query string may carry credentials, so errors name only the bare URL.
        let response = builder.send().await.map_err(|e| {
            ConnectorError::Transport(format!(
                "Request to {} failed: {}",
                request.url,
                e.without_url()
            ))
        })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await.map_err(|e| {
            ConnectorError::Transport(format!(
                "Failed to read response from {}: {}",
                request.url,
                e.without_url()
            ))
        })?;

        tracing::debug!(url = %request.url, status = status, bytes = body.len(), "Response received");

        Ok(HttpResponse {
            status,
            content_type,
            body: body.to_vec(),
        })
    }
}
