//! Gateway-side view of an incoming HTTP call.
//!
//! # Responsibilities
//! - Parse query string and form-encoded body into multi-valued form data
//! - Carry the request ID assigned by the request-id layer
//! - Hold request-scoped context values and hook overrides
//!
//! # Design Decisions
//! - Body values come before query values for the same key, so a lookup
//!   prefers the body
//! - Only POST, PUT and PATCH bodies with a form content type are parsed
//! - Body size is capped before anything reaches the pipeline

use std::collections::HashMap;

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, Method, Request, StatusCode},
    response::{IntoResponse, Response},
};
use futures_util::StreamExt;
use thiserror::Error;

use crate::pipeline::hooks::RequestHooks;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Multi-valued form fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    values: HashMap<String, Vec<String>>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the query string and (optional) form-encoded body.
    pub fn parse(query: Option<&str>, body: Option<&[u8]>) -> Self {
        let mut form = Self::new();
        if let Some(body) = body {
            form.extend_encoded(body);
        }
        if let Some(query) = query {
            form.extend_encoded(query.as_bytes());
        }
        form
    }

    fn extend_encoded(&mut self, encoded: &[u8]) {
        for (key, value) in url::form_urlencoded::parse(encoded) {
            self.append(key.into_owned(), value.into_owned());
        }
    }

    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.entry(key.into()).or_default().push(value.into());
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(|v| v.first()).map(String::as_str)
    }

    pub fn get_all(&self, key: &str) -> &[String] {
        self.values.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Request-scoped string values, keyed by original or wire-key field names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    values: HashMap<String, String>,
}

impl RequestContext {
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One incoming call, owned by its request's execution.
#[derive(Debug, Clone)]
pub struct RpcRequest {
    pub method: Method,
    pub path: String,
    pub request_id: String,
    pub headers: HeaderMap,
    pub form: FormData,
    pub context: RequestContext,
    pub hooks: RequestHooks,
}

impl RpcRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            request_id: uuid::Uuid::new_v4().to_string(),
            headers: HeaderMap::new(),
            form: FormData::new(),
            context: RequestContext::default(),
            hooks: RequestHooks::default(),
        }
    }

    pub fn with_form_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.append(key, value);
        self
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key, value);
        self
    }

    pub fn with_hooks(mut self, hooks: RequestHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Build from an HTTP request, reading at most `max_body_size` body bytes.
    pub async fn from_http(
        request: Request<Body>,
        max_body_size: usize,
    ) -> Result<Self, FormError> {
        let (parts, body) = request.into_parts();

        let reads_body = matches!(parts.method, Method::POST | Method::PUT | Method::PATCH)
            && parts
                .headers
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|ct| ct.starts_with(FORM_CONTENT_TYPE));

        let body_bytes = if reads_body {
            Some(read_body(body, max_body_size).await?)
        } else {
            None
        };

        let form = FormData::parse(parts.uri.query(), body_bytes.as_deref());
        let request_id = parts
            .headers
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        Ok(Self {
            method: parts.method,
            path: parts.uri.path().to_string(),
            request_id,
            headers: parts.headers,
            form,
            context: RequestContext::default(),
            hooks: RequestHooks::default(),
        })
    }
}

/// Collect the body, failing as soon as it grows past `limit` bytes.
async fn read_body(body: Body, limit: usize) -> Result<Bytes, FormError> {
    let mut stream = body.into_data_stream();
    let mut buf = Vec::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|err| FormError::BodyRead(err.to_string()))?;
        if buf.len() + chunk.len() > limit {
            return Err(FormError::BodyTooLarge(limit));
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(Bytes::from(buf))
}

/// The HTTP request could not be turned into form data.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("request body exceeds {0} bytes")]
    BodyTooLarge(usize),
    #[error("failed to read request body: {0}")]
    BodyRead(String),
}

impl IntoResponse for FormError {
    fn into_response(self) -> Response {
        let status = match self {
            FormError::BodyTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            FormError::BodyRead(_) => StatusCode::BAD_REQUEST,
        };
        (status, self.to_string()).into_response()
    }
}
