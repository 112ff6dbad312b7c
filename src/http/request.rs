//! Per-request context.
//!
//! # Responsibilities
//! - Capture method, path and decoded query parameters
//! - Carry the request ID assigned by the request-id middleware
//! - Look up required parameters for route handlers

use axum::http::{HeaderMap, Method, Uri};

use crate::http::handlers::HandlerError;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Immutable view of one request, alive only while it is handled.
#[derive(Debug, Clone)]
pub struct RequestContext {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    request_id: Option<String>,
}

impl RequestContext {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            request_id: None,
        }
    }

    /// Build a context from the parts axum hands to a handler.
    pub fn from_parts(method: Method, uri: &Uri, headers: &HeaderMap) -> Self {
        let query = uri
            .query()
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default();

        let request_id = headers
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Self {
            method,
            path: uri.path().to_string(),
            query,
            request_id,
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn request_id(&self) -> &str {
        self.request_id.as_deref().unwrap_or("unknown")
    }

    /// First value of a query parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// A parameter that must be present and non-empty.
    pub fn required_param(&self, name: &str) -> Result<&str, HandlerError> {
        match self.param(name) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(HandlerError::Input(format!("{name} parameter is required"))),
        }
    }
}
