//! Response encoding.
//!
//! # Responsibilities
//! - Map handler outcomes to status, content type and body
//! - Log each request's outcome exactly once
//! - Record request metrics
//!
//! | Outcome                          | Status | Content-Type       |
//! |----------------------------------|--------|--------------------|
//! | text payload                     | 200    | `text/plain`       |
//! | JSON payload                     | 200    | `application/json` |
//! | input error                      | 400    | `text/plain`       |
//! | execution / serialization error  | 500    | `text/plain`       |
//!
//! JSON payloads are the command's raw stdout. They are checked for
//! well-formedness but never re-serialized.

use std::time::Instant;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::http::handlers::{HandlerError, HandlerResult, OutputFormat, Payload};
use crate::http::request::RequestContext;
use crate::observability::metrics;

pub const TEXT_PLAIN: &str = "text/plain";
pub const APPLICATION_JSON: &str = "application/json";

/// Response extension marking responses whose outcome [`encode`] already logged.
#[derive(Debug, Clone, Copy)]
pub struct Encoded;

/// Turn a handler outcome into an HTTP response.
pub fn encode(ctx: &RequestContext, result: HandlerResult, started: Instant) -> Response {
    let (status, content_type, body) = match result.and_then(check_format) {
        Ok(payload) => {
            let content_type = match payload.format {
                OutputFormat::Text => TEXT_PLAIN,
                OutputFormat::Json => APPLICATION_JSON,
            };
            tracing::info!(
                request_id = ctx.request_id(),
                path = ctx.path(),
                status = 200,
                bytes = payload.body.len(),
                "Request handled"
            );
            (StatusCode::OK, content_type, payload.body)
        }
        Err(HandlerError::Input(message)) => {
            tracing::warn!(
                request_id = ctx.request_id(),
                path = ctx.path(),
                status = 400,
                error = %message,
                "Invalid request input"
            );
            (StatusCode::BAD_REQUEST, TEXT_PLAIN, message.into_bytes())
        }
        Err(err) => {
            tracing::error!(
                request_id = ctx.request_id(),
                path = ctx.path(),
                status = 500,
                error = %err,
                "Request failed"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, TEXT_PLAIN, err.to_string().into_bytes())
        }
    };

    metrics::record_request(ctx.path(), status.as_u16(), started);
    let mut response = (status, [(header::CONTENT_TYPE, content_type)], body).into_response();
    response.extensions_mut().insert(Encoded);
    response
}

fn check_format(payload: Payload) -> HandlerResult {
    if payload.format == OutputFormat::Json {
        serde_json::from_slice::<serde::de::IgnoredAny>(&payload.body)
            .map_err(|e| HandlerError::Serialization(e.to_string()))?;
    }
    Ok(payload)
}
