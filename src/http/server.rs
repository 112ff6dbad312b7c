//! HTTP application setup.
//!
//! # Responsibilities
//! - Compile a [`RouteTable`] into an axum `Router`
//! - Wire up middleware (request ID, tracing span)
//! - Dispatch each request: context → handler → encoder
//! - Optionally expose Prometheus metrics

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    http::{HeaderMap, Method, Request, Uri},
    response::Response,
    routing::{get, on},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::Span;

use crate::http::handlers::RouteHandler;
use crate::http::request::{RequestContext, X_REQUEST_ID};
use crate::http::response::{self, Encoded};
use crate::routing::RouteTable;

pub const METRICS_PATH: &str = "/metrics";

/// Build the axum router for one relay.
pub fn build_router(table: &RouteTable, metrics: Option<PrometheusHandle>) -> Router {
    let mut router = Router::new();

    for route in table.routes() {
        let handler = Arc::clone(route.handler());
        router = router.route(
            route.path(),
            on(
                route.method_filter(),
                move |method: Method, uri: Uri, headers: HeaderMap| {
                    let handler = Arc::clone(&handler);
                    async move { dispatch(handler, method, uri, headers).await }
                },
            ),
        );
    }

    if let Some(handle) = metrics {
        router = router.route(
            METRICS_PATH,
            get(move || {
                let handle = handle.clone();
                async move { handle.render() }
            }),
        );
    }

    // Request ID is set first so the span can carry it. Dispatched requests
    // are logged by the encoder; the trace layer covers everything else.
    router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(request_span)
                    .on_request(())
                    .on_response(log_unencoded)
                    .on_failure(()),
            )
            .layer(PropagateRequestIdLayer::x_request_id()),
    )
}

async fn dispatch(
    handler: Arc<dyn RouteHandler>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let started = Instant::now();
    let ctx = RequestContext::from_parts(method, &uri, &headers);

    tracing::debug!(request_id = ctx.request_id(), path = ctx.path(), "Dispatching request");

    let result = handler.handle(&ctx).await;
    response::encode(&ctx, result, started)
}

/// Outcome event for responses axum produced without a relay handler
/// (404, 405, `/metrics`).
fn log_unencoded(response: &Response, latency: Duration, _span: &Span) {
    if response.extensions().get::<Encoded>().is_some() {
        return;
    }

    let status = response.status();
    let latency_ms = latency.as_millis() as u64;
    if status.is_success() {
        tracing::debug!(status = status.as_u16(), latency_ms, "Request served");
    } else {
        tracing::warn!(status = status.as_u16(), latency_ms, "Request not routed");
    }
}

fn request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
    )
}
