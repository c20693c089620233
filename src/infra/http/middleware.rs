use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, HeaderValue, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};
use uuid::Uuid;

use crate::application::error::ErrorReport;

use super::api::error::ApiError;

pub(crate) const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Per-request identifier, taken from `x-request-id` when the caller sent a
/// usable one and generated otherwise.
#[derive(Clone, Debug)]
pub struct RequestContext {
    pub request_id: String,
}

impl RequestContext {
    fn from_request(request: &Request<Body>) -> Self {
        let request_id = request
            .headers()
            .get(&REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty() && value.len() <= 128)
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        Self { request_id }
    }
}

pub async fn set_request_context(mut request: Request<Body>, next: Next) -> Response {
    let ctx = RequestContext::from_request(&request);
    request.extensions_mut().insert(ctx.clone());

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&ctx.request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response.extensions_mut().insert(ctx);
    response
}

/// Drops the inner future once `limit` elapses, cancelling any store or
/// cache call still in flight.
pub async fn enforce_timeout(
    State(limit): State<Duration>,
    request: Request<Body>,
    next: Next,
) -> Response {
    match tokio::time::timeout(limit, next.run(request)).await {
        Ok(response) => response,
        Err(_) => ApiError::request_timeout(limit.as_millis()).into_response(),
    }
}

struct FailedRequest {
    status: StatusCode,
    method: Method,
    path: String,
    query: String,
    elapsed_ms: u128,
    request_id: String,
    report: Option<ErrorReport>,
}

impl FailedRequest {
    fn emit(self) {
        let (source, chain) = match self.report {
            Some(report) => (report.source, report.messages),
            None => ("unknown", Vec::new()),
        };
        let detail = chain.first().map(String::as_str).unwrap_or("no diagnostic");

        if self.status.is_server_error() {
            error!(
                target: "catalog::http::response",
                status = self.status.as_u16(),
                method = %self.method,
                path = %self.path,
                query = %self.query,
                elapsed_ms = self.elapsed_ms,
                source,
                detail,
                chain = ?chain,
                request_id = %self.request_id,
                "request failed",
            );
        } else {
            warn!(
                target: "catalog::http::response",
                status = self.status.as_u16(),
                method = %self.method,
                path = %self.path,
                query = %self.query,
                elapsed_ms = self.elapsed_ms,
                source,
                detail,
                request_id = %self.request_id,
                "request rejected",
            );
        }
    }
}

/// Logs every 4xx/5xx response with the diagnostic chain the handler
/// attached. Successful responses are not logged.
pub async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let query = request.uri().query().unwrap_or_default().to_string();
    let request_id = request
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.request_id.clone())
        .unwrap_or_default();
    let start = Instant::now();

    let mut response = next.run(request).await;
    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        FailedRequest {
            status,
            method,
            path,
            query,
            elapsed_ms: start.elapsed().as_millis(),
            request_id,
            report: response.extensions_mut().remove::<ErrorReport>(),
        }
        .emit();
    }

    response
}
