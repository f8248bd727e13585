use axum::{
    body::Body,
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use fgw_telemetry::new_request_ids;
use std::time::Instant;
use tracing::{Instrument, info, info_span};

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");
pub const TRACE_ID_HEADER: HeaderName = HeaderName::from_static("x-trace-id");

/// 请求上下文中间件：生成追踪 ID，写入响应头，并在请求 span 内记录状态码与耗时。
pub async fn request_context(req: Request<Body>, next: Next) -> Response {
    let ids = new_request_ids();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let span = info_span!(
        "request",
        request_id = %ids.request_id,
        trace_id = %ids.trace_id,
        method = %method,
        path = %path
    );

    let started = Instant::now();
    let mut response = next.run(req).instrument(span.clone()).await;
    span.in_scope(|| {
        info!(
            target: "fgw.server",
            status = response.status().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "http_request"
        );
    });

    response.headers_mut().insert(
        REQUEST_ID_HEADER,
        HeaderValue::from_str(&ids.request_id).unwrap_or_else(|_| HeaderValue::from_static("")),
    );
    response.headers_mut().insert(
        TRACE_ID_HEADER,
        HeaderValue::from_str(&ids.trace_id).unwrap_or_else(|_| HeaderValue::from_static("")),
    );
    response
}
