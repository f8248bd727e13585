//! 路由定义
//!
//! 只有一个页面：任意方法、任意路径都返回首页文档。
//! 文档在每次请求时从磁盘读取并原样返回，读取失败返回 500 与错误描述。

use crate::middleware::request_context;
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse, Response},
    routing::any,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tracing::warn;

#[derive(Clone)]
pub struct AppState {
    index_document: Arc<PathBuf>,
}

impl AppState {
    pub fn new(index_document: PathBuf) -> Self {
        Self {
            index_document: Arc::new(index_document),
        }
    }
}

/// 创建路由，附带请求超时与请求上下文中间件。
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/", any(index))
        .fallback(index)
        .with_state(state)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(middleware::from_fn(request_context))
}

/// 首页
pub async fn index(State(state): State<AppState>) -> Response {
    match tokio::fs::read_to_string(state.index_document.as_path()).await {
        Ok(document) => Html(document).into_response(),
        Err(err) => {
            warn!(
                target: "fgw.server",
                path = %state.index_document.display(),
                error = %err,
                "index_document_read_failed"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}
