//! 中间件
//!
//! - request_context：为每个请求注入 request_id/trace_id 并记录访问日志

mod request_context;

pub use request_context::request_context;
