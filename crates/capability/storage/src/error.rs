//! 存储层错误类型
//!
//! 区分三类失败：
//! - 单次尝试失败（建池、ping），可重试
//! - 终止性失败（重试耗尽、参数非法）
//! - 启动上下文取消或超时，立即中止

use crate::manager::PoolState;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("invalid connection parameters: {0}")]
    InvalidParameters(String),
    #[error("failed to create pool: {0}")]
    Connect(String),
    #[error("database ping failed: {0}")]
    Ping(String),
    #[error("database unavailable after {attempts} attempts")]
    Exhausted {
        attempts: u32,
        #[source]
        last: Box<StorageError>,
    },
    #[error("pool establishment cancelled")]
    Cancelled,
    #[error("pool establishment exceeded deadline of {0:?}")]
    DeadlineExceeded(Duration),
    #[error("pool manager cannot establish from state {0:?}")]
    InvalidState(PoolState),
    #[error("failed to close pool: {0}")]
    Close(String),
}

impl StorageError {
    /// 是否由启动上下文（取消或截止时间）引起。
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded(_))
    }
}
