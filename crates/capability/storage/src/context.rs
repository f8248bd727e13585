//! 启动上下文：取消令牌 + 可选的整体截止时间。
//!
//! 截止时间约束整个建池重试序列，而不是单次尝试。

use crate::error::StorageError;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy)]
struct Deadline {
    at: Instant,
    timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct StartupContext {
    cancel: CancellationToken,
    deadline: Option<Deadline>,
}

impl StartupContext {
    /// 仅由令牌取消，无截止时间。
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            deadline: None,
        }
    }

    /// 从现在起 `timeout` 后到期。
    pub fn with_timeout(cancel: CancellationToken, timeout: Duration) -> Self {
        Self {
            cancel,
            deadline: Some(Deadline {
                at: Instant::now() + timeout,
                timeout,
            }),
        }
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// 已取消或已到期时返回对应错误，取消优先。
    pub fn err(&self) -> Option<StorageError> {
        if self.cancel.is_cancelled() {
            return Some(StorageError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline.at => {
                Some(StorageError::DeadlineExceeded(deadline.timeout))
            }
            _ => None,
        }
    }

    /// 等待取消或到期。
    pub async fn done(&self) -> StorageError {
        match self.deadline {
            Some(deadline) => tokio::select! {
                biased;
                _ = self.cancel.cancelled() => StorageError::Cancelled,
                _ = tokio::time::sleep_until(deadline.at) => {
                    StorageError::DeadlineExceeded(deadline.timeout)
                }
            },
            None => {
                self.cancel.cancelled().await;
                StorageError::Cancelled
            }
        }
    }
}
