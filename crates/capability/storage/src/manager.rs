//! 连接池生命周期管理
//!
//! 状态流转：
//!
//! ```text
//! Unstarted → Attempting(i) → Live | Attempting(i + 1) | Failed
//! Live → Closed
//! ```
//!
//! 每次尝试依次执行建池与 ping，失败时先关闭本次创建的连接池再进入下一次尝试。
//! 启动上下文在每个挂起点参与竞争，取消或到期立即中止，不再重试。

use crate::connection::PoolSettings;
use crate::context::StartupContext;
use crate::error::StorageError;
use crate::retry::RetryPolicy;
use crate::traits::Connector;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolState {
    Unstarted,
    Attempting(u32),
    Live,
    Failed,
    Closed,
}

enum AttemptError {
    /// 可重试
    Retry(StorageError),
    /// 立即终止
    Abort(StorageError),
}

/// 连接池唯一所有者，负责建立与关闭。
pub struct PoolManager<C: Connector> {
    connector: C,
    settings: PoolSettings,
    policy: RetryPolicy,
    pool: Option<C::Pool>,
    state: PoolState,
}

impl<C: Connector> PoolManager<C> {
    pub fn new(connector: C, settings: PoolSettings, policy: RetryPolicy) -> Self {
        Self {
            connector,
            settings,
            policy,
            pool: None,
            state: PoolState::Unstarted,
        }
    }

    pub fn state(&self) -> PoolState {
        self.state
    }

    /// 仅在 `Live` 状态下返回连接池。
    pub fn pool(&self) -> Option<&C::Pool> {
        self.pool.as_ref()
    }

    pub fn settings(&self) -> &PoolSettings {
        &self.settings
    }

    /// 建立连接池并通过 ping 校验。
    ///
    /// 已处于 `Live` 时直接返回现有连接池；`Failed`/`Closed` 之后不允许再次建立。
    pub async fn establish(&mut self, ctx: &StartupContext) -> Result<&C::Pool, StorageError> {
        match self.state {
            PoolState::Unstarted => {}
            PoolState::Live => {
                return self
                    .pool
                    .as_ref()
                    .ok_or(StorageError::InvalidState(PoolState::Live));
            }
            state => return Err(StorageError::InvalidState(state)),
        }

        match self.run_attempts(ctx).await {
            Ok(pool) => {
                self.state = PoolState::Live;
                info!(
                    target: "fgw.storage",
                    max_connections = self.settings.max_connections,
                    min_connections = self.settings.min_connections,
                    "db_pool_live"
                );
                Ok(&*self.pool.insert(pool))
            }
            Err(err) => {
                self.state = PoolState::Failed;
                Err(err)
            }
        }
    }

    /// 关闭连接池。幂等：未建立或已关闭时直接返回 `Ok`。
    pub async fn close(&mut self) -> Result<(), StorageError> {
        let Some(pool) = self.pool.take() else {
            return Ok(());
        };
        self.state = PoolState::Closed;
        self.connector.close(pool).await?;
        info!(target: "fgw.storage", "db_pool_closed");
        Ok(())
    }

    async fn run_attempts(&mut self, ctx: &StartupContext) -> Result<C::Pool, StorageError> {
        let max_attempts = self.policy.max_attempts();
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            if let Some(err) = ctx.err() {
                return Err(err);
            }
            self.state = PoolState::Attempting(attempt);

            let err = match self.attempt(ctx).await {
                Ok(pool) => return Ok(pool),
                Err(AttemptError::Abort(err)) => return Err(err),
                Err(AttemptError::Retry(err)) => err,
            };
            warn!(
                target: "fgw.storage",
                attempt,
                max_attempts,
                error = %err,
                "db_connect_attempt_failed"
            );
            last_error = Some(err);

            if let Some(delay) = self.policy.delay_after(attempt) {
                tokio::select! {
                    biased;
                    err = ctx.done() => return Err(err),
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }

        let last = last_error
            .unwrap_or_else(|| StorageError::Connect("no connection attempt was made".to_string()));
        Err(StorageError::Exhausted {
            attempts: max_attempts,
            last: Box::new(last),
        })
    }

    async fn attempt(&self, ctx: &StartupContext) -> Result<C::Pool, AttemptError> {
        let connected = tokio::select! {
            biased;
            err = ctx.done() => return Err(AttemptError::Abort(err)),
            result = self.connector.connect(&self.settings) => result,
        };
        let pool = match connected {
            Ok(pool) => pool,
            Err(err @ StorageError::InvalidParameters(_)) => return Err(AttemptError::Abort(err)),
            Err(err) => return Err(AttemptError::Retry(err)),
        };

        let pinged = tokio::select! {
            biased;
            err = ctx.done() => Err(AttemptError::Abort(err)),
            result = self.connector.ping(&pool) => result.map_err(AttemptError::Retry),
        };
        match pinged {
            Ok(()) => Ok(pool),
            Err(err) => {
                if let Err(close_err) = self.connector.close(pool).await {
                    warn!(target: "fgw.storage", error = %close_err, "db_attempt_pool_close_failed");
                }
                Err(err)
            }
        }
    }
}
