//! # FGW Storage 模块
//!
//! 负责 PostgreSQL 连接池的完整生命周期：建立、校验、关闭。
//!
//! ## 模块说明
//!
//! - [`connection`]：连接 URI 拼接、连接池规格、sqlx 连接器
//! - [`traits`]：`Connector` 接口（测试中可替换为内存实现）
//! - [`retry`]：固定次数、固定间隔的重试策略
//! - [`context`]：启动上下文（取消令牌 + 整体截止时间）
//! - [`manager`]：`PoolManager`，带重试的建池流程与幂等关闭
//! - [`error`]：存储错误类型
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use fgw_storage::{PgConnector, PoolManager, PoolSettings, RetryPolicy, StartupContext};
//! use tokio_util::sync::CancellationToken;
//!
//! let settings = PoolSettings::from_params(&config.psql);
//! let mut manager = PoolManager::new(PgConnector, settings, RetryPolicy::default());
//! let ctx = StartupContext::with_timeout(CancellationToken::new(), Duration::from_secs(15));
//! let pool = manager.establish(&ctx).await?.clone();
//! // ...
//! manager.close().await?;
//! ```
//!
//! ## 约束
//!
//! - 连接池在 ping 成功之前不会暴露给调用方
//! - 每个进程最多建立一次连接池，关闭只能经由 `PoolManager`

pub mod connection;
pub mod context;
pub mod error;
pub mod manager;
pub mod retry;
pub mod traits;

pub use connection::*;
pub use context::*;
pub use error::*;
pub use manager::*;
pub use retry::*;
pub use traits::*;
