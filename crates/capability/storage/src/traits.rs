//! 连接器接口：重试循环与具体驱动之间的边界。

use crate::connection::PoolSettings;
use crate::error::StorageError;
use async_trait::async_trait;

#[async_trait]
pub trait Connector: Send + Sync {
    type Pool: Send + Sync;

    /// 按规格创建连接池。
    async fn connect(&self, settings: &PoolSettings) -> Result<Self::Pool, StorageError>;

    /// 连通性检查。
    async fn ping(&self, pool: &Self::Pool) -> Result<(), StorageError>;

    /// 释放连接池持有的全部连接。
    async fn close(&self, pool: Self::Pool) -> Result<(), StorageError>;
}
