//! fgw-web：单页面 HTTP 服务 + PostgreSQL 连接池。
//!
//! 启动顺序：配置 → 连接池（带重试）→ HTTP 监听器 → 停机编排。
//! 停机顺序：排空监听器（有时限）→ 关闭连接池（无条件）。

mod middleware;
mod routes;
mod server;
mod shutdown;

use fgw_config::{AppConfig, Config, ConfigError};
use fgw_storage::{
    Connector, PgConnector, PoolManager, PoolSettings, RetryPolicy, StartupContext, StorageError,
};
use fgw_telemetry::init_tracing;
use routes::{AppState, create_router};
use server::{HttpServer, ServeHandle};
use shutdown::{ShutdownOrchestrator, ShutdownReport, ShutdownTrigger, spawn_signal_listener};
use std::future::Future;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// 启动阶段的致命错误，由 `main` 决定退出码。
#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("database error: {0}")]
    Storage(#[from] StorageError),
    #[error("failed to bind http listener on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to install signal handlers: {0}")]
    Signal(#[source] std::io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "startup_failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    let database = Config::load(&config.database_config_path)?;

    // 根令牌：OS 信号到达时取消，同时中止仍在进行的建池重试
    let shutdown = CancellationToken::new();
    spawn_signal_listener(shutdown.clone()).map_err(AppError::Signal)?;

    let settings = PoolSettings::from_params(&database.psql)
        .with_acquire_timeout(config.db_attempt_timeout);
    let mut pool_manager = PoolManager::new(
        PgConnector,
        settings,
        RetryPolicy::fixed(config.db_connect_attempts, config.db_retry_delay),
    );
    let startup = StartupContext::with_timeout(shutdown.child_token(), config.startup_timeout);

    let report = run_lifecycle(
        &mut pool_manager,
        &startup,
        || bind_listener(&config),
        ShutdownOrchestrator::new(config.drain_timeout),
        shutdown.cancelled(),
    )
    .await?;

    match &report.trigger {
        ShutdownTrigger::Signal => info!(drained = report.drained, "shutdown_complete"),
        ShutdownTrigger::ListenerFault(fault) => warn!(
            error = %fault,
            drained = report.drained,
            "shutdown_complete_after_listener_fault"
        ),
    }
    Ok(())
}

/// 生命周期编排：连接池 Live 之后才启动监听器；停机时先排空监听器，再无条件关闭连接池。
async fn run_lifecycle<C, L, B, Fut, S>(
    pool_manager: &mut PoolManager<C>,
    startup: &StartupContext,
    start_listener: B,
    orchestrator: ShutdownOrchestrator,
    signal: S,
) -> Result<ShutdownReport, AppError>
where
    C: Connector,
    L: ServeHandle,
    B: FnOnce() -> Fut,
    Fut: Future<Output = Result<L, AppError>>,
    S: Future<Output = ()>,
{
    pool_manager.establish(startup).await?;

    let served = match start_listener().await {
        Ok(listener) => Ok(orchestrator.run(listener, signal).await),
        Err(err) => Err(err),
    };

    if let Err(err) = pool_manager.close().await {
        warn!(error = %err, "db_pool_close_failed");
    }
    served
}

async fn bind_listener(config: &AppConfig) -> Result<HttpServer, AppError> {
    let state = AppState::new(config.index_template_path.clone());
    let router = create_router(state, config.request_timeout);
    let server = HttpServer::bind(&config.http_addr, router)
        .await
        .map_err(|source| AppError::Bind {
            addr: config.http_addr.clone(),
            source,
        })?;

    info!(target: "fgw.server", addr = %server.local_addr(), "http_server_listening");
    Ok(server)
}
