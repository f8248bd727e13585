//! 优雅停机编排
//!
//! 在「终止信号」与「监听器故障」之间竞争，先到者触发一次有时限的排空。
//! 排空超时只记录告警，编排器不会无限期阻塞。连接池的关闭由调用方在之后完成。

use crate::server::{ListenerError, ServeHandle};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[derive(Debug)]
pub enum ShutdownTrigger {
    Signal,
    ListenerFault(ListenerError),
}

#[derive(Debug)]
pub struct ShutdownReport {
    pub trigger: ShutdownTrigger,
    /// 监听器是否在时限内完成排空
    pub drained: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct ShutdownOrchestrator {
    drain_timeout: Duration,
}

impl Default for ShutdownOrchestrator {
    fn default() -> Self {
        Self::new(Duration::from_secs(15))
    }
}

impl ShutdownOrchestrator {
    pub fn new(drain_timeout: Duration) -> Self {
        Self { drain_timeout }
    }

    /// 阻塞直到信号或监听器故障，然后排空监听器（仅一次）。
    pub async fn run<L, F>(&self, mut listener: L, signal: F) -> ShutdownReport
    where
        L: ServeHandle,
        F: Future<Output = ()>,
    {
        let trigger = tokio::select! {
            () = signal => {
                info!(target: "fgw.server", "shutdown_signal_received");
                ShutdownTrigger::Signal
            }
            fault = listener.failed() => {
                error!(target: "fgw.server", error = %fault, "http_listener_failed");
                ShutdownTrigger::ListenerFault(fault)
            }
        };

        info!(
            target: "fgw.server",
            timeout_ms = self.drain_timeout.as_millis() as u64,
            "http_drain_started"
        );
        let drained = match tokio::time::timeout(self.drain_timeout, listener.shutdown()).await {
            Ok(Ok(())) => true,
            Ok(Err(err)) => {
                warn!(target: "fgw.server", error = %err, "http_drain_failed");
                false
            }
            Err(_) => {
                warn!(
                    target: "fgw.server",
                    timeout_ms = self.drain_timeout.as_millis() as u64,
                    "http_drain_timeout"
                );
                false
            }
        };

        ShutdownReport { trigger, drained }
    }
}

/// 安装 SIGINT/SIGTERM 处理，首次收到信号时取消 `token`。
///
/// 信号注册失败在启动阶段直接返回错误。
#[cfg(unix)]
pub fn spawn_signal_listener(
    token: CancellationToken,
) -> std::io::Result<tokio::task::JoinHandle<()>> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    Ok(tokio::spawn(async move {
        tokio::select! {
            _ = sigterm.recv() => info!(target: "fgw.server", signal = "SIGTERM", "os_signal"),
            _ = sigint.recv() => info!(target: "fgw.server", signal = "SIGINT", "os_signal"),
            () = token.cancelled() => return,
        }
        token.cancel();
    }))
}

#[cfg(not(unix))]
pub fn spawn_signal_listener(
    token: CancellationToken,
) -> std::io::Result<tokio::task::JoinHandle<()>> {
    Ok(tokio::spawn(async move {
        tokio::select! {
            result = tokio::signal::ctrl_c() => match result {
                Ok(()) => info!(target: "fgw.server", signal = "ctrl-c", "os_signal"),
                Err(err) => {
                    error!(target: "fgw.server", error = %err, "ctrl_c_listener_failed");
                    return;
                }
            },
            () = token.cancelled() => return,
        }
        token.cancel();
    }))
}
