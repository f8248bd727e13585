//! HTTP 监听器
//!
//! `HttpServer` 在独立任务中运行 accept 循环，并区分两种结束方式：
//! - 经 `shutdown()` 请求的关闭：不会被上报为故障
//! - 监听循环自身出错或意外退出：通过 `failed()` 上报

use async_trait::async_trait;
use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    #[error("http listener failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("http listener stopped without a shutdown request")]
    Closed,
    #[error("http server task failed: {0}")]
    Task(String),
}

/// 可被停机编排器监督的监听器。
#[async_trait]
pub trait ServeHandle: Send {
    /// 仅在真实故障时完成；正常关闭后永远挂起。
    async fn failed(&mut self) -> ListenerError;

    /// 停止接收新连接并等待在途请求完成。
    async fn shutdown(&mut self) -> Result<(), ListenerError>;
}

pub struct HttpServer {
    local_addr: SocketAddr,
    stop: CancellationToken,
    fault_rx: Option<oneshot::Receiver<ListenerError>>,
    task: Option<JoinHandle<()>>,
}

impl HttpServer {
    /// 绑定地址并在后台开始服务。
    pub async fn bind(addr: &str, router: Router) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        Ok(Self::serve(listener, local_addr, router))
    }

    fn serve(listener: TcpListener, local_addr: SocketAddr, router: Router) -> Self {
        let stop = CancellationToken::new();
        let (fault_tx, fault_rx) = oneshot::channel();

        let serve_stop = stop.clone();
        let task = tokio::spawn(async move {
            let signal = serve_stop.clone();
            let result = axum::serve(listener, router)
                .with_graceful_shutdown(async move { signal.cancelled().await })
                .await;

            let fault = match result {
                Err(err) => Some(ListenerError::Io(err)),
                Ok(()) if !serve_stop.is_cancelled() => Some(ListenerError::Closed),
                Ok(()) => None,
            };
            if let Some(fault) = fault {
                let _ = fault_tx.send(fault);
            }
        });

        Self {
            local_addr,
            stop,
            fault_rx: Some(fault_rx),
            task: Some(task),
        }
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    async fn task_fault(&mut self) -> ListenerError {
        let Some(task) = self.task.take() else {
            return ListenerError::Closed;
        };
        match task.await {
            Err(err) => ListenerError::Task(err.to_string()),
            Ok(()) => ListenerError::Closed,
        }
    }
}

#[async_trait]
impl ServeHandle for HttpServer {
    async fn failed(&mut self) -> ListenerError {
        if let Some(rx) = self.fault_rx.as_mut() {
            let received = rx.await;
            self.fault_rx = None;
            match received {
                Ok(fault) => return fault,
                // 未请求关闭时发送端被丢弃：服务任务 panic 或被中止
                Err(_) if !self.stop.is_cancelled() => return self.task_fault().await,
                Err(_) => {}
            }
        }
        std::future::pending::<ListenerError>().await
    }

    async fn shutdown(&mut self) -> Result<(), ListenerError> {
        self.stop.cancel();
        let Some(task) = self.task.take() else {
            return Ok(());
        };
        task.await
            .map_err(|err| ListenerError::Task(err.to_string()))?;
        info!(target: "fgw.server", addr = %self.local_addr, "http_server_stopped");
        Ok(())
    }
}

impl Drop for HttpServer {
    fn drop(&mut self) {
        self.stop.cancel();
    }
}
