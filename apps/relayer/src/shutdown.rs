//! Graceful shutdown coordination for the HTTP surface.
//!
//! Mirrors the corpus's `ShutdownCoordinator` pattern: a broadcast channel
//! notifies subsystems once, and a `wait_for_signal` future resolves on
//! either SIGINT or SIGTERM.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use core_config::server::ServerConfig;
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{info, warn};

#[derive(Clone)]
pub struct ShutdownCoordinator {
    tx: broadcast::Sender<()>,
    shutdown_initiated: Arc<AtomicBool>,
}

impl ShutdownCoordinator {
    pub fn new() -> (Self, broadcast::Receiver<()>) {
        let (tx, rx) = broadcast::channel(1);
        (
            Self {
                tx,
                shutdown_initiated: Arc::new(AtomicBool::new(false)),
            },
            rx,
        )
    }

    fn shutdown(&self) {
        if self
            .shutdown_initiated
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            info!("initiating graceful shutdown");
            let _ = self.tx.send(());
        }
    }

    pub async fn wait_for_signal(&self) {
        wait_for_os_signal().await;
        self.shutdown();
    }
}

async fn wait_for_os_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, initiating graceful shutdown"),
        _ = terminate => info!("received SIGTERM, initiating graceful shutdown"),
    }
}

/// Binds and serves `router`, waiting for SIGINT/SIGTERM before running
/// `cleanup` (under `shutdown_timeout`) and returning.
pub async fn serve_with_graceful_shutdown<F>(
    router: Router,
    server_config: &ServerConfig,
    shutdown_timeout: Duration,
    cleanup: F,
) -> io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let (coordinator, _rx) = ShutdownCoordinator::new();
    let signal_coordinator = coordinator.clone();

    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;
    info!("server starting on {}", listener.local_addr()?);

    let cleanup_handle = tokio::spawn(async move {
        signal_coordinator.wait_for_signal().await;

        info!("starting cleanup tasks (timeout: {:?})", shutdown_timeout);
        match tokio::time::timeout(shutdown_timeout, cleanup).await {
            Ok(()) => info!("cleanup completed successfully"),
            Err(_) => warn!("cleanup exceeded timeout of {:?}, forcing shutdown", shutdown_timeout),
        }
    });

    let serve_result = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move {
            coordinator.wait_for_signal().await;
        })
        .await
        .inspect_err(|e| tracing::error!("server encountered an error: {:?}", e));

    cleanup_handle.await.ok();

    serve_result
}
