use std::sync::Arc;
use tokio::signal;
use tracing::{error, warn};

use crate::storage::Storage;

/// 等待 Ctrl+C 或 SIGTERM
pub async fn listen_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    warn!("Shutdown signal received, initiating graceful shutdown...");
}

/// 释放存储连接
pub async fn release_resources(storage: Arc<dyn Storage>) {
    storage.shutdown().await;
    warn!("Storage connections closed");
}
