//! Signal handling and graceful shutdown.

use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Waits for SIGINT or SIGTERM.
pub async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut terminate = match signal(SignalKind::terminate()) {
            Ok(stream) => stream,
            Err(error) => {
                tracing::warn!(%error, "failed to install SIGTERM handler, using ctrl-c only");
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = terminate.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

/// Resolves when shutdown begins: cancels `root` so in-flight work winds
/// down, and arms the forced-exit watchdog (second signal or grace expiry
/// exits with code 2).
pub async fn shutdown_signal(root: CancellationToken, grace: Duration) {
    wait_for_signal().await;
    tracing::info!("shutdown signal received, draining in-flight requests");
    root.cancel();

    tokio::spawn(async move {
        tokio::select! {
            _ = wait_for_signal() => {
                tracing::error!("second signal received, forcing shutdown");
            }
            _ = tokio::time::sleep(grace) => {
                tracing::error!(grace_secs = grace.as_secs(), "grace period elapsed, forcing shutdown");
            }
        }
        std::process::exit(2);
    });
}
