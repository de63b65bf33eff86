use tokio::signal;

/// Resolves on Ctrl-C, or SIGTERM on unix.
#[allow(clippy::expect_used)]
pub async fn shutdown_signal() {
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
        _ = ctrl_c => {
            tracing::info!("{:<20} - Received Ctrl+C", "shutdown");
        }
        _ = terminate => {
            tracing::info!("{:<20} - Received SIGTERM", "shutdown");
        }
    }
}
