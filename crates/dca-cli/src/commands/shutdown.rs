//! 종료 시그널 처리.

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// 종료 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 종료 토큰을 취소합니다.
/// 토큰이 다른 곳에서 먼저 취소되면 그대로 반환합니다.
pub async fn shutdown_signal(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, cancelling in-flight order...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, cancelling in-flight order...");
        }
        _ = shutdown_token.cancelled() => {
            return;
        }
    }

    shutdown_token.cancel();
    info!("Shutdown signal propagated");
}
