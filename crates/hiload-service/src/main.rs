//! hiload service binary.
//!
//! - Config: `HILOAD_CONFIG` / `hiload.yaml` / defaults, `PORT` override
//! - Metrics registry created once here and carried by `AppState`
//! - Graceful shutdown on Ctrl+C / SIGTERM

use tracing_subscriber::{fmt, EnvFilter};

use hiload_core::error::{HiloadError, Result};
use hiload_service::{app_state, config, router};

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = config::load_from_env()?;
    let listen = cfg.listen_addr();

    let state = app_state::AppState::new(cfg)?;
    let app = router::build_router(state);

    let listener = tokio::net::TcpListener::bind(&listen)
        .await
        .map_err(|e| HiloadError::Internal(format!("bind {listen} failed: {e}")))?;

    tracing::info!(%listen, "hiload starting");
    tracing::info!("metrics: http://{listen}/metrics");
    tracing::info!("health:  http://{listen}/health");
    tracing::info!("requests per second: rate(http_requests_total[5m])");
    tracing::info!(
        "average response time: rate(http_request_duration_seconds_sum[5m]) / rate(http_request_duration_seconds_count[5m])"
    );
    tracing::info!(
        "95th percentile latency: histogram_quantile(0.95, rate(http_request_duration_seconds_bucket[5m]))"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| HiloadError::Internal(format!("server failed: {e}")))?;

    tracing::info!("hiload stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("signal received, starting graceful shutdown");
}
