use std::future::Future;
use std::pin::pin;

use anyhow::Result;
use tokio::signal;

/// Signals that can trigger shutdown.
enum ShutdownSignal {
    CtrlC,
    #[cfg(unix)]
    Sigterm,
}

/// Resolves once Ctrl+C or SIGTERM arrives. If neither handler can be
/// installed the error is logged and the server keeps running.
pub async fn shutdown_signal() {
    match wait_for_shutdown().await {
        Ok(ShutdownSignal::CtrlC) => tracing::info!("Received Ctrl+C, shutting down"),
        #[cfg(unix)]
        Ok(ShutdownSignal::Sigterm) => tracing::info!("Received SIGTERM, shutting down"),
        Err(e) => {
            tracing::error!(error = %e, "signal handling failed");
            std::future::pending::<()>().await;
        }
    }
}

async fn wait_for_shutdown() -> Result<ShutdownSignal> {
    first_signal(wait_ctrl_c(), wait_sigterm()).await
}

/// First signal to arrive. A source that fails is logged and the other one
/// is still awaited; only when both fail is the error returned.
async fn first_signal<A, B>(ctrl_c: A, sigterm: B) -> Result<ShutdownSignal>
where
    A: Future<Output = Result<ShutdownSignal>>,
    B: Future<Output = Result<ShutdownSignal>>,
{
    let mut ctrl_c = pin!(ctrl_c);
    let mut sigterm = pin!(sigterm);

    tokio::select! {
        result = &mut ctrl_c => match result {
            Ok(signal) => Ok(signal),
            Err(e) => {
                tracing::warn!(error = %e, "Ctrl+C handler unavailable, waiting for SIGTERM");
                sigterm.await
            }
        },
        result = &mut sigterm => match result {
            Ok(signal) => Ok(signal),
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable, waiting for Ctrl+C");
                ctrl_c.await
            }
        },
    }
}

async fn wait_ctrl_c() -> Result<ShutdownSignal> {
    signal::ctrl_c().await?;
    Ok(ShutdownSignal::CtrlC)
}

#[cfg(unix)]
async fn wait_sigterm() -> Result<ShutdownSignal> {
    let mut handler = signal::unix::signal(signal::unix::SignalKind::terminate())?;
    handler.recv().await;
    Ok(ShutdownSignal::Sigterm)
}

#[cfg(not(unix))]
async fn wait_sigterm() -> Result<ShutdownSignal> {
    std::future::pending::<Result<ShutdownSignal>>().await
}
