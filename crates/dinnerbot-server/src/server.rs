//! Long-running server mode: liveness routes plus the scheduled job.

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;

use dinnerbot_core::{Notifier, Recommender};
use tokio::sync::oneshot;

use crate::{api::build_app, orchestrator::Orchestrator};

/// Serve the liveness routes on `0.0.0.0:{port}` while the orchestrator runs.
///
/// The listener is up before the orchestrator starts, so health probes are
/// answered during startup. A failed start shuts the listener down and is
/// returned as an error. On Ctrl-C / SIGTERM the server drains and the
/// orchestrator is stopped.
///
/// # Errors
///
/// Returns an error if the port cannot be bound, the orchestrator fails to
/// start, or the server task fails.
pub async fn serve<R, N>(orchestrator: Arc<Orchestrator<R, N>>, port: u16) -> anyhow::Result<()>
where
    R: Recommender,
    N: Notifier,
{
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server: listening");

    let (abort_tx, abort_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(
        axum::serve(listener, build_app())
            .with_graceful_shutdown(shutdown_signal(abort_rx))
            .into_future(),
    );

    if let Err(e) = orchestrator.start().await {
        tracing::error!(error = %e, "server: orchestrator failed to start; shutting down");
        orchestrator.stop().await;
        let _ = abort_tx.send(());
        match server.await {
            Ok(Ok(())) => {}
            Ok(Err(io)) => tracing::warn!(error = %io, "server: listener failed during shutdown"),
            Err(join) => tracing::warn!(error = %join, "server: listener task failed"),
        }
        return Err(e.into());
    }

    let served = server.await;
    orchestrator.stop().await;
    served??;
    Ok(())
}

async fn shutdown_signal(abort: oneshot::Receiver<()>) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
        _ = abort => return,
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
