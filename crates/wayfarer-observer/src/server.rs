//! Observer listener lifecycle.
//!
//! The listener is bound before the serve task is spawned, so a port that is
//! already taken is reported to the engine at startup instead of being lost
//! in a background task.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::router::build_router;
use crate::state::AppState;

/// Errors that can occur when starting or running the Observer server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The port could not be bound.
    #[error("cannot bind observer on {addr}: {source}")]
    Bind {
        /// The address that was requested.
        addr: SocketAddr,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The server failed while serving.
    #[error("observer stopped: {0}")]
    Serve(#[from] std::io::Error),
}

/// A running Observer.
#[derive(Debug)]
pub struct ObserverHandle {
    /// The address actually bound (useful with port 0).
    pub addr: SocketAddr,
    /// The serve task. Abort it to stop the server.
    pub task: JoinHandle<()>,
}

/// Bind `0.0.0.0:{port}`. Port 0 picks a free port.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the port is unavailable.
pub async fn bind(port: u16) -> Result<TcpListener, ServerError> {
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })
}

/// Serve the Observer API on `listener` until the process exits.
///
/// # Errors
///
/// Returns [`ServerError::Serve`] if the accept loop fails.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> Result<(), ServerError> {
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}

/// Bind the Observer and serve it on a background task.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the port is unavailable.
pub async fn spawn_observer(port: u16, state: Arc<AppState>) -> Result<ObserverHandle, ServerError> {
    let listener = bind(port).await?;
    let addr = listener.local_addr()?;
    info!(%addr, "Observer server listening");

    let task = tokio::spawn(async move {
        if let Err(e) = serve(listener, state).await {
            error!(error = %e, "Observer server exited with error");
        }
    });
    Ok(ObserverHandle { addr, task })
}
