//! Lifecycle controller - turns termination requests into cancellation.
//!
//! Termination is cooperative: the listener only cancels the shared token.
//! Watchers notice it at the top of their next loop iteration, close their
//! sources, and the monitor finishes its shutdown sequence on its own.
//!
//! # Signal Handling
//!
//! - SIGTERM/SIGINT: graceful shutdown (exit status 0)

use std::future::Future;
use std::io;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

#[cfg(unix)]
use tokio::signal::unix::{signal, Signal, SignalKind};

/// Registered termination signals.
///
/// Registering is separate from waiting so a registration failure can be
/// reported before the monitor starts.
pub struct ShutdownSignals {
    #[cfg(unix)]
    sigterm: Signal,
    #[cfg(unix)]
    sigint: Signal,
}

impl ShutdownSignals {
    /// Registers SIGTERM and SIGINT handlers. Must be called inside a runtime.
    pub fn register() -> io::Result<Self> {
        #[cfg(unix)]
        {
            Ok(Self {
                sigterm: signal(SignalKind::terminate())?,
                sigint: signal(SignalKind::interrupt())?,
            })
        }

        #[cfg(not(unix))]
        {
            Ok(Self {})
        }
    }

    /// Waits for the first termination signal.
    pub async fn recv(self) {
        #[cfg(unix)]
        {
            let Self {
                mut sigterm,
                mut sigint,
            } = self;
            tokio::select! {
                _ = sigterm.recv() => {
                    info!("Received SIGTERM");
                }
                _ = sigint.recv() => {
                    info!("Received SIGINT");
                }
            }
        }

        #[cfg(not(unix))]
        {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Received Ctrl+C"),
                Err(e) => tracing::error!(error = %e, "Error waiting for Ctrl+C"),
            }
        }
    }
}

/// Cancels `cancel_token` once `trigger` completes.
///
/// The task also exits, without doing anything, if the token is cancelled
/// by someone else first.
pub fn cancel_on<F>(trigger: F, cancel_token: CancellationToken) -> JoinHandle<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        tokio::select! {
            _ = trigger => {
                info!("Shutdown requested");
                cancel_token.cancel();
            }
            _ = cancel_token.cancelled() => {
                debug!("Shutdown listener stopping: already cancelled");
            }
        }
    })
}

/// Registers signal handlers and spawns the task that cancels on receipt.
///
/// `on_signal` runs once a signal has arrived, before the token is cancelled.
pub fn spawn_shutdown_listener<F>(
    cancel_token: CancellationToken,
    on_signal: F,
) -> io::Result<JoinHandle<()>>
where
    F: FnOnce() + Send + 'static,
{
    let signals = ShutdownSignals::register()?;
    let trigger = async move {
        signals.recv().await;
        on_signal();
    };
    Ok(cancel_on(trigger, cancel_token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::oneshot;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_trigger_cancels_token() {
        let cancel = CancellationToken::new();
        let (tx, rx) = oneshot::channel::<()>();
        let handle = cancel_on(
            async move {
                let _ = rx.await;
            },
            cancel.clone(),
        );

        assert!(!cancel.is_cancelled());
        tx.send(()).unwrap();
        handle.await.unwrap();
        assert!(cancel.is_cancelled());
    }

    #[tokio::test]
    async fn test_listener_exits_when_cancelled_elsewhere() {
        let cancel = CancellationToken::new();
        let handle = cancel_on(std::future::pending(), cancel.clone());
        cancel.cancel();
        timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent() {
        let cancel = CancellationToken::new();
        let first = cancel_on(async {}, cancel.clone());
        first.await.unwrap();
        let second = cancel_on(async {}, cancel.clone());
        second.await.unwrap();
        assert!(cancel.is_cancelled());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_register_signals() {
        let cancel = CancellationToken::new();
        let handle = spawn_shutdown_listener(cancel.clone(), || {}).unwrap();
        cancel.cancel();
        timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
