//! Pin watcher - one blocking edge watcher per button.
//!
//! Each watcher runs on the tokio blocking pool because the hardware edge
//! wait is synchronous. The wait is bounded by a timeout so that the
//! cancellation token is checked at least once per timeout interval; that
//! timeout is the worst-case shutdown latency.
//!
//! # Panic-Free Guarantees
//!
//! - No `.unwrap()`, `.expect()`, `panic!()`, `unreachable!()`, `todo!()`
//! - Hardware errors end the loop and travel to the main loop inside the
//!   source's close message

use std::sync::Arc;
use std::time::Duration;

use bonnet_core::{HardwareResult, InputPin};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::mux::SourceSender;

/// Default bound on a single edge wait.
pub const EDGE_WAIT_TIMEOUT: Duration = Duration::from_secs(1);

/// Why a watcher loop ended without a hardware error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchExit {
    /// The cancellation token fired
    Cancelled,
    /// The multiplexer was dropped
    Disconnected,
}

/// Spawns a watcher for `pin` on the blocking pool.
///
/// The watcher closes `sender` exactly once when it exits, carrying the
/// hardware error that stopped it, if any.
pub fn spawn_pin_watcher(
    pin: Arc<dyn InputPin>,
    sender: SourceSender,
    cancel_token: CancellationToken,
    timeout: Duration,
) -> JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        let source = sender.index();
        match watch_pin(pin.as_ref(), &sender, &cancel_token, timeout) {
            Ok(exit) => {
                debug!(pin = pin.label(), source, ?exit, "Pin watcher stopped");
                sender.blocking_close(None);
            }
            Err(e) => {
                warn!(pin = pin.label(), source, error = %e, "Pin watcher failed");
                sender.blocking_close(Some(e));
            }
        }
    })
}

/// Runs the watch loop on the current thread until cancelled.
///
/// 1. Stop if cancelled.
/// 2. Wait up to `timeout` for an edge.
/// 3. On timeout go back to 1; on an edge send one notification, then go back to 1.
pub fn watch_pin(
    pin: &dyn InputPin,
    sender: &SourceSender,
    cancel_token: &CancellationToken,
    timeout: Duration,
) -> HardwareResult<WatchExit> {
    loop {
        if cancel_token.is_cancelled() {
            return Ok(WatchExit::Cancelled);
        }

        if !pin.wait_for_edge(timeout)? {
            continue;
        }

        if !sender.blocking_notify() {
            return Ok(WatchExit::Disconnected);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mux::{EventMux, Wakeup};
    use bonnet_core::mocks::MockPin;
    use bonnet_core::{HardwareError, Level};
    use std::time::Instant;
    use tokio::time::timeout;

    const SHORT_WAIT: Duration = Duration::from_millis(20);

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let (mut mux, mut senders) = EventMux::with_sources(1);
        let pin = Arc::new(MockPin::new("Button A", Level::High));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let handle = spawn_pin_watcher(pin.clone(), senders.remove(0), cancel, SHORT_WAIT);
        handle.await.unwrap();

        assert_eq!(mux.next().await, Some(Wakeup::Closed { source: 0, fault: None }));
        assert_eq!(pin.wait_count(), 0);
    }

    #[tokio::test]
    async fn test_edge_produces_one_notification() {
        let (mut mux, mut senders) = EventMux::with_sources(1);
        let pin = Arc::new(MockPin::new("Button A", Level::High));
        let cancel = CancellationToken::new();

        let handle = spawn_pin_watcher(pin.clone(), senders.remove(0), cancel.clone(), SHORT_WAIT);
        pin.set_level(Level::Low);

        let wakeup = timeout(Duration::from_secs(2), mux.next()).await.unwrap();
        assert_eq!(wakeup, Some(Wakeup::Edge { source: 0 }));

        cancel.cancel();
        let wakeup = timeout(Duration::from_secs(2), mux.next()).await.unwrap();
        assert_eq!(wakeup, Some(Wakeup::Closed { source: 0, fault: None }));
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_cancel_closes_within_one_timeout() {
        let wait = Duration::from_millis(200);
        let (mut mux, mut senders) = EventMux::with_sources(1);
        let pin = Arc::new(MockPin::new("Button A", Level::High));
        let cancel = CancellationToken::new();

        let handle = spawn_pin_watcher(pin.clone(), senders.remove(0), cancel.clone(), wait);
        timeout(Duration::from_secs(2), async {
            while pin.wait_count() == 0 {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .unwrap();

        let started = Instant::now();
        cancel.cancel();
        let wakeup = timeout(Duration::from_secs(2), mux.next()).await.unwrap();
        assert_eq!(wakeup, Some(Wakeup::Closed { source: 0, fault: None }));
        assert!(
            started.elapsed() < wait + Duration::from_millis(150),
            "closed after {:?}",
            started.elapsed()
        );
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_hardware_error_closes_with_fault() {
        let (mut mux, mut senders) = EventMux::with_sources(1);
        let pin = Arc::new(MockPin::new("Button A", Level::High));
        let fault = HardwareError::EdgeWait {
            pin: "Button A".to_string(),
            reason: "device removed".to_string(),
        };
        pin.fail_next_wait(fault.clone());

        let handle = spawn_pin_watcher(pin, senders.remove(0), CancellationToken::new(), SHORT_WAIT);

        let wakeup = timeout(Duration::from_secs(2), mux.next()).await.unwrap();
        assert_eq!(wakeup, Some(Wakeup::Closed { source: 0, fault: Some(fault) }));
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_stops_when_mux_dropped() {
        let (mux, mut senders) = EventMux::with_sources(1);
        let pin = Arc::new(MockPin::new("Button A", Level::High));
        drop(mux);

        let handle = spawn_pin_watcher(pin.clone(), senders.remove(0), CancellationToken::new(), SHORT_WAIT);
        pin.trigger_edge();

        timeout(Duration::from_secs(2), handle).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_timeouts_keep_waiting() {
        let (_mux, mut senders) = EventMux::with_sources(1);
        let pin = Arc::new(MockPin::new("Button A", Level::High));
        let cancel = CancellationToken::new();

        let handle = spawn_pin_watcher(pin.clone(), senders.remove(0), cancel.clone(), Duration::from_millis(5));
        tokio::time::sleep(Duration::from_millis(60)).await;
        cancel.cancel();
        handle.await.unwrap();

        assert!(pin.wait_count() >= 2);
    }
}
