//! Button monitor - the single update loop.
//!
//! The monitor is the only writer of button state and of the frame buffer.
//! Watchers only ever send notifications; every state change happens here,
//! one notification at a time, and each one is followed by a full
//! recompose-and-draw before the next notification is taken.
//!
//! # Lifecycle
//!
//! ```text
//! configure pins ─▶ sample ─▶ draw ─▶ spawn watchers ─▶ ┌─ next wakeup ◀─┐
//!                                                       │  resample, draw │
//!                                                       └────────┬────────┘
//!                                        all sources closed      │
//!                                                                ▼
//!                                   clear ─▶ draw ─▶ halt ─▶ release pins
//! ```
//!
//! # Panic-Free Guarantees
//!
//! - No `.unwrap()`, `.expect()`, `panic!()`, `unreachable!()`, `todo!()`
//! - Any hardware error is returned, after cancelling every watcher

use std::io::Write;
use std::time::Duration;

use embedded_graphics::prelude::*;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use bonnet_core::{compose_frame, Display, Edge, FrameBuffer, HardwareResult, Pull};

use crate::error::MonitorError;
use crate::mux::{EventMux, Wakeup};
use crate::tracker::ButtonTracker;
use crate::watcher::{spawn_pin_watcher, EDGE_WAIT_TIMEOUT};

/// Line printed once the initial frame is on screen.
pub const READY_MESSAGE: &str = "Press buttons... ";

/// Owns the buttons, the frame and the display for one monitor run.
pub struct ButtonMonitor<D, W> {
    tracker: ButtonTracker,
    display: D,
    frame: FrameBuffer,
    output: W,
    edge_timeout: Duration,
}

impl<D, W> ButtonMonitor<D, W>
where
    D: Display,
    W: Write,
{
    /// Creates a monitor that prints transitions to `output`.
    pub fn new(tracker: ButtonTracker, display: D, output: W) -> Self {
        Self {
            tracker,
            display,
            frame: FrameBuffer::new(),
            output,
            edge_timeout: EDGE_WAIT_TIMEOUT,
        }
    }

    /// Overrides the per-wait edge timeout (and so the shutdown latency).
    ///
    /// Test hook: the CLI always runs with [`EDGE_WAIT_TIMEOUT`].
    #[must_use]
    pub fn with_edge_timeout(mut self, edge_timeout: Duration) -> Self {
        self.edge_timeout = edge_timeout;
        self
    }

    pub fn tracker(&self) -> &ButtonTracker {
        &self.tracker
    }

    pub fn edge_timeout(&self) -> Duration {
        self.edge_timeout
    }

    /// Runs until `cancel_token` fires and every watcher has closed.
    ///
    /// Returns `Ok(())` on a requested shutdown. Any hardware failure is
    /// returned as an error after the watchers have been told to stop.
    pub async fn run(mut self, cancel_token: CancellationToken) -> Result<(), MonitorError> {
        self.start()?;

        let (mut mux, senders) = EventMux::with_sources(self.tracker.len());
        let watchers: Vec<JoinHandle<()>> = self
            .tracker
            .pins()
            .into_iter()
            .zip(senders)
            .map(|(pin, sender)| {
                spawn_pin_watcher(pin, sender, cancel_token.clone(), self.edge_timeout)
            })
            .collect();

        info!(
            buttons = self.tracker.len(),
            edge_timeout_ms = self.edge_timeout.as_millis() as u64,
            "Monitoring buttons"
        );

        if let Err(e) = self.process_events(&mut mux).await {
            error!(error = %e, "Button monitor failed");
            cancel_token.cancel();
            // unblocks any watcher waiting on a full queue
            drop(mux);
            if let Err(join_error) = join_watchers(watchers).await {
                debug!(error = %join_error, "Watcher did not stop cleanly");
            }
            return Err(e);
        }

        join_watchers(watchers).await?;
        self.shutdown()
    }

    fn start(&mut self) -> Result<(), MonitorError> {
        self.tracker.configure_all(Pull::Up, Edge::Both)?;
        self.tracker.sample_all()?;
        self.render()?;

        writeln!(self.output, "{READY_MESSAGE}")?;
        self.output.flush()?;
        Ok(())
    }

    async fn process_events(&mut self, mux: &mut EventMux) -> Result<(), MonitorError> {
        while let Some(wakeup) = mux.next().await {
            match wakeup {
                Wakeup::Edge { source } => self.handle_edge(source)?,
                Wakeup::Closed {
                    source,
                    fault: None,
                } => {
                    debug!(source, remaining = mux.open_sources(), "Pin watcher closed");
                }
                Wakeup::Closed {
                    source,
                    fault: Some(fault),
                } => {
                    error!(source, error = %fault, "Pin watcher reported a hardware fault");
                    return Err(fault.into());
                }
            }
        }
        Ok(())
    }

    fn handle_edge(&mut self, source: usize) -> Result<(), MonitorError> {
        let transition = self.tracker.resample(source)?;
        debug!(
            button = %transition.name,
            state = %transition.current,
            changed = transition.changed(),
            "Button sampled"
        );

        writeln!(self.output, "{transition}")?;
        self.output.flush()?;
        self.render()
    }

    fn render(&mut self) -> Result<(), MonitorError> {
        compose_frame(&mut self.frame, self.tracker.snapshot());
        self.push_frame()?;
        Ok(())
    }

    fn push_frame(&mut self) -> HardwareResult<()> {
        self.display
            .draw(self.frame.bounding_box(), &self.frame, Point::zero())
    }

    fn shutdown(mut self) -> Result<(), MonitorError> {
        self.frame.clear_all();
        self.push_frame()?;
        self.display.halt()?;
        self.tracker.release_all()?;
        info!("Button monitor stopped");
        Ok(())
    }
}

async fn join_watchers(watchers: Vec<JoinHandle<()>>) -> Result<(), MonitorError> {
    for handle in watchers {
        handle
            .await
            .map_err(|e| MonitorError::WatcherPanicked(e.to_string()))?;
    }
    Ok(())
}
