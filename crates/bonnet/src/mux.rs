//! Event multiplexer - waits on a runtime-sized set of event sources.
//!
//! Every source owns a [`SourceSender`] bound to its index. All senders feed
//! one bounded mpsc queue, so the receiving side needs a single `recv()`
//! no matter how many sources exist.
//!
//! ```text
//!  SourceSender(0) ──┐
//!  SourceSender(1) ──┼──▶ mpsc (bounded) ──▶ EventMux::next() ──▶ Wakeup
//!  SourceSender(N) ──┘
//! ```
//!
//! Each source's messages arrive in the order it sent them, so every edge a
//! source reported is delivered before that source is reported closed.
//!
//! # Panic-Free Guarantees
//!
//! - No `.unwrap()`, `.expect()`, `panic!()`, `unreachable!()`, `todo!()`
//! - Send failures after the receiver is gone are reported as `false`

use bonnet_core::HardwareError;
use tokio::sync::mpsc;
use tracing::{debug, trace};

/// Message carried on the shared queue.
#[derive(Debug)]
enum SourceEvent {
    Edge(usize),
    Closed(usize, Option<HardwareError>),
}

/// What woke the multiplexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Wakeup {
    /// The source observed an edge and is still open.
    Edge { source: usize },

    /// The source closed. Reported exactly once per source.
    ///
    /// `fault` is set when the source stopped because of a hardware error.
    Closed {
        source: usize,
        fault: Option<HardwareError>,
    },
}

impl Wakeup {
    /// Index of the source that fired.
    pub fn source(&self) -> usize {
        match self {
            Self::Edge { source } | Self::Closed { source, .. } => *source,
        }
    }

    /// Whether the source is still open after this wakeup.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Edge { .. })
    }
}

// ============================================================================
// Source Sender
// ============================================================================

/// Sending half owned by one source.
///
/// Closing consumes the sender, so a source closes at most once.
#[derive(Debug)]
pub struct SourceSender {
    index: usize,
    tx: mpsc::Sender<SourceEvent>,
}

impl SourceSender {
    /// Index of the source this sender reports for.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Reports an edge, waiting while the queue is full.
    ///
    /// Returns `false` if the multiplexer has been dropped.
    pub async fn notify(&self) -> bool {
        self.tx.send(SourceEvent::Edge(self.index)).await.is_ok()
    }

    /// Blocking variant of [`notify`](Self::notify) for worker threads.
    ///
    /// Must not be called from inside an async context.
    pub fn blocking_notify(&self) -> bool {
        self.tx.blocking_send(SourceEvent::Edge(self.index)).is_ok()
    }

    /// Closes this source.
    pub async fn close(self, fault: Option<HardwareError>) {
        if self
            .tx
            .send(SourceEvent::Closed(self.index, fault))
            .await
            .is_err()
        {
            trace!(source = self.index, "Multiplexer gone before close");
        }
    }

    /// Blocking variant of [`close`](Self::close) for worker threads.
    pub fn blocking_close(self, fault: Option<HardwareError>) {
        if self
            .tx
            .blocking_send(SourceEvent::Closed(self.index, fault))
            .is_err()
        {
            trace!(source = self.index, "Multiplexer gone before close");
        }
    }
}

// ============================================================================
// Event Multiplexer
// ============================================================================

/// Receiving side. Owned by the main loop.
#[derive(Debug)]
pub struct EventMux {
    rx: mpsc::Receiver<SourceEvent>,
    open: Vec<bool>,
    open_count: usize,
}

impl EventMux {
    /// Creates a multiplexer over `sources` sources and one sender per source.
    ///
    /// The set is fixed here; the multiplexer never learns of new sources.
    /// The queue holds one pending event per source.
    pub fn with_sources(sources: usize) -> (Self, Vec<SourceSender>) {
        let (tx, rx) = mpsc::channel(sources.max(1));
        let senders = (0..sources)
            .map(|index| SourceSender {
                index,
                tx: tx.clone(),
            })
            .collect();

        let mux = Self {
            rx,
            open: vec![true; sources],
            open_count: sources,
        };
        (mux, senders)
    }

    /// Total number of sources.
    pub fn sources(&self) -> usize {
        self.open.len()
    }

    /// Number of sources that have not closed yet.
    pub fn open_sources(&self) -> usize {
        self.open_count
    }

    /// Returns whether `source` is still open. Unknown sources are closed.
    pub fn is_open(&self, source: usize) -> bool {
        self.open.get(source).copied().unwrap_or(false)
    }

    /// Waits for the next wakeup from any source.
    ///
    /// Returns `None` once every source has closed, or once every sender has
    /// been dropped without closing.
    pub async fn next(&mut self) -> Option<Wakeup> {
        while self.open_count > 0 {
            match self.rx.recv().await? {
                SourceEvent::Edge(source) => {
                    if self.is_open(source) {
                        return Some(Wakeup::Edge { source });
                    }
                    debug!(source, "Dropping edge from closed source");
                }
                SourceEvent::Closed(source, fault) => {
                    if let Some(open) = self.open.get_mut(source) {
                        if *open {
                            *open = false;
                            self.open_count -= 1;
                            trace!(source, remaining = self.open_count, "Source closed");
                            return Some(Wakeup::Closed { source, fault });
                        }
                    }
                    debug!(source, "Ignoring duplicate close");
                }
            }
        }
        None
    }
}
