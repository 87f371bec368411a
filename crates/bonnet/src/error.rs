//! Error types for the monitor runtime.

use std::io;

use bonnet_core::HardwareError;
use thiserror::Error;

/// Errors that end a monitor run.
///
/// Every variant is fatal: the loop does not retry, it cancels its
/// watchers and hands the error to the process boundary.
#[derive(Error, Debug)]
pub enum MonitorError {
    /// Pin or display failure
    #[error(transparent)]
    Hardware(#[from] HardwareError),

    /// Writing the transition transcript failed
    #[error("Failed to write output: {0}")]
    Output(#[from] io::Error),

    /// A watcher task panicked or was aborted
    #[error("Pin watcher task failed: {0}")]
    WatcherPanicked(String),

    /// The multiplexer reported a source with no matching button
    #[error("Notification from unknown source {0}")]
    UnknownSource(usize),
}
