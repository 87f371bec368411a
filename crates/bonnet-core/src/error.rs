//! Hardware error types following panic-free policy.

use thiserror::Error;

/// Errors raised by the pin and display collaborators.
///
/// None of these are retried: the monitor surfaces them to the process
/// boundary, which logs them and exits non-zero.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HardwareError {
    /// Pin could not be exported, configured or released
    #[error("Failed to set up pin {pin}: {reason}")]
    PinSetup { pin: String, reason: String },

    /// Pin level could not be read
    #[error("Failed to read pin {pin}: {reason}")]
    PinRead { pin: String, reason: String },

    /// Blocking edge wait failed
    #[error("Failed to wait for edge on pin {pin}: {reason}")]
    EdgeWait { pin: String, reason: String },

    /// Edge wait requested on a pin configured without edge detection
    #[error("Edge detection is not enabled on pin {pin}")]
    EdgeDetectionDisabled { pin: String },

    /// Bus device could not be opened
    #[error("Failed to open bus {path}: {reason}")]
    BusOpen { path: String, reason: String },

    /// Display controller rejected its init sequence
    #[error("Failed to initialize display: {0}")]
    DisplayInit(String),

    /// Display command or data transfer failed
    #[error("Display operation failed: {0}")]
    Display(String),
}

/// Result type for hardware operations.
pub type HardwareResult<T> = Result<T, HardwareError>;
