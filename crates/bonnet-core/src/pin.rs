//! Digital input pins.
//!
//! `InputPin` is the seam between the monitor and the GPIO hardware. A pin
//! is shared by two parties at once: its watcher blocks in
//! [`InputPin::wait_for_edge`] on a worker thread while the main loop calls
//! [`InputPin::read`], so every method takes `&self`.

use std::fmt;
use std::time::Duration;

use crate::error::HardwareResult;

/// Logic level sampled from a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    High,
    Low,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Low => write!(f, "low"),
        }
    }
}

/// Internal bias resistor selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Pull {
    #[default]
    None,
    Up,
    Down,
}

/// Which transitions the pin reports through `wait_for_edge`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Edge {
    #[default]
    None,
    Rising,
    Falling,
    Both,
}

impl Edge {
    /// Returns true if this mode reports any transition at all.
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// A digital input pin with edge detection.
pub trait InputPin: Send + Sync {
    /// Human-readable pin name used in logs and errors.
    fn label(&self) -> &str;

    /// Samples the current level.
    fn read(&self) -> HardwareResult<Level>;

    /// Blocks until an edge is observed or `timeout` elapses.
    ///
    /// Returns `Ok(true)` if an edge was observed, `Ok(false)` on timeout.
    fn wait_for_edge(&self, timeout: Duration) -> HardwareResult<bool>;

    /// Sets the bias and the edge detection mode.
    fn configure(&self, pull: Pull, edge: Edge) -> HardwareResult<()>;

    /// Returns the pin to the system.
    fn release(&self) -> HardwareResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_enabled() {
        assert!(!Edge::None.is_enabled());
        assert!(Edge::Rising.is_enabled());
        assert!(Edge::Falling.is_enabled());
        assert!(Edge::Both.is_enabled());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(Pull::default(), Pull::None);
        assert_eq!(Edge::default(), Edge::None);
    }
}
