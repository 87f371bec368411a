//! `display on|off` - direct panel power control.
//!
//! Stateless: each invocation opens the display, issues one command and
//! exits. Nothing is remembered between invocations.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use bonnet_core::{Display, HardwareResult};

/// Requested panel state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayAction {
    On,
    Off,
}

impl DisplayAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
        }
    }
}

impl fmt::Display for DisplayAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for anything other than `on` or `off`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized action '{0}', must be one of: [on, off]")]
pub struct ParseDisplayActionError(pub String);

impl FromStr for DisplayAction {
    type Err = ParseDisplayActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on" => Ok(Self::On),
            "off" => Ok(Self::Off),
            other => Err(ParseDisplayActionError(other.to_string())),
        }
    }
}

/// Applies `action` to the panel.
///
/// `On` stops scrolling, which also wakes a halted panel; `Off` halts it.
pub fn apply_display_action<D>(display: &mut D, action: DisplayAction) -> HardwareResult<()>
where
    D: Display + ?Sized,
{
    match action {
        DisplayAction::On => display.stop_scroll(),
        DisplayAction::Off => display.halt(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bonnet_core::mocks::{DisplayCall, MockDisplay};

    #[test]
    fn test_parse_actions() {
        assert_eq!("on".parse::<DisplayAction>().unwrap(), DisplayAction::On);
        assert_eq!("off".parse::<DisplayAction>().unwrap(), DisplayAction::Off);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let error = "dim".parse::<DisplayAction>().unwrap_err();
        assert_eq!(
            error.to_string(),
            "unrecognized action 'dim', must be one of: [on, off]"
        );
        assert!("ON".parse::<DisplayAction>().is_err());
    }

    #[test]
    fn test_off_halts() {
        let mut display = MockDisplay::new();
        apply_display_action(&mut display, DisplayAction::Off).unwrap();
        assert_eq!(display.calls(), vec![DisplayCall::Halt]);
    }

    #[test]
    fn test_on_stops_scroll() {
        let mut display = MockDisplay::new();
        apply_display_action(&mut display, DisplayAction::On).unwrap();
        assert_eq!(display.calls(), vec![DisplayCall::StopScroll]);
        assert_eq!(display.draw_count(), 0);
    }
}
