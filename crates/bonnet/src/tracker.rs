//! Button state tracker.
//!
//! Holds one entry per physical button in a fixed order; the order is each
//! button's identity for the lifetime of the process. Only the main loop
//! mutates it.
//!
//! A notification is a trigger to re-sample, not a direction: the tracked
//! state always comes from reading the pin, so bounce between the edge and
//! the read is absorbed, and two quick edges may collapse into one change.

use std::fmt;
use std::sync::Arc;

use embedded_graphics::prelude::Point;
use tracing::debug;

use bonnet_core::{ButtonState, Edge, HardwareResult, InputPin, Pull};

use crate::error::MonitorError;

/// One tracked button.
pub struct TrackedButton {
    name: String,
    position: Point,
    pin: Arc<dyn InputPin>,
    state: ButtonState,
}

impl TrackedButton {
    /// Creates a button in the `Released` state. Call
    /// [`ButtonTracker::sample_all`] to pick up the real level.
    pub fn new(name: impl Into<String>, position: Point, pin: Arc<dyn InputPin>) -> Self {
        Self {
            name: name.into(),
            position,
            pin,
            state: ButtonState::Released,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn state(&self) -> ButtonState {
        self.state
    }

    fn sample(&mut self) -> HardwareResult<ButtonState> {
        let level = self.pin.read()?;
        self.state = ButtonState::from_level(level);
        Ok(self.state)
    }
}

impl fmt::Debug for TrackedButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackedButton")
            .field("name", &self.name)
            .field("position", &self.position)
            .field("pin", &self.pin.label())
            .field("state", &self.state)
            .finish()
    }
}

/// Result of re-sampling one button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub index: usize,
    pub name: String,
    pub previous: ButtonState,
    pub current: ButtonState,
}

impl Transition {
    /// Whether the sample changed the tracked state.
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.current.action())
    }
}

/// Ordered set of tracked buttons.
#[derive(Debug, Default)]
pub struct ButtonTracker {
    buttons: Vec<TrackedButton>,
}

impl ButtonTracker {
    pub fn new(buttons: Vec<TrackedButton>) -> Self {
        Self { buttons }
    }

    pub fn len(&self) -> usize {
        self.buttons.len()
    }

    pub fn get(&self, index: usize) -> Option<&TrackedButton> {
        self.buttons.get(index)
    }

    /// Shared handles to every pin, in button order.
    pub fn pins(&self) -> Vec<Arc<dyn InputPin>> {
        self.buttons.iter().map(|b| Arc::clone(&b.pin)).collect()
    }

    /// Positions and states of every button, in button order.
    pub fn snapshot(&self) -> Vec<(Point, ButtonState)> {
        self.buttons.iter().map(|b| (b.position, b.state)).collect()
    }

    /// Applies the same bias and edge mode to every pin.
    pub fn configure_all(&self, pull: Pull, edge: Edge) -> HardwareResult<()> {
        for button in &self.buttons {
            button.pin.configure(pull, edge)?;
        }
        Ok(())
    }

    /// Samples every pin once and sets the initial states.
    pub fn sample_all(&mut self) -> HardwareResult<()> {
        for button in &mut self.buttons {
            let state = button.sample()?;
            debug!(button = %button.name, %state, "Initial button state");
        }
        Ok(())
    }

    /// Re-reads the pin of button `index` and updates its state.
    pub fn resample(&mut self, index: usize) -> Result<Transition, MonitorError> {
        let button = self
            .buttons
            .get_mut(index)
            .ok_or(MonitorError::UnknownSource(index))?;
        let previous = button.state;
        let current = button.sample()?;
        Ok(Transition {
            index,
            name: button.name.clone(),
            previous,
            current,
        })
    }

    /// Disables edge detection on every pin, leaving the pull-up on, and
    /// releases it.
    pub fn release_all(&self) -> HardwareResult<()> {
        for button in &self.buttons {
            button.pin.configure(Pull::Up, Edge::None)?;
            button.pin.release()?;
        }
        Ok(())
    }
}

impl FromIterator<TrackedButton> for ButtonTracker {
    fn from_iter<I: IntoIterator<Item = TrackedButton>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
