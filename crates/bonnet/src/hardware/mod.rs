//! Concrete collaborators for the Adafruit 128x64 OLED Bonnet.
//!
//! - `cdev` - button pins through the Linux GPIO character device
//! - `oled` - the SSD1306 panel on the I2C bus
//!
//! All functions here perform blocking I/O. Opening any part of the board
//! is fatal on failure; nothing is retried.

mod cdev;
mod oled;

pub use cdev::GpioPin;
pub use oled::OledDisplay;

use std::sync::Arc;

use tracing::info;

use bonnet_core::{ButtonSpec, HardwareResult, BONNET_BUTTONS};

use crate::config::BonnetConfig;
use crate::tracker::{ButtonTracker, TrackedButton};

/// The opened board: one pin per button plus the display.
pub struct Bonnet {
    buttons: Vec<(ButtonSpec, Arc<GpioPin>)>,
    display: OledDisplay,
}

impl Bonnet {
    /// Opens the display, then every button pin in layout order.
    pub fn open(config: &BonnetConfig) -> HardwareResult<Self> {
        let display = Self::open_display(config)?;

        let buttons = BONNET_BUTTONS
            .iter()
            .map(|spec| {
                GpioPin::open(spec.name, &config.gpio_chip, spec.gpio)
                    .map(|pin| (*spec, Arc::new(pin)))
            })
            .collect::<HardwareResult<Vec<_>>>()?;

        info!(buttons = buttons.len(), "Bonnet opened");
        Ok(Self { buttons, display })
    }

    /// Opens only the display.
    pub fn open_display(config: &BonnetConfig) -> HardwareResult<OledDisplay> {
        OledDisplay::open(&config.i2c_bus, config.display_address)
    }

    /// Splits the board into the tracker and display the monitor consumes.
    pub fn into_parts(self) -> (ButtonTracker, OledDisplay) {
        let tracker = self
            .buttons
            .into_iter()
            .map(|(spec, pin)| TrackedButton::new(spec.name, spec.position, pin))
            .collect();
        (tracker, self.display)
    }
}
