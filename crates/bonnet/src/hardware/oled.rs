//! SSD1306 128x64 panel on the I2C bus.

use std::path::Path;

use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use linux_embedded_hal::I2cdev;
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::{I2CDisplayInterface, Ssd1306};
use tracing::debug;

use bonnet_core::{Display, FrameBuffer, HardwareError, HardwareResult};

type Driver = Ssd1306<
    I2CInterface<I2cdev>,
    DisplaySize128x64,
    BufferedGraphicsMode<DisplaySize128x64>,
>;

/// The Bonnet's OLED panel, driven in buffered mode.
pub struct OledDisplay {
    driver: Driver,
}

impl OledDisplay {
    /// Opens `bus` and initializes the controller at `address`.
    pub fn open(bus: &Path, address: u8) -> HardwareResult<Self> {
        let i2c = I2cdev::new(bus).map_err(|e| HardwareError::BusOpen {
            path: bus.display().to_string(),
            reason: e.to_string(),
        })?;

        let interface = I2CDisplayInterface::new_custom_address(i2c, address);
        let mut driver = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();
        driver
            .init()
            .map_err(|e| HardwareError::DisplayInit(format!("{e:?}")))?;

        debug!(bus = %bus.display(), address = %format_args!("{address:#04x}"), "Display initialized");
        Ok(Self { driver })
    }
}

fn display_error(error: impl std::fmt::Debug) -> HardwareError {
    HardwareError::Display(format!("{error:?}"))
}

impl Display for OledDisplay {
    fn draw(&mut self, bounds: Rectangle, frame: &FrameBuffer, offset: Point) -> HardwareResult<()> {
        let pixels = frame
            .pixels_in(bounds)
            .map(|Pixel(point, color)| Pixel(point + offset, color));
        self.driver.draw_iter(pixels).map_err(display_error)?;
        self.driver.flush().map_err(display_error)
    }

    /// The controller wakes on this command, which is how `display on`
    /// undoes a previous halt.
    fn stop_scroll(&mut self) -> HardwareResult<()> {
        self.driver.set_display_on(true).map_err(display_error)
    }

    fn halt(&mut self) -> HardwareResult<()> {
        self.driver.set_display_on(false).map_err(display_error)
    }
}
