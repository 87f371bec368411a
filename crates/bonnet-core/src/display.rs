//! Display seam.

use embedded_graphics::prelude::Point;
use embedded_graphics::primitives::Rectangle;

use crate::error::HardwareResult;
use crate::frame::FrameBuffer;

/// A bitmap display the composed frame is pushed to.
pub trait Display {
    /// Pushes the `bounds` region of `frame` to the panel, shifted by `offset`.
    fn draw(&mut self, bounds: Rectangle, frame: &FrameBuffer, offset: Point) -> HardwareResult<()>;

    /// Stops any scrolling and brings the panel back on.
    fn stop_scroll(&mut self) -> HardwareResult<()>;

    /// Turns the panel off.
    fn halt(&mut self) -> HardwareResult<()>;
}
