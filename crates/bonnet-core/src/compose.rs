//! Frame composer.
//!
//! Every button is drawn as a filled white disc. Released buttons get a
//! smaller black disc punched out of the middle, leaving a ring.

use std::convert::Infallible;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, PrimitiveStyle};

use crate::frame::FrameBuffer;
use crate::layout::ButtonState;

/// Radius of the white disc drawn for every button.
pub const BUTTON_OUTER_RADIUS: u32 = 8;

/// Radius of the black disc punched into released buttons.
pub const BUTTON_INNER_RADIUS: u32 = 6;

/// Rebuilds `frame` from the full set of button states.
///
/// The frame is cleared first; nothing from the previous composition survives.
pub fn compose_frame<I>(frame: &mut FrameBuffer, buttons: I)
where
    I: IntoIterator<Item = (Point, ButtonState)>,
{
    frame.clear_all();
    for (center, state) in buttons {
        fill_disc(frame, center, BUTTON_OUTER_RADIUS, BinaryColor::On);
        if !state.is_pressed() {
            fill_disc(frame, center, BUTTON_INNER_RADIUS, BinaryColor::Off);
        }
    }
}

fn fill_disc(frame: &mut FrameBuffer, center: Point, radius: u32, color: BinaryColor) {
    let result: Result<(), Infallible> = Circle::with_center(center, 2 * radius + 1)
        .into_styled(PrimitiveStyle::with_fill(color))
        .draw(frame);
    if let Err(never) = result {
        match never {}
    }
}
