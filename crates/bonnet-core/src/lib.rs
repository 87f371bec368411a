//! Bonnet Core - Shared types for the OLED Bonnet button monitor
//!
//! This crate provides the hardware-free domain types shared between
//! the monitor runtime (`bonnet`) and the CLI:
//! - `pin` - digital input levels, bias and edge modes, and the `InputPin` seam
//! - `display` - the `Display` seam the frame is pushed through
//! - `frame` - the 128x64 monochrome frame buffer
//! - `layout` - the Bonnet's fixed button wiring and screen positions
//! - `compose` - renders button states into a frame
//!
//! All code follows the panic-free policy: no `.unwrap()`, `.expect()`,
//! `panic!()`, `unreachable!()`, `todo!()`, or direct indexing `[i]`.

pub mod compose;
pub mod display;
pub mod error;
pub mod frame;
pub mod layout;
pub mod pin;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

// Re-exports for convenience
pub use compose::{compose_frame, BUTTON_INNER_RADIUS, BUTTON_OUTER_RADIUS};
pub use display::Display;
pub use error::{HardwareError, HardwareResult};
pub use frame::{FrameBuffer, FRAME_HEIGHT, FRAME_WIDTH};
pub use layout::{ButtonSpec, ButtonState, BONNET_BUTTONS};
pub use pin::{Edge, InputPin, Level, Pull};
