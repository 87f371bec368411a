//! Button wiring and screen layout of the OLED Bonnet.

use std::fmt;

use embedded_graphics::prelude::Point;

use crate::pin::Level;

/// Tracked state of one push-button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ButtonState {
    #[default]
    Released,
    Pressed,
}

impl ButtonState {
    /// Buttons pull the line low when pressed (pull-up wiring).
    pub fn from_level(level: Level) -> Self {
        match level {
            Level::Low => Self::Pressed,
            Level::High => Self::Released,
        }
    }

    pub fn is_pressed(&self) -> bool {
        matches!(self, Self::Pressed)
    }

    /// Verb printed for a transition into this state.
    pub fn action(&self) -> &'static str {
        match self {
            Self::Pressed => "pressed",
            Self::Released => "released",
        }
    }
}

impl fmt::Display for ButtonState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.action())
    }
}

/// Static description of one physical button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonSpec {
    /// Display name, e.g. `"Button A"`
    pub name: &'static str,
    /// BCM GPIO line number
    pub gpio: u64,
    /// Center of the button's indicator on screen
    pub position: Point,
}

/// Button wiring of the Bonnet, in reporting order.
pub const BONNET_BUTTONS: [ButtonSpec; 7] = [
    ButtonSpec {
        name: "Button A",
        gpio: 5,
        position: Point::new(80, 50),
    },
    ButtonSpec {
        name: "Button B",
        gpio: 6,
        position: Point::new(110, 30),
    },
    ButtonSpec {
        name: "Button L",
        gpio: 27,
        position: Point::new(9, 31),
    },
    ButtonSpec {
        name: "Button R",
        gpio: 23,
        position: Point::new(51, 31),
    },
    ButtonSpec {
        name: "Button U",
        gpio: 17,
        position: Point::new(30, 11),
    },
    ButtonSpec {
        name: "Button D",
        gpio: 22,
        position: Point::new(30, 51),
    },
    ButtonSpec {
        name: "Button C",
        gpio: 4,
        position: Point::new(30, 31),
    },
];
