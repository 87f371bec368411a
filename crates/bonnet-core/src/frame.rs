//! Monochrome frame buffer.
//!
//! The frame is rebuilt from scratch on every button change and handed whole
//! to the display. It implements `embedded_graphics::DrawTarget` so standard
//! primitives can be rasterized straight into it.

use std::convert::Infallible;
use std::fmt;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

/// Frame width in pixels.
pub const FRAME_WIDTH: u32 = 128;

/// Frame height in pixels.
pub const FRAME_HEIGHT: u32 = 64;

const PIXEL_COUNT: usize = (FRAME_WIDTH * FRAME_HEIGHT) as usize;

/// A 128x64 one-bit frame. `true` is a lit (white) pixel.
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    pixels: Vec<bool>,
}

impl FrameBuffer {
    /// Creates an all-black frame.
    pub fn new() -> Self {
        Self {
            pixels: vec![false; PIXEL_COUNT],
        }
    }

    fn index(point: Point) -> Option<usize> {
        let x = u32::try_from(point.x).ok()?;
        let y = u32::try_from(point.y).ok()?;
        if x >= FRAME_WIDTH || y >= FRAME_HEIGHT {
            return None;
        }
        usize::try_from(y * FRAME_WIDTH + x).ok()
    }

    /// Returns whether the pixel at `point` is lit. Points outside the frame are dark.
    pub fn pixel(&self, point: Point) -> bool {
        Self::index(point)
            .and_then(|i| self.pixels.get(i))
            .copied()
            .unwrap_or(false)
    }

    /// Sets a single pixel. Points outside the frame are ignored.
    pub fn set_pixel(&mut self, point: Point, on: bool) {
        if let Some(pixel) = Self::index(point).and_then(|i| self.pixels.get_mut(i)) {
            *pixel = on;
        }
    }

    /// Clears the whole frame to black.
    pub fn clear_all(&mut self) {
        self.pixels.fill(false);
    }

    /// Number of lit pixels.
    pub fn lit_pixels(&self) -> usize {
        self.pixels.iter().filter(|on| **on).count()
    }

    /// Returns true if no pixel is lit.
    pub fn is_blank(&self) -> bool {
        !self.pixels.iter().any(|on| *on)
    }

    /// Iterates every pixel of `area` (clipped to the frame) with its color.
    pub fn pixels_in(&self, area: Rectangle) -> impl Iterator<Item = Pixel<BinaryColor>> + '_ {
        area.intersection(&self.bounding_box())
            .points()
            .map(move |p| Pixel(p, BinaryColor::from(self.pixel(p))))
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("width", &FRAME_WIDTH)
            .field("height", &FRAME_HEIGHT)
            .field("lit", &self.lit_pixels())
            .finish()
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(FRAME_WIDTH, FRAME_HEIGHT)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point, color.is_on());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_frame_is_blank() {
        let frame = FrameBuffer::new();
        assert!(frame.is_blank());
        assert_eq!(frame.lit_pixels(), 0);
        assert_eq!(frame.size(), Size::new(128, 64));
    }

    #[test]
    fn test_set_and_read_pixel() {
        let mut frame = FrameBuffer::new();
        frame.set_pixel(Point::new(127, 63), true);
        assert!(frame.pixel(Point::new(127, 63)));
        assert!(!frame.pixel(Point::new(0, 0)));
        assert_eq!(frame.lit_pixels(), 1);
    }

    #[test]
    fn test_out_of_bounds_ignored() {
        let mut frame = FrameBuffer::new();
        frame.set_pixel(Point::new(128, 0), true);
        frame.set_pixel(Point::new(-1, 10), true);
        frame.set_pixel(Point::new(10, 64), true);
        assert!(frame.is_blank());
        assert!(!frame.pixel(Point::new(-5, -5)));
    }

    #[test]
    fn test_clear_all() {
        let mut frame = FrameBuffer::new();
        frame.set_pixel(Point::new(3, 4), true);
        frame.clear_all();
        assert!(frame.is_blank());
    }

    #[test]
    fn test_pixels_in_clips_to_frame() {
        let frame = FrameBuffer::new();
        let area = Rectangle::new(Point::new(120, 60), Size::new(20, 20));
        assert_eq!(frame.pixels_in(area).count(), 8 * 4);
    }

    #[test]
    fn test_pixels_in_reports_colors() {
        let mut frame = FrameBuffer::new();
        frame.set_pixel(Point::new(1, 1), true);
        let area = Rectangle::new(Point::zero(), Size::new(2, 2));
        let lit: Vec<Point> = frame
            .pixels_in(area)
            .filter(|Pixel(_, color)| color.is_on())
            .map(|Pixel(p, _)| p)
            .collect();
        assert_eq!(lit, vec![Point::new(1, 1)]);
    }
}
