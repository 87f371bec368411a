//! Mock implementations for testing
//!
//! This module provides test doubles for the pin and display collaborators
//! and a shared output sink, for use in unit and integration tests.
//!
//! Tests CAN panic; these doubles still recover poisoned locks so that a
//! failing test reports its own assertion rather than a poison error.

use std::io;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::display::Display;
use crate::error::{HardwareError, HardwareResult};
use crate::frame::FrameBuffer;
use crate::pin::{Edge, InputPin, Level, Pull};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Mock Pin
// ============================================================================

#[derive(Debug)]
struct MockPinState {
    level: Level,
    pending_edges: usize,
    configure_calls: Vec<(Pull, Edge)>,
    released: bool,
    waits: usize,
    read_failure: Option<HardwareError>,
    wait_failure: Option<HardwareError>,
}

/// Scripted input pin.
///
/// Level changes made through [`MockPin::set_level`] queue one edge, which
/// wakes a thread blocked in `wait_for_edge` just like a real interrupt.
#[derive(Debug)]
pub struct MockPin {
    label: String,
    state: Mutex<MockPinState>,
    edge_ready: Condvar,
}

impl MockPin {
    pub fn new(label: impl Into<String>, level: Level) -> Self {
        Self {
            label: label.into(),
            state: Mutex::new(MockPinState {
                level,
                pending_edges: 0,
                configure_calls: Vec::new(),
                released: false,
                waits: 0,
                read_failure: None,
                wait_failure: None,
            }),
            edge_ready: Condvar::new(),
        }
    }

    /// Changes the level and queues an edge.
    pub fn set_level(&self, level: Level) {
        let mut state = lock(&self.state);
        state.level = level;
        state.pending_edges += 1;
        self.edge_ready.notify_all();
    }

    /// Changes the level without reporting an edge.
    pub fn set_level_silently(&self, level: Level) {
        lock(&self.state).level = level;
    }

    /// Queues an edge without changing the level (contact bounce).
    pub fn trigger_edge(&self) {
        lock(&self.state).pending_edges += 1;
        self.edge_ready.notify_all();
    }

    /// Makes every following `read` fail with `error`.
    pub fn fail_reads(&self, error: HardwareError) {
        lock(&self.state).read_failure = Some(error);
    }

    /// Makes the next `wait_for_edge` fail with `error`, waking any waiter.
    pub fn fail_next_wait(&self, error: HardwareError) {
        lock(&self.state).wait_failure = Some(error);
        self.edge_ready.notify_all();
    }

    /// Every `(pull, edge)` pair passed to `configure`, oldest first.
    pub fn configure_history(&self) -> Vec<(Pull, Edge)> {
        lock(&self.state).configure_calls.clone()
    }

    pub fn is_released(&self) -> bool {
        lock(&self.state).released
    }

    pub fn wait_count(&self) -> usize {
        lock(&self.state).waits
    }

    pub fn pending_edges(&self) -> usize {
        lock(&self.state).pending_edges
    }
}

impl InputPin for MockPin {
    fn label(&self) -> &str {
        &self.label
    }

    fn read(&self) -> HardwareResult<Level> {
        let state = lock(&self.state);
        match &state.read_failure {
            Some(error) => Err(error.clone()),
            None => Ok(state.level),
        }
    }

    fn wait_for_edge(&self, timeout: Duration) -> HardwareResult<bool> {
        let mut state = lock(&self.state);
        state.waits += 1;
        let (mut state, _) = self
            .edge_ready
            .wait_timeout_while(state, timeout, |s| {
                s.pending_edges == 0 && s.wait_failure.is_none()
            })
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(error) = state.wait_failure.take() {
            return Err(error);
        }
        if state.pending_edges > 0 {
            state.pending_edges -= 1;
            return Ok(true);
        }
        Ok(false)
    }

    fn configure(&self, pull: Pull, edge: Edge) -> HardwareResult<()> {
        lock(&self.state).configure_calls.push((pull, edge));
        Ok(())
    }

    fn release(&self) -> HardwareResult<()> {
        lock(&self.state).released = true;
        Ok(())
    }
}

// ============================================================================
// Mock Display
// ============================================================================

/// One call made on a [`MockDisplay`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayCall {
    Draw,
    StopScroll,
    Halt,
}

#[derive(Debug, Default)]
struct DisplayLog {
    calls: Vec<DisplayCall>,
    frames: Vec<FrameBuffer>,
    fail_draws_after: Option<usize>,
}

/// Recording display. Clones share one log, so a test can keep a clone
/// while the code under test owns the other.
#[derive(Debug, Clone, Default)]
pub struct MockDisplay {
    log: Arc<Mutex<DisplayLog>>,
}

impl MockDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lets `count` draws succeed, then fails every following draw.
    pub fn fail_draws_after(&self, count: usize) {
        lock(&self.log).fail_draws_after = Some(count);
    }

    pub fn calls(&self) -> Vec<DisplayCall> {
        lock(&self.log).calls.clone()
    }

    /// Every frame pushed so far, as the panel would show it.
    pub fn frames(&self) -> Vec<FrameBuffer> {
        lock(&self.log).frames.clone()
    }

    pub fn last_frame(&self) -> Option<FrameBuffer> {
        lock(&self.log).frames.last().cloned()
    }

    pub fn draw_count(&self) -> usize {
        lock(&self.log).frames.len()
    }

    /// True if the most recent call turned the panel off.
    pub fn is_halted(&self) -> bool {
        lock(&self.log).calls.last() == Some(&DisplayCall::Halt)
    }
}

impl Display for MockDisplay {
    fn draw(&mut self, bounds: Rectangle, frame: &FrameBuffer, offset: Point) -> HardwareResult<()> {
        let mut log = lock(&self.log);
        log.calls.push(DisplayCall::Draw);
        if let Some(limit) = log.fail_draws_after {
            if log.frames.len() >= limit {
                return Err(HardwareError::Display("injected draw failure".to_string()));
            }
        }

        let mut shown = FrameBuffer::new();
        for Pixel(point, color) in frame.pixels_in(bounds) {
            shown.set_pixel(point + offset, color.is_on());
        }
        log.frames.push(shown);
        Ok(())
    }

    fn stop_scroll(&mut self) -> HardwareResult<()> {
        lock(&self.log).calls.push(DisplayCall::StopScroll);
        Ok(())
    }

    fn halt(&mut self) -> HardwareResult<()> {
        lock(&self.log).calls.push(DisplayCall::Halt);
        Ok(())
    }
}

// ============================================================================
// Shared Output
// ============================================================================

/// `io::Write` sink whose clones share one buffer.
#[derive(Debug, Clone, Default)]
pub struct SharedOutput {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl SharedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&lock(&self.buffer)).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl io::Write for SharedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        lock(&self.buffer).extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_mock_pin_times_out_without_edge() {
        let pin = MockPin::new("A", Level::High);
        assert!(!pin.wait_for_edge(Duration::from_millis(10)).unwrap());
        assert_eq!(pin.wait_count(), 1);
    }

    #[test]
    fn test_mock_pin_edge_wakes_waiter() {
        let pin = Arc::new(MockPin::new("A", Level::High));
        let waiter = {
            let pin = Arc::clone(&pin);
            thread::spawn(move || pin.wait_for_edge(Duration::from_secs(5)))
        };
        thread::sleep(Duration::from_millis(20));
        pin.set_level(Level::Low);
        assert!(waiter.join().unwrap().unwrap());
        assert_eq!(pin.read().unwrap(), Level::Low);
        assert_eq!(pin.pending_edges(), 0);
    }

    #[test]
    fn test_mock_pin_wait_failure() {
        let pin = MockPin::new("A", Level::High);
        pin.fail_next_wait(HardwareError::EdgeDetectionDisabled { pin: "A".to_string() });
        assert!(pin.wait_for_edge(Duration::from_secs(5)).is_err());
        assert!(!pin.wait_for_edge(Duration::from_millis(1)).unwrap());
    }

    #[test]
    fn test_mock_display_records_offset_frame() {
        let mut display = MockDisplay::new();
        let mut frame = FrameBuffer::new();
        frame.set_pixel(Point::new(1, 1), true);
        display
            .draw(frame.bounding_box(), &frame, Point::new(2, 0))
            .unwrap();
        let shown = display.last_frame().unwrap();
        assert!(shown.pixel(Point::new(3, 1)));
        assert!(!shown.pixel(Point::new(1, 1)));
    }

    #[test]
    fn test_mock_display_injected_failure() {
        let mut display = MockDisplay::new();
        display.fail_draws_after(1);
        let frame = FrameBuffer::new();
        assert!(display.draw(frame.bounding_box(), &frame, Point::zero()).is_ok());
        assert!(display.draw(frame.bounding_box(), &frame, Point::zero()).is_err());
        assert_eq!(display.draw_count(), 1);
    }

    #[test]
    fn test_shared_output_lines() {
        let output = SharedOutput::new();
        let mut writer = output.clone();
        writeln!(writer, "Button A pressed").unwrap();
        writeln!(writer, "Button A released").unwrap();
        assert_eq!(output.lines(), vec!["Button A pressed", "Button A released"]);
    }
}
