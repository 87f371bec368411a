//! Button pins through the Linux GPIO character device.
//!
//! Line offsets on the Pi's main chip are the BCM numbers, so the layout
//! table can be used as-is. Bias and edge detection are both properties of
//! the line request; reconfiguring re-requests the line.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use gpiocdev::line::{Bias, EdgeDetection, Offset, Value};
use gpiocdev::Request;
use tracing::debug;

use bonnet_core::{Edge, HardwareError, HardwareResult, InputPin, Level, Pull};

const CONSUMER: &str = "oledbonnet";

struct LineRequest {
    request: Arc<Request>,
    edge: Edge,
}

/// One requested GPIO input line.
///
/// Reads and edge waits share the request, so the main loop can sample a
/// line while its watcher is blocked waiting on it.
pub struct GpioPin {
    label: String,
    chip: PathBuf,
    offset: Offset,
    line: Mutex<Option<LineRequest>>,
}

impl GpioPin {
    /// Requests `line` on `chip` as an input with no bias or edge detection.
    pub fn open(label: impl Into<String>, chip: &Path, line: u64) -> HardwareResult<Self> {
        let label = label.into();
        let offset = Offset::try_from(line).map_err(|_| HardwareError::PinSetup {
            pin: label.clone(),
            reason: format!("line {line} out of range"),
        })?;

        let pin = Self {
            label,
            chip: chip.to_path_buf(),
            offset,
            line: Mutex::new(None),
        };
        pin.request(Pull::None, Edge::None)?;
        debug!(pin = %pin.label, chip = %pin.chip.display(), offset, "Requested GPIO line");
        Ok(pin)
    }

    fn line(&self) -> MutexGuard<'_, Option<LineRequest>> {
        self.line.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn current(&self) -> Option<(Arc<Request>, Edge)> {
        self.line()
            .as_ref()
            .map(|line| (Arc::clone(&line.request), line.edge))
    }

    fn request(&self, pull: Pull, edge: Edge) -> HardwareResult<()> {
        let mut line = self.line();
        // the old request holds the line until dropped
        *line = None;

        let request = Request::builder()
            .on_chip(&self.chip)
            .with_consumer(CONSUMER)
            .with_line(self.offset)
            .as_input()
            .with_bias(Some(line_bias(pull)))
            .with_edge_detection(edge_detection(edge))
            .request()
            .map_err(|e| HardwareError::PinSetup {
                pin: self.label.clone(),
                reason: e.to_string(),
            })?;

        *line = Some(LineRequest {
            request: Arc::new(request),
            edge,
        });
        Ok(())
    }
}

fn line_bias(pull: Pull) -> Bias {
    match pull {
        Pull::None => Bias::Disabled,
        Pull::Up => Bias::PullUp,
        Pull::Down => Bias::PullDown,
    }
}

fn edge_detection(edge: Edge) -> Option<EdgeDetection> {
    match edge {
        Edge::None => None,
        Edge::Rising => Some(EdgeDetection::RisingEdge),
        Edge::Falling => Some(EdgeDetection::FallingEdge),
        Edge::Both => Some(EdgeDetection::BothEdges),
    }
}

fn level_of(value: Value) -> Level {
    match value {
        Value::Active => Level::High,
        Value::Inactive => Level::Low,
    }
}

impl InputPin for GpioPin {
    fn label(&self) -> &str {
        &self.label
    }

    fn read(&self) -> HardwareResult<Level> {
        let read_error = |reason: String| HardwareError::PinRead {
            pin: self.label.clone(),
            reason,
        };
        let (request, _) = self
            .current()
            .ok_or_else(|| read_error("line released".to_string()))?;
        request
            .value(self.offset)
            .map(level_of)
            .map_err(|e| read_error(e.to_string()))
    }

    fn wait_for_edge(&self, timeout: Duration) -> HardwareResult<bool> {
        let request = match self.current() {
            Some((request, edge)) if edge.is_enabled() => request,
            _ => {
                return Err(HardwareError::EdgeDetectionDisabled {
                    pin: self.label.clone(),
                })
            }
        };

        let wait_error = |e: gpiocdev::Error| HardwareError::EdgeWait {
            pin: self.label.clone(),
            reason: e.to_string(),
        };
        if !request.wait_edge_event(timeout).map_err(wait_error)? {
            return Ok(false);
        }
        request.read_edge_event().map_err(wait_error)?;
        Ok(true)
    }

    fn configure(&self, pull: Pull, edge: Edge) -> HardwareResult<()> {
        self.request(pull, edge)?;
        debug!(pin = %self.label, ?pull, ?edge, "Configured GPIO line");
        Ok(())
    }

    fn release(&self) -> HardwareResult<()> {
        *self.line() = None;
        debug!(pin = %self.label, offset = self.offset, "Released GPIO line");
        Ok(())
    }
}
