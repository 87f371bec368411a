//! Bonnet - Button monitor runtime for the OLED Bonnet
//!
//! This crate provides the moving parts of the monitor:
//! - `watcher` - one blocking edge watcher per button
//! - `mux` - fan-in of every watcher into one ordered event stream
//! - `tracker` - per-button pressed/released state
//! - `monitor` - the single-threaded update loop that owns the frame
//! - `lifecycle` - termination signals and cancellation
//! - `hardware` - GPIO character-device pins and the SSD1306 panel
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  Edge(i)   ┌──────────┐  Wakeup   ┌───────────────┐
//! │ PinWatcher 0 │──────────▶│          │──────────▶│  ButtonMonitor │
//! ├──────────────┤            │ EventMux │            │  (main loop)   │
//! │ PinWatcher N │──────────▶│          │            └───────┬───────┘
//! └──────▲───────┘  Closed(i) └──────────┘                    │ draw
//!        │ cancel                                             ▼
//! ┌──────┴───────┐                                   ┌───────────────┐
//! │  Lifecycle   │                                   │    Display    │
//! └──────────────┘                                   └───────────────┘
//! ```
//!
//! # Panic-Free Guarantees
//!
//! All production code in this crate follows the panic-free policy:
//! - No `.unwrap()`, `.expect()`, `panic!()`, `unreachable!()`, `todo!()`
//! - All fallible operations return `Result` or `Option`
//! - Channel operations handle closure gracefully

pub mod config;
pub mod display_control;
pub mod error;
pub mod hardware;
pub mod lifecycle;
pub mod monitor;
pub mod mux;
pub mod tracker;
pub mod watcher;

pub use config::{BonnetConfig, ConfigError};
pub use display_control::{apply_display_action, DisplayAction};
pub use error::MonitorError;
pub use monitor::ButtonMonitor;
pub use mux::{EventMux, SourceSender, Wakeup};
pub use tracker::{ButtonTracker, Transition};
