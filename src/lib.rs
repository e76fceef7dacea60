//! # socd-cleaner - SOCD resolution for Linux keyboards
//!
//! Reads four direction keys from a physical keyboard and replays them through a
//! virtual keyboard so that opposing directions (up/down, left/right) are never
//! reported pressed at the same time.
//!
//! ## Resolution policy
//!
//! - **Last input wins**: pressing a key takes its axis over from the opposing key
//! - **Restore on release**: releasing the winner re-presses the opposing key if it
//!   is still physically held
//! - **Independent axes**: vertical and horizontal conflicts never affect each other
//!
//! ## Architecture
//!
//! - [`keymap`] - Logical roles, axes, and the startup key binding
//! - [`engine`] - The resolution state machine
//! - [`store`] - Lock-protected state shared by capture and emission
//! - [`emit`] - Emission batches, optional frame pacing, output sinks
//! - [`input`] - Input source abstraction
//! - [`device`] - evdev keyboard input, uinput virtual keyboard, discovery
//! - [`app`] - Sequential and concurrent run loops with shutdown handling

// Core modules
pub mod error;
pub mod event;
pub mod keymap;

// Resolution
pub mod engine;
pub mod store;

// Pipeline edges
pub mod device;
pub mod emit;
pub mod input;

// Orchestration
pub mod app;
pub mod config;

// Re-export commonly used types for convenience
pub use error::{Result, SocdError};

pub use app::{Application, RunSummary, StopReason};
pub use config::{Config, SchedulingModel};
pub use emit::{EmissionScheduler, OutputSink, PacingPolicy};
pub use engine::{KeyStates, ResolutionEngine, StateSnapshot};
pub use event::{EmissionBatch, KeyEvent, OutputEvent, Transition};
pub use input::InputSource;
pub use keymap::{Axis, AxisKeyMap, KeyCode, LogicalKey};
pub use store::SharedStateStore;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
