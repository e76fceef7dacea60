//! Emission subsystem: turns resolved snapshots into synthetic event batches.

pub mod pacing;
pub mod scheduler;
pub mod sink;

pub use pacing::{Pacer, PacingPolicy};
pub use scheduler::EmissionScheduler;
pub use sink::{LogSink, OutputSink};
