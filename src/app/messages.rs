//! Messages exchanged between the capture task and the emission worker.

use crate::engine::StateSnapshot;

/// Commands sent to the emission worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmissionCommand {
    /// A batch was applied to the store; emit the snapshot it produced.
    Emit(StateSnapshot),
    /// Stop after the current emission.
    Shutdown,
}
