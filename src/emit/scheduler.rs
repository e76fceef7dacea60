//! Emission scheduler.
//!
//! One call to [`EmissionScheduler::emit`] turns one snapshot into one batch:
//! a key event for every role followed by the frame marker.

use crate::emit::pacing::{Pacer, PacingPolicy};
use crate::emit::sink::OutputSink;
use crate::engine::{KeyStates, StateSnapshot};
use crate::error::Result;
use crate::event::EmissionBatch;
use crate::keymap::{Axis, AxisKeyMap};
use std::time::Instant;

pub struct EmissionScheduler<S> {
    keymap: AxisKeyMap,
    sink: S,
    pacer: Pacer,
    last_emitted: KeyStates,
    batches: u64,
}

impl<S: OutputSink> EmissionScheduler<S> {
    pub fn new(keymap: AxisKeyMap, sink: S, pacing: PacingPolicy) -> Self {
        Self {
            keymap,
            sink,
            pacer: Pacer::new(pacing),
            last_emitted: KeyStates::ALL_RELEASED,
            batches: 0,
        }
    }

    /// Emit the batch for `snapshot` and return the states that went out.
    pub fn emit(&mut self, snapshot: &StateSnapshot, now: Instant) -> Result<KeyStates> {
        let states = self.pacer.apply(snapshot, &self.last_emitted, now);
        debug_assert!(
            Axis::ALL.iter().all(|axis| !states.is_conflicted(*axis)),
            "emission batch carries opposing keys: {states}"
        );
        self.write(states)?;
        Ok(states)
    }

    /// Emit an all-released batch regardless of current state.
    pub fn release_all(&mut self) -> Result<()> {
        self.write(KeyStates::ALL_RELEASED)
    }

    fn write(&mut self, states: KeyStates) -> Result<()> {
        let batch = EmissionBatch::from_states(&self.keymap, &states);
        self.sink.write_batch(&batch)?;
        self.last_emitted = states;
        self.batches += 1;
        log::trace!("emitted batch #{}: {}", self.batches, states);
        Ok(())
    }

    /// When the next paced key becomes due, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pacer.next_deadline()
    }

    pub fn last_emitted(&self) -> KeyStates {
        self.last_emitted
    }

    pub fn batches_emitted(&self) -> u64 {
        self.batches
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}
