//! Optional frame pacing for winning presses.
//!
//! When enabled, a key that newly becomes pressed, is the most recent press of
//! its axis, and has nothing held on the other axis is shown as released until a
//! fixed deadline. Each key carries its own hold, so other keys keep flowing.
//! A hold only ends at its deadline (or with the process).

use crate::engine::{KeyStates, StateSnapshot};
use crate::keymap::LogicalKey;
use std::time::{Duration, Instant};

/// Roughly one 60 Hz frame.
pub const DEFAULT_FRAME_DELAY: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PacingPolicy {
    /// Emit resolved state as-is.
    #[default]
    Immediate,
    /// Hold eligible winning presses for the given delay.
    Delayed(Duration),
}

impl PacingPolicy {
    /// `0` disables pacing.
    pub fn from_millis(ms: u64) -> Self {
        if ms == 0 {
            PacingPolicy::Immediate
        } else {
            PacingPolicy::Delayed(Duration::from_millis(ms))
        }
    }

    pub fn delay(&self) -> Option<Duration> {
        match self {
            PacingPolicy::Immediate => None,
            PacingPolicy::Delayed(delay) => Some(*delay),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pacer {
    policy: PacingPolicy,
    holds: [Option<Instant>; 4],
}

impl Pacer {
    pub fn new(policy: PacingPolicy) -> Self {
        Self {
            policy,
            holds: [None; 4],
        }
    }

    /// Compute the states to emit for `snapshot`, given what was emitted last.
    ///
    /// The result never sets a key the snapshot does not resolve as pressed.
    pub fn apply(
        &mut self,
        snapshot: &StateSnapshot,
        last_emitted: &KeyStates,
        now: Instant,
    ) -> KeyStates {
        let Some(delay) = self.policy.delay() else {
            return snapshot.resolved;
        };

        let mut out = snapshot.resolved;
        for key in LogicalKey::ALL {
            let slot = &mut self.holds[key.index()];
            if let Some(deadline) = *slot {
                if now >= deadline {
                    // Expired: show the key as resolved now.
                    *slot = None;
                } else {
                    out.set(key, false);
                }
                continue;
            }

            let newly_pressed = snapshot.resolved.get(key) && !last_emitted.get(key);
            if newly_pressed && Self::eligible(snapshot, key) {
                *slot = Some(now + delay);
                out.set(key, false);
            }
        }
        out
    }

    // Only the axis winner is paced, and only while the other axis is idle.
    fn eligible(snapshot: &StateSnapshot, key: LogicalKey) -> bool {
        snapshot.recency.get(key.axis()) == Some(key)
            && !snapshot.raw.any_on(key.axis().other())
    }

    /// Earliest pending hold, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.holds.iter().flatten().min().copied()
    }

    pub fn is_holding(&self, key: LogicalKey) -> bool {
        self.holds[key.index()].is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ResolutionEngine;
    use crate::event::Transition;
    use crate::keymap::AxisKeyMap;

    const DELAY: Duration = Duration::from_millis(16);

    fn engine() -> ResolutionEngine {
        ResolutionEngine::new(AxisKeyMap::wasd())
    }

    fn press(engine: &mut ResolutionEngine, key: LogicalKey) -> StateSnapshot {
        let code = engine.keymap().code(key);
        engine.apply_transition(code, Transition::Pressed);
        engine.snapshot()
    }

    fn release(engine: &mut ResolutionEngine, key: LogicalKey) -> StateSnapshot {
        let code = engine.keymap().code(key);
        engine.apply_transition(code, Transition::Released);
        engine.snapshot()
    }

    #[test]
    fn immediate_policy_passes_through() {
        let mut pacer = Pacer::new(PacingPolicy::Immediate);
        let mut engine = engine();
        let snapshot = press(&mut engine, LogicalKey::Left);

        let out = pacer.apply(&snapshot, &KeyStates::ALL_RELEASED, Instant::now());
        assert_eq!(out, snapshot.resolved);
        assert_eq!(pacer.next_deadline(), None);
    }

    #[test]
    fn lone_press_is_held_until_deadline() {
        let mut pacer = Pacer::new(PacingPolicy::Delayed(DELAY));
        let mut engine = engine();
        let start = Instant::now();
        let snapshot = press(&mut engine, LogicalKey::Left);

        let held = pacer.apply(&snapshot, &KeyStates::ALL_RELEASED, start);
        assert!(!held.get(LogicalKey::Left));
        assert_eq!(pacer.next_deadline(), Some(start + DELAY));

        let early = pacer.apply(&snapshot, &held, start + DELAY / 2);
        assert!(!early.get(LogicalKey::Left));

        let released = pacer.apply(&snapshot, &early, start + DELAY);
        assert!(released.get(LogicalKey::Left));
        assert!(!pacer.is_holding(LogicalKey::Left));
    }

    #[test]
    fn near_simultaneous_opposing_press_only_shows_winner() {
        let mut pacer = Pacer::new(PacingPolicy::Delayed(DELAY));
        let mut engine = engine();
        let start = Instant::now();

        let first = press(&mut engine, LogicalKey::Left);
        let out = pacer.apply(&first, &KeyStates::ALL_RELEASED, start);
        assert!(out.is_all_released());

        let second = press(&mut engine, LogicalKey::Right);
        let out = pacer.apply(&second, &out, start + Duration::from_millis(4));
        assert!(out.is_all_released());

        // Left's hold expires while Left is suppressed; Right is still held back.
        let out = pacer.apply(&second, &out, start + DELAY);
        assert!(out.is_all_released());

        let out = pacer.apply(&second, &out, start + Duration::from_millis(4) + DELAY);
        assert!(out.get(LogicalKey::Right));
        assert!(!out.get(LogicalKey::Left));
    }

    #[test]
    fn restore_is_not_delayed() {
        let mut pacer = Pacer::new(PacingPolicy::Delayed(DELAY));
        let mut engine = engine();
        let start = Instant::now();

        press(&mut engine, LogicalKey::Up);
        let snapshot = press(&mut engine, LogicalKey::Down);
        let mut emitted = KeyStates::ALL_RELEASED;
        emitted.set(LogicalKey::Down, true);

        let restored = release(&mut engine, LogicalKey::Down);
        let out = pacer.apply(&restored, &emitted, start);
        assert!(out.get(LogicalKey::Up));
        assert!(!pacer.is_holding(LogicalKey::Up));
        assert!(snapshot.resolved.get(LogicalKey::Down));
    }

    #[test]
    fn other_axis_held_skips_pacing() {
        let mut pacer = Pacer::new(PacingPolicy::Delayed(DELAY));
        let mut engine = engine();
        let start = Instant::now();

        press(&mut engine, LogicalKey::Up);
        let snapshot = press(&mut engine, LogicalKey::Left);
        let mut emitted = KeyStates::ALL_RELEASED;
        emitted.set(LogicalKey::Up, true);

        let out = pacer.apply(&snapshot, &emitted, start);
        assert!(out.get(LogicalKey::Left));
        assert!(out.get(LogicalKey::Up));
    }

    #[test]
    fn already_emitted_keys_are_not_held_again() {
        let mut pacer = Pacer::new(PacingPolicy::Delayed(DELAY));
        let mut engine = engine();
        let snapshot = press(&mut engine, LogicalKey::Right);

        let out = pacer.apply(&snapshot, &snapshot.resolved, Instant::now());
        assert_eq!(out, snapshot.resolved);
        assert_eq!(pacer.next_deadline(), None);
    }
}
