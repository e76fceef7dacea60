//! Last-input priority with restore-on-release.
//!
//! Each axis is resolved on its own:
//!
//! - a press always wins its axis outright, suppressing a held opposing key;
//! - releasing a key restores the opposing key if it is still physically held;
//! - with at most one key of the axis held, resolved state mirrors raw state.

use crate::engine::state::{KeyStates, RawKeyState, Recency, StateSnapshot};
use crate::event::{KeyEvent, Transition};
use crate::keymap::{AxisKeyMap, KeyCode, LogicalKey};

/// Owns the raw, resolved, and recency state and applies the SOCD policy.
#[derive(Debug, Clone)]
pub struct ResolutionEngine {
    keymap: AxisKeyMap,
    raw: RawKeyState,
    resolved: KeyStates,
    recency: Recency,
}

impl ResolutionEngine {
    pub fn new(keymap: AxisKeyMap) -> Self {
        Self {
            keymap,
            raw: RawKeyState::default(),
            resolved: KeyStates::ALL_RELEASED,
            recency: Recency::default(),
        }
    }

    pub fn keymap(&self) -> &AxisKeyMap {
        &self.keymap
    }

    /// Apply one raw event. Returns the role it touched, `None` for untracked codes.
    pub fn apply(&mut self, event: &KeyEvent) -> Option<LogicalKey> {
        self.apply_transition(event.code, event.transition)
    }

    /// Apply a batch in the order the input source produced it.
    pub fn apply_batch(&mut self, events: &[KeyEvent]) -> usize {
        events
            .iter()
            .filter(|event| self.apply(event).is_some())
            .count()
    }

    pub fn apply_transition(&mut self, code: KeyCode, transition: Transition) -> Option<LogicalKey> {
        let key = self.raw.apply_raw_event(&self.keymap, code, transition)?;
        match transition {
            Transition::Pressed => self.resolve_press(key),
            Transition::Released => self.resolve_release(key),
        }
        Some(key)
    }

    fn resolve_press(&mut self, key: LogicalKey) {
        let opposite = key.opposite();
        self.recency.mark(key);
        if self.raw.is_held(opposite) {
            self.resolved.set(opposite, false);
        }
        self.resolved.set(key, true);
    }

    fn resolve_release(&mut self, key: LogicalKey) {
        let opposite = key.opposite();
        self.resolved.set(key, false);
        if self.raw.is_held(opposite) {
            self.resolved.set(opposite, true);
        }
    }

    pub fn raw(&self) -> KeyStates {
        self.raw.states()
    }

    pub fn resolved(&self) -> KeyStates {
        self.resolved
    }

    pub fn recency(&self) -> Recency {
        self.recency
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            raw: self.raw.states(),
            resolved: self.resolved,
            recency: self.recency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::{codes, Axis};
    use proptest::prelude::*;

    fn engine() -> ResolutionEngine {
        ResolutionEngine::new(AxisKeyMap::wasd())
    }

    fn press(engine: &mut ResolutionEngine, key: LogicalKey) {
        let code = engine.keymap().code(key);
        engine.apply_transition(code, Transition::Pressed);
    }

    fn release(engine: &mut ResolutionEngine, key: LogicalKey) {
        let code = engine.keymap().code(key);
        engine.apply_transition(code, Transition::Released);
    }

    #[test]
    fn single_press_mirrors_raw() {
        let mut engine = engine();
        press(&mut engine, LogicalKey::Up);
        assert!(engine.resolved().get(LogicalKey::Up));
        assert_eq!(engine.resolved(), engine.raw());

        release(&mut engine, LogicalKey::Up);
        assert!(engine.resolved().is_all_released());
    }

    #[test]
    fn last_input_wins() {
        let mut engine = engine();
        press(&mut engine, LogicalKey::Left);
        press(&mut engine, LogicalKey::Right);
        assert!(!engine.resolved().get(LogicalKey::Left));
        assert!(engine.resolved().get(LogicalKey::Right));

        // Re-pressing the held loser takes priority back.
        press(&mut engine, LogicalKey::Left);
        assert!(engine.resolved().get(LogicalKey::Left));
        assert!(!engine.resolved().get(LogicalKey::Right));
        assert_eq!(engine.recency().get(Axis::Horizontal), Some(LogicalKey::Left));
    }

    #[test]
    fn release_restores_held_opposite() {
        let mut engine = engine();
        press(&mut engine, LogicalKey::Left);
        press(&mut engine, LogicalKey::Right);
        release(&mut engine, LogicalKey::Right);
        assert!(engine.resolved().get(LogicalKey::Left));
        assert!(!engine.resolved().get(LogicalKey::Right));

        release(&mut engine, LogicalKey::Left);
        assert!(engine.resolved().is_all_released());
    }

    #[test]
    fn releasing_the_suppressed_key_keeps_the_winner() {
        let mut engine = engine();
        press(&mut engine, LogicalKey::Up);
        press(&mut engine, LogicalKey::Down);
        release(&mut engine, LogicalKey::Up);
        assert!(engine.resolved().get(LogicalKey::Down));
        assert!(!engine.resolved().get(LogicalKey::Up));
    }

    #[test]
    fn duplicate_press_is_idempotent() {
        let mut once = engine();
        press(&mut once, LogicalKey::Left);

        let mut twice = engine();
        press(&mut twice, LogicalKey::Left);
        press(&mut twice, LogicalKey::Left);

        assert_eq!(once.snapshot(), twice.snapshot());
    }

    #[test]
    fn batch_order_decides_the_winner() {
        let mut engine = engine();
        let map = *engine.keymap();
        let applied = engine.apply_batch(&[
            KeyEvent::pressed(map.code(LogicalKey::Right)),
            KeyEvent::pressed(KeyCode(codes::KEY_Q)),
            KeyEvent::pressed(map.code(LogicalKey::Left)),
        ]);
        assert_eq!(applied, 2);
        assert!(engine.resolved().get(LogicalKey::Left));
        assert!(!engine.resolved().get(LogicalKey::Right));
    }

    #[test]
    fn untracked_codes_change_nothing() {
        let mut engine = engine();
        press(&mut engine, LogicalKey::Up);
        let before = engine.snapshot();
        assert_eq!(
            engine.apply_transition(KeyCode(codes::KEY_SPACE), Transition::Pressed),
            None
        );
        assert_eq!(engine.snapshot(), before);
    }

    fn arb_event() -> impl Strategy<Value = (LogicalKey, bool)> {
        (
            prop::sample::select(LogicalKey::ALL.to_vec()),
            any::<bool>(),
        )
    }

    proptest! {
        #[test]
        fn resolved_never_conflicts(events in prop::collection::vec(arb_event(), 0..64)) {
            let mut engine = engine();
            for (key, pressed) in events {
                if pressed { press(&mut engine, key) } else { release(&mut engine, key) }
                for axis in Axis::ALL {
                    prop_assert!(!engine.resolved().is_conflicted(axis));
                }
            }
        }

        #[test]
        fn resolved_follows_raw_without_conflict(events in prop::collection::vec(arb_event(), 0..64)) {
            let mut engine = engine();
            for (key, pressed) in events {
                if pressed { press(&mut engine, key) } else { release(&mut engine, key) }
                for axis in Axis::ALL {
                    let raw = engine.raw();
                    if !raw.is_conflicted(axis) {
                        for k in axis.keys() {
                            prop_assert_eq!(engine.resolved().get(k), raw.get(k));
                        }
                    } else {
                        let winner = engine.recency().get(axis).unwrap();
                        prop_assert!(engine.resolved().get(winner));
                    }
                }
            }
        }

        #[test]
        fn axes_are_independent(events in prop::collection::vec(arb_event(), 0..64)) {
            for axis in Axis::ALL {
                let mut full = engine();
                let mut single_axis = engine();
                for &(key, pressed) in &events {
                    if pressed { press(&mut full, key) } else { release(&mut full, key) }
                    if key.axis() == axis {
                        if pressed { press(&mut single_axis, key) } else { release(&mut single_axis, key) }
                    }
                    for k in axis.keys() {
                        prop_assert_eq!(full.resolved().get(k), single_axis.resolved().get(k));
                    }
                }
            }
        }
    }
}
