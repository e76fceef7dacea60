//! Concurrency-safe home of the key state.
//!
//! The capture path writes through [`SharedStateStore::apply_batch`]; the emission
//! path reads [`SharedStateStore::snapshot`]. Each write holds the lock across the
//! whole raw/resolved/recency update, so a reader sees either all of it or none.

use crate::engine::{KeyStates, ResolutionEngine, StateSnapshot};
use crate::event::KeyEvent;
use crate::keymap::AxisKeyMap;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

pub struct SharedStateStore {
    keymap: AxisKeyMap,
    engine: RwLock<ResolutionEngine>,
    updates: AtomicU64,
}

impl SharedStateStore {
    pub fn new(keymap: AxisKeyMap) -> Self {
        Self {
            keymap,
            engine: RwLock::new(ResolutionEngine::new(keymap)),
            updates: AtomicU64::new(0),
        }
    }

    pub fn keymap(&self) -> &AxisKeyMap {
        &self.keymap
    }

    /// Apply one event and return the state right after it.
    pub fn apply(&self, event: &KeyEvent) -> StateSnapshot {
        let mut engine = self.engine.write();
        if engine.apply(event).is_some() {
            self.updates.fetch_add(1, Ordering::Relaxed);
        }
        engine.snapshot()
    }

    /// Apply a whole input batch under one write lock.
    pub fn apply_batch(&self, events: &[KeyEvent]) -> StateSnapshot {
        let mut engine = self.engine.write();
        let applied = engine.apply_batch(events);
        self.updates.fetch_add(applied as u64, Ordering::Relaxed);
        engine.snapshot()
    }

    pub fn snapshot(&self) -> StateSnapshot {
        self.engine.read().snapshot()
    }

    pub fn resolved(&self) -> KeyStates {
        self.engine.read().resolved()
    }

    /// Number of tracked key transitions applied so far.
    pub fn update_count(&self) -> u64 {
        self.updates.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::{Axis, LogicalKey};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn apply_returns_post_update_snapshot() {
        let store = SharedStateStore::new(AxisKeyMap::wasd());
        let map = *store.keymap();

        let snapshot = store.apply(&KeyEvent::pressed(map.code(LogicalKey::Down)));
        assert!(snapshot.resolved.get(LogicalKey::Down));
        assert_eq!(snapshot.recency.get(Axis::Vertical), Some(LogicalKey::Down));
        assert_eq!(store.snapshot(), snapshot);
        assert_eq!(store.update_count(), 1);
    }

    #[test]
    fn concurrent_readers_never_see_conflicts() {
        let store = Arc::new(SharedStateStore::new(AxisKeyMap::wasd()));
        let map = *store.keymap();

        let writer = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..2_000 {
                    let (a, b) = if i % 2 == 0 {
                        (LogicalKey::Left, LogicalKey::Right)
                    } else {
                        (LogicalKey::Right, LogicalKey::Left)
                    };
                    store.apply_batch(&[
                        KeyEvent::pressed(map.code(a)),
                        KeyEvent::pressed(map.code(b)),
                        KeyEvent::released(map.code(a)),
                    ]);
                    store.apply(&KeyEvent::released(map.code(b)));
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..2_000 {
                        let snapshot = store.snapshot();
                        assert!(!snapshot.resolved.is_conflicted(Axis::Horizontal));
                        // A resolved press always belongs to the axis winner.
                        if let Some(winner) = snapshot.recency.get(Axis::Horizontal) {
                            if snapshot.raw.is_conflicted(Axis::Horizontal) {
                                assert!(snapshot.resolved.get(winner));
                            }
                        }
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
        assert!(store.resolved().is_all_released());
    }
}
