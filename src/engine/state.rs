//! Per-key state tables and the immutable snapshot handed to the emission path.

use crate::event::Transition;
use crate::keymap::{Axis, AxisKeyMap, KeyCode, LogicalKey};
use std::fmt;
use std::ops::Index;

/// One boolean per logical key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct KeyStates([bool; 4]);

impl KeyStates {
    pub const ALL_RELEASED: KeyStates = KeyStates([false; 4]);

    pub fn get(&self, key: LogicalKey) -> bool {
        self.0[key.index()]
    }

    pub fn set(&mut self, key: LogicalKey, pressed: bool) {
        self.0[key.index()] = pressed;
    }

    /// True when both opposing keys of `axis` are set.
    pub fn is_conflicted(&self, axis: Axis) -> bool {
        axis.keys().iter().all(|key| self.get(*key))
    }

    pub fn any_on(&self, axis: Axis) -> bool {
        axis.keys().iter().any(|key| self.get(*key))
    }

    pub fn is_all_released(&self) -> bool {
        self.0.iter().all(|pressed| !pressed)
    }
}

impl Index<LogicalKey> for KeyStates {
    type Output = bool;

    fn index(&self, key: LogicalKey) -> &bool {
        &self.0[key.index()]
    }
}

impl fmt::Display for KeyStates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ up: {}, left: {}, down: {}, right: {} }}",
            u8::from(self[LogicalKey::Up]),
            u8::from(self[LogicalKey::Left]),
            u8::from(self[LogicalKey::Down]),
            u8::from(self[LogicalKey::Right]),
        )
    }
}

/// Which key of each axis most recently transitioned to pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Recency([Option<LogicalKey>; 2]);

impl Recency {
    pub fn get(&self, axis: Axis) -> Option<LogicalKey> {
        self.0[axis.index()]
    }

    pub fn mark(&mut self, key: LogicalKey) {
        self.0[key.axis().index()] = Some(key);
    }
}

/// Physical truth: whether each bound key is currently held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawKeyState {
    held: KeyStates,
}

impl RawKeyState {
    /// Record a physical transition. Returns the role it touched, or `None`
    /// when `code` is not one of the bound keys.
    pub fn apply_raw_event(
        &mut self,
        keymap: &AxisKeyMap,
        code: KeyCode,
        transition: Transition,
    ) -> Option<LogicalKey> {
        let key = keymap.lookup(code)?;
        self.held.set(key, transition.is_pressed());
        Some(key)
    }

    pub fn is_held(&self, key: LogicalKey) -> bool {
        self.held.get(key)
    }

    pub fn states(&self) -> KeyStates {
        self.held
    }
}

/// Consistent copy of the raw/resolved/recency triple at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StateSnapshot {
    pub raw: KeyStates,
    pub resolved: KeyStates,
    pub recency: Recency,
}
