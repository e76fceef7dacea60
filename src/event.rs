//! Input and output event shapes shared by the engine, the scheduler, and the devices.

use crate::engine::KeyStates;
use crate::keymap::{AxisKeyMap, KeyCode, LogicalKey};
use std::time::SystemTime;

/// Physical key transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Pressed,
    Released,
}

impl Transition {
    /// Translate an evdev key value. Auto-repeat (2) and anything else yields `None`.
    pub fn from_value(value: i32) -> Option<Self> {
        match value {
            1 => Some(Transition::Pressed),
            0 => Some(Transition::Released),
            _ => None,
        }
    }

    pub fn is_pressed(self) -> bool {
        matches!(self, Transition::Pressed)
    }
}

/// One raw key event read from the input source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub transition: Transition,
    pub timestamp: SystemTime,
}

impl KeyEvent {
    pub fn new(code: KeyCode, transition: Transition, timestamp: SystemTime) -> Self {
        Self {
            code,
            transition,
            timestamp,
        }
    }

    pub fn pressed(code: KeyCode) -> Self {
        Self::new(code, Transition::Pressed, SystemTime::now())
    }

    pub fn released(code: KeyCode) -> Self {
        Self::new(code, Transition::Released, SystemTime::now())
    }
}

/// One synthetic event handed to the output sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputEvent {
    Key {
        key: LogicalKey,
        code: KeyCode,
        pressed: bool,
    },
    /// Frame terminator (`SYN_REPORT` on uinput).
    Frame,
}

/// Ordered output of one emission: one event per role, then the frame marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmissionBatch {
    events: Vec<OutputEvent>,
}

impl EmissionBatch {
    /// Build a batch from a single set of key states.
    pub fn from_states(keymap: &AxisKeyMap, states: &KeyStates) -> Self {
        let mut events = Vec::with_capacity(LogicalKey::ALL.len() + 1);
        events.extend(keymap.iter().map(|(key, code)| OutputEvent::Key {
            key,
            code,
            pressed: states.get(key),
        }));
        events.push(OutputEvent::Frame);
        Self { events }
    }

    pub fn events(&self) -> &[OutputEvent] {
        &self.events
    }

    /// Key events only, without the trailing frame marker.
    pub fn key_events(&self) -> impl Iterator<Item = (LogicalKey, KeyCode, bool)> + '_ {
        self.events.iter().filter_map(|event| match *event {
            OutputEvent::Key { key, code, pressed } => Some((key, code, pressed)),
            OutputEvent::Frame => None,
        })
    }

    /// The key states this batch carries.
    pub fn states(&self) -> KeyStates {
        let mut states = KeyStates::default();
        for (key, _, pressed) in self.key_events() {
            states.set(key, pressed);
        }
        states
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_values_follow_evdev() {
        assert_eq!(Transition::from_value(1), Some(Transition::Pressed));
        assert_eq!(Transition::from_value(0), Some(Transition::Released));
        assert_eq!(Transition::from_value(2), None);
    }

    #[test]
    fn batch_lists_every_role_then_frame() {
        let map = AxisKeyMap::wasd();
        let mut states = KeyStates::default();
        states.set(LogicalKey::Right, true);

        let batch = EmissionBatch::from_states(&map, &states);
        let events = batch.events();

        assert_eq!(events.len(), 5);
        assert_eq!(events.last(), Some(&OutputEvent::Frame));
        assert_eq!(
            events[3],
            OutputEvent::Key {
                key: LogicalKey::Right,
                code: map.code(LogicalKey::Right),
                pressed: true,
            }
        );
        assert_eq!(batch.states(), states);
    }
}
