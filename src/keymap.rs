//! Logical direction keys, their axes, and the startup binding to physical key codes.

use crate::error::{Result, SocdError};
use std::fmt;

/// Linux input key codes for the keys a binding may name.
pub mod codes {
    pub const KEY_1: u16 = 2;
    pub const KEY_2: u16 = 3;
    pub const KEY_3: u16 = 4;
    pub const KEY_4: u16 = 5;
    pub const KEY_5: u16 = 6;
    pub const KEY_6: u16 = 7;
    pub const KEY_7: u16 = 8;
    pub const KEY_8: u16 = 9;
    pub const KEY_9: u16 = 10;
    pub const KEY_0: u16 = 11;
    pub const KEY_Q: u16 = 16;
    pub const KEY_W: u16 = 17;
    pub const KEY_E: u16 = 18;
    pub const KEY_R: u16 = 19;
    pub const KEY_T: u16 = 20;
    pub const KEY_Y: u16 = 21;
    pub const KEY_U: u16 = 22;
    pub const KEY_I: u16 = 23;
    pub const KEY_O: u16 = 24;
    pub const KEY_P: u16 = 25;
    pub const KEY_A: u16 = 30;
    pub const KEY_S: u16 = 31;
    pub const KEY_D: u16 = 32;
    pub const KEY_F: u16 = 33;
    pub const KEY_G: u16 = 34;
    pub const KEY_H: u16 = 35;
    pub const KEY_J: u16 = 36;
    pub const KEY_K: u16 = 37;
    pub const KEY_L: u16 = 38;
    pub const KEY_Z: u16 = 44;
    pub const KEY_X: u16 = 45;
    pub const KEY_C: u16 = 46;
    pub const KEY_V: u16 = 47;
    pub const KEY_B: u16 = 48;
    pub const KEY_N: u16 = 49;
    pub const KEY_M: u16 = 50;
    pub const KEY_SPACE: u16 = 57;
    pub const KEY_UP: u16 = 103;
    pub const KEY_LEFT: u16 = 105;
    pub const KEY_RIGHT: u16 = 106;
    pub const KEY_DOWN: u16 = 108;
}

/// Raw key code as reported by the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyCode(pub u16);

impl KeyCode {
    pub fn raw(self) -> u16 {
        self.0
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match key_name(*self) {
            Some(name) => write!(f, "{name}"),
            None => write!(f, "code {}", self.0),
        }
    }
}

/// Direction role a physical key is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalKey {
    Up,
    Left,
    Down,
    Right,
}

impl LogicalKey {
    /// All roles in emission order.
    pub const ALL: [LogicalKey; 4] = [
        LogicalKey::Up,
        LogicalKey::Left,
        LogicalKey::Down,
        LogicalKey::Right,
    ];

    /// Stable slot used by the per-key tables.
    pub fn index(self) -> usize {
        match self {
            LogicalKey::Up => 0,
            LogicalKey::Left => 1,
            LogicalKey::Down => 2,
            LogicalKey::Right => 3,
        }
    }

    pub fn axis(self) -> Axis {
        match self {
            LogicalKey::Up | LogicalKey::Down => Axis::Vertical,
            LogicalKey::Left | LogicalKey::Right => Axis::Horizontal,
        }
    }

    /// The key on the same axis pointing the other way.
    pub fn opposite(self) -> LogicalKey {
        match self {
            LogicalKey::Up => LogicalKey::Down,
            LogicalKey::Down => LogicalKey::Up,
            LogicalKey::Left => LogicalKey::Right,
            LogicalKey::Right => LogicalKey::Left,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            LogicalKey::Up => "up",
            LogicalKey::Left => "left",
            LogicalKey::Down => "down",
            LogicalKey::Right => "right",
        }
    }
}

impl fmt::Display for LogicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A pair of opposing keys resolved together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Vertical,
    Horizontal,
}

impl Axis {
    pub const ALL: [Axis; 2] = [Axis::Vertical, Axis::Horizontal];

    pub fn index(self) -> usize {
        match self {
            Axis::Vertical => 0,
            Axis::Horizontal => 1,
        }
    }

    pub fn keys(self) -> [LogicalKey; 2] {
        match self {
            Axis::Vertical => [LogicalKey::Up, LogicalKey::Down],
            Axis::Horizontal => [LogicalKey::Left, LogicalKey::Right],
        }
    }

    pub fn other(self) -> Axis {
        match self {
            Axis::Vertical => Axis::Horizontal,
            Axis::Horizontal => Axis::Vertical,
        }
    }
}

/// Fixed role-to-code binding, built once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisKeyMap {
    codes: [KeyCode; 4],
}

impl AxisKeyMap {
    /// Build a binding, rejecting any code bound to more than one role.
    pub fn new(up: KeyCode, left: KeyCode, down: KeyCode, right: KeyCode) -> Result<Self> {
        let codes = [up, left, down, right];
        for (i, code) in codes.iter().enumerate() {
            if let Some(j) = codes[i + 1..].iter().position(|other| other == code) {
                return Err(SocdError::invalid_binding(format!(
                    "{code} is bound to both {} and {}",
                    LogicalKey::ALL[i],
                    LogicalKey::ALL[i + 1 + j]
                )));
            }
        }
        Ok(Self { codes })
    }

    /// The W/A/S/D layout.
    pub fn wasd() -> Self {
        Self {
            codes: [
                KeyCode(codes::KEY_W),
                KeyCode(codes::KEY_A),
                KeyCode(codes::KEY_S),
                KeyCode(codes::KEY_D),
            ],
        }
    }

    pub fn code(&self, key: LogicalKey) -> KeyCode {
        self.codes[key.index()]
    }

    /// Role bound to `code`, or `None` for keys this program does not track.
    pub fn lookup(&self, code: KeyCode) -> Option<LogicalKey> {
        LogicalKey::ALL
            .into_iter()
            .find(|key| self.codes[key.index()] == code)
    }

    pub fn iter(&self) -> impl Iterator<Item = (LogicalKey, KeyCode)> + '_ {
        LogicalKey::ALL.into_iter().map(|key| (key, self.code(key)))
    }
}

impl Default for AxisKeyMap {
    fn default() -> Self {
        Self::wasd()
    }
}

impl fmt::Display for AxisKeyMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(key, code)| format!("{key}={code}"))
            .collect();
        f.write_str(&parts.join(" "))
    }
}

const KEY_NAMES: &[(&str, u16)] = &[
    ("1", codes::KEY_1),
    ("2", codes::KEY_2),
    ("3", codes::KEY_3),
    ("4", codes::KEY_4),
    ("5", codes::KEY_5),
    ("6", codes::KEY_6),
    ("7", codes::KEY_7),
    ("8", codes::KEY_8),
    ("9", codes::KEY_9),
    ("0", codes::KEY_0),
    ("q", codes::KEY_Q),
    ("w", codes::KEY_W),
    ("e", codes::KEY_E),
    ("r", codes::KEY_R),
    ("t", codes::KEY_T),
    ("y", codes::KEY_Y),
    ("u", codes::KEY_U),
    ("i", codes::KEY_I),
    ("o", codes::KEY_O),
    ("p", codes::KEY_P),
    ("a", codes::KEY_A),
    ("s", codes::KEY_S),
    ("d", codes::KEY_D),
    ("f", codes::KEY_F),
    ("g", codes::KEY_G),
    ("h", codes::KEY_H),
    ("j", codes::KEY_J),
    ("k", codes::KEY_K),
    ("l", codes::KEY_L),
    ("z", codes::KEY_Z),
    ("x", codes::KEY_X),
    ("c", codes::KEY_C),
    ("v", codes::KEY_V),
    ("b", codes::KEY_B),
    ("n", codes::KEY_N),
    ("m", codes::KEY_M),
    ("space", codes::KEY_SPACE),
    ("up", codes::KEY_UP),
    ("left", codes::KEY_LEFT),
    ("right", codes::KEY_RIGHT),
    ("down", codes::KEY_DOWN),
];

/// Parse a key name such as `w`, `KEY_W`, `left`, or `7` into its code.
pub fn parse_key_name(name: &str) -> Option<KeyCode> {
    let lowered = name.trim().to_ascii_lowercase();
    let name = lowered.strip_prefix("key_").unwrap_or(&lowered);

    KEY_NAMES
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, code)| KeyCode(*code))
}

fn key_name(code: KeyCode) -> Option<&'static str> {
    KEY_NAMES
        .iter()
        .find(|(_, candidate)| *candidate == code.0)
        .map(|(name, _)| *name)
}
