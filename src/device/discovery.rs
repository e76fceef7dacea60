//! Keyboard event node discovery.
//!
//! udev publishes stable symlinks for every input device. Keyboards end in
//! `-event-kbd`; composite keyboards also expose secondary interfaces such as
//! `...-if01-event-kbd` (media keys, macro pads) which are skipped.

use crate::error::{Result, SocdError};
use std::fs;
use std::path::{Path, PathBuf};

pub const BY_ID: &str = "/dev/input/by-id/";
pub const BY_PATH: &str = "/dev/input/by-path/";

const KBD_SUFFIX: &str = "-event-kbd";

/// Whether a directory entry name looks like a primary keyboard node.
pub fn is_primary_keyboard(name: &str) -> bool {
    let Some(stem) = name.strip_suffix(KBD_SUFFIX) else {
        return false;
    };
    !stem
        .rsplit_once('-')
        .is_some_and(|(_, last)| is_interface_number(last))
}

/// `if` followed by digits, as in `if01`.
fn is_interface_number(segment: &str) -> bool {
    segment
        .strip_prefix("if")
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

/// Filter and sort candidate names so discovery is deterministic.
pub fn keyboard_candidates<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut candidates: Vec<String> = names
        .into_iter()
        .map(Into::into)
        .filter(|name| is_primary_keyboard(name))
        .collect();
    candidates.sort();
    candidates
}

fn scan(dir: &Path) -> Option<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).ok()?;
    let names = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok());
    Some(
        keyboard_candidates(names)
            .into_iter()
            .map(|name| dir.join(name))
            .collect(),
    )
}

/// All keyboard nodes, preferring `by-id` over `by-path`.
pub fn list_keyboards() -> Vec<PathBuf> {
    [BY_ID, BY_PATH]
        .iter()
        .filter_map(|dir| scan(Path::new(dir)))
        .find(|found| !found.is_empty())
        .unwrap_or_default()
}

/// First keyboard node found.
pub fn find_keyboard() -> Result<PathBuf> {
    list_keyboards()
        .into_iter()
        .next()
        .ok_or_else(|| SocdError::DeviceNotFound {
            searched: format!("{BY_ID} or {BY_PATH}"),
        })
}
