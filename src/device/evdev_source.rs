//! Physical keyboard input over evdev.

use crate::error::{Result, SocdError};
use crate::event::{KeyEvent, Transition};
use crate::input::InputSource;
use crate::keymap::{AxisKeyMap, KeyCode};
use async_trait::async_trait;
use evdev::{Device, EventStream, EventType, InputEvent, Key, Synchronization};
use std::path::{Path, PathBuf};

/// Reads one keyboard and yields bound-key events grouped by `SYN_REPORT`.
///
/// The evdev event stream resynchronizes after a kernel buffer overflow: the
/// incomplete report is discarded and compensating press/release events for
/// every key whose state changed are delivered in a report of their own. A
/// release lost in the overflow therefore still reaches the engine.
pub struct EvdevSource {
    path: PathBuf,
    name: String,
    stream: EventStream,
    // Survives a cancelled `next_batch` so no event is lost.
    batcher: ReportBatcher,
}

impl EvdevSource {
    pub fn open(path: &Path, keymap: &AxisKeyMap) -> Result<Self> {
        let device = Device::open(path).map_err(|e| SocdError::device_open(path, e))?;
        let name = device.name().unwrap_or("unnamed keyboard").to_string();

        if let Some(supported) = device.supported_keys() {
            for (key, code) in keymap.iter() {
                if !supported.contains(Key::new(code.raw())) {
                    log::warn!("{name} does not report {code} (bound to {key})");
                }
            }
        }

        let stream = device
            .into_event_stream()
            .map_err(|e| SocdError::device_open(path, e))?;

        Ok(Self {
            path: path.to_path_buf(),
            name,
            stream,
            batcher: ReportBatcher::new(*keymap),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Map a kernel event onto a key transition; auto-repeat and non-key events give `None`.
fn translate(event: &InputEvent) -> Option<KeyEvent> {
    if event.event_type() != EventType::KEY {
        return None;
    }
    let transition = Transition::from_value(event.value())?;
    Some(KeyEvent::new(
        KeyCode(event.code()),
        transition,
        event.timestamp(),
    ))
}

fn sync_code(event: &InputEvent) -> Option<Synchronization> {
    (event.event_type() == EventType::SYNCHRONIZATION).then(|| Synchronization(event.code()))
}

/// Groups bound-key transitions into one batch per `SYN_REPORT`.
#[derive(Debug)]
struct ReportBatcher {
    keymap: AxisKeyMap,
    pending: Vec<KeyEvent>,
}

impl ReportBatcher {
    fn new(keymap: AxisKeyMap) -> Self {
        Self {
            keymap,
            pending: Vec::new(),
        }
    }

    /// Feed one kernel event; returns a batch when a report closes with bound keys in it.
    fn push(&mut self, event: &InputEvent) -> Option<Vec<KeyEvent>> {
        if let Some(key_event) = translate(event) {
            // Untracked keys never open a batch of their own.
            if self.keymap.lookup(key_event.code).is_some() {
                self.pending.push(key_event);
            }
            return None;
        }

        match sync_code(event)? {
            Synchronization::SYN_REPORT if !self.pending.is_empty() => {
                Some(std::mem::take(&mut self.pending))
            }
            Synchronization::SYN_DROPPED => {
                // The rest of this report is unreliable; the resync replaces it.
                log::warn!("input events dropped by the kernel, discarding partial report");
                self.pending.clear();
                None
            }
            _ => None,
        }
    }
}

#[async_trait]
impl InputSource for EvdevSource {
    async fn next_batch(&mut self) -> Result<Option<Vec<KeyEvent>>> {
        loop {
            // Unplugging the keyboard surfaces here as ENODEV, which is fatal.
            let event = self
                .stream
                .next_event()
                .await
                .map_err(SocdError::input_read)?;

            if let Some(batch) = self.batcher.push(&event) {
                return Ok(Some(batch));
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::codes;

    #[test]
    fn translates_key_events_only() {
        let press = InputEvent::new(EventType::KEY, 30, 1);
        let release = InputEvent::new(EventType::KEY, 30, 0);
        let repeat = InputEvent::new(EventType::KEY, 30, 2);
        let scan = InputEvent::new(EventType::MISC, 4, 458756);

        assert_eq!(translate(&press).map(|e| e.transition), Some(Transition::Pressed));
        assert_eq!(translate(&release).map(|e| e.code), Some(KeyCode(30)));
        assert!(translate(&repeat).is_none());
        assert!(translate(&scan).is_none());
    }

    fn key(code: u16, value: i32) -> InputEvent {
        InputEvent::new(EventType::KEY, code, value)
    }

    fn sync(kind: Synchronization) -> InputEvent {
        InputEvent::new(EventType::SYNCHRONIZATION, kind.0, 0)
    }

    #[test]
    fn batches_close_on_syn_report_only() {
        let mut batcher = ReportBatcher::new(AxisKeyMap::wasd());
        assert!(batcher.push(&key(codes::KEY_A, 1)).is_none());
        assert!(batcher.push(&key(codes::KEY_D, 1)).is_none());
        assert!(batcher.push(&sync(Synchronization::SYN_CONFIG)).is_none());

        let batch = batcher.push(&sync(Synchronization::SYN_REPORT)).unwrap();
        let got: Vec<_> = batch.iter().map(|e| e.code).collect();
        assert_eq!(got, vec![KeyCode(codes::KEY_A), KeyCode(codes::KEY_D)]);
    }

    #[test]
    fn untracked_only_reports_produce_no_batch() {
        let mut batcher = ReportBatcher::new(AxisKeyMap::wasd());
        assert!(batcher.push(&key(codes::KEY_Q, 1)).is_none());
        assert!(batcher.push(&key(codes::KEY_W, 2)).is_none());
        assert!(batcher.push(&sync(Synchronization::SYN_REPORT)).is_none());
    }

    #[test]
    fn dropped_report_is_discarded_and_resync_is_delivered() {
        let mut batcher = ReportBatcher::new(AxisKeyMap::wasd());
        batcher.push(&key(codes::KEY_A, 1));
        batcher.push(&sync(Synchronization::SYN_DROPPED));
        assert!(batcher.push(&sync(Synchronization::SYN_REPORT)).is_none());

        // Compensating release for a key whose release was lost.
        batcher.push(&key(codes::KEY_D, 0));
        let batch = batcher.push(&sync(Synchronization::SYN_REPORT)).unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].code, KeyCode(codes::KEY_D));
        assert_eq!(batch[0].transition, Transition::Released);
    }

    #[test]
    fn key_table_matches_evdev() {
        let pairs = [
            (codes::KEY_W, Key::KEY_W),
            (codes::KEY_A, Key::KEY_A),
            (codes::KEY_S, Key::KEY_S),
            (codes::KEY_D, Key::KEY_D),
            (codes::KEY_1, Key::KEY_1),
            (codes::KEY_9, Key::KEY_9),
            (codes::KEY_0, Key::KEY_0),
            (codes::KEY_Q, Key::KEY_Q),
            (codes::KEY_M, Key::KEY_M),
            (codes::KEY_SPACE, Key::KEY_SPACE),
            (codes::KEY_UP, Key::KEY_UP),
            (codes::KEY_LEFT, Key::KEY_LEFT),
            (codes::KEY_DOWN, Key::KEY_DOWN),
            (codes::KEY_RIGHT, Key::KEY_RIGHT),
        ];
        for (ours, theirs) in pairs {
            assert_eq!(ours, theirs.code(), "{theirs:?}");
        }
    }
}
