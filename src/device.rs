//! Linux device plumbing: keyboard discovery, evdev input, uinput output.
//!
//! Nothing in the engine depends on this module; it only implements
//! [`InputSource`](crate::input::InputSource) and
//! [`OutputSink`](crate::emit::OutputSink) for real hardware.

pub mod discovery;
pub mod evdev_source;
pub mod uinput_sink;

pub use discovery::{find_keyboard, list_keyboards, BY_ID, BY_PATH};
pub use evdev_source::EvdevSource;
pub use uinput_sink::{UinputSink, DEFAULT_DEVICE_NAME};
