//! Virtual keyboard output over uinput.

use crate::emit::OutputSink;
use crate::error::{Result, SocdError};
use crate::event::EmissionBatch;
use crate::keymap::AxisKeyMap;
use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{AttributeSet, BusType, EventType, InputEvent, InputId, Key};

pub const DEFAULT_DEVICE_NAME: &str = "socd_cleaner";

const VENDOR_ID: u16 = 0x1234;
const PRODUCT_ID: u16 = 0x5678;

/// uinput device advertising exactly the four bound keys.
///
/// The kernel destroys the device when this value is dropped.
pub struct UinputSink {
    device: VirtualDevice,
    scratch: Vec<InputEvent>,
}

impl UinputSink {
    pub fn create(name: &str, keymap: &AxisKeyMap) -> Result<Self> {
        let mut keys = AttributeSet::<Key>::new();
        for (_, code) in keymap.iter() {
            keys.insert(Key::new(code.raw()));
        }

        let device = VirtualDeviceBuilder::new()
            .map_err(|e| SocdError::device_open("/dev/uinput", e))?
            .name(name)
            .input_id(InputId::new(BusType::BUS_USB, VENDOR_ID, PRODUCT_ID, 1))
            .with_keys(&keys)
            .map_err(|e| SocdError::virtual_device(e.to_string()))?
            .build()
            .map_err(|e| SocdError::virtual_device(e.to_string()))?;

        Ok(Self {
            device,
            scratch: Vec::with_capacity(4),
        })
    }
}

impl OutputSink for UinputSink {
    fn write_batch(&mut self, batch: &EmissionBatch) -> Result<()> {
        self.scratch.clear();
        self.scratch.extend(batch.key_events().map(|(_, code, pressed)| {
            InputEvent::new(EventType::KEY, code.raw(), i32::from(pressed))
        }));
        // `emit` appends the SYN_REPORT that closes the frame.
        self.device
            .emit(&self.scratch)
            .map_err(SocdError::output_write)
    }
}
