//! Error types and handling infrastructure for socd-cleaner.
//!
//! The resolution engine itself cannot fail. Everything in here comes from the
//! edges of the pipeline: opening devices, reading the keyboard, writing the
//! virtual device, and startup configuration.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for socd-cleaner operations.
///
/// Every variant is fatal to a running pipeline. Ignorable conditions (untracked
/// keys, auto-repeat, no data ready) never become errors.
#[derive(Error, Debug)]
pub enum SocdError {
    /// No keyboard event node could be found during discovery
    #[error("No keyboard device found under {searched}")]
    DeviceNotFound { searched: String },

    /// Opening an input or uinput device node failed
    #[error("Failed to open device {path}: {source}")]
    DeviceOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Permission denied on a device node (usually needs root or the input group)
    #[error("Permission denied accessing {path}; run as root or grant access to /dev/input and /dev/uinput")]
    PermissionDenied { path: PathBuf },

    /// Reading from the physical keyboard failed
    #[error("Failed to read input events: {source}")]
    InputRead {
        #[source]
        source: std::io::Error,
    },

    /// Writing to the virtual device failed
    #[error("Failed to write output events: {source}")]
    OutputWrite {
        #[source]
        source: std::io::Error,
    },

    /// Creating the uinput virtual device failed
    #[error("Failed to create virtual device: {message}")]
    VirtualDevice { message: String },

    /// Invalid key binding (unknown key name or repeated code)
    #[error("Invalid key binding: {message}")]
    InvalidBinding { message: String },

    /// Invalid command line arguments
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// A pipeline task stopped unexpectedly
    #[error("Pipeline failure: {message}")]
    Pipeline { message: String },
}

/// Standard Result type for socd-cleaner operations.
pub type Result<T> = std::result::Result<T, SocdError>;

impl SocdError {
    /// Create a DeviceOpen error, promoting permission failures to PermissionDenied
    pub fn device_open(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::DeviceOpen { path, source },
        }
    }

    pub fn input_read(source: std::io::Error) -> Self {
        Self::InputRead { source }
    }

    pub fn output_write(source: std::io::Error) -> Self {
        Self::OutputWrite { source }
    }

    pub fn virtual_device(message: impl Into<String>) -> Self {
        Self::VirtualDevice {
            message: message.into(),
        }
    }

    pub fn invalid_binding(message: impl Into<String>) -> Self {
        Self::InvalidBinding {
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn pipeline(message: impl Into<String>) -> Self {
        Self::Pipeline {
            message: message.into(),
        }
    }
}
