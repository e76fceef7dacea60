//! Command-line configuration.
//!
//! Everything is decided once at startup; nothing here is persisted.

use crate::device::DEFAULT_DEVICE_NAME;
use crate::emit::PacingPolicy;
use crate::error::{Result, SocdError};
use crate::keymap::{parse_key_name, AxisKeyMap, KeyCode};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use std::time::Duration;

/// How capture and emission are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulingModel {
    /// One loop reads a batch, resolves it, and emits.
    #[default]
    Sequential,
    /// A capture task and an emission task share the state store.
    Concurrent,
}

impl SchedulingModel {
    fn parse(value: &str) -> Result<Self> {
        match value {
            "sequential" => Ok(SchedulingModel::Sequential),
            "concurrent" => Ok(SchedulingModel::Concurrent),
            other => Err(SocdError::invalid_argument(format!(
                "unknown mode '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Keyboard event node; discovered when absent.
    pub device: Option<PathBuf>,
    pub list_devices: bool,
    pub keymap: AxisKeyMap,
    pub mode: SchedulingModel,
    pub pacing: PacingPolicy,
    pub monitor_interval: Option<Duration>,
    pub device_name: String,
    pub dry_run: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device: None,
            list_devices: false,
            keymap: AxisKeyMap::wasd(),
            mode: SchedulingModel::Sequential,
            pacing: PacingPolicy::Immediate,
            monitor_interval: None,
            device_name: DEFAULT_DEVICE_NAME.to_string(),
            dry_run: false,
        }
    }
}

impl Config {
    pub fn command() -> Command {
        Command::new("socd-cleaner")
            .version(crate::VERSION)
            .about("Resolves opposing direction keys into a conflict-free virtual keyboard")
            .long_about(
                "socd-cleaner reads a physical keyboard, resolves simultaneous opposing \
                 direction presses with last-input priority, and replays the result through \
                 a uinput virtual keyboard. Needs access to /dev/input and /dev/uinput.",
            )
            .arg(
                Arg::new("device")
                    .long("device")
                    .short('d')
                    .value_name("PATH")
                    .value_parser(value_parser!(PathBuf))
                    .help("Keyboard event node (default: first keyboard under /dev/input/by-id)"),
            )
            .arg(
                Arg::new("list-devices")
                    .long("list-devices")
                    .action(ArgAction::SetTrue)
                    .help("Print discovered keyboards and exit"),
            )
            .arg(key_arg("up", "w"))
            .arg(key_arg("left", "a"))
            .arg(key_arg("down", "s"))
            .arg(key_arg("right", "d"))
            .arg(
                Arg::new("mode")
                    .long("mode")
                    .value_parser(["sequential", "concurrent"])
                    .default_value("sequential")
                    .help("Run capture and emission in one loop or as two tasks"),
            )
            .arg(
                Arg::new("pacing-ms")
                    .long("pacing-ms")
                    .value_name("MS")
                    .value_parser(value_parser!(u64).range(0..=1000))
                    .default_value("0")
                    .help("Hold a winning press for this long before emitting it (0 = off, 16 ~ one frame)"),
            )
            .arg(
                Arg::new("monitor-ms")
                    .long("monitor-ms")
                    .value_name("MS")
                    .value_parser(value_parser!(u64).range(1..))
                    .help("Log raw and resolved key state at this interval (debug level)"),
            )
            .arg(
                Arg::new("name")
                    .long("name")
                    .value_name("NAME")
                    .default_value(DEFAULT_DEVICE_NAME)
                    .help("Name of the virtual keyboard"),
            )
            .arg(
                Arg::new("dry-run")
                    .long("dry-run")
                    .action(ArgAction::SetTrue)
                    .help("Log emitted batches instead of creating a virtual keyboard"),
            )
    }

    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let keymap = AxisKeyMap::new(
            key_value(matches, "up")?,
            key_value(matches, "left")?,
            key_value(matches, "down")?,
            key_value(matches, "right")?,
        )?;

        let mode = matches
            .get_one::<String>("mode")
            .map(|value| SchedulingModel::parse(value))
            .transpose()?
            .unwrap_or_default();

        let pacing = matches
            .get_one::<u64>("pacing-ms")
            .map(|ms| PacingPolicy::from_millis(*ms))
            .unwrap_or_default();

        Ok(Self {
            device: matches.get_one::<PathBuf>("device").cloned(),
            list_devices: matches.get_flag("list-devices"),
            keymap,
            mode,
            pacing,
            monitor_interval: matches
                .get_one::<u64>("monitor-ms")
                .map(|ms| Duration::from_millis(*ms)),
            device_name: matches
                .get_one::<String>("name")
                .cloned()
                .unwrap_or_else(|| DEFAULT_DEVICE_NAME.to_string()),
            dry_run: matches.get_flag("dry-run"),
        })
    }

    /// Parse from an explicit argument list (first item is the program name).
    pub fn try_parse_from<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let matches = Self::command()
            .try_get_matches_from(args)
            .map_err(|e| SocdError::invalid_argument(e.to_string()))?;
        Self::from_matches(&matches)
    }
}

fn key_arg(role: &'static str, default: &'static str) -> Arg {
    Arg::new(role)
        .long(role)
        .value_name("KEY")
        .default_value(default)
        .help(format!("Key bound to {role} (letter, digit, arrow name, or space)"))
}

fn key_value(matches: &ArgMatches, role: &str) -> Result<KeyCode> {
    let name = matches
        .get_one::<String>(role)
        .ok_or_else(|| SocdError::invalid_binding(format!("no key given for {role}")))?;
    parse_key_name(name)
        .ok_or_else(|| SocdError::invalid_binding(format!("unknown key '{name}' for {role}")))
}
