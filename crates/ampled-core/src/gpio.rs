//! GPIO capability
//!
//! The arbitrator only needs two operations from a board: set a pin's
//! direction and write a level. Each supported board family implements
//! [`GpioBackend`]; [`MemoryGpio`] records writes for tests and dry runs.

use crate::error::{Error, GpioError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};
use tracing::trace;

/// Kernel line number of a pin
pub type PinNumber = u32;

/// Pin direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    /// Driven by us
    Output,
    /// Read only
    Input,
}

impl PinMode {
    /// sysfs `direction` value
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Output => "out",
            Self::Input => "in",
        }
    }
}

/// Pin identifier as written in configuration: a raw line number or a
/// board-specific name such as `PA12` or `GPIO17`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PinSpec {
    /// Line number
    Line(PinNumber),
    /// Board-specific name
    Name(String),
}

impl fmt::Display for PinSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Line(n) => write!(f, "{n}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

impl From<PinNumber> for PinSpec {
    fn from(line: PinNumber) -> Self {
        Self::Line(line)
    }
}

impl From<&str> for PinSpec {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

/// Board pin access.
///
/// `level` is electrical: `true` drives the line high.
pub trait GpioBackend: Send + Sync {
    /// Backend name for logs
    fn name(&self) -> &str;

    /// Translate a configured pin identifier into a line number.
    ///
    /// The default accepts line numbers and purely numeric names.
    fn resolve_pin(&self, spec: &PinSpec) -> Result<PinNumber, GpioError> {
        match spec {
            PinSpec::Line(n) => Ok(*n),
            PinSpec::Name(name) => name
                .trim()
                .parse()
                .map_err(|_| GpioError::InvalidPin(name.clone())),
        }
    }

    /// Set the direction of `pin`
    fn configure_pin(&self, pin: PinNumber, mode: PinMode) -> Result<(), GpioError>;

    /// Drive `pin` to `level`
    fn write_pin(&self, pin: PinNumber, level: bool) -> Result<(), GpioError>;
}

/// Physical bindings of the logical outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputPins {
    /// `LED_TALK`
    pub led_talk: PinNumber,
    /// `LED_RECORD`, if the board has one
    pub led_record: Option<PinNumber>,
    /// `AMP_ENABLE`, if the board has one
    pub amp_enable: Option<PinNumber>,
}

impl OutputPins {
    /// Bindings with only the talk LED
    #[must_use]
    pub fn talk_only(led_talk: PinNumber) -> Self {
        Self {
            led_talk,
            led_record: None,
            amp_enable: None,
        }
    }

    /// All bound pins
    pub fn iter(&self) -> impl Iterator<Item = PinNumber> {
        std::iter::once(self.led_talk)
            .chain(self.led_record)
            .chain(self.amp_enable)
    }

    /// Reject bindings that reuse a pin for two outputs
    pub fn validate(&self) -> Result<(), Error> {
        let pins: Vec<PinNumber> = self.iter().collect();
        for (i, pin) in pins.iter().enumerate() {
            if pins[..i].contains(pin) {
                return Err(Error::Config(format!("pin {pin} is bound twice")));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryPins {
    modes: HashMap<PinNumber, PinMode>,
    levels: HashMap<PinNumber, bool>,
    writes: Vec<(PinNumber, bool)>,
    failing: Vec<PinNumber>,
}

/// In-memory backend that records every write.
#[derive(Debug, Default)]
pub struct MemoryGpio {
    pins: Mutex<MemoryPins>,
}

impl MemoryGpio {
    /// Create an empty backend
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn pins(&self) -> std::sync::MutexGuard<'_, MemoryPins> {
        self.pins.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Last level written to `pin`
    #[must_use]
    pub fn level(&self, pin: PinNumber) -> Option<bool> {
        self.pins().levels.get(&pin).copied()
    }

    /// Configured direction of `pin`
    #[must_use]
    pub fn mode(&self, pin: PinNumber) -> Option<PinMode> {
        self.pins().modes.get(&pin).copied()
    }

    /// Every write in order
    #[must_use]
    pub fn writes(&self) -> Vec<(PinNumber, bool)> {
        self.pins().writes.clone()
    }

    /// Writes to a single pin in order
    #[must_use]
    pub fn writes_to(&self, pin: PinNumber) -> Vec<bool> {
        self.pins()
            .writes
            .iter()
            .filter(|(p, _)| *p == pin)
            .map(|(_, level)| *level)
            .collect()
    }

    /// Forget recorded writes (levels are kept)
    pub fn clear_writes(&self) {
        self.pins().writes.clear();
    }

    /// Make every later write to `pin` fail
    pub fn fail_on(&self, pin: PinNumber) {
        self.pins().failing.push(pin);
    }
}

impl GpioBackend for MemoryGpio {
    fn name(&self) -> &str {
        "memory"
    }

    fn configure_pin(&self, pin: PinNumber, mode: PinMode) -> Result<(), GpioError> {
        self.pins().modes.insert(pin, mode);
        Ok(())
    }

    fn write_pin(&self, pin: PinNumber, level: bool) -> Result<(), GpioError> {
        let mut pins = self.pins();
        if pins.failing.contains(&pin) {
            return Err(GpioError::Backend(format!("injected failure on pin {pin}")));
        }
        if pins.modes.get(&pin) != Some(&PinMode::Output) {
            return Err(GpioError::NotConfigured(pin));
        }
        trace!(pin, level, "memory write");
        pins.levels.insert(pin, level);
        pins.writes.push((pin, level));
        Ok(())
    }
}
