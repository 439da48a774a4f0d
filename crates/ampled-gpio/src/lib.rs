//! Ampled GPIO - board backends
//!
//! One [`GpioBackend`] per supported board family, chosen explicitly from
//! configuration:
//! - `sunxi`: Allwinner H3/A20 boards, `PA12`-style port names
//! - `bcm`: Raspberry Pi, BCM line numbers
//!
//! With `dry_run` the family's pin naming is kept but writes go to memory.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod bcm;
pub mod sunxi;
pub mod sysfs;

pub use ampled_core::{GpioBackend, GpioError, MemoryGpio, PinMode, PinNumber, PinSpec};
pub use bcm::BcmGpio;
pub use sunxi::SunxiGpio;
pub use sysfs::Sysfs;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

/// Supported board families
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardFamily {
    /// Allwinner (Orange Pi and similar)
    #[default]
    Sunxi,
    /// Broadcom (Raspberry Pi)
    Bcm,
}

impl BoardFamily {
    /// Resolve a pin identifier with this family's naming
    pub fn resolve_pin(self, spec: &PinSpec) -> Result<PinNumber, GpioError> {
        match self {
            Self::Sunxi => sunxi::resolve(spec),
            Self::Bcm => bcm::resolve(spec),
        }
    }
}

impl fmt::Display for BoardFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sunxi => write!(f, "sunxi"),
            Self::Bcm => write!(f, "bcm"),
        }
    }
}

impl FromStr for BoardFamily {
    type Err = GpioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sunxi" | "allwinner" | "orangepi" => Ok(Self::Sunxi),
            "bcm" | "raspberrypi" | "rpi" => Ok(Self::Bcm),
            other => Err(GpioError::Backend(format!("unknown board family: {other}"))),
        }
    }
}

/// Board selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Board family
    #[serde(default)]
    pub family: BoardFamily,

    /// sysfs GPIO root
    #[serde(default = "default_sysfs_root")]
    pub sysfs_root: PathBuf,

    /// First line of the GPIO chip
    #[serde(default)]
    pub base: PinNumber,

    /// Keep pins in memory instead of touching hardware
    #[serde(default)]
    pub dry_run: bool,
}

fn default_sysfs_root() -> PathBuf {
    PathBuf::from(sysfs::DEFAULT_SYSFS_ROOT)
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            family: BoardFamily::default(),
            sysfs_root: default_sysfs_root(),
            base: 0,
            dry_run: false,
        }
    }
}

/// In-memory pins with a real board's naming.
#[derive(Debug, Default)]
pub struct SimulatedBoard {
    family: BoardFamily,
    pins: MemoryGpio,
}

impl SimulatedBoard {
    /// Simulate `family`
    #[must_use]
    pub fn new(family: BoardFamily) -> Self {
        Self {
            family,
            pins: MemoryGpio::new(),
        }
    }

    /// Recorded pin state
    #[must_use]
    pub fn pins(&self) -> &MemoryGpio {
        &self.pins
    }
}

impl GpioBackend for SimulatedBoard {
    fn name(&self) -> &str {
        "simulated"
    }

    fn resolve_pin(&self, spec: &PinSpec) -> Result<PinNumber, GpioError> {
        self.family.resolve_pin(spec)
    }

    fn configure_pin(&self, pin: PinNumber, mode: PinMode) -> Result<(), GpioError> {
        self.pins.configure_pin(pin, mode)
    }

    fn write_pin(&self, pin: PinNumber, level: bool) -> Result<(), GpioError> {
        info!(family = %self.family, pin, level, "Simulated pin write");
        self.pins.write_pin(pin, level)
    }
}

/// Build the backend selected by `config`
#[must_use]
pub fn open_backend(config: &BoardConfig) -> Arc<dyn GpioBackend> {
    if config.dry_run {
        info!(family = %config.family, "Using simulated GPIO");
        return Arc::new(SimulatedBoard::new(config.family));
    }

    let sysfs = Sysfs::new(&config.sysfs_root);
    info!(
        family = %config.family,
        root = %config.sysfs_root.display(),
        base = config.base,
        "Using sysfs GPIO"
    );
    match config.family {
        BoardFamily::Sunxi => Arc::new(SunxiGpio::new(sysfs, config.base)),
        BoardFamily::Bcm => Arc::new(BcmGpio::new(sysfs, config.base)),
    }
}
