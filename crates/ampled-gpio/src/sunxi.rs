//! Allwinner (sunxi) boards: Orange Pi, Banana Pi and friends.
//!
//! Pins are named by port bank and index, `PA12`, `PG7`; the kernel line is
//! `bank * 32 + index`.

use crate::sysfs::{chip_line, Sysfs};
use ampled_core::{GpioBackend, GpioError, PinMode, PinNumber, PinSpec};
use tracing::trace;

const PINS_PER_BANK: u32 = 32;
const LAST_BANK: char = 'N';
/// One past the highest line of the last bank
const LINE_COUNT: PinNumber = (LAST_BANK as u32 - 'A' as u32 + 1) * PINS_PER_BANK;

/// Parse a `P<bank><index>` port name.
pub fn parse_port_name(name: &str) -> Result<PinNumber, GpioError> {
    let invalid = || GpioError::InvalidPin(name.to_string());

    let upper = name.trim().to_ascii_uppercase();
    let rest = upper.strip_prefix('P').ok_or_else(invalid)?;
    let mut chars = rest.chars();
    let bank = chars.next().filter(|b| ('A'..=LAST_BANK).contains(b)).ok_or_else(invalid)?;
    let digits = chars.as_str();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let index: u32 = digits.parse().map_err(|_| invalid())?;
    if index >= PINS_PER_BANK {
        return Err(invalid());
    }

    Ok((bank as u32 - 'A' as u32) * PINS_PER_BANK + index)
}

/// Resolve a sunxi pin identifier
pub fn resolve(spec: &PinSpec) -> Result<PinNumber, GpioError> {
    let line = match spec {
        PinSpec::Line(line) => *line,
        PinSpec::Name(name) => match name.trim().parse() {
            Ok(line) => line,
            Err(_) => return parse_port_name(name),
        },
    };

    if line >= LINE_COUNT {
        return Err(GpioError::InvalidPin(format!("sunxi line {line} out of range")));
    }
    Ok(line)
}

/// sysfs backend for sunxi boards
#[derive(Debug, Clone)]
pub struct SunxiGpio {
    sysfs: Sysfs,
    base: PinNumber,
}

impl SunxiGpio {
    /// Backend over `sysfs`; `base` is the GPIO chip's first line
    #[must_use]
    pub fn new(sysfs: Sysfs, base: PinNumber) -> Self {
        Self { sysfs, base }
    }
}

impl GpioBackend for SunxiGpio {
    fn name(&self) -> &str {
        "sunxi"
    }

    fn resolve_pin(&self, spec: &PinSpec) -> Result<PinNumber, GpioError> {
        let pin = resolve(spec)?;
        chip_line(self.base, pin)?;
        Ok(pin)
    }

    fn configure_pin(&self, pin: PinNumber, mode: PinMode) -> Result<(), GpioError> {
        self.sysfs.configure(chip_line(self.base, pin)?, mode)
    }

    fn write_pin(&self, pin: PinNumber, level: bool) -> Result<(), GpioError> {
        trace!(pin, level, "sunxi write");
        self.sysfs.set_value(chip_line(self.base, pin)?, level)
    }
}
