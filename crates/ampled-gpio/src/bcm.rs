//! Broadcom (Raspberry Pi) boards, BCM numbering.

use crate::sysfs::{chip_line, Sysfs};
use ampled_core::{GpioBackend, GpioError, PinMode, PinNumber, PinSpec};
use tracing::trace;

/// Highest BCM line exposed on the header of any Pi
const MAX_BCM_LINE: PinNumber = 53;

/// Resolve `17`, `"17"`, `"GPIO17"` or `"BCM17"`
pub fn resolve(spec: &PinSpec) -> Result<PinNumber, GpioError> {
    let line = match spec {
        PinSpec::Line(line) => *line,
        PinSpec::Name(name) => {
            let upper = name.trim().to_ascii_uppercase();
            let digits = upper
                .strip_prefix("GPIO")
                .or_else(|| upper.strip_prefix("BCM"))
                .unwrap_or(&upper);
            digits
                .parse()
                .map_err(|_| GpioError::InvalidPin(name.clone()))?
        }
    };

    if line > MAX_BCM_LINE {
        return Err(GpioError::InvalidPin(format!("BCM line {line} out of range")));
    }
    Ok(line)
}

/// sysfs backend for Raspberry Pi boards
#[derive(Debug, Clone)]
pub struct BcmGpio {
    sysfs: Sysfs,
    base: PinNumber,
}

impl BcmGpio {
    /// Backend over `sysfs`; recent kernels put the chip at base 512
    #[must_use]
    pub fn new(sysfs: Sysfs, base: PinNumber) -> Self {
        Self { sysfs, base }
    }
}

impl GpioBackend for BcmGpio {
    fn name(&self) -> &str {
        "bcm"
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
        trace!(pin, level, "bcm write");
        self.sysfs.set_value(chip_line(self.base, pin)?, level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_names() {
        assert_eq!(resolve(&PinSpec::Line(17)).unwrap(), 17);
        assert_eq!(resolve(&PinSpec::from("GPIO17")).unwrap(), 17);
        assert_eq!(resolve(&PinSpec::from("bcm4")).unwrap(), 4);
        assert_eq!(resolve(&PinSpec::from("27")).unwrap(), 27);
        assert!(resolve(&PinSpec::from("PA12")).is_err());
        assert!(resolve(&PinSpec::Line(54)).is_err());
    }

    #[test]
    fn test_overflowing_base_rejected() {
        let gpio = BcmGpio::new(Sysfs::new("/nonexistent"), u32::MAX);
        assert!(matches!(
            gpio.resolve_pin(&PinSpec::from("GPIO17")),
            Err(GpioError::InvalidPin(_))
        ));
        assert!(matches!(
            gpio.write_pin(17, true),
            Err(GpioError::InvalidPin(_))
        ));
    }

    #[test]
    fn test_base_offset() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("gpio529")).unwrap();
        let gpio = BcmGpio::new(Sysfs::new(root.path()), 512);

        gpio.configure_pin(17, PinMode::Output).unwrap();
        gpio.write_pin(17, true).unwrap();
        assert_eq!(
            fs::read_to_string(root.path().join("gpio529").join("value")).unwrap(),
            "1"
        );
    }
}
