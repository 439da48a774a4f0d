//! Linux sysfs GPIO access (`/sys/class/gpio`)
//!
//! A line is exported by writing its number to `export`; the kernel then
//! creates `gpio<N>/` with `direction` and `value` attributes.

use ampled_core::{GpioError, PinMode, PinNumber};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tracing::debug;

/// Default sysfs root
pub const DEFAULT_SYSFS_ROOT: &str = "/sys/class/gpio";

/// udev may need a moment to expose a freshly exported line
const EXPORT_POLL_ATTEMPTS: u32 = 10;
const EXPORT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Kernel line for `pin` on a chip starting at `base`
pub fn chip_line(base: PinNumber, pin: PinNumber) -> Result<PinNumber, GpioError> {
    base.checked_add(pin)
        .ok_or_else(|| GpioError::InvalidPin(format!("line {pin} past base {base} overflows")))
}

/// Handle on a sysfs GPIO tree
#[derive(Debug, Clone)]
pub struct Sysfs {
    root: PathBuf,
}

impl Sysfs {
    /// Tree rooted at `root`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn line_dir(&self, line: PinNumber) -> PathBuf {
        self.root.join(format!("gpio{line}"))
    }

    fn write_attr(path: &Path, line: PinNumber, value: &str) -> Result<(), GpioError> {
        fs::write(path, value).map_err(|source| GpioError::Io { pin: line, source })
    }

    /// Export `line` unless it already is
    pub fn export(&self, line: PinNumber) -> Result<(), GpioError> {
        let dir = self.line_dir(line);
        if dir.exists() {
            return Ok(());
        }

        Self::write_attr(&self.root.join("export"), line, &line.to_string())?;
        for _ in 0..EXPORT_POLL_ATTEMPTS {
            if dir.exists() {
                debug!(line, "Exported GPIO line");
                return Ok(());
            }
            thread::sleep(EXPORT_POLL_INTERVAL);
        }

        Err(GpioError::Io {
            pin: line,
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} did not appear after export", dir.display()),
            ),
        })
    }

    /// Export `line` and set its direction
    pub fn configure(&self, line: PinNumber, mode: PinMode) -> Result<(), GpioError> {
        self.export(line)?;
        Self::write_attr(&self.line_dir(line).join("direction"), line, mode.as_str())
    }

    /// Write `level` to `line`
    pub fn set_value(&self, line: PinNumber, level: bool) -> Result<(), GpioError> {
        let dir = self.line_dir(line);
        if !dir.exists() {
            return Err(GpioError::NotConfigured(line));
        }
        Self::write_attr(&dir.join("value"), line, if level { "1" } else { "0" })
    }
}

impl Default for Sysfs {
    fn default() -> Self {
        Self::new(DEFAULT_SYSFS_ROOT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configure_and_write_exported_line() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("gpio12")).unwrap();
        let sysfs = Sysfs::new(root.path());

        sysfs.configure(12, PinMode::Output).unwrap();
        sysfs.set_value(12, true).unwrap();

        let dir = root.path().join("gpio12");
        assert_eq!(fs::read_to_string(dir.join("direction")).unwrap(), "out");
        assert_eq!(fs::read_to_string(dir.join("value")).unwrap(), "1");
        // Already exported: export untouched
        assert!(!root.path().join("export").exists());
    }

    #[test]
    fn test_export_written_when_missing() {
        let root = tempfile::tempdir().unwrap();
        let sysfs = Sysfs::new(root.path());

        // Nothing creates gpio7/ here, so export times out
        assert!(matches!(
            sysfs.configure(7, PinMode::Output),
            Err(GpioError::Io { pin: 7, .. })
        ));
        assert_eq!(fs::read_to_string(root.path().join("export")).unwrap(), "7");
    }

    #[test]
    fn test_chip_line_overflow() {
        assert_eq!(chip_line(512, 17).unwrap(), 529);
        assert!(matches!(
            chip_line(512, u32::MAX),
            Err(GpioError::InvalidPin(_))
        ));
    }

    #[test]
    fn test_write_unexported_line() {
        let root = tempfile::tempdir().unwrap();
        let sysfs = Sysfs::new(root.path());
        assert!(matches!(
            sysfs.set_value(3, false),
            Err(GpioError::NotConfigured(3))
        ));
    }
}
