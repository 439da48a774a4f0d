//! Error types for ampled-core

use crate::gpio::PinNumber;
use crate::plugin::Lifecycle;
use thiserror::Error;

/// Pin backend error type
#[derive(Debug, Error)]
pub enum GpioError {
    /// Pin identifier could not be resolved to a line number
    #[error("invalid pin: {0}")]
    InvalidPin(String),

    /// Write attempted before the pin direction was configured
    #[error("pin {0} is not configured as output")]
    NotConfigured(PinNumber),

    /// Backend-level I/O failure
    #[error("GPIO I/O error on pin {pin}: {source}")]
    Io {
        /// Pin being accessed
        pin: PinNumber,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Backend refused the operation
    #[error("GPIO backend error: {0}")]
    Backend(String),
}

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// Pin backend error
    #[error("GPIO error: {0}")]
    Gpio(#[from] GpioError),

    /// Settings store error
    #[error("settings store error: {0}")]
    Store(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Lifecycle method called in the wrong state
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        /// Attempted operation
        action: &'static str,
        /// State the plugin was in
        state: Lifecycle,
    },

    /// Side task failed to start
    #[error("side task error: {0}")]
    SideTask(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
