//! Ampled Core - Amplifier/LED arbitration
//!
//! This crate drives the indicator LEDs and the amplifier-enable line of a
//! voice-assistant terminal from the terminal's runtime events:
//! - Reducer: folds events into the `talking` / `playing` flags
//! - Arbitrator: derives the amplifier signal and writes the pins
//! - Settings: host-persisted polarity and logging flags with strict validation
//! - Plugin: start/stop lifecycle, reload policy and optional side tasks
//! - Event bus: a minimal in-process host for callbacks
//!
//! # Usage
//!
//! ```rust,ignore
//! use ampled_core::{EventBus, MemoryGpio, MemoryStore, Plugin, PluginConfig};
//! use std::sync::Arc;
//!
//! let bus = Arc::new(EventBus::default());
//! let mut plugin = Plugin::new(
//!     PluginConfig::default(),
//!     bus.clone(),
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(MemoryGpio::new()),
//! )?;
//! plugin.start()?;
//! bus.publish(Event::new(EventKind::StartTalking));
//! assert!(plugin.amp_enabled());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod arbitrator;
pub mod config;
pub mod error;
pub mod event_bus;
pub mod gpio;
pub mod plugin;
pub mod reducer;
pub mod settings;

pub use arbitrator::Arbitrator;
pub use config::{PinsConfig, PluginConfig};
pub use error::{Error, GpioError, Result};
pub use event_bus::{vocabulary, Event, EventBus, EventCallback, EventKind, EventSource};
pub use gpio::{GpioBackend, MemoryGpio, OutputPins, PinMode, PinNumber, PinSpec};
pub use plugin::{Lifecycle, Plugin, PluginStatus, ReloadContext, SideTask};
pub use reducer::{apply, derive_amp, ArbitratorState};
pub use settings::{
    load_or_default, ConfigStore, JsonFileStore, Mapping, MemoryStore, SemanticType, Settings,
};
