//! Amplifier/LED arbitrator
//!
//! Owns the talk/play flags and the output pins. Every handled event
//! recomputes the amplifier signal from scratch and re-asserts it on the
//! `AMP_ENABLE` pin; LED writes go through the `led_on` polarity flag.

use crate::error::Result;
use crate::event_bus::{Event, EventKind};
use crate::gpio::{GpioBackend, OutputPins, PinMode, PinNumber};
use crate::reducer::{apply, derive_amp, ArbitratorState};
use crate::settings::Settings;
use std::sync::Arc;
use tracing::debug;

/// Drives LEDs and the amplifier line from terminal events.
pub struct Arbitrator {
    backend: Arc<dyn GpioBackend>,
    pins: OutputPins,
    settings: Settings,
    state: ArbitratorState,
    amp_enabled: bool,
}

impl Arbitrator {
    /// Create an arbitrator in the silent state
    #[must_use]
    pub fn new(backend: Arc<dyn GpioBackend>, pins: OutputPins, settings: Settings) -> Self {
        Self {
            backend,
            pins,
            settings,
            state: ArbitratorState::default(),
            amp_enabled: false,
        }
    }

    /// Current flags
    #[must_use]
    pub fn state(&self) -> ArbitratorState {
        self.state
    }

    /// Last derived amplifier signal
    #[must_use]
    pub fn amp_enabled(&self) -> bool {
        self.amp_enabled
    }

    /// Bound pins
    #[must_use]
    pub fn pins(&self) -> OutputPins {
        self.pins
    }

    /// Active settings
    #[must_use]
    pub fn settings(&self) -> Settings {
        self.settings
    }

    /// Replace settings (polarity applies from the next write)
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    /// Configure every bound pin as output
    pub fn configure_outputs(&self) -> Result<()> {
        for pin in self.pins.iter() {
            self.backend.configure_pin(pin, PinMode::Output)?;
        }
        debug!(backend = self.backend.name(), pins = ?self.pins, "Outputs configured");
        Ok(())
    }

    /// Turn both LEDs off and drop the amplifier line
    pub fn quiesce(&self) -> Result<()> {
        let leds = self.leds_off();
        let amp = match self.pins.amp_enable {
            Some(pin) => self.write(pin, false),
            None => Ok(()),
        };
        leds.and(amp)
    }

    /// Turn both LEDs off
    pub fn leds_off(&self) -> Result<()> {
        self.set_led(self.pins.led_talk, false)?;
        if let Some(pin) = self.pins.led_record {
            self.set_led(pin, false)?;
        }
        Ok(())
    }

    /// Apply one event to the flags and the outputs.
    ///
    /// The amplifier is written even when an LED write fails; the first error
    /// is returned.
    pub fn handle(&mut self, event: &Event) -> Result<()> {
        self.state = apply(self.state, event);
        self.amp_enabled = derive_amp(self.state);

        if self.settings.log_on {
            debug!(
                event = %event.kind,
                talking = self.state.talking,
                playing = self.state.playing,
                amp = self.amp_enabled,
                "Event handled"
            );
        }

        let leds = self.drive_leds(&event.kind);
        let amp = match self.pins.amp_enable {
            Some(pin) => self.write(pin, self.amp_enabled),
            None => Ok(()),
        };
        leds.and(amp)
    }

    fn drive_leds(&self, kind: &EventKind) -> Result<()> {
        match kind {
            EventKind::StartTalking => self.set_led(self.pins.led_talk, true),
            EventKind::StopTalking => self.set_led(self.pins.led_talk, false),
            EventKind::StartRecord => self.set_optional_led(self.pins.led_record, true),
            EventKind::StopRecord => self.set_optional_led(self.pins.led_record, false),
            _ => Ok(()),
        }
    }

    fn set_optional_led(&self, pin: Option<PinNumber>, lit: bool) -> Result<()> {
        match pin {
            Some(pin) => self.set_led(pin, lit),
            None => Ok(()),
        }
    }

    fn set_led(&self, pin: PinNumber, lit: bool) -> Result<()> {
        self.write(pin, self.settings.led_level(lit))
    }

    fn write(&self, pin: PinNumber, level: bool) -> Result<()> {
        Ok(self.backend.write_pin(pin, level)?)
    }
}
