//! Plugin configuration

use crate::error::{Error, Result};
use crate::gpio::{GpioBackend, OutputPins, PinSpec};
use crate::settings::DEFAULT_SETTINGS_KEY;
use serde::{Deserialize, Serialize};

/// Pin bindings as configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinsConfig {
    /// `LED_TALK`
    #[serde(default = "default_led_talk")]
    pub led_talk: PinSpec,

    /// `LED_RECORD`; omit on boards without a record LED
    #[serde(default)]
    pub led_record: Option<PinSpec>,

    /// `AMP_ENABLE`; omit on boards without an amplifier switch
    #[serde(default)]
    pub amp_enable: Option<PinSpec>,
}

fn default_led_talk() -> PinSpec {
    PinSpec::Line(12) // PA12
}

impl Default for PinsConfig {
    fn default() -> Self {
        Self {
            led_talk: default_led_talk(),
            led_record: Some(PinSpec::Line(11)), // PA11
            amp_enable: Some(PinSpec::Line(6)),  // PA6
        }
    }
}

impl PinsConfig {
    /// Resolve names through `backend` and check for clashes
    pub fn resolve(&self, backend: &dyn GpioBackend) -> Result<OutputPins> {
        let resolve = |spec: &PinSpec| {
            backend
                .resolve_pin(spec)
                .map_err(|e| Error::Config(format!("{} on {}: {}", spec, backend.name(), e)))
        };

        let pins = OutputPins {
            led_talk: resolve(&self.led_talk)?,
            led_record: self.led_record.as_ref().map(resolve).transpose()?,
            amp_enable: self.amp_enable.as_ref().map(resolve).transpose()?,
        };
        pins.validate()?;
        Ok(pins)
    }
}

/// Plugin configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Key of the settings record in the host store
    #[serde(default = "default_settings_key")]
    pub settings_key: String,

    /// Output pin bindings
    #[serde(default)]
    pub pins: PinsConfig,

    /// Host language at construction time
    #[serde(default = "default_language")]
    pub language: String,

    /// Only stay subscribed while the host runs in this language
    #[serde(default)]
    pub required_language: Option<String>,
}

fn default_settings_key() -> String {
    DEFAULT_SETTINGS_KEY.to_string()
}

fn default_language() -> String {
    "ru".to_string()
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            settings_key: default_settings_key(),
            pins: PinsConfig::default(),
            language: default_language(),
            required_language: None,
        }
    }
}

impl PluginConfig {
    /// Set pin bindings
    #[must_use]
    pub fn with_pins(mut self, pins: PinsConfig) -> Self {
        self.pins = pins;
        self
    }

    /// Set the settings key
    #[must_use]
    pub fn with_settings_key(mut self, key: impl Into<String>) -> Self {
        self.settings_key = key.into();
        self
    }

    /// Set the host language
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Require a host language
    #[must_use]
    pub fn with_required_language(mut self, language: impl Into<String>) -> Self {
        self.required_language = Some(language.into());
        self
    }

    /// Whether `language` satisfies the language requirement
    #[must_use]
    pub fn language_allowed(&self, language: &str) -> bool {
        self.required_language
            .as_deref()
            .map_or(true, |required| required.eq_ignore_ascii_case(language))
    }
}
