//! Announcer configuration

use crate::source::FORISMATIC_ENDPOINT;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Quote announcer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteConfig {
    /// Run the announcer at all
    #[serde(default)]
    pub enabled: bool,

    /// Seconds between announcements
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Quote API endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Language of the quotes
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_interval_secs() -> u64 {
    12 * 60 * 60
}

fn default_endpoint() -> String {
    FORISMATIC_ENDPOINT.to_string()
}

fn default_language() -> String {
    "ru".to_string()
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_secs: default_interval_secs(),
            endpoint: default_endpoint(),
            language: default_language(),
        }
    }
}

impl QuoteConfig {
    /// Interval as a duration (never zero)
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}
