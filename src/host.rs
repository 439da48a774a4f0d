//! Line-oriented reference host
//!
//! Each input line is either an event (`<name> [payload]`) published on the
//! bus, or a host command prefixed with `:`:
//! - `:status` logs plugin state
//! - `:reload <language>` re-applies configuration
//! - `:quote` announces a quotation now
//! - `:quit` stops reading input

use ampled_core::{Event, EventBus, EventKind, Plugin, ReloadContext};
use ampled_quotes::QuoteAnnouncer;
use anyhow::{Context, Result};
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// One parsed input line
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Publish an event
    Publish(Event),
    /// Fetch and announce a quotation
    Quote,
    /// Re-apply configuration for a host language
    Reload(String),
    /// Log plugin state
    Status,
    /// Stop reading input
    Quit,
}

/// Parse an input line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    if let Some(command) = line.strip_prefix(':') {
        let mut parts = command.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let command = match name {
            "status" => Command::Status,
            "quote" => Command::Quote,
            "quit" | "q" => Command::Quit,
            "reload" => match parts.next() {
                Some(language) => Command::Reload(language.to_string()),
                None => return Err("usage: :reload <language>".to_string()),
            },
            other => return Err(format!("unknown command: :{other}")),
        };
        return Ok(Some(command));
    }

    let (name, payload) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, Some(rest.trim())),
        None => (line, None),
    };
    let kind = EventKind::from(name);

    let event = match payload {
        Some(raw) => {
            let value = serde_json::from_str::<Value>(raw)
                .unwrap_or_else(|_| Value::String(raw.to_string()));
            Event::with_payload(kind, value)
        }
        None => Event::new(kind),
    };
    Ok(Some(Command::Publish(event)))
}

/// In-process host wiring a plugin to a line feed
pub struct Host {
    bus: Arc<EventBus>,
    plugin: Plugin,
    quotes: Option<Arc<QuoteAnnouncer>>,
}

impl Host {
    /// Host around a plugin subscribed to `bus`
    pub fn new(bus: Arc<EventBus>, plugin: Plugin, quotes: Option<Arc<QuoteAnnouncer>>) -> Self {
        Self {
            bus,
            plugin,
            quotes,
        }
    }

    /// The hosted plugin
    pub fn plugin(&self) -> &Plugin {
        &self.plugin
    }

    /// Execute one command. Returns `false` when input should stop.
    pub async fn execute(&mut self, command: Command) -> bool {
        match command {
            Command::Publish(event) => {
                let delivered = self.bus.publish(event.clone());
                debug!(event = %event.kind, delivered, "Event published");
            }
            Command::Quote => match &self.quotes {
                Some(quotes) => {
                    if let Err(e) = quotes.announce_once().await {
                        warn!("Quote announcement failed: {}", e);
                    }
                }
                None => warn!("Quote announcer is not enabled"),
            },
            Command::Reload(language) => {
                match self.plugin.apply_new_config(&ReloadContext::new(language)) {
                    Ok(status) => info!(?status, "Configuration reloaded"),
                    Err(e) => warn!("Reload failed: {}", e),
                }
            }
            Command::Status => {
                let state = self.plugin.state();
                let settings = self.plugin.settings();
                info!(
                    lifecycle = %self.plugin.lifecycle(),
                    status = ?self.plugin.status(),
                    subscribed = self.plugin.is_subscribed(),
                    talking = state.talking,
                    playing = state.playing,
                    amp = self.plugin.amp_enabled(),
                    led_on = settings.led_on,
                    log_on = settings.log_on,
                    "Status"
                );
            }
            Command::Quit => return false,
        }
        true
    }

    /// Feed lines from `input` until EOF, `:quit` or `shutdown`.
    pub async fn run<R>(&mut self, input: R, shutdown: CancellationToken) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();

        loop {
            let line = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                line = lines.next_line() => line.context("Failed to read input")?,
            };

            let Some(line) = line else {
                info!("Input closed");
                break;
            };

            match parse_line(&line) {
                Ok(Some(command)) => {
                    if !self.execute(command).await {
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => warn!("{}", e),
            }
        }

        Ok(())
    }

    /// Stop the plugin
    pub fn shutdown(mut self) -> Result<()> {
        self.plugin.stop().context("Failed to stop plugin")
    }
}
