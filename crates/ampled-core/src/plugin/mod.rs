//! Plugin lifecycle
//!
//! Wires the arbitrator to a host: resolves pins, loads settings, subscribes
//! the event callback and runs optional side tasks.
//!
//! ```text
//! Created ──start()──▶ Started ──stop()──▶ Stopped
//!    └──────────────stop()──────────────────▲
//! ```
//!
//! Independently of the lifecycle, reloads move the plugin between
//! [`PluginStatus`] values. A failed reload is final: later reloads are
//! ignored until a new instance is built.

use crate::arbitrator::Arbitrator;
use crate::config::PluginConfig;
use crate::error::{Error, Result};
use crate::event_bus::{vocabulary, Event, EventCallback, EventSource};
use crate::gpio::GpioBackend;
use crate::reducer::ArbitratorState;
use crate::settings::{ConfigStore, Settings};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info, warn};

/// Lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Constructed, pins untouched
    Created,
    /// Pins configured and callback subscribed
    Started,
    /// Terminal
    Stopped,
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Started => write!(f, "started"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

/// Outcome of the most recent reload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginStatus {
    /// Subscribed and reacting to events
    Active,
    /// Host configuration excludes this plugin (e.g. language mismatch)
    DisabledByPolicy,
    /// A reload failed; reloads are no longer applied
    DisabledByFailure,
}

/// Host state passed on reload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadContext {
    /// Current host language code
    pub language: String,
}

impl ReloadContext {
    /// Context for `language`
    #[must_use]
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }
}

/// Background work owned by the plugin, such as a periodic announcer.
///
/// `disabled` follows the plugin's reload policy; tasks should skip their
/// work while it is set.
pub trait SideTask: Send {
    /// Task name for logs
    fn name(&self) -> &str;

    /// Launch the task
    fn start(&mut self, disabled: Arc<AtomicBool>) -> Result<()>;

    /// Signal the task to finish. Must not block.
    fn stop(&mut self);
}

/// Amplifier/LED plugin
pub struct Plugin {
    config: PluginConfig,
    events: Arc<dyn EventSource>,
    store: Arc<dyn ConfigStore>,
    arbitrator: Arc<Mutex<Arbitrator>>,
    callback: EventCallback,
    lifecycle: Lifecycle,
    status: PluginStatus,
    subscribed: bool,
    disabled: Arc<AtomicBool>,
    side_tasks: Vec<Box<dyn SideTask>>,
}

fn lock(arbitrator: &Mutex<Arbitrator>) -> MutexGuard<'_, Arbitrator> {
    arbitrator.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Callback boundary: failures are logged, never returned to the host.
fn dispatch(arbitrator: &Mutex<Arbitrator>, event: &Event) {
    if let Err(e) = lock(arbitrator).handle(event) {
        error!(event = %event.kind, "Failed to drive outputs: {}", e);
    }
}

impl Plugin {
    /// Resolve pins and load settings. Pins are not touched until `start`.
    pub fn new(
        config: PluginConfig,
        events: Arc<dyn EventSource>,
        store: Arc<dyn ConfigStore>,
        backend: Arc<dyn GpioBackend>,
    ) -> Result<Self> {
        let pins = config.pins.resolve(backend.as_ref())?;
        let settings = Settings::load(store.as_ref(), &config.settings_key)?;

        info!(
            backend = backend.name(),
            led_talk = pins.led_talk,
            led_record = ?pins.led_record,
            amp_enable = ?pins.amp_enable,
            led_on = settings.led_on,
            "GPIO plugin created"
        );

        let arbitrator = Arc::new(Mutex::new(Arbitrator::new(backend, pins, settings)));
        let target = Arc::clone(&arbitrator);
        let callback: EventCallback = Arc::new(move |event: &Event| dispatch(&target, event));

        Ok(Self {
            config,
            events,
            store,
            arbitrator,
            callback,
            lifecycle: Lifecycle::Created,
            status: PluginStatus::Active,
            subscribed: false,
            disabled: Arc::new(AtomicBool::new(false)),
            side_tasks: Vec::new(),
        })
    }

    /// Attach a side task, started with the plugin
    #[must_use]
    pub fn with_side_task(mut self, task: Box<dyn SideTask>) -> Self {
        self.side_tasks.push(task);
        self
    }

    /// Lifecycle state
    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Reload status
    #[must_use]
    pub fn status(&self) -> PluginStatus {
        self.status
    }

    /// Whether the callback is currently registered
    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    /// Current talk/play flags
    #[must_use]
    pub fn state(&self) -> ArbitratorState {
        lock(&self.arbitrator).state()
    }

    /// Current amplifier signal
    #[must_use]
    pub fn amp_enabled(&self) -> bool {
        lock(&self.arbitrator).amp_enabled()
    }

    /// Active settings
    #[must_use]
    pub fn settings(&self) -> Settings {
        lock(&self.arbitrator).settings()
    }

    /// Configuration
    #[must_use]
    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    /// The callback registered with the host
    #[must_use]
    pub fn callback(&self) -> EventCallback {
        Arc::clone(&self.callback)
    }

    /// Configure outputs, switch LEDs off, apply the initial reload and
    /// launch side tasks.
    ///
    /// If the initial reload or a side task fails, the plugin is stopped
    /// (outputs off, nothing subscribed) and the error returned; a fresh
    /// instance is needed to try again.
    pub fn start(&mut self) -> Result<()> {
        if self.lifecycle != Lifecycle::Created {
            return Err(Error::InvalidTransition {
                action: "start",
                state: self.lifecycle,
            });
        }

        {
            let arbitrator = lock(&self.arbitrator);
            arbitrator.configure_outputs()?;
            arbitrator.quiesce()?;
        }
        self.lifecycle = Lifecycle::Started;

        if let Err(e) = self.finish_start() {
            error!("GPIO plugin failed to start: {}", e);
            if let Err(stop_error) = self.stop() {
                warn!("Failed to switch outputs off: {}", stop_error);
            }
            return Err(e);
        }

        info!(status = ?self.status, "GPIO plugin started");
        Ok(())
    }

    fn finish_start(&mut self) -> Result<()> {
        let context = ReloadContext::new(self.config.language.clone());
        self.apply_new_config(&context)?;

        for task in &mut self.side_tasks {
            task.start(Arc::clone(&self.disabled))?;
            debug!(task = task.name(), "Side task started");
        }
        Ok(())
    }

    /// Unsubscribe, stop side tasks and switch outputs off.
    ///
    /// Safe in every state; a plugin that never started just becomes stopped.
    pub fn stop(&mut self) -> Result<()> {
        match self.lifecycle {
            Lifecycle::Stopped => return Ok(()),
            Lifecycle::Created => {
                self.lifecycle = Lifecycle::Stopped;
                return Ok(());
            }
            Lifecycle::Started => {}
        }

        self.unsubscribe();
        for task in &mut self.side_tasks {
            task.stop();
            debug!(task = task.name(), "Side task stopped");
        }
        self.lifecycle = Lifecycle::Stopped;

        let result = lock(&self.arbitrator).quiesce();
        info!("GPIO plugin stopped");
        result
    }

    /// Re-read settings and re-evaluate the host policy.
    ///
    /// A store failure marks the plugin [`PluginStatus::DisabledByFailure`];
    /// from then on reloads are ignored.
    pub fn apply_new_config(&mut self, context: &ReloadContext) -> Result<PluginStatus> {
        if self.lifecycle == Lifecycle::Stopped {
            return Err(Error::InvalidTransition {
                action: "reload",
                state: self.lifecycle,
            });
        }
        if self.status == PluginStatus::DisabledByFailure {
            warn!("Reload ignored: plugin disabled by an earlier failure");
            return Ok(self.status);
        }

        let settings = match Settings::load(self.store.as_ref(), &self.config.settings_key) {
            Ok(settings) => settings,
            Err(e) => {
                error!("Reload failed, disabling reloads: {}", e);
                self.status = PluginStatus::DisabledByFailure;
                return Err(e);
            }
        };
        lock(&self.arbitrator).set_settings(settings);

        if self.config.language_allowed(&context.language) {
            self.status = PluginStatus::Active;
            self.disabled.store(false, Ordering::SeqCst);
            if self.lifecycle == Lifecycle::Started {
                self.subscribe();
            }
        } else {
            info!(
                language = %context.language,
                required = ?self.config.required_language,
                "Host language not supported, plugin disabled"
            );
            self.status = PluginStatus::DisabledByPolicy;
            self.disabled.store(true, Ordering::SeqCst);
            self.unsubscribe();
        }

        Ok(self.status)
    }

    fn subscribe(&mut self) {
        if !self.subscribed {
            self.events.subscribe(&vocabulary(), self.callback());
            self.subscribed = true;
        }
    }

    fn unsubscribe(&mut self) {
        if self.subscribed {
            self.events.unsubscribe(&vocabulary(), &self.callback);
            self.subscribed = false;
        }
    }
}

impl Drop for Plugin {
    fn drop(&mut self) {
        if self.lifecycle == Lifecycle::Started {
            if let Err(e) = self.stop() {
                warn!("Failed to stop GPIO plugin on drop: {}", e);
            }
        }
    }
}
