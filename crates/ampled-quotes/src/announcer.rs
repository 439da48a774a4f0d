//! Periodic quote announcer
//!
//! Waits for the interval or cancellation, then fetches one quote and hands
//! it to the host's speech output. Fetch failures are logged and the loop
//! carries on with the next tick.

use crate::error::Result;
use crate::source::{Quote, QuoteSource};
use ampled_core::{Error as CoreError, SideTask};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Host speech output
pub trait Announcer: Send + Sync {
    /// Speak `text`
    fn announce(&self, text: &str);
}

/// Announcer that writes quotes to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAnnouncer;

impl Announcer for LogAnnouncer {
    fn announce(&self, text: &str) {
        info!(target: "ampled::announce", "{}", text);
    }
}

/// Fetch-and-announce loop
pub struct QuoteAnnouncer {
    source: Arc<dyn QuoteSource>,
    announcer: Arc<dyn Announcer>,
    interval: Duration,
}

impl QuoteAnnouncer {
    /// Create an announcer ticking every `interval`
    #[must_use]
    pub fn new(
        source: Arc<dyn QuoteSource>,
        announcer: Arc<dyn Announcer>,
        interval: Duration,
    ) -> Self {
        Self {
            source,
            announcer,
            interval,
        }
    }

    /// Tick interval
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Fetch one quote and announce it
    pub async fn announce_once(&self) -> Result<Quote> {
        let quote = self.source.fetch().await?;
        self.announcer.announce(&quote.to_string());
        Ok(quote)
    }

    /// Run until `shutdown` is cancelled. Ticks are skipped while `disabled`.
    pub async fn run(&self, disabled: Arc<AtomicBool>, shutdown: CancellationToken) {
        info!(
            source = self.source.name(),
            interval_secs = self.interval.as_secs(),
            "Quote announcer starting"
        );

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }

            if disabled.load(Ordering::SeqCst) {
                debug!("Quote announcer disabled, skipping tick");
                continue;
            }

            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                result = self.announce_once() => {
                    if let Err(e) = result {
                        debug!("Quote announcement failed: {}", e);
                    }
                }
            }
        }

        info!("Quote announcer stopped");
    }
}

/// [`SideTask`] that runs a [`QuoteAnnouncer`] on a tokio runtime.
pub struct QuoteTask {
    announcer: Arc<QuoteAnnouncer>,
    runtime: Handle,
    shutdown: Option<CancellationToken>,
    handle: Option<JoinHandle<()>>,
}

impl QuoteTask {
    /// Task that will be spawned on `runtime`
    #[must_use]
    pub fn new(announcer: Arc<QuoteAnnouncer>, runtime: Handle) -> Self {
        Self {
            announcer,
            runtime,
            shutdown: None,
            handle: None,
        }
    }

    /// Whether the loop has exited (or never started)
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Cancel and wait for the loop to exit
    pub async fn shutdown(&mut self) {
        SideTask::stop(self);
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!("Quote announcer task ended abnormally: {}", e);
            }
        }
    }
}

impl SideTask for QuoteTask {
    fn name(&self) -> &str {
        "quotes"
    }

    fn start(&mut self, disabled: Arc<AtomicBool>) -> std::result::Result<(), CoreError> {
        if self.handle.is_some() {
            return Err(CoreError::SideTask("quote task already started".to_string()));
        }

        let shutdown = CancellationToken::new();
        let announcer = Arc::clone(&self.announcer);
        let token = shutdown.clone();
        self.handle = Some(
            self.runtime
                .spawn(async move { announcer.run(disabled, token).await }),
        );
        self.shutdown = Some(shutdown);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(shutdown) = &self.shutdown {
            shutdown.cancel();
        }
    }
}
