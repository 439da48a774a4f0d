//! ampled - amplifier and LED control
//!
//! Reference host: loads configuration, opens the board backend and feeds
//! terminal events from stdin to the plugin.

#![forbid(unsafe_code)]

use ampled_core::{ConfigStore, EventBus, JsonFileStore, Plugin};
use ampled_gpio::open_backend;
use ampled_quotes::{ForismaticSource, LogAnnouncer, QuoteAnnouncer, QuoteTask};
use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod config;
mod host;
mod loader;
mod shutdown;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ampled=info,ampled_core=info,ampled_quotes=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = cli::Cli::parse();
    let mut config = loader::load_config(cli.config.as_deref())?;
    cli.apply(&mut config);

    info!("Starting ampled v{}", env!("CARGO_PKG_VERSION"));

    std::fs::create_dir_all(&config.store.dir).with_context(|| {
        format!(
            "Failed to create settings directory {}",
            config.store.dir.display()
        )
    })?;
    let store: Arc<dyn ConfigStore> = Arc::new(JsonFileStore::new(&config.store.dir));
    let bus = Arc::new(EventBus::default());
    let backend = open_backend(&config.board);

    let mut plugin = Plugin::new(config.plugin.clone(), bus.clone(), store, backend)
        .context("Failed to create GPIO plugin")?;

    let quotes = if config.quotes.enabled {
        let source = ForismaticSource::new(&config.quotes.endpoint, &config.quotes.language)
            .context("Failed to create quote source")?;
        let announcer = Arc::new(QuoteAnnouncer::new(
            Arc::new(source),
            Arc::new(LogAnnouncer),
            config.quotes.interval(),
        ));
        plugin = plugin.with_side_task(Box::new(QuoteTask::new(
            Arc::clone(&announcer),
            tokio::runtime::Handle::current(),
        )));
        Some(announcer)
    } else {
        None
    };

    plugin.start().context("Failed to start GPIO plugin")?;

    let shutdown = CancellationToken::new();
    shutdown::cancel_on_signal(shutdown.clone());

    let mut host = host::Host::new(bus, plugin, quotes);
    let result = host
        .run(BufReader::new(tokio::io::stdin()), shutdown)
        .await;

    host.shutdown()?;
    info!("ampled stopped");
    result
}
