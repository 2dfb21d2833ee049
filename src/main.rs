//! Cryptoboard - headless price dashboard
//!
//! Usage: cargo run (commands on stdin: `threshold BTC 45100`, `theme`, `quit`)

use std::rc::Rc;
use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cryptoboard::alerts::{AlertSound, SilentSound, TerminalBell};
use cryptoboard::config::AppConfig;
use cryptoboard::dashboard::{Dashboard, DashboardChannels, DashboardCommand};
use cryptoboard::feed::{spawn_feed, SyntheticFeed};
use cryptoboard::persistence::{JsonFileStore, KeyValueStore, MemoryStore};
use cryptoboard::stats::StatsWorker;
use cryptoboard::types::{default_catalog, AssetDefinition};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load()?;
    info!("🚀 Starting Cryptoboard ({})", config.digest());

    let catalog = default_catalog();

    let store: Arc<dyn KeyValueStore> = if config.persistence.store_path.is_empty() {
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(JsonFileStore::new(&config.persistence.store_path))
    };

    let sound: Rc<dyn AlertSound> = if config.alerts.sound_enabled {
        Rc::new(TerminalBell)
    } else {
        Rc::new(SilentSound)
    };

    let dashboard = Dashboard::new(&config, catalog.clone(), store, sound);

    let mut feed = SyntheticFeed::new(catalog.clone(), config.feed_interval()).with_noise(config.feed.noise);
    if let Some(seed) = config.feed.seed {
        feed = feed.with_seed(seed);
    }
    let (snapshots, feed_task) = spawn_feed(feed, config.feed.channel_capacity.max(1));
    let (stats, replies, stats_task) = StatsWorker::spawn();

    let (command_tx, commands) = mpsc::channel(16);
    spawn_stdin_commands(catalog, command_tx.clone());
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = command_tx.send(DashboardCommand::Shutdown).await;
        }
    });

    let channels = DashboardChannels {
        snapshots,
        stats,
        replies,
        commands,
    };
    dashboard.run(channels, config.summary_interval()).await?;

    feed_task.abort();
    stats_task.abort();

    info!("Shutdown complete");
    Ok(())
}

/// Forward parsed stdin lines to the dashboard loop
fn spawn_stdin_commands(catalog: Vec<AssetDefinition>, tx: mpsc::Sender<DashboardCommand>) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) if line.trim().is_empty() => continue,
                Ok(Some(line)) => match DashboardCommand::parse(&line, &catalog) {
                    Ok(command) => {
                        if tx.send(command).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!(input = %line.trim(), error = %e, "Ignoring command"),
                },
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "Failed to read stdin");
                    break;
                }
            }
        }
    });
}
