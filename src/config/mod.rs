//! Configuration management for Cryptoboard
//!
//! Loads from optional config files + environment variables via .env

mod types;

pub use types::*;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub feed: FeedConfig,
    pub stats: StatsConfig,
    pub alerts: AlertsConfig,
    pub persistence: PersistenceConfig,
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Tick interval in milliseconds
    pub interval_ms: u64,
    /// Total relative noise band (0.02 = ±1%)
    pub noise: f64,
    /// Fixed RNG seed for reproducible runs
    #[serde(default)]
    pub seed: Option<u64>,
    /// Snapshot channel capacity
    pub channel_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatsConfig {
    /// Number of recent prices kept per asset
    pub window_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlertsConfig {
    /// Ring the terminal bell when an alert fires
    pub sound_enabled: bool,
    /// How many fired alerts to keep for display
    pub max_recent: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PersistenceConfig {
    /// JSON file backing the key-value store; empty keeps state in memory
    pub store_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    /// Card summary log interval in seconds (0 disables)
    pub summary_interval_secs: u64,
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config::builder()
            // Feed defaults
            .set_default("feed.interval_ms", 200)?
            .set_default("feed.noise", 0.02)?
            .set_default("feed.channel_capacity", 64)?
            // Stats defaults
            .set_default("stats.window_size", 10)?
            // Alert defaults
            .set_default("alerts.sound_enabled", true)?
            .set_default("alerts.max_recent", 50)?
            // Persistence defaults
            .set_default("persistence.store_path", "./data/dashboard-state.json")?
            // Dashboard defaults
            .set_default("dashboard.summary_interval_secs", 5)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Override with environment variables (CRYPTOBOARD__FEED__INTERVAL_MS=...)
            .add_source(Environment::with_prefix("CRYPTOBOARD").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        let app_config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        Ok(app_config)
    }

    pub fn feed_interval(&self) -> Duration {
        Duration::from_millis(self.feed.interval_ms.max(1))
    }

    pub fn summary_interval(&self) -> Option<Duration> {
        match self.dashboard.summary_interval_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// One-line digest for startup logging
    pub fn digest(&self) -> String {
        format!(
            "interval={}ms noise={} window={} sound={} store={}",
            self.feed.interval_ms,
            self.feed.noise,
            self.stats.window_size,
            self.alerts.sound_enabled,
            if self.persistence.store_path.is_empty() {
                "<memory>"
            } else {
                self.persistence.store_path.as_str()
            }
        )
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            feed: FeedConfig {
                interval_ms: 200,
                noise: 0.02,
                seed: None,
                channel_capacity: 64,
            },
            stats: StatsConfig { window_size: 10 },
            alerts: AlertsConfig {
                sound_enabled: true,
                max_recent: 50,
            },
            persistence: PersistenceConfig {
                store_path: "./data/dashboard-state.json".to_string(),
            },
            dashboard: DashboardConfig {
                summary_interval_secs: 5,
            },
        }
    }
}

impl std::fmt::Display for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.digest())
    }
}
