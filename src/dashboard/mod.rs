//! Dashboard Module
//!
//! Owns the aggregated asset records, the threshold map and the theme flag,
//! wires the reactive effects between them, and drives everything from a
//! single cooperative event loop.
//!
//! Effects registered at construction:
//! - record list changes → alert monitor (edge-triggered sound)
//! - threshold map changes → persisted to the key-value store
//! - theme changes → persisted to the key-value store

mod commands;
mod types;

pub use commands::DashboardCommand;
pub use types::*;

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc::{Receiver, UnboundedReceiver};
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::aggregator::AssetAggregator;
use crate::alerts::{AlertEvent, AlertMonitor, AlertSound, ThresholdMap};
use crate::config::AppConfig;
use crate::observable::Observable;
use crate::persistence::{self, KeyValueStore};
use crate::stats::{StatsDispatch, StatsReply, StatsWorkerHandle};
use crate::theme::ThemeState;
use crate::types::{AssetDefinition, ExtendedAssetRecord, PriceSnapshot, Theme};

/// Event sources and the worker handle consumed by [`Dashboard::run`]
pub struct DashboardChannels {
    pub snapshots: Receiver<PriceSnapshot>,
    pub stats: StatsWorkerHandle,
    pub replies: UnboundedReceiver<StatsReply>,
    pub commands: Receiver<DashboardCommand>,
}

pub struct Dashboard {
    catalog: Vec<AssetDefinition>,
    aggregator: AssetAggregator,
    thresholds: Observable<ThresholdMap>,
    theme: ThemeState,
    monitor: Rc<RefCell<AlertMonitor>>,
}

impl Dashboard {
    /// Build the dashboard, restoring thresholds and theme from `store`
    pub fn new(
        config: &AppConfig,
        catalog: Vec<AssetDefinition>,
        store: Arc<dyn KeyValueStore>,
        sound: Rc<dyn AlertSound>,
    ) -> Self {
        let thresholds = Observable::new(persistence::load_thresholds(store.as_ref()));
        let theme = ThemeState::new(persistence::load_theme(store.as_ref()));
        let aggregator = AssetAggregator::new(config.stats.window_size);
        let monitor = Rc::new(RefCell::new(AlertMonitor::new(config.alerts.max_recent)));

        {
            let store = Arc::clone(&store);
            thresholds.subscribe(move |map| persistence::save_thresholds(store.as_ref(), map));
        }

        {
            let store = Arc::clone(&store);
            theme.subscribe(move |theme| {
                persistence::save_theme(store.as_ref(), *theme);
                info!(theme = %theme, "🎨 Theme changed");
            });
        }

        {
            let monitor = Rc::clone(&monitor);
            let thresholds = thresholds.clone();
            aggregator.records().subscribe(move |records| {
                let fired = monitor.borrow_mut().check(records, &thresholds.get());
                for event in fired {
                    info!(
                        asset = %event.symbol,
                        price = event.price,
                        threshold = event.threshold,
                        "🔔 Price alert"
                    );
                    if let Err(e) = sound.play(&event) {
                        warn!(asset = %event.symbol, error = %e, "Alert sound skipped");
                    }
                }
            });
        }

        info!(
            assets = catalog.len(),
            thresholds = thresholds.get().len(),
            theme = %theme.get(),
            "📊 Dashboard ready"
        );

        Self {
            catalog,
            aggregator,
            thresholds,
            theme,
            monitor,
        }
    }

    pub fn catalog(&self) -> &[AssetDefinition] {
        &self.catalog
    }

    pub fn records(&self) -> Rc<Vec<ExtendedAssetRecord>> {
        self.aggregator.snapshot()
    }

    pub fn thresholds(&self) -> Rc<ThresholdMap> {
        self.thresholds.get()
    }

    pub fn theme(&self) -> Theme {
        self.theme.get()
    }

    /// Merge a feed tick; statistics requests go to `stats`
    pub fn on_snapshot(&self, snapshot: &PriceSnapshot, stats: &dyn StatsDispatch) {
        self.aggregator.apply_snapshot(snapshot, stats);
    }

    pub fn on_stats(&self, reply: &StatsReply) -> bool {
        self.aggregator.apply_stats(reply)
    }

    /// Set an alert level for one asset. Zero clears it.
    pub fn update_threshold(&self, id: &str, value: f64) {
        self.thresholds.update(|map| map.with(id, value));
        info!(asset = %id, threshold = value, "🎯 Threshold updated");
    }

    pub fn toggle_theme(&self) -> Theme {
        self.theme.toggle()
    }

    pub fn is_alert_active(&self, id: &str) -> bool {
        self.monitor.borrow().is_active(id)
    }

    pub fn recent_alerts(&self) -> Vec<AlertEvent> {
        self.monitor.borrow().recent().cloned().collect()
    }

    pub fn total_alerts(&self) -> u64 {
        self.monitor.borrow().total_fired()
    }

    pub fn cards(&self) -> Vec<CardView> {
        let thresholds = self.thresholds.get();
        self.records()
            .iter()
            .map(|record| CardView::from_record(record, &thresholds))
            .collect()
    }

    pub fn view(&self) -> DashboardView {
        DashboardView {
            theme: self.theme(),
            cards: self.cards(),
            active_alerts: self.monitor.borrow().active_count(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Apply a user command. Returns false when the loop should stop.
    pub fn handle_command(&self, command: DashboardCommand) -> bool {
        match command {
            DashboardCommand::SetThreshold { id, value } => {
                self.update_threshold(&id, value);
                true
            }
            DashboardCommand::ToggleTheme => {
                self.toggle_theme();
                true
            }
            DashboardCommand::Shutdown => false,
        }
    }

    pub fn log_summary(&self) {
        let cards = self.cards();
        if cards.is_empty() {
            return;
        }
        for card in cards {
            info!(
                asset = %card.symbol,
                price = %format!("{:.4}", card.price),
                change_pct = %format!("{:+.3}", card.change_pct),
                moving_avg = %format!("{:.4}", card.moving_average),
                volatility = %format!("{:.4}", card.volatility),
                threshold = ?card.threshold,
                alerting = card.over_threshold,
                "{} {}",
                card.trend.arrow(),
                card.name
            );
        }
    }

    /// Run the event loop until the feed closes or a shutdown command arrives
    pub async fn run(&self, channels: DashboardChannels, summary: Option<Duration>) -> Result<()> {
        let DashboardChannels {
            mut snapshots,
            stats,
            mut replies,
            mut commands,
        } = channels;

        let mut summary_timer = summary.map(|period| {
            let mut timer = tokio::time::interval(period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
            timer
        });
        let mut replies_open = true;
        let mut commands_open = true;
        let mut ticks: u64 = 0;

        info!("▶️ Dashboard event loop started");

        loop {
            tokio::select! {
                snapshot = snapshots.recv() => match snapshot {
                    Some(snapshot) => {
                        ticks += 1;
                        self.on_snapshot(&snapshot, &stats);
                    }
                    None => {
                        info!("Price feed closed");
                        break;
                    }
                },
                reply = replies.recv(), if replies_open => match reply {
                    Some(reply) => {
                        self.on_stats(&reply);
                    }
                    None => {
                        warn!("Stats worker stopped, statistics will no longer update");
                        replies_open = false;
                    }
                },
                command = commands.recv(), if commands_open => match command {
                    Some(command) => {
                        debug!(?command, "Command received");
                        if !self.handle_command(command) {
                            info!("Shutdown requested");
                            break;
                        }
                    }
                    None => {
                        debug!("Command channel closed");
                        commands_open = false;
                    }
                },
                _ = next_summary(&mut summary_timer) => self.log_summary(),
            }
        }

        info!(
            ticks,
            alerts = self.total_alerts(),
            "⏹️ Dashboard event loop stopped"
        );
        Ok(())
    }
}

async fn next_summary(timer: &mut Option<Interval>) {
    match timer {
        Some(timer) => {
            timer.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::{MockAlertSound, SilentSound};
    use crate::error::DashboardError;
    use crate::persistence::{MemoryStore, THEME_KEY, THRESHOLDS_KEY};
    use crate::stats::StatsRequest;
    use crate::types::{default_catalog, PriceData};

    struct NoStats;

    impl StatsDispatch for NoStats {
        fn submit(&self, _request: StatsRequest) {}
    }

    fn btc_tick(price: f64) -> PriceSnapshot {
        let btc = &default_catalog()[0];
        PriceSnapshot {
            ts: 0,
            prices: vec![PriceData::from_definition(btc, price)],
        }
    }

    fn dashboard_with(store: Arc<dyn KeyValueStore>, sound: Rc<dyn AlertSound>) -> Dashboard {
        Dashboard::new(&AppConfig::default(), default_catalog(), store, sound)
    }

    #[test]
    fn alert_sound_plays_once_per_crossing() {
        let mut sound = MockAlertSound::new();
        sound.expect_play().times(2).returning(|_| Ok(()));

        let dashboard = dashboard_with(Arc::new(MemoryStore::new()), Rc::new(sound));
        dashboard.update_threshold("1", 50.0);

        for price in [10.0, 49.0, 50.0, 55.0, 49.0, 51.0] {
            dashboard.on_snapshot(&btc_tick(price), &NoStats);
        }

        assert_eq!(dashboard.total_alerts(), 2);
        assert_eq!(dashboard.recent_alerts().len(), 2);
    }

    #[test]
    fn failing_sound_keeps_alert_state() {
        let mut sound = MockAlertSound::new();
        sound
            .expect_play()
            .times(1)
            .returning(|_| Err(DashboardError::Audio("no device".to_string())));

        let dashboard = dashboard_with(Arc::new(MemoryStore::new()), Rc::new(sound));
        dashboard.update_threshold("1", 100.0);
        dashboard.on_snapshot(&btc_tick(150.0), &NoStats);
        dashboard.on_snapshot(&btc_tick(160.0), &NoStats);

        assert!(dashboard.is_alert_active("1"));
        assert_eq!(dashboard.total_alerts(), 1);
    }

    #[test]
    fn thresholds_are_persisted_on_change_and_restored() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        {
            let dashboard = dashboard_with(Arc::clone(&store), Rc::new(SilentSound));
            dashboard.update_threshold("2", 3100.0);
            dashboard.update_threshold("5", 7.5);
        }
        assert!(store.get(THRESHOLDS_KEY).unwrap().is_some());

        let restored = dashboard_with(store, Rc::new(SilentSound));
        assert_eq!(restored.thresholds().get("2"), Some(3100.0));
        assert_eq!(restored.thresholds().get("5"), Some(7.5));
    }

    #[test]
    fn theme_toggle_persists() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let dashboard = dashboard_with(Arc::clone(&store), Rc::new(SilentSound));
        assert_eq!(dashboard.theme(), Theme::Light);

        assert!(dashboard.handle_command(DashboardCommand::ToggleTheme));
        assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("dark"));

        dashboard.toggle_theme();
        assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("light"));
    }

    #[test]
    fn shutdown_command_stops_loop() {
        let dashboard = dashboard_with(Arc::new(MemoryStore::new()), Rc::new(SilentSound));
        assert!(!dashboard.handle_command(DashboardCommand::Shutdown));
    }

    #[test]
    fn view_lists_cards_in_feed_order() {
        let dashboard = dashboard_with(Arc::new(MemoryStore::new()), Rc::new(SilentSound));
        let catalog = default_catalog();
        let snapshot = PriceSnapshot {
            ts: 0,
            prices: catalog
                .iter()
                .map(|a| PriceData::from_definition(a, a.base_price))
                .collect(),
        };
        dashboard.on_snapshot(&snapshot, &NoStats);

        let view = dashboard.view();
        let symbols: Vec<&str> = view.cards.iter().map(|c| c.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["BTC", "ETH", "SOL", "ADA", "DOT"]);
        assert_eq!(view.active_alerts, 0);
    }
}
