//! Synthetic price feed
//!
//! Every tick re-draws each asset's price as `base * (1 + U * noise)` with
//! `U` uniform on [-0.5, 0.5). Ticks are independent, prices never drift.

use anyhow::Result;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tokio::sync::mpsc::Sender;

use crate::error::DashboardError;
use crate::feed::PriceFeed;
use crate::types::{AssetDefinition, PriceData, PriceSnapshot};

pub const DEFAULT_INTERVAL_MS: u64 = 200;
pub const DEFAULT_NOISE: f64 = 0.02;

pub struct SyntheticFeed {
    assets: Vec<AssetDefinition>,
    interval: Duration,
    noise: f64,
    rng: StdRng,
    finished: bool,
    ticks: u64,
}

impl SyntheticFeed {
    pub fn new(assets: Vec<AssetDefinition>, interval: Duration) -> Self {
        Self {
            assets,
            interval,
            noise: DEFAULT_NOISE,
            rng: StdRng::from_entropy(),
            finished: false,
            ticks: 0,
        }
    }

    pub fn with_noise(mut self, noise: f64) -> Self {
        self.noise = noise;
        self
    }

    /// Deterministic prices for replay and tests
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// `u` is expected in [-0.5, 0.5)
    pub fn perturb(base_price: f64, u: f64, noise: f64) -> f64 {
        base_price * (1.0 + u * noise)
    }

    /// Draw one snapshot for every asset in the catalog
    pub fn next_snapshot(&mut self) -> PriceSnapshot {
        let noise = self.noise;
        let prices = self
            .assets
            .iter()
            .map(|asset| {
                let u: f64 = self.rng.gen::<f64>() - 0.5;
                PriceData::from_definition(asset, Self::perturb(asset.base_price, u, noise))
            })
            .collect();
        self.ticks += 1;
        PriceSnapshot::new(prices)
    }
}

#[async_trait]
impl PriceFeed for SyntheticFeed {
    fn name(&self) -> &'static str {
        "Synthetic"
    }

    async fn run(&mut self, tx: Sender<PriceSnapshot>) -> Result<()> {
        if self.finished {
            return Err(DashboardError::FeedExhausted.into());
        }

        tracing::info!(
            feed = self.name(),
            assets = self.assets.len(),
            interval_ms = self.interval.as_millis() as u64,
            "📡 Synthetic price feed started"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // interval fires immediately; the first snapshot is due one period in
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let snapshot = self.next_snapshot();
            if tx.send(snapshot).await.is_err() {
                break;
            }
        }

        self.finished = true;
        tracing::info!(feed = self.name(), ticks = self.ticks, "Subscriber detached, feed stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{snapshot_stream, spawn_feed};
    use crate::types::default_catalog;
    use futures_util::StreamExt;
    use tokio::sync::mpsc;

    #[test]
    fn perturb_bounds() {
        assert_eq!(SyntheticFeed::perturb(100.0, 0.0, 0.02), 100.0);
        assert!((SyntheticFeed::perturb(100.0, -0.5, 0.02) - 99.0).abs() < 1e-9);
        assert!((SyntheticFeed::perturb(100.0, 0.5, 0.02) - 101.0).abs() < 1e-9);
    }

    #[test]
    fn snapshot_covers_every_asset_within_one_percent() {
        let catalog = default_catalog();
        let mut feed = SyntheticFeed::new(catalog.clone(), Duration::from_millis(200)).with_seed(7);

        for _ in 0..200 {
            let snapshot = feed.next_snapshot();
            assert_eq!(snapshot.prices.len(), catalog.len());
            for (price, asset) in snapshot.prices.iter().zip(&catalog) {
                assert_eq!(price.id, asset.id);
                let lo = asset.base_price * 0.99;
                let hi = asset.base_price * 1.01;
                assert!(price.price >= lo && price.price < hi, "{} out of range", price.price);
            }
        }
        assert_eq!(feed.ticks(), 200);
    }

    #[test]
    fn same_seed_same_prices() {
        let catalog = default_catalog();
        let mut a = SyntheticFeed::new(catalog.clone(), Duration::from_millis(200)).with_seed(42);
        let mut b = SyntheticFeed::new(catalog, Duration::from_millis(200)).with_seed(42);
        let pa: Vec<f64> = a.next_snapshot().prices.iter().map(|p| p.price).collect();
        let pb: Vec<f64> = b.next_snapshot().prices.iter().map(|p| p.price).collect();
        assert_eq!(pa, pb);
    }

    #[tokio::test(start_paused = true)]
    async fn run_stops_when_receiver_dropped_and_cannot_restart() {
        let mut feed = SyntheticFeed::new(default_catalog(), Duration::from_millis(200));
        let (tx, mut rx) = mpsc::channel(1);

        let consumer = tokio::spawn(async move {
            let first = rx.recv().await;
            drop(rx);
            first
        });

        feed.run(tx).await.expect("feed should stop cleanly");
        let first = consumer.await.unwrap().expect("one snapshot delivered");
        assert_eq!(first.prices.len(), 5);

        let (tx, _rx) = mpsc::channel(1);
        let err = feed.run(tx).await.expect_err("finished feed must not restart");
        assert!(err.to_string().contains("already ran"));
    }

    #[tokio::test(start_paused = true)]
    async fn stream_yields_snapshots() {
        let feed = SyntheticFeed::new(default_catalog(), Duration::from_millis(200)).with_seed(1);
        let snapshots: Vec<_> = snapshot_stream(feed, 4).take(3).collect().await;
        assert_eq!(snapshots.len(), 3);
        assert!(snapshots.iter().all(|s| s.prices.len() == 5));
    }

    #[tokio::test(start_paused = true)]
    async fn spawned_feed_exits_after_receiver_drop() {
        let feed = SyntheticFeed::new(default_catalog(), Duration::from_millis(200));
        let (mut rx, handle) = spawn_feed(feed, 1);
        assert!(rx.recv().await.is_some());
        drop(rx);
        handle.await.expect("feed task should finish");
    }
}
