//! Asset State Aggregator - merges feed snapshots into per-asset records
//!
//! Each snapshot rebuilds the whole record list and publishes it in one
//! `set`, so observers never see a half-applied tick. Moving average and
//! volatility are carried over until the stats worker answers for that id.

use std::collections::VecDeque;
use std::rc::Rc;

use crate::observable::Observable;
use crate::stats::{StatsDispatch, StatsReply, StatsRequest};
use crate::types::{ExtendedAssetRecord, PriceSnapshot};

pub const DEFAULT_WINDOW_SIZE: usize = 10;

/// Minimum history length before statistics are requested
const MIN_STATS_SAMPLES: usize = 2;

pub struct AssetAggregator {
    records: Observable<Vec<ExtendedAssetRecord>>,
    window_size: usize,
}

impl AssetAggregator {
    pub fn new(window_size: usize) -> Self {
        Self {
            records: Observable::new(Vec::new()),
            window_size: window_size.max(1),
        }
    }

    /// Observable record list for effects and presentation
    pub fn records(&self) -> &Observable<Vec<ExtendedAssetRecord>> {
        &self.records
    }

    pub fn snapshot(&self) -> Rc<Vec<ExtendedAssetRecord>> {
        self.records.get()
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Merge one feed tick and post history windows to the worker
    pub fn apply_snapshot(&self, snapshot: &PriceSnapshot, stats: &dyn StatsDispatch) {
        let current = self.records.get();

        let updated: Vec<ExtendedAssetRecord> = snapshot
            .prices
            .iter()
            .map(|price| {
                let prior = current.iter().find(|r| r.id == price.id);

                let mut history: VecDeque<f64> = prior
                    .map(|r| r.history.clone())
                    .unwrap_or_else(|| VecDeque::with_capacity(self.window_size));
                history.push_back(price.price);
                while history.len() > self.window_size {
                    history.pop_front();
                }

                if history.len() >= MIN_STATS_SAMPLES {
                    stats.submit(StatsRequest {
                        id: price.id.clone(),
                        history: history.iter().copied().collect(),
                    });
                }

                match prior {
                    Some(r) => ExtendedAssetRecord {
                        id: price.id.clone(),
                        name: price.name.clone(),
                        symbol: price.symbol.clone(),
                        image: price.image.clone(),
                        price: price.price,
                        previous_price: r.price,
                        history,
                        moving_average: r.moving_average,
                        volatility: r.volatility,
                    },
                    None => ExtendedAssetRecord {
                        history,
                        ..ExtendedAssetRecord::first_seen(price)
                    },
                }
            })
            .collect();

        self.records.set(updated);
    }

    /// Patch statistics for one asset. Returns false when the id is unknown.
    pub fn apply_stats(&self, reply: &StatsReply) -> bool {
        let current = self.records.get();
        if !current.iter().any(|r| r.id == reply.id) {
            tracing::debug!(asset = %reply.id, "Stats reply for untracked asset ignored");
            return false;
        }

        let patched = current
            .iter()
            .map(|r| {
                if r.id == reply.id {
                    ExtendedAssetRecord {
                        moving_average: reply.moving_average,
                        volatility: reply.volatility,
                        ..r.clone()
                    }
                } else {
                    r.clone()
                }
            })
            .collect();

        self.records.set(patched);
        true
    }
}

impl Default for AssetAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_SIZE)
    }
}
