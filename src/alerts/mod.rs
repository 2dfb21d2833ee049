//! Price alerts - per-asset thresholds with edge-triggered notifications
//!
//! An asset is "alerting" while `threshold > 0 && price >= threshold`. The
//! monitor fires once on the transition into that state and re-arms when
//! the price drops back below.

mod sound;

pub use sound::{AlertSound, SilentSound, TerminalBell};

#[cfg(test)]
pub use sound::MockAlertSound;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet, VecDeque};
use uuid::Uuid;

use crate::types::ExtendedAssetRecord;

pub const DEFAULT_MAX_RECENT_ALERTS: usize = 50;

/// User-set alert levels keyed by asset id. Zero or missing means no alert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThresholdMap(BTreeMap<String, f64>);

impl ThresholdMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<f64> {
        self.0.get(id).copied()
    }

    /// Copy with one level changed. Non-finite values clear the entry.
    pub fn with(&self, id: &str, value: f64) -> Self {
        let mut next = self.0.clone();
        if value.is_finite() {
            next.insert(id.to_string(), value);
        } else {
            next.remove(id);
        }
        Self(next)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.0.iter()
    }
}

impl FromIterator<(String, f64)> for ThresholdMap {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().filter(|(_, v)| v.is_finite()).collect())
    }
}

pub fn is_alerting(price: f64, threshold: Option<f64>) -> bool {
    matches!(threshold, Some(t) if t > 0.0 && price >= t)
}

/// One fired alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub alert_id: Uuid,
    pub asset_id: String,
    pub symbol: String,
    pub price: f64,
    pub threshold: f64,
    pub ts: i64,
}

/// Tracks which assets are over threshold and fires on upward crossings
#[derive(Debug)]
pub struct AlertMonitor {
    active: HashSet<String>,
    recent: VecDeque<AlertEvent>,
    max_recent: usize,
    total_fired: u64,
}

impl AlertMonitor {
    pub fn new(max_recent: usize) -> Self {
        Self {
            active: HashSet::new(),
            recent: VecDeque::with_capacity(max_recent),
            max_recent,
            total_fired: 0,
        }
    }

    /// Evaluate every record and return the alerts that fire on this pass
    pub fn check(
        &mut self,
        records: &[ExtendedAssetRecord],
        thresholds: &ThresholdMap,
    ) -> Vec<AlertEvent> {
        let mut fired = Vec::new();

        for record in records {
            let threshold = thresholds.get(&record.id);
            if is_alerting(record.price, threshold) {
                if self.active.insert(record.id.clone()) {
                    let event = AlertEvent {
                        alert_id: Uuid::new_v4(),
                        asset_id: record.id.clone(),
                        symbol: record.symbol.clone(),
                        price: record.price,
                        threshold: threshold.unwrap_or_default(),
                        ts: chrono::Utc::now().timestamp_millis(),
                    };
                    self.remember(event.clone());
                    fired.push(event);
                }
            } else if self.active.remove(&record.id) {
                tracing::debug!(asset = %record.id, price = record.price, "Alert re-armed");
            }
        }

        fired
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.active.contains(id)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Most recent alerts, oldest first
    pub fn recent(&self) -> impl Iterator<Item = &AlertEvent> {
        self.recent.iter()
    }

    pub fn total_fired(&self) -> u64 {
        self.total_fired
    }

    fn remember(&mut self, event: AlertEvent) {
        self.total_fired += 1;
        if self.max_recent == 0 {
            return;
        }
        if self.recent.len() == self.max_recent {
            self.recent.pop_front();
        }
        self.recent.push_back(event);
    }
}

impl Default for AlertMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RECENT_ALERTS)
    }
}
