//! Dashboard view types
//!
//! Card view models derived from the aggregated asset records.

use serde::{Deserialize, Serialize};

use crate::alerts::{is_alerting, ThresholdMap};
use crate::types::{ExtendedAssetRecord, Theme};

// ─────────────────────────────────────────────────────────────────
// Cards
// ─────────────────────────────────────────────────────────────────

/// Direction of the visible history window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    /// Fewer than two samples
    Flat,
}

impl Trend {
    /// Compare the latest price with the oldest one still in the window
    pub fn of(record: &ExtendedAssetRecord) -> Self {
        if record.history.len() < 2 {
            return Trend::Flat;
        }
        match record.history.front() {
            Some(&first) if record.price >= first => Trend::Up,
            Some(_) => Trend::Down,
            None => Trend::Flat,
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            Trend::Up => "▲",
            Trend::Down => "▼",
            Trend::Flat => "•",
        }
    }
}

/// Per-asset card as the presentation layer shows it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardView {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub image: String,
    pub price: f64,
    pub previous_price: f64,
    pub change_pct: f64,
    pub moving_average: f64,
    pub volatility: f64,
    pub threshold: Option<f64>,
    pub over_threshold: bool,
    pub trend: Trend,
}

impl CardView {
    pub fn from_record(record: &ExtendedAssetRecord, thresholds: &ThresholdMap) -> Self {
        let threshold = thresholds.get(&record.id);
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            symbol: record.symbol.clone(),
            image: record.image.clone(),
            price: record.price,
            previous_price: record.previous_price,
            change_pct: change_pct(record.price, record.previous_price),
            moving_average: record.moving_average,
            volatility: record.volatility,
            threshold,
            over_threshold: is_alerting(record.price, threshold),
            trend: Trend::of(record),
        }
    }
}

/// Tick-over-tick change in percent; zero when there is no usable previous price
pub fn change_pct(price: f64, previous: f64) -> f64 {
    if previous == 0.0 || !previous.is_finite() {
        return 0.0;
    }
    (price - previous) / previous * 100.0
}

// ─────────────────────────────────────────────────────────────────
// Full view
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub theme: Theme,
    pub cards: Vec<CardView>,
    pub active_alerts: usize,
    pub timestamp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    fn record(price: f64, previous: f64, history: &[f64]) -> ExtendedAssetRecord {
        ExtendedAssetRecord {
            id: "1".to_string(),
            name: "Bitcoin".to_string(),
            symbol: "BTC".to_string(),
            image: String::new(),
            price,
            previous_price: previous,
            history: history.iter().copied().collect::<VecDeque<f64>>(),
            moving_average: price,
            volatility: 0.0,
        }
    }

    #[test]
    fn change_pct_handles_zero_previous() {
        assert_eq!(change_pct(10.0, 0.0), 0.0);
        assert!((change_pct(110.0, 100.0) - 10.0).abs() < 1e-9);
        assert!((change_pct(90.0, 100.0) + 10.0).abs() < 1e-9);
    }

    #[test]
    fn trend_compares_first_sample_with_price() {
        assert_eq!(Trend::of(&record(5.0, 5.0, &[5.0])), Trend::Flat);
        assert_eq!(Trend::of(&record(6.0, 5.0, &[4.0, 5.0, 6.0])), Trend::Up);
        assert_eq!(Trend::of(&record(4.0, 4.0, &[4.0, 4.0])), Trend::Up);
        assert_eq!(Trend::of(&record(3.0, 5.0, &[4.0, 5.0, 3.0])), Trend::Down);
    }

    #[test]
    fn card_reflects_threshold_state() {
        let thresholds = ThresholdMap::new().with("1", 100.0);
        let card = CardView::from_record(&record(101.0, 99.0, &[99.0, 101.0]), &thresholds);
        assert!(card.over_threshold);
        assert_eq!(card.threshold, Some(100.0));

        let card = CardView::from_record(&record(101.0, 99.0, &[99.0, 101.0]), &ThresholdMap::new());
        assert!(!card.over_threshold);
        assert_eq!(card.threshold, None);
    }
}
