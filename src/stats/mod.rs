//! Rolling statistics - moving average and volatility per history window
//!
//! The arithmetic itself is a pure function; [`StatsWorker`] runs it on a
//! separate task so the dashboard event loop only ever posts requests and
//! receives replies through channels.

mod worker;

pub use worker::{StatsWorker, StatsWorkerHandle};

use serde::{Deserialize, Serialize};

/// Mean and population standard deviation of a price window
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RollingStats {
    pub mean: f64,
    pub std_dev: f64,
}

/// Compute mean and population standard deviation (divides by N)
pub fn rolling_stats(history: &[f64]) -> RollingStats {
    if history.len() < 2 {
        return RollingStats {
            mean: history.first().copied().unwrap_or(0.0),
            std_dev: 0.0,
        };
    }

    let n = history.len() as f64;
    let mean = history.iter().sum::<f64>() / n;
    let variance = history.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / n;

    RollingStats {
        mean,
        std_dev: variance.sqrt(),
    }
}

/// Request sent to the worker: one asset's current window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsRequest {
    pub id: String,
    pub history: Vec<f64>,
}

/// Worker reply patched back into the asset record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReply {
    pub id: String,
    pub moving_average: f64,
    pub volatility: f64,
}

impl StatsRequest {
    pub fn evaluate(&self) -> StatsReply {
        let stats = rolling_stats(&self.history);
        StatsReply {
            id: self.id.clone(),
            moving_average: stats.mean,
            volatility: stats.std_dev,
        }
    }
}

/// Fire-and-forget submission of statistics work
pub trait StatsDispatch {
    fn submit(&self, request: StatsRequest);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_history_yields_zeroes() {
        assert_eq!(rolling_stats(&[]), RollingStats { mean: 0.0, std_dev: 0.0 });
    }

    #[test]
    fn single_sample_is_its_own_mean() {
        let stats = rolling_stats(&[42.5]);
        assert_eq!(stats.mean, 42.5);
        assert_eq!(stats.std_dev, 0.0);
    }

    #[test]
    fn population_std_dev_of_known_sample() {
        let stats = rolling_stats(&[1.0, 2.0, 3.0, 4.0]);
        assert!((stats.mean - 2.5).abs() < 1e-12);
        assert!((stats.std_dev - 1.25_f64.sqrt()).abs() < 1e-12);
        assert!((stats.std_dev - 1.118).abs() < 1e-3);
    }

    #[test]
    fn constant_window_has_zero_volatility() {
        let stats = rolling_stats(&[7.0; 10]);
        assert_eq!(stats.mean, 7.0);
        assert_eq!(stats.std_dev, 0.0);
    }

    #[test]
    fn divides_by_n_not_n_minus_one() {
        // sample std dev of [2, 4] would be sqrt(2)
        let stats = rolling_stats(&[2.0, 4.0]);
        assert!((stats.std_dev - 1.0).abs() < 1e-12);
    }

    #[test]
    fn reply_uses_boundary_field_names() {
        let reply = StatsRequest {
            id: "1".to_string(),
            history: vec![1.0, 3.0],
        }
        .evaluate();
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["id"], "1");
        assert_eq!(json["movingAverage"], 2.0);
        assert_eq!(json["volatility"], 1.0);
    }
}
