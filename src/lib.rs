//! Cryptoboard Library
//!
//! Simulated crypto price dashboard: synthetic feed, off-loop rolling
//! statistics, and edge-triggered price alerts with persisted thresholds.

pub mod aggregator;
pub mod alerts;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod feed;
pub mod observable;
pub mod persistence;
pub mod stats;
pub mod theme;
pub mod types;
