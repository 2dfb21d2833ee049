//! Core types used throughout Cryptoboard
//!
//! Defines the asset catalog, per-tick price snapshots and the extended
//! per-asset records the dashboard renders from.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Immutable catalog entry for a tracked asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetDefinition {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub base_price: f64,
    pub image: String,
}

impl AssetDefinition {
    pub fn new(id: &str, name: &str, symbol: &str, base_price: f64, image: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            symbol: symbol.to_string(),
            base_price,
            image: image.to_string(),
        }
    }
}

/// Built-in asset catalog
pub fn default_catalog() -> Vec<AssetDefinition> {
    vec![
        AssetDefinition::new(
            "1",
            "Bitcoin",
            "BTC",
            45000.0,
            "https://cryptologos.cc/logos/bitcoin-btc-logo.png",
        ),
        AssetDefinition::new(
            "2",
            "Ethereum",
            "ETH",
            3000.0,
            "https://cryptologos.cc/logos/ethereum-eth-logo.png",
        ),
        AssetDefinition::new(
            "3",
            "Solana",
            "SOL",
            100.0,
            "https://cryptologos.cc/logos/solana-sol-logo.png",
        ),
        AssetDefinition::new(
            "4",
            "Cardano",
            "ADA",
            0.5,
            "https://cryptologos.cc/logos/cardano-ada-logo.png",
        ),
        AssetDefinition::new(
            "5",
            "Polkadot",
            "DOT",
            7.0,
            "https://cryptologos.cc/logos/polkadot-new-dot-logo.png",
        ),
    ]
}

/// Resolve an asset by id or ticker symbol (case-insensitive for symbols)
pub fn find_asset<'a>(catalog: &'a [AssetDefinition], key: &str) -> Option<&'a AssetDefinition> {
    catalog
        .iter()
        .find(|a| a.id == key || a.symbol.eq_ignore_ascii_case(key))
}

/// One asset's instantaneous price within a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceData {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub image: String,
    pub price: f64,
}

impl PriceData {
    pub fn from_definition(asset: &AssetDefinition, price: f64) -> Self {
        Self {
            id: asset.id.clone(),
            name: asset.name.clone(),
            symbol: asset.symbol.clone(),
            image: asset.image.clone(),
            price,
        }
    }
}

/// Full set of per-asset prices for one feed tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    /// Epoch millis when the tick was generated
    pub ts: i64,
    pub prices: Vec<PriceData>,
}

impl PriceSnapshot {
    pub fn new(prices: Vec<PriceData>) -> Self {
        Self {
            ts: chrono::Utc::now().timestamp_millis(),
            prices,
        }
    }
}

/// Per-asset state kept across ticks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedAssetRecord {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub image: String,
    pub price: f64,
    pub previous_price: f64,
    /// Most recent prices, oldest first
    pub history: VecDeque<f64>,
    pub moving_average: f64,
    pub volatility: f64,
}

impl ExtendedAssetRecord {
    /// First observation of an asset: statistics default to the price itself
    pub fn first_seen(price: &PriceData) -> Self {
        Self {
            id: price.id.clone(),
            name: price.name.clone(),
            symbol: price.symbol.clone(),
            image: price.image.clone(),
            price: price.price,
            previous_price: price.price,
            history: VecDeque::from(vec![price.price]),
            moving_average: price.price,
            volatility: 0.0,
        }
    }
}

/// UI colour scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Default for Theme {
    fn default() -> Self {
        Theme::Light
    }
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Anything other than "dark" is treated as light
    pub fn from_stored(s: &str) -> Self {
        if s.trim() == "dark" {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_five_unique_assets() {
        let catalog = default_catalog();
        assert_eq!(catalog.len(), 5);
        let mut ids: Vec<&str> = catalog.iter().map(|a| a.id.as_str()).collect();
        ids.dedup();
        assert_eq!(ids, vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn find_asset_matches_id_or_symbol() {
        let catalog = default_catalog();
        assert_eq!(find_asset(&catalog, "2").map(|a| a.symbol.as_str()), Some("ETH"));
        assert_eq!(find_asset(&catalog, "sol").map(|a| a.id.as_str()), Some("3"));
        assert!(find_asset(&catalog, "DOGE").is_none());
    }

    #[test]
    fn theme_parsing_defaults_to_light() {
        assert_eq!(Theme::from_stored("dark"), Theme::Dark);
        assert_eq!(Theme::from_stored("light"), Theme::Light);
        assert_eq!(Theme::from_stored("garbage"), Theme::Light);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
    }

    #[test]
    fn record_serializes_with_camel_case_fields() {
        let price = PriceData::from_definition(&default_catalog()[0], 45000.0);
        let record = ExtendedAssetRecord::first_seen(&price);
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("previousPrice").is_some());
        assert!(json.get("movingAverage").is_some());
        assert_eq!(json["history"].as_array().map(|h| h.len()), Some(1));
    }
}
