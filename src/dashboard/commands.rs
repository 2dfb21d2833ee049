//! User input commands
//!
//! Line format: `threshold <id|symbol> <value>`, `theme`, `quit`.

use crate::error::{DashboardError, Result};
use crate::types::{find_asset, AssetDefinition};

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardCommand {
    /// Set an alert level; zero clears it
    SetThreshold { id: String, value: f64 },
    ToggleTheme,
    Shutdown,
}

impl DashboardCommand {
    pub fn parse(line: &str, catalog: &[AssetDefinition]) -> Result<Self> {
        let mut parts = line.split_whitespace();
        let verb = parts
            .next()
            .ok_or_else(|| DashboardError::InvalidCommand("empty line".to_string()))?;

        match verb.to_lowercase().as_str() {
            "threshold" | "t" => {
                let key = parts.next().ok_or_else(|| {
                    DashboardError::InvalidCommand("usage: threshold <id|symbol> <value>".into())
                })?;
                let asset = find_asset(catalog, key)
                    .ok_or_else(|| DashboardError::InvalidCommand(format!("unknown asset {}", key)))?;
                let raw = parts.next().unwrap_or("0");
                let value: f64 = raw
                    .parse()
                    .map_err(|_| DashboardError::InvalidCommand(format!("bad value {}", raw)))?;
                if !value.is_finite() || value < 0.0 {
                    return Err(DashboardError::InvalidCommand(format!(
                        "threshold must be a non-negative number, got {}",
                        raw
                    )));
                }
                Ok(DashboardCommand::SetThreshold {
                    id: asset.id.clone(),
                    value,
                })
            }
            "theme" => Ok(DashboardCommand::ToggleTheme),
            "quit" | "exit" | "q" => Ok(DashboardCommand::Shutdown),
            other => Err(DashboardError::InvalidCommand(format!("unknown command {}", other))),
        }
    }
}
