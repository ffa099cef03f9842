//! Application configuration loaded from an optional JSON file

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use grid_core::{PageStyle, TableConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// CSV file with household records; generated fixtures when absent
    pub households_csv: Option<PathBuf>,
    /// Simulated backend latency in milliseconds
    pub latency_ms: u64,
    pub households: TableConfig,
    pub tickets: TableConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            households_csv: None,
            latency_ms: 350,
            households: TableConfig::new("allHouseholds")
                .with_title("Households")
                .selectable(true),
            tickets: TableConfig {
                page_style: PageStyle::PagePageSize,
                ..TableConfig::new("grievanceTickets")
                    .with_title("Grievance tickets")
                    .with_page_size(15)
            },
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = AppConfig::from_json(
            r#"{ "latency_ms": 0, "households": { "queried_object_name": "households", "page_size": 20 } }"#,
        )
        .unwrap();

        assert_eq!(config.latency_ms, 0);
        assert_eq!(config.households.page_size, 20);
        assert_eq!(config.households.queried_object_name, "households");
        assert_eq!(config.households.title, None);
        assert_eq!(config.tickets.page_style, PageStyle::PagePageSize);
        assert_eq!(config.tickets.page_size, 15);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(AppConfig::load(Path::new("/nonexistent/casegrid.json")).is_err());
    }
}
