//! Configuration system for the relay endpoint and read-side defaults

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file looked up in the current directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "sheetfit.toml";

/// Environment variable overriding `relay.url`
pub const RELAY_URL_ENV: &str = "SHEETFIT_RELAY_URL";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SheetfitConfig {
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub weight: WeightConfig,
    #[serde(default)]
    pub overview: OverviewConfig,
    #[serde(default)]
    pub log: LogTabConfig,
}

impl SheetfitConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: SheetfitConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Explicit path, else `sheetfit.toml` if present, else defaults;
    /// then the environment override.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(config_path) = path {
            Self::from_file(config_path)
                .with_context(|| format!("Failed to load config from {}", config_path.display()))?
        } else {
            let default_config_path = PathBuf::from(DEFAULT_CONFIG_FILE);
            if default_config_path.exists() {
                Self::from_file(&default_config_path).with_context(|| {
                    format!(
                        "Failed to load config from {}",
                        default_config_path.display()
                    )
                })?
            } else {
                Self::default()
            }
        };

        config.apply_relay_url_override(std::env::var(RELAY_URL_ENV).ok());
        Ok(config)
    }

    /// Replace the relay URL with a non-blank override
    pub fn apply_relay_url_override(&mut self, url: Option<String>) {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.relay.url = url.trim().to_string();
        }
    }

    /// Check the settings every relay call depends on
    pub fn validate(&self) -> Result<()> {
        let url = self.relay.url.trim();
        if url.is_empty() || url.starts_with("PASTE_") {
            anyhow::bail!(
                "Configuration error: relay.url is not set (use {} or the {} variable)",
                DEFAULT_CONFIG_FILE,
                RELAY_URL_ENV
            );
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            anyhow::bail!("Configuration error: relay.url '{}' is not an http(s) URL", url);
        }
        if self.overview.limit == 0 {
            anyhow::bail!("Configuration error: overview.limit must be at least 1");
        }
        if self.log.tab.trim().is_empty() {
            anyhow::bail!("Configuration error: log.tab must name the exercise log tab");
        }
        Ok(())
    }
}

/// Relay endpoint settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default)]
    pub url: String,
    /// Client-side timeout; absent means none
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

impl RelayConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

/// Defaults for weight entries
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeightConfig {
    #[serde(default)]
    pub user: String,
}

/// Defaults for overview reads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverviewConfig {
    #[serde(default = "default_overview_limit")]
    pub limit: u32,
}

impl Default for OverviewConfig {
    fn default() -> Self {
        Self {
            limit: default_overview_limit(),
        }
    }
}

fn default_overview_limit() -> u32 {
    8
}

/// Where `exercise_batch` rows land
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogTabConfig {
    #[serde(default = "default_log_tab")]
    pub tab: String,
    #[serde(default = "default_log_range")]
    pub range: String,
    #[serde(default = "default_header_row")]
    pub header_row: bool,
}

impl Default for LogTabConfig {
    fn default() -> Self {
        Self {
            tab: default_log_tab(),
            range: default_log_range(),
            header_row: default_header_row(),
        }
    }
}

fn default_log_tab() -> String {
    "Exercise Log".to_string()
}

fn default_log_range() -> String {
    "A1:L".to_string()
}

fn default_header_row() -> bool {
    true
}
