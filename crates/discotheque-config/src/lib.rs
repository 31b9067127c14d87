// SPDX-License-Identifier: GPL-3.0-or-later
use std::path::Path;

use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscogsConfig {
    pub base_url: String,
    /// Personal access token sent as `Authorization: Discogs token=...`.
    pub token: Option<String>,
    /// Overrides the built-in `Discotheque/<version>` user agent.
    pub user_agent: Option<String>,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    pub per_page: u32,
}

impl Default for DiscogsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.discogs.com".to_string(),
            token: None,
            user_agent: None,
            connect_timeout_secs: 30,
            read_timeout_secs: 30,
            per_page: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub discogs: DiscogsConfig,
    pub telemetry: TelemetryConfig,
}

/// Load configuration from defaults, optional TOML file, and environment overrides (prefix: DISCOTHEQUE_).
pub fn load(config_path: Option<&Path>) -> Result<AppConfig> {
    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

    if let Some(path) = config_path {
        figment = figment.merge(Toml::file(path));
    }

    figment = figment.merge(Env::prefixed("DISCOTHEQUE_").split("__"));

    let config: AppConfig = figment.extract()?;
    info!(target: "config", base_url = %config.discogs.base_url, "configuration loaded");
    Ok(config)
}
