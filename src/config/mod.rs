// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Application configuration.
//!
//! This module manages the application configuration file.

use std::time::Duration;

use serde::{Deserialize, Serialize};

const CONFIG_NAME: &str = "summarist";

/// Where debounced searches are answered.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Ask the content API, matching the local catalog if that fails.
    Remote,
    /// Only match the local catalog.
    Local,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub version: u32,
    pub api_base_url: String,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
    pub search_debounce_ms: u64,
    pub search_mode: SearchMode,
    pub sample_volume: u8,
    pub summary_volume: u8,
    pub preview_limit_secs: Option<u64>,
    pub log_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            api_base_url: "https://us-central1-summaristt.cloudfunctions.net".to_string(),
            retry_attempts: 3,
            retry_delay_ms: 1000,
            search_debounce_ms: 300,
            search_mode: SearchMode::Remote,
            sample_volume: 100,
            summary_volume: 100,
            preview_limit_secs: None,
            log_dir: ".logs".to_string(),
        }
    }
}

impl AppConfig {
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn preview_limit(&self) -> Option<Duration> {
        self.preview_limit_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

pub fn load_config() -> AppConfig {
    confy::load(CONFIG_NAME, None).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"search_mode": "local", "preview_limit_secs": 30}"#).unwrap();

        assert_eq!(config.search_mode, SearchMode::Local);
        assert_eq!(config.preview_limit(), Some(Duration::from_secs(30)));
        assert_eq!(config.search_debounce(), Duration::from_millis(300));
        assert_eq!(config.retry_attempts, 3);
        assert_eq!(config.summary_volume, 100);
    }

    #[test]
    fn zero_preview_limit_means_unlimited() {
        let config = AppConfig {
            preview_limit_secs: Some(0),
            ..AppConfig::default()
        };

        assert_eq!(config.preview_limit(), None);
    }
}
