use std::fs;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::log;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    #[serde(default="default_port")]
    pub port: u16,

    #[serde(default="default_base_url")]
    pub base_url: String,

    #[serde(default="default_max_matches")]
    pub max_matches: usize,

    #[serde(default="default_list_poll_s")]
    pub list_poll_s: u64,
    #[serde(default="default_detail_poll_s")]
    pub detail_poll_s: u64,

    #[serde(default="default_list_timeout_s")]
    pub list_timeout_s: u64,
    #[serde(default="default_detail_timeout_s")]
    pub detail_timeout_s: u64,

    #[serde(default="default_event_rate_limit_ms")]
    pub event_rate_limit_ms: u64,

    #[serde(default="default_max_processed_deliveries")]
    pub max_processed_deliveries: usize,
}

fn default_port() -> u16 {
    8000
}

fn default_base_url() -> String {
    "https://www.cricbuzz.com".to_string()
}

fn default_max_matches() -> usize {
    10
}

fn default_list_poll_s() -> u64 {
    120
}

fn default_detail_poll_s() -> u64 {
    5
}

fn default_list_timeout_s() -> u64 {
    20
}

fn default_detail_timeout_s() -> u64 {
    15
}

fn default_event_rate_limit_ms() -> u64 {
    2000
}

fn default_max_processed_deliveries() -> usize {
    100
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: default_port(),
            base_url: default_base_url(),
            max_matches: default_max_matches(),
            list_poll_s: default_list_poll_s(),
            detail_poll_s: default_detail_poll_s(),
            list_timeout_s: default_list_timeout_s(),
            detail_timeout_s: default_detail_timeout_s(),
            event_rate_limit_ms: default_event_rate_limit_ms(),
            max_processed_deliveries: default_max_processed_deliveries(),
        }
    }
}

impl Config {
    pub fn homepage_url(&self) -> String {
        format!("{}/", self.base_url.trim_end_matches('/'))
    }

    pub fn list_poll(&self) -> Duration {
        Duration::from_secs(self.list_poll_s)
    }

    pub fn detail_poll(&self) -> Duration {
        Duration::from_secs(self.detail_poll_s)
    }

    pub fn list_timeout(&self) -> Duration {
        Duration::from_secs(self.list_timeout_s)
    }

    pub fn detail_timeout(&self) -> Duration {
        Duration::from_secs(self.detail_timeout_s)
    }
}

pub fn get_config() -> anyhow::Result<Config> {
    let mut result = match std::env::var("CONFIG_PATH").ok() {
        Some(path) => {
            let data = fs::read_to_string(&path)
                .with_context(|| format!("Unable to read config at {path}"))?;
            serde_json::from_str::<Config>(&data)
                .with_context(|| format!("Could not parse JSON at {path}"))?
        },
        None => Config::default(),
    };
    if let Ok(base_url) = std::env::var("BASE_URL") {
        result.base_url = base_url;
        log::info!("[CONFIG] BASE_URL {}", result.base_url);
    }
    log::info!("[CONFIG] {:?}", result);
    Ok(result)
}
