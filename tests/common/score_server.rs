use std::process::{Command, Child};

use assert_cmd::prelude::CommandCargoExt;
use cricket_score_rs::{config_handler::Config, models::{MatchDetail, MatchSummary}};
use predicates::{function::FnPredicate, Predicate};
use serde_json::json;

/// The built binary, configured against an `ExternalServer`.
pub struct ScoreServer {
    port: u16,
    child_process: Option<Child>,
}

impl Drop for ScoreServer {
    fn drop(&mut self) {
        if let Some(child) = self.child_process.as_mut() {
            child.kill().expect("Should kill");
        }
    }
}

impl ScoreServer {
    pub fn new(port: u16) -> ScoreServer {
        ScoreServer { port, child_process: None }
    }

    pub fn start(&mut self, path: &str, external_url: &str) {
        let config = Config {
            port: self.port,
            base_url: external_url.to_string(),
            list_poll_s: 1,
            detail_poll_s: 1,
            list_timeout_s: 2,
            detail_timeout_s: 2,
            ..Default::default()
        };

        let config_str = serde_json::to_string(&config).unwrap();
        let config_path = format!("{path}/config.json");
        std::fs::write(config_path.clone(), config_str).unwrap();
        let child_process = Command::cargo_bin("cricket-score-rs")
            .unwrap()
            .env("CONFIG_PATH", config_path)
            .env_remove("BASE_URL")
            .spawn()
            .expect("should start");

        self.child_process = Some(child_process);
    }

    pub async fn get_matches(&self) -> Result<Vec<MatchSummary>, Box<dyn std::error::Error>> {
        Ok(reqwest::get(format!("http://localhost:{}/matches", self.port))
            .await?.json().await?)
    }

    pub async fn get_match(&self, url: &str) -> Result<Option<MatchDetail>, Box<dyn std::error::Error>> {
        Ok(reqwest::Client::new()
            .get(format!("http://localhost:{}/match", self.port))
            .query(&[("url", url)])
            .send()
            .await?.json().await?)
    }

    pub async fn select(&self, url: Option<&str>) -> Result<Option<MatchDetail>, Box<dyn std::error::Error>> {
        Ok(reqwest::Client::new()
            .post(format!("http://localhost:{}/select", self.port))
            .json(&json!({ "url": url }))
            .send()
            .await?.json().await?)
    }

    pub async fn retry_until_matches<F>(&self, predicate: FnPredicate<F, Vec<MatchSummary>>, retry_ms: u64) -> Vec<MatchSummary>
    where
        F: Fn(&Vec<MatchSummary>) -> bool,
    {
        let mut nr_loops = 0;
        loop {
            if let Ok(matches) = self.get_matches().await {
                if predicate.eval(&matches) {
                    return matches;
                }
            }
            tokio::time::sleep(std::time::Duration::from_millis(retry_ms)).await;
            nr_loops += 1;
            if nr_loops > 50 {
                panic!("retry failed");
            }
        }
    }
}
