use std::time::{Duration, Instant};

use anyhow::Context;
use reqwest::Client;
use reqwest::header::{ACCEPT_LANGUAGE, REFERER, USER_AGENT};
use tracing::log;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
const BROWSER_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";
pub const SEARCH_REFERER: &str = "https://www.google.com/";

pub async fn get_html(client: &Client, url: &str, referer: &str, timeout: Duration) -> anyhow::Result<String> {
    let before = Instant::now();
    let rsp = client.get(url)
        .header(USER_AGENT, BROWSER_USER_AGENT)
        .header(ACCEPT_LANGUAGE, BROWSER_ACCEPT_LANGUAGE)
        .header(REFERER, referer)
        .timeout(timeout)
        .send().await
        .with_context(|| format!("GET {url}"))?
        .error_for_status()?;
    let body = rsp.text().await
        .with_context(|| format!("Read body {url}"))?;
    log::info!("[REST] Call {url} {:.2?}", before.elapsed());
    Ok(body)
}
