use std::collections::HashSet;
use std::time::Duration;

use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::log;

use crate::config_handler::Config;
use crate::html::{css, select_all, text_of, truncate};
use crate::models::MatchSummary;
use crate::text_normalizer::normalize_title;
use crate::{rest_client, LogResult};

const MAX_TEXT_LEN: usize = 100;

const MATCH_LINK_PREFIX: &str = "/live-cricket-scores/";

lazy_static! {
    static ref MATCH_LINK: Selector = css(r#"a[href^="/live-cricket-scores/"]"#);

    static ref CONTAINER_SELECTORS: Vec<(&'static str, Selector)> = [
        "ul.cb-col.cb-col-100.videos-carousal-wrapper.cb-mtch-crd-rt-itm",
        "div.cb-mtch-crd-rt-itm",
        r#"li[class*="cb-view-all-ga cb-match-card cb-bg-white"]"#,
    ].into_iter()
        .map(|e| (e, css(e)))
        .collect();

    static ref STATUS_SELECTORS: Vec<Selector> = [
        "div.cb-lv-scrs-col",
        r#"div[class*="cb-text-live"], div[class*="cb-text-complete"], span[class*="cb-text-preview"]"#,
    ].into_iter()
        .map(css)
        .collect();

    static ref WINNER: Regex = Regex::new(r"^(.+?)\s+won\b(.*)$").expect("winner pattern");
    static ref TEAM_PAIR: Regex = Regex::new(r"^(.*?)\s+vs?\.?\s+(.*?)(?:,|$)").expect("team pair pattern");
    static ref MATCH_TYPE: Regex = Regex::new(r"(?i)\b(test|odi|t20i?)\b").expect("match type pattern");
}

pub struct MatchListService {
    client: Client,
    homepage_url: String,
    base_url: String,
    max_matches: usize,
    timeout: Duration,
}

impl MatchListService {
    pub fn new(client: Client, config: &Config) -> MatchListService {
        MatchListService {
            client,
            homepage_url: config.homepage_url(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_matches: config.max_matches,
            timeout: config.list_timeout(),
        }
    }

    /// Never fails: network or parse trouble yields an empty list.
    pub async fn fetch(&self) -> Vec<MatchSummary> {
        log::info!("[LIST] Fetch {}", self.homepage_url);
        let html = rest_client::get_html(&self.client, &self.homepage_url, rest_client::SEARCH_REFERER, self.timeout).await
            .ok_log("[LIST] Fetch failed");
        match html {
            Some(html) => {
                let matches = MatchListService::parse(&html, &self.base_url, self.max_matches);
                log::info!("[LIST] Parsed {} matches", matches.len());
                matches
            },
            None => vec![],
        }
    }

    pub fn parse(html: &str, base_url: &str, max_matches: usize) -> Vec<MatchSummary> {
        let doc = Html::parse_document(html);
        let root = doc.root_element();

        let found = CONTAINER_SELECTORS.iter()
            .map(|(name, selector)| (*name, select_all(root, selector)))
            .find(|(_, containers)| !containers.is_empty());
        let Some((selector, containers)) = found else {
            log::warn!("[LIST] No match containers found");
            return vec![];
        };
        log::debug!("[LIST] Using container selector {selector}");

        let mut result = vec![];
        let mut seen = HashSet::new();
        for container in containers {
            let links = select_all(container, &MATCH_LINK);
            // a card may link the same match more than once (title, score)
            let nr_matches = links.iter()
                .filter_map(MatchListService::href_of)
                .collect::<HashSet<_>>()
                .len();
            for link in &links {
                if result.len() >= max_matches {
                    return result;
                }
                if let Some(summary) = MatchListService::to_summary(&container, link, nr_matches, base_url) {
                    if seen.insert(summary.url.clone()) {
                        result.push(summary);
                    }
                }
            }
        }
        result
    }

    fn href_of<'a>(link: &ElementRef<'a>) -> Option<&'a str> {
        link.value().attr("href").map(str::trim).filter(|e| !e.is_empty())
    }

    fn to_summary(container: &ElementRef, link: &ElementRef, nr_matches: usize, base_url: &str) -> Option<MatchSummary> {
        let href = MatchListService::href_of(link)?;
        let raw_title = link.value().attr("title")
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| text_of(link));
        if raw_title.is_empty() {
            return None;
        }

        let url = if href.starts_with("http") {
            href.to_string()
        } else {
            format!("{base_url}{href}")
        };
        let title = normalize_title(&raw_title);
        let score = match MatchListService::find_status(container, href, nr_matches) {
            Some(status) => MatchListService::normalize_winner(&status),
            None => MatchListService::synthesize_status(&title, &url),
        };

        Some(MatchSummary {
            title: truncate(&title, MAX_TEXT_LEN),
            score: truncate(&score, MAX_TEXT_LEN),
            url,
        })
    }

    /// Status text scoped to this match only: a candidate nested in a link to another match is never used,
    /// and an unowned candidate is only trusted when the container holds a single match.
    fn find_status(container: &ElementRef, href: &str, nr_matches: usize) -> Option<String> {
        STATUS_SELECTORS.iter().find_map(|selector| {
            select_all(*container, selector).into_iter()
                .filter(|candidate| match MatchListService::owning_link(candidate) {
                    Some(owner) => MatchListService::href_of(&owner) == Some(href),
                    None => nr_matches == 1,
                })
                .map(|candidate| text_of(&candidate))
                .find(|text| !text.is_empty())
        })
    }

    fn owning_link<'a>(element: &ElementRef<'a>) -> Option<ElementRef<'a>> {
        element.ancestors()
            .filter_map(ElementRef::wrap)
            .find(|e| e.value().name() == "a" && e.value().attr("href").map(|h| h.starts_with(MATCH_LINK_PREFIX)).unwrap_or(false))
    }

    fn normalize_winner(status: &str) -> String {
        match WINNER.captures(status) {
            Some(c) => format!("{} won{}", normalize_title(&c[1]), &c[2]),
            None => status.to_string(),
        }
    }

    fn synthesize_status(title: &str, url: &str) -> String {
        let lower = title.to_lowercase();
        if lower.contains("preview") {
            return "Preview".to_string();
        }
        if lower.contains("report") {
            return "Report".to_string();
        }
        match TEAM_PAIR.captures(title) {
            Some(c) if !c[1].trim().is_empty() && !c[2].trim().is_empty() => {
                let hint = MATCH_TYPE.captures(url)
                    .map(|m| format!(" ({})", match m[1].to_lowercase().as_str() {
                        "test" => "Test".to_string(),
                        other => other.to_uppercase(),
                    }))
                    .unwrap_or_default();
                format!("{} v {}{hint}", c[1].trim(), c[2].trim())
            },
            _ => "N/A".to_string(),
        }
    }
}
