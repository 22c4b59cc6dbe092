use std::time::Duration;

use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::log;

use crate::config_handler::Config;
use crate::html::{css, first_text, select_all, select_first, text_of, truncate};
use crate::models::MatchDetail;
use crate::scorecard::parse_scorecard;
use crate::status_resolver::{is_complete, resolve_status};
use crate::text_normalizer::{abbreviate_team, format_player_name, normalize_title};
use crate::{rest_client, LogResult};

const MAX_TITLE_LEN: usize = 150;
const NOT_AVAILABLE: &str = "N/A";
const POM_LABEL: &str = "PLAYER OF THE MATCH";

lazy_static! {
    static ref TEAMS: Regex = Regex::new(r"^(.*?)\s+vs\s+(.*?)(?:,|\s+-\s+|\||$)").expect("teams pattern");
    static ref CRR: Regex = Regex::new(r"(?i)CRR:\s*([\d.]+)").expect("crr pattern");
    static ref RRR: Regex = Regex::new(r"(?i)(?:REQ|RRR):\s*([\d.]+)").expect("rrr pattern");
    static ref RECENT_LABEL: Regex = Regex::new(r"(?i)^\s*recent\s*:?\s*").expect("recent pattern");

    static ref HEADING: Selector = css("h1.cb-nav-hdr, div.cb-nav-main h1");
    static ref TITLE: Selector = css("title");
    static ref GRAY_TEXT: Selector = css("div.cb-text-gray");
    static ref SCORES_WRAP: Selector = css("div.cb-scrs-wrp");
    static ref LIVE_SCORE: Selector = css(".cb-font-20");
    static ref TEAM_SCORE: Selector = css("div.cb-min-tm");
    static ref BATTING_ROW: Selector = css(".cb-min-bat-rw");
    static ref COMMENTARY_LINE: Selector = css("p.cb-com-ln");
    static ref OVER_NUMBER: Selector = css(".cb-ovr-num");
    static ref RECENT_BALLS: Selector = css(".cb-min-rcnt");
    static ref POM_ITEM: Selector = css("div.cb-mom-itm");
    static ref POM_LABEL_SPAN: Selector = css("span.cb-text-gray");
    static ref POM_NAME: Selector = css("a.cb-link-undrln");
}

pub struct MatchDetailService {
    client: Client,
    referer: String,
    timeout: Duration,
}

fn capture_rate(re: &Regex, text: &str) -> Option<String> {
    re.captures(text).map(|c| c[1].trim_end_matches('.').to_string())
}

impl MatchDetailService {
    pub fn new(client: Client, config: &Config) -> MatchDetailService {
        MatchDetailService {
            client,
            referer: config.homepage_url(),
            timeout: config.detail_timeout(),
        }
    }

    /// `None` on any network failure; a fetched page always parses into a best-effort detail.
    pub async fn fetch(&self, url: &str) -> Option<MatchDetail> {
        log::info!("[DETAIL] Fetch {url}");
        let html = rest_client::get_html(&self.client, url, &self.referer, self.timeout).await
            .ok_log("[DETAIL] Fetch failed")?;
        let detail = MatchDetailService::parse(url, &html);
        log::info!("[DETAIL] {detail}");
        Some(detail)
    }

    pub fn parse(url: &str, html: &str) -> MatchDetail {
        let doc = Html::parse_document(html);
        let root = doc.root_element();

        let raw_title = first_text(root, &HEADING)
            .or_else(|| first_text(root, &TITLE))
            .unwrap_or_default();
        let (team1_name, team2_name) = MatchDetailService::parse_teams(&raw_title);

        let status = resolve_status(root);
        let is_complete = is_complete(&status);
        let (score, opponent_score) = MatchDetailService::parse_scores(root, team1_name.as_deref());
        let (current_run_rate, required_run_rate) = MatchDetailService::parse_run_rates(root);
        let (latest_commentary, delivery_identifier) = MatchDetailService::parse_commentary(root);
        let (batters, bowlers) = parse_scorecard(root);
        let player_of_match = if is_complete {
            MatchDetailService::parse_player_of_match(root)
        } else {
            None
        };

        MatchDetail {
            url: url.to_string(),
            title: truncate(&normalize_title(&raw_title), MAX_TITLE_LEN),
            score,
            opponent_score,
            status,
            is_complete,
            current_run_rate,
            required_run_rate,
            latest_commentary,
            delivery_identifier,
            recent_balls: MatchDetailService::parse_recent_balls(root),
            batters,
            bowlers,
            team1_name,
            team2_name,
            player_of_match,
            last_event: None,
        }
    }

    /// Taken from the raw title, before abbreviation has merged names into codes.
    fn parse_teams(raw_title: &str) -> (Option<String>, Option<String>) {
        match TEAMS.captures(raw_title) {
            Some(c) => {
                let team = |i: usize| c.get(i)
                    .map(|m| m.as_str().trim())
                    .filter(|e| !e.is_empty())
                    .map(abbreviate_team);
                (team(1), team(2))
            },
            None => (None, None),
        }
    }

    fn parse_scores(root: ElementRef, team1: Option<&str>) -> (String, Option<String>) {
        let opponent = first_text(root, &GRAY_TEXT);
        let Some(wrapper) = select_first(root, &SCORES_WRAP) else {
            return (first_text(root, &LIVE_SCORE).unwrap_or_else(|| NOT_AVAILABLE.to_string()), opponent);
        };

        let blocks: Vec<String> = select_all(wrapper, &TEAM_SCORE).iter()
            .map(text_of)
            .filter(|e| !e.is_empty())
            .collect();
        match blocks.as_slice() {
            [first, second, ..] => {
                let second_is_team1 = team1
                    .map(|t| second.contains(t) && !first.contains(t))
                    .unwrap_or(false);
                if second_is_team1 {
                    (second.clone(), Some(first.clone()))
                } else {
                    (first.clone(), Some(second.clone()))
                }
            },
            [single] => (single.clone(), first_text(wrapper, &GRAY_TEXT).or(opponent)),
            [] => {
                let live = first_text(wrapper, &LIVE_SCORE)
                    .or_else(|| first_text(root, &LIVE_SCORE))
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string());
                (live, first_text(wrapper, &GRAY_TEXT).or(opponent))
            },
        }
    }

    fn parse_run_rates(root: ElementRef) -> (Option<String>, Option<String>) {
        let text = first_text(root, &SCORES_WRAP)
            .or_else(|| first_text(root, &BATTING_ROW))
            .unwrap_or_default();
        (capture_rate(&CRR, &text), capture_rate(&RRR, &text))
    }

    /// Commentary is cut before its second comma: "Bowler to Batter, FOUR, filler..." keeps "Bowler to Batter, FOUR".
    fn parse_commentary(root: ElementRef) -> (Option<String>, Option<String>) {
        let Some(line) = select_all(root, &COMMENTARY_LINE).into_iter().find(|e| !text_of(e).is_empty()) else {
            return (None, None);
        };
        let text = text_of(&line);
        let commentary = match text.match_indices(',').nth(1) {
            Some((i, _)) => text[..i].trim().to_string(),
            None => text,
        };
        let over = line.parent()
            .and_then(ElementRef::wrap)
            .and_then(|parent| first_text(parent, &OVER_NUMBER));
        (Some(commentary), over)
    }

    fn parse_recent_balls(root: ElementRef) -> Option<String> {
        first_text(root, &RECENT_BALLS)
            .map(|e| RECENT_LABEL.replace(&e, "").trim().to_string())
            .filter(|e| !e.is_empty())
    }

    fn parse_player_of_match(root: ElementRef) -> Option<String> {
        select_all(root, &POM_ITEM).into_iter()
            .filter(|item| select_all(*item, &POM_LABEL_SPAN).iter()
                .any(|label| text_of(label).to_uppercase().contains(POM_LABEL)))
            .find_map(|item| first_text(item, &POM_NAME))
            .map(|name| format_player_name(&name))
    }
}
