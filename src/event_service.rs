use std::collections::HashMap;

use bounded_vec_deque::BoundedVecDeque;
use chrono::{DateTime, Duration, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::log;

use crate::config_handler::Config;
use crate::models::{EventKind, MatchDetail};

/// Checked top to bottom; the first kind with a matching phrase wins.
const EVENT_KEYWORDS: &[(EventKind, &[&str])] = &[
    (EventKind::Four, &[r"\bfour\b", r"\b4 runs\b", r"\b4!"]),
    (EventKind::Six, &[r"\bsix\b", r"\b6 runs\b", r"\b6!"]),
    (EventKind::Wicket, &[
        r"\bcaught\b", r"\bbowled\b", r"\blbw\b", r"\brun out\b", r"\bstumped\b", r"\bretired hurt\b",
        r"\bhit wicket\b", r"\bc & b\b", r",\s*out\b", r"\bdismissed\b",
    ]),
];

lazy_static! {
    static ref EVENT_PATTERNS: Vec<(EventKind, Vec<Regex>)> = EVENT_KEYWORDS.iter()
        .map(|(kind, phrases)| {
            let patterns = phrases.iter()
                .map(|e| Regex::new(&format!("(?i){e}")).expect("event keyword"))
                .collect();
            (*kind, patterns)
        })
        .collect();

    static ref WICKETS: Regex = Regex::new(r"/\s*(\d+)").expect("wicket pattern");
}

pub struct PollState {
    pub last_wicket_count: Option<u32>,
    pub last_score_text: String,
    pub last_commentary_key: Option<String>,
    pub processed_deliveries: BoundedVecDeque<String>,
    pub last_event_at: HashMap<EventKind, DateTime<Utc>>,
}

impl PollState {
    fn new(max_processed: usize) -> PollState {
        PollState {
            last_wicket_count: None,
            last_score_text: String::new(),
            last_commentary_key: None,
            processed_deliveries: BoundedVecDeque::new(max_processed),
            last_event_at: HashMap::new(),
        }
    }

    fn is_rate_limited(&self, kind: EventKind, now: DateTime<Utc>, window: Duration) -> bool {
        self.last_event_at.get(&kind)
            .map(|last| now - *last < window)
            .unwrap_or(false)
    }
}

/// Per-URL event detection state. Only successfully parsed polls are fed in,
/// so a failed poll never moves the baseline.
pub struct EventService {
    states: HashMap<String, PollState>,
    max_processed: usize,
    rate_limit: Duration,
}

impl EventService {
    pub fn new(config: &Config) -> EventService {
        EventService {
            states: HashMap::new(),
            max_processed: config.max_processed_deliveries.max(1),
            rate_limit: Duration::milliseconds(config.event_rate_limit_ms as i64),
        }
    }

    pub fn process(&mut self, url: &str, detail: &MatchDetail, now: DateTime<Utc>) -> Option<EventKind> {
        let max_processed = self.max_processed;
        let state = self.states.entry(url.to_string())
            .or_insert_with(|| PollState::new(max_processed));

        let wickets = wicket_count(&detail.score);
        let key = delivery_key(detail.delivery_identifier.as_deref(), detail.latest_commentary.as_deref());

        let candidate = match (state.last_wicket_count, wickets) {
            (Some(previous), Some(current)) if current > previous && !detail.is_complete => Some(EventKind::Wicket),
            _ => detail.latest_commentary.as_deref().and_then(detect_commentary_event),
        };

        let accepted = candidate.filter(|kind| {
            if key.as_ref().map(|k| state.processed_deliveries.contains(k)).unwrap_or(false) {
                log::debug!("[EVENT] {url} {kind} already processed for {:?}", key);
                return false;
            }
            if state.is_rate_limited(*kind, now, self.rate_limit) {
                log::info!("[EVENT] {url} {kind} rate limited");
                return false;
            }
            true
        });

        if let Some(kind) = accepted {
            log::info!("[EVENT] {url} {kind} {:?}", key);
            if let Some(key) = &key {
                state.processed_deliveries.push_front(key.clone());
            }
            state.last_event_at.insert(kind, now);
        }

        if wickets.is_some() {
            state.last_wicket_count = wickets;
        }
        state.last_score_text = detail.score.clone();
        state.last_commentary_key = key;

        accepted
    }

    pub fn forget(&mut self, url: &str) {
        if self.states.remove(url).is_some() {
            log::info!("[EVENT] Dropped state for {url}");
        }
    }

    pub fn get_state(&self, url: &str) -> Option<&PollState> {
        self.states.get(url)
    }
}

/// "MI 120/3 (14.2)" => 3
pub fn wicket_count(score: &str) -> Option<u32> {
    WICKETS.captures(score).and_then(|c| c[1].parse().ok())
}

pub fn detect_commentary_event(commentary: &str) -> Option<EventKind> {
    EVENT_PATTERNS.iter()
        .find(|(_, patterns)| patterns.iter().any(|re| re.is_match(commentary)))
        .map(|(kind, _)| *kind)
}

pub fn delivery_key(over: Option<&str>, commentary: Option<&str>) -> Option<String> {
    let commentary = commentary.map(str::trim).filter(|e| !e.is_empty())?;
    Some(format!("{}|{commentary}", over.map(str::trim).filter(|e| !e.is_empty()).unwrap_or("?")))
}
