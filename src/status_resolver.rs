use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Selector};

use crate::html::{css, first_text, select_all, select_first, text_of};

pub const DEFAULT_STATUS: &str = "Match In Progress";

const MAX_CHASE_LEN: usize = 80;
const MAX_SHORT_LIVE_LEN: usize = 30;
const MAX_CLEANED_LEN: usize = 50;

/// Discrete match states: element selector, phrase pattern and canonical label.
const DISCRETE_STATES: &[(&str, &str, &str)] = &[
    (".cb-text-inningsbreak", r"(?i)\binnings break\b", "Innings Break"),
    (".cb-text-stumps", r"(?i)\bstumps\b", "Stumps"),
    (".cb-text-lunch", r"(?i)\blunch\b", "Lunch Break"),
    (".cb-text-tea", r"(?i)\btea\b", "Tea Break"),
    (".cb-text-drinks", r"(?i)\bdrinks\b", "Drinks Break"),
    (".cb-text-rain", r"(?i)\brain\b", "Rain Delay"),
    (".cb-text-delay", r"(?i)\b(?:match )?delayed\b", "Match Delayed"),
    (".cb-text-abandon", r"(?i)\babandoned\b", "Match Abandoned"),
    (".cb-text-strategic", r"(?i)\bstrategic time-?out\b", "Strategic Timeout"),
];

const RESULT_PHRASES: &[&str] = &["won by", "tied", "drawn", "no result"];
const CHASE_KEYWORDS: &[&str] = &["need", "target", "trail", "lead", "require"];
const ALLOWED_KEYWORDS: &[&str] = &[
    "target", "win", "won", "lead", "trail", "need", "break", "stumps", "lunch", "tea", "drinks", "delay", "abandon", "timeout",
];

const COMPLETE_MARKERS: &[&str] = &["won by", "match tied", "match drawn", "no result", "abandoned", "match complete"];

type Stage = fn(ElementRef) -> Option<String>;

/// Evaluated in order, first hit wins.
const STATUS_CASCADE: &[(&str, Stage)] = &[
    ("discrete_state", discrete_state_element),
    ("complete", complete_element),
    ("discrete_phrase", discrete_state_phrase),
    ("chase", chase_phrase),
    ("live", generic_live_element),
    ("cleaned", cleaned_status_region),
];

lazy_static! {
    static ref DISCRETE: Vec<(Selector, Regex, &'static str)> = DISCRETE_STATES.iter()
        .map(|(selector, pattern, label)| (css(selector), Regex::new(pattern).expect("discrete state pattern"), *label))
        .collect();

    static ref LIVE_REGIONS: Selector = css("div.cb-min-stts, div.cb-text-live, div.cb-toss-sts");
    static ref COMPLETE_ELEMENT: Selector = css(".cb-text-complete");
    static ref LIVE_ELEMENT: Selector = css(".cb-text-live, .cb-text-inprogress");
    static ref STATUS_REGION: Selector = css("div.cb-min-stts");
    static ref SCORES_REGION: Selector = css("div.cb-scrs-wrp");

    static ref CHASE: Regex = Regex::new(concat!(
        r"(?i)(?:[A-Za-z][\w .'-]*?\s+)?(?:",
        r"needs?\s+\d+\s+runs?(?:\s+(?:from|in)\s+\d+\s+(?:balls|overs))?",
        r"|target:?\s*\d+",
        r"|(?:trail|lead)s?\s+by\s+\d+\s+runs?",
        r"|requires?\s+\d+\s+runs?(?:\s+(?:from|in)\s+\d+\s+(?:balls|overs))?",
        r")",
    )).expect("chase pattern");

    static ref IN_PROGRESS_MARKERS: Vec<Regex> = [
        r"\binnings break\b", r"\blive\b", r"\bin progress\b", r"\bstumps\b", r"\bstrategic time-?out\b",
        r"\bdrinks\b", r"\btea\b", r"\blunch\b", r"\bdelay(?:ed)?\b",
    ].iter()
        .map(|e| Regex::new(e).expect("in progress marker"))
        .collect();

    static ref JUNK: Vec<Regex> = [
        r"(?i)\b(?:CRR|RRR|REQ)\s*:\s*[\d.]+",
        r"(?i)click (?:here )?for full scorecard",
        r"(?i)live cricket score(?:,\s*commentary)?",
        r"(?i)\bcommentary\b.*$",
        r"(?i)\b(?:mon|tue|wed|thu|fri|sat|sun)[a-z]*,?\s+\w+\s+\d{1,2}(?:,\s*\d{4})?",
        r"(?i)\b\d{1,2}\s+(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*(?:\s+\d{4})?",
        r"\b[A-Z][a-z]+\s+\d+\*?\s*\(\d+\)",
        r"(?i)last wkt:.*$",
        r"(?i)recent:.*$",
    ].iter()
        .map(|e| Regex::new(e).expect("junk pattern"))
        .collect();

    static ref SCORE_PATTERN: Regex = Regex::new(r"\d+/\d+|\(\d+(?:\.\d)?\s*(?:ov|overs)?\)").expect("score pattern");
}

/// Best-effort status line for a match page; never fails.
pub fn resolve_status(root: ElementRef) -> String {
    STATUS_CASCADE.iter()
        .find_map(|(_, stage)| stage(root))
        .unwrap_or_else(|| DEFAULT_STATUS.to_string())
}

pub fn is_complete(status: &str) -> bool {
    let lower = status.to_lowercase();
    COMPLETE_MARKERS.iter().any(|e| lower.contains(e))
        && !IN_PROGRESS_MARKERS.iter().any(|e| e.is_match(&lower))
}

fn discrete_state_element(root: ElementRef) -> Option<String> {
    DISCRETE.iter()
        .find(|(selector, _, _)| select_first(root, selector).is_some())
        .map(|(_, _, label)| label.to_string())
}

fn complete_element(root: ElementRef) -> Option<String> {
    select_all(root, &COMPLETE_ELEMENT).iter()
        .map(text_of)
        .find(|text| {
            let lower = text.to_lowercase();
            RESULT_PHRASES.iter().any(|e| lower.contains(e))
        })
}

fn discrete_state_phrase(root: ElementRef) -> Option<String> {
    select_all(root, &LIVE_REGIONS).iter()
        .map(text_of)
        .find_map(|text| DISCRETE.iter()
            .find(|(_, re, _)| re.is_match(&text))
            .map(|(_, _, label)| label.to_string()))
}

fn chase_phrase(root: ElementRef) -> Option<String> {
    select_all(root, &LIVE_REGIONS).iter()
        .map(text_of)
        .find_map(|text| CHASE.find(&text)
            .map(|m| m.as_str().trim().to_string())
            .filter(|e| e.chars().count() < MAX_CHASE_LEN && e.chars().any(|c| c.is_ascii_digit())))
}

fn generic_live_element(root: ElementRef) -> Option<String> {
    let element = select_all(root, &LIVE_ELEMENT).into_iter()
        .find(|e| !text_of(e).is_empty())?;
    let text = text_of(&element);
    let lower = text.to_lowercase();
    if text.chars().any(|c| c.is_ascii_digit()) && CHASE_KEYWORDS.iter().any(|e| lower.contains(e)) {
        return Some(text);
    }
    if text.chars().count() < MAX_SHORT_LIVE_LEN {
        return Some(text);
    }
    let generic = if element.value().classes().any(|c| c == "cb-text-inprogress") { "In Progress" } else { "Live" };
    Some(generic.to_string())
}

fn cleaned_status_region(root: ElementRef) -> Option<String> {
    let raw = first_text(root, &STATUS_REGION)
        .or_else(|| first_text(root, &SCORES_REGION))?;
    let cleaned = clean_status_text(&raw);
    let lower = cleaned.to_lowercase();
    let allowed = ALLOWED_KEYWORDS.iter().any(|e| lower.contains(e));
    if cleaned.is_empty() || cleaned.chars().count() >= MAX_CLEANED_LEN {
        return None;
    }
    if SCORE_PATTERN.is_match(&cleaned) && !allowed {
        return None;
    }
    Some(cleaned)
}

pub fn clean_status_text(raw: &str) -> String {
    let mut text = raw.to_string();
    for re in JUNK.iter() {
        text = re.replace_all(&text, " ").into_owned();
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
        .trim_matches(|c: char| c == ',' || c == '-' || c == '|' || c == '•' || c.is_whitespace())
        .to_string()
}
