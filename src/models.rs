use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MatchSummary {
    pub title: String,
    pub score: String,
    pub url: String,
}

impl Display for MatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} :: {} • {}", self.title, self.score, self.url)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Four,
    Six,
    Wicket,
}

impl Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::Four => write!(f, "four"),
            EventKind::Six => write!(f, "six"),
            EventKind::Wicket => write!(f, "wicket"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BatterLine {
    pub name: String,
    pub runs: u32,
    pub balls: u32,
    pub fours: String,
    pub sixes: String,
    pub strike_rate: String,
    pub is_on_strike: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BowlerLine {
    pub name: String,
    pub overs: String,
    pub maidens: String,
    pub runs_conceded: u32,
    pub wickets: String,
    pub economy_rate: String,
    pub is_current_bowler: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct MatchDetail {
    pub url: String,
    pub title: String,
    pub score: String,
    pub opponent_score: Option<String>,
    pub status: String,
    pub is_complete: bool,

    pub current_run_rate: Option<String>,
    pub required_run_rate: Option<String>,

    pub latest_commentary: Option<String>,
    pub delivery_identifier: Option<String>,
    pub recent_balls: Option<String>,

    pub batters: Vec<BatterLine>,
    pub bowlers: Vec<BowlerLine>,

    pub team1_name: Option<String>,
    pub team2_name: Option<String>,
    pub player_of_match: Option<String>,

    pub last_event: Option<EventKind>,
}

impl MatchDetail {
    /// One-line value for compact displays: the result once the match is over, the live score otherwise.
    pub fn headline(&self) -> &str {
        if self.is_complete && !self.status.is_empty() && self.status != "N/A" {
            &self.status
        } else {
            &self.score
        }
    }
}

impl Display for MatchDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} :: {} • {} {:?}", self.title, self.headline(), self.status, self.last_event)
    }
}
