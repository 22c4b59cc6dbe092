use lazy_static::lazy_static;
use scraper::{ElementRef, Selector};
use tracing::log;

use crate::html::{child_elements, css, first_text, select_all, text_of};
use crate::models::{BatterLine, BowlerLine};
use crate::text_normalizer::format_player_name;

const STRIKE_MARKER: char = '*';
const MIN_COLUMNS: usize = 6;

lazy_static! {
    static ref BLOCK: Selector = css("div.cb-min-inf");
    static ref HEADER_ROW: Selector = css("div.cb-min-hdr-rw");
    static ref ITEM_ROW: Selector = css("div.cb-min-itm-rw");
}

pub fn strike_rate(runs: u32, balls: u32) -> String {
    if balls == 0 {
        return "0.00".to_string();
    }
    format!("{:.2}", runs as f64 * 100.0 / balls as f64)
}

/// Balls bowled from the "N.B" overs notation; anything unparsable counts as zero.
pub fn overs_to_balls(overs: &str) -> u32 {
    let (full, partial) = overs.trim().split_once('.').unwrap_or((overs.trim(), "0"));
    full.parse::<u32>().unwrap_or(0) * 6 + partial.parse::<u32>().unwrap_or(0)
}

pub fn economy_rate(overs: &str, runs_conceded: u32) -> String {
    let balls = overs_to_balls(overs);
    if balls == 0 {
        return "0.00".to_string();
    }
    format!("{:.2}", runs_conceded as f64 * 6.0 / balls as f64)
}

fn parse_count(s: &str) -> u32 {
    s.trim().parse().unwrap_or(0)
}

fn split_marker(cell: &str) -> (String, bool) {
    let marked = cell.contains(STRIKE_MARKER);
    let name = cell.replace(STRIKE_MARKER, "");
    (format_player_name(name.trim()), marked)
}

impl BatterLine {
    /// Name, R, B, 4s, 6s, SR. The scraped SR column is ignored and recomputed.
    pub fn from_cells(cells: &[String]) -> Option<BatterLine> {
        if cells.len() < MIN_COLUMNS {
            return None;
        }
        let (name, is_on_strike) = split_marker(&cells[0]);
        let runs = parse_count(&cells[1]);
        let balls = parse_count(&cells[2]);
        Some(BatterLine {
            name,
            runs,
            balls,
            fours: cells[3].clone(),
            sixes: cells[4].clone(),
            strike_rate: strike_rate(runs, balls),
            is_on_strike,
        })
    }
}

impl BowlerLine {
    /// Name, O, M, R, W, ECO. The scraped ECO column is ignored and recomputed.
    pub fn from_cells(cells: &[String]) -> Option<BowlerLine> {
        if cells.len() < MIN_COLUMNS {
            return None;
        }
        let (name, is_current_bowler) = split_marker(&cells[0]);
        let runs_conceded = parse_count(&cells[3]);
        Some(BowlerLine {
            name,
            overs: cells[1].clone(),
            maidens: cells[2].clone(),
            runs_conceded,
            wickets: cells[4].clone(),
            economy_rate: economy_rate(&cells[1], runs_conceded),
            is_current_bowler,
        })
    }
}

enum Section {
    Batters,
    Bowlers,
}

/// Mini scorecard: `div.cb-min-inf` blocks, each with a header row and fixed-width item rows.
/// Block kind comes from the header text, falling back to position (batters first).
pub fn parse_scorecard(root: ElementRef) -> (Vec<BatterLine>, Vec<BowlerLine>) {
    let mut batters = vec![];
    let mut bowlers = vec![];
    for (index, block) in select_all(root, &BLOCK).into_iter().enumerate() {
        let header = first_text(block, &HEADER_ROW).unwrap_or_default().to_lowercase();
        let section = if header.contains("batter") || header.contains("batsman") {
            Section::Batters
        } else if header.contains("bowler") {
            Section::Bowlers
        } else if index == 0 {
            Section::Batters
        } else {
            Section::Bowlers
        };

        for row in select_all(block, &ITEM_ROW) {
            let cells: Vec<String> = child_elements(&row).iter().map(text_of).collect();
            match section {
                Section::Batters => match BatterLine::from_cells(&cells) {
                    Some(line) => batters.push(line),
                    None => log::debug!("[SCORECARD] Skip batter row {:?}", cells),
                },
                Section::Bowlers => match BowlerLine::from_cells(&cells) {
                    Some(line) => bowlers.push(line),
                    None => log::debug!("[SCORECARD] Skip bowler row {:?}", cells),
                },
            }
        }
    }
    (batters, bowlers)
}
