use lazy_static::lazy_static;
use regex::Regex;

const TEAM_ABBREVIATIONS: &[(&str, &str)] = &[
    ("Punjab Kings", "PBKS"),
    ("Lucknow Super Giants", "LSG"),
    ("Gujarat Titans", "GT"),
    ("Rajasthan Royals", "RR"),
    ("Royal Challengers Bengaluru", "RCB"),
    ("Royal Challengers Bangalore", "RCB"),
    ("Sunrisers Hyderabad", "SRH"),
    ("Kolkata Knight Riders", "KKR"),
    ("Delhi Capitals", "DC"),
    ("Chennai Super Kings", "CSK"),
    ("Mumbai Indians", "MI"),
    ("India", "IND"),
    ("Australia", "AUS"),
    ("England", "ENG"),
    ("South Africa", "SA"),
    ("New Zealand", "NZ"),
    ("Pakistan", "PAK"),
    ("Sri Lanka", "SL"),
    ("West Indies", "WI"),
    ("Bangladesh", "BAN"),
    ("Afghanistan", "AFG"),
    ("Ireland", "IRE"),
    ("Zimbabwe", "ZIM"),
];

lazy_static! {
    static ref TEAM_PATTERNS: Vec<(Regex, &'static str)> = TEAM_ABBREVIATIONS.iter()
        .map(|(full, abbr)| {
            let re = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(full))).expect("team pattern");
            (re, *abbr)
        })
        .collect();

    static ref BOILERPLATE: Vec<Regex> = vec![
        Regex::new(r",.*?- Live Cricket Score, Commentary").expect("live boilerplate"),
        Regex::new(r",.*?- Scorecard.*").expect("scorecard boilerplate"),
        Regex::new(r"\|.*").expect("pipe boilerplate"),
    ];

    static ref MATCH_NUMBER: Regex = Regex::new(r"(?i),\s*(\d+(?:st|nd|rd|th)\s+Match)").expect("match number");
}

/// Canonical display title: team names abbreviated, site boilerplate removed,
/// the "54th Match" fragment kept right after the teams. Never fails; empty input gives `"N/A"`.
pub fn normalize_title(raw: &str) -> String {
    if raw.trim().is_empty() {
        return "N/A".to_string();
    }

    let mut short = raw.to_string();
    for re in BOILERPLATE.iter() {
        short = re.replace_all(&short, "").into_owned();
    }
    for (re, abbr) in TEAM_PATTERNS.iter() {
        short = re.replace_all(&short, *abbr).into_owned();
    }

    if let Some(fragment) = MATCH_NUMBER.captures(raw).and_then(|c| c.get(1)).map(|m| m.as_str()) {
        if !short.contains(fragment) {
            short = match short.find(" vs ") {
                Some(vs_index) => {
                    let teams_end = short[vs_index..].find(',')
                        .map(|i| vs_index + i)
                        .unwrap_or(short.len());
                    format!("{}, {fragment}", &short[..teams_end])
                },
                None => format!("{short}, {fragment}"),
            };
        }
    }

    let trimmed = short.trim_matches(|c: char| c == ',' || c.is_whitespace());
    if trimmed.is_empty() {
        "N/A".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Exact (case-insensitive) lookup of a single team name, falling back to the trimmed input.
pub fn abbreviate_team(name: &str) -> String {
    let name = name.trim();
    TEAM_ABBREVIATIONS.iter()
        .find(|(full, _)| full.eq_ignore_ascii_case(name))
        .map(|(_, abbr)| abbr.to_string())
        .unwrap_or_else(|| name.to_string())
}

/// "Rohit Gurunath Sharma" => "R. Sharma"
pub fn format_player_name(full: &str) -> String {
    let tokens: Vec<&str> = full.split_whitespace().collect();
    match tokens.as_slice() {
        [] => "N/A".to_string(),
        [single] => single.to_string(),
        [first, .., last] => {
            let initial = first.chars().next().map(|c| c.to_string()).unwrap_or_default();
            format!("{initial}. {last}")
        },
    }
}
