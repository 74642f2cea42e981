//! Key component normalization
//!
//! External payloads spell identity fields however they like: numbers as
//! strings, mixed-case level tags, alliance colors embedded in longer tokens
//! ("Red Alliance", "frcRed"). Each normalizer here maps that variety onto
//! one canonical component, or `None` when nothing usable is present. A
//! missing component means the record is skipped, never defaulted.

use cody_common::types::{Alliance, AllianceKey, MatchKey, MatchLevel, TeamKey};
use serde_json::Value;

/// Normalize a match level tag: trim and uppercase
///
/// Only string values carry a level; numbers and other shapes yield `None`.
pub fn level(value: &Value) -> Option<MatchLevel> {
    MatchLevel::parse(value.as_str()?)
}

/// Normalize a match number from a native number or a numeric string
pub fn match_number(value: &Value) -> Option<u32> {
    non_negative_integer(value)
}

/// Normalize a team number from a native number or a string like "frc254"
pub fn team_number(value: &Value) -> Option<u32> {
    non_negative_integer(value)
}

/// Normalize an alliance color
///
/// Accepts exact tokens ("RED"/"BLUE"), single-letter abbreviations
/// ("R"/"B"), and colors embedded at either end of a longer tag
/// ("RED ALLIANCE", "frcBlue"). Rules are tried in that order; the first
/// match wins.
pub fn alliance(value: &Value) -> Option<Alliance> {
    alliance_tag(value.as_str()?)
}

/// Alliance normalization over a raw string tag
pub fn alliance_tag(raw: &str) -> Option<Alliance> {
    let tag = raw.trim().to_uppercase();
    match tag.as_str() {
        "RED" => return Some(Alliance::Red),
        "BLUE" => return Some(Alliance::Blue),
        "R" => return Some(Alliance::Red),
        "B" => return Some(Alliance::Blue),
        _ => {}
    }
    if tag.starts_with("RED") || tag.ends_with("RED") {
        return Some(Alliance::Red);
    }
    if tag.starts_with("BLUE") || tag.ends_with("BLUE") {
        return Some(Alliance::Blue);
    }
    None
}

/// Build the composite key for one alliance in one match
pub fn alliance_key(level: &MatchLevel, number: u32, alliance: Alliance) -> String {
    AllianceKey {
        match_key: MatchKey::new(level.clone(), number),
        alliance,
    }
    .to_string()
}

/// Build the composite key for one team in one match
pub fn team_key(level: &MatchLevel, number: u32, team: u32) -> String {
    TeamKey {
        match_key: MatchKey::new(level.clone(), number),
        team_number: team,
    }
    .to_string()
}

/// Extract the first contiguous run of ASCII digits
pub fn digit_run(s: &str) -> Option<u32> {
    let start = s.find(|c: char| c.is_ascii_digit())?;
    let digits: String = s[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

fn non_negative_integer(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                return u32::try_from(u).ok();
            }
            // Tolerate a whole-valued float (e.g. 7.0 from a lossy encoder)
            let f = n.as_f64()?;
            if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 {
                Some(f as u32)
            } else {
                None
            }
        }
        Value::String(s) => digit_run(s),
        _ => None,
    }
}
