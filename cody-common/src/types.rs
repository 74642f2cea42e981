//! Domain types shared across the CodyStats tools
//!
//! Composite keys follow a fixed `-` delimited format: match level first
//! (uppercase tag), then match number, then either a team number or an
//! alliance color tag. `QM-7-RED` names the red alliance of qualification
//! match 7; `QM-7-1234` names team 1234 in the same match.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Delimiter used when joining composite key components
pub const KEY_DELIMITER: char = '-';

/// Canonical match level tag (e.g. "QM", "SF", "F")
///
/// The set of tags is open: whatever the schedule uses, trimmed and
/// uppercased. An empty tag is not representable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MatchLevel(String);

impl<'de> Deserialize<'de> for MatchLevel {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        MatchLevel::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom("empty match level tag"))
    }
}

impl MatchLevel {
    /// Canonicalize a raw level tag: trim and uppercase
    ///
    /// Returns `None` for an empty or whitespace-only input. No decoding of
    /// full words is attempted; "qm" and "QM" both canonicalize to "QM".
    pub fn parse(raw: &str) -> Option<Self> {
        let tag = raw.trim().to_uppercase();
        if tag.is_empty() {
            None
        } else {
            Some(MatchLevel(tag))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MatchLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Alliance color
///
/// Exactly two alliances compete in a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Alliance {
    Red,
    Blue,
}

impl Alliance {
    /// Canonical key tag ("RED" / "BLUE")
    pub fn as_tag(&self) -> &'static str {
        match self {
            Alliance::Red => "RED",
            Alliance::Blue => "BLUE",
        }
    }

    /// Human-readable label ("Red" / "Blue")
    pub fn label(&self) -> &'static str {
        match self {
            Alliance::Red => "Red",
            Alliance::Blue => "Blue",
        }
    }

    /// Both alliances, in red-first order
    pub fn both() -> [Alliance; 2] {
        [Alliance::Red, Alliance::Blue]
    }
}

impl fmt::Display for Alliance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// Endgame state reported for one team in one match
///
/// Closed set: unrecognized strings are treated as absent by
/// [`Endgame::parse`], never coerced to a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Endgame {
    None,
    Park,
    Shallow,
    Deep,
}

impl Endgame {
    /// Parse an endgame tag: trimmed, case-insensitive, closed set
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "NONE" => Some(Endgame::None),
            "PARK" => Some(Endgame::Park),
            "SHALLOW" => Some(Endgame::Shallow),
            "DEEP" => Some(Endgame::Deep),
            _ => None,
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Endgame::None => "None",
            Endgame::Park => "Park",
            Endgame::Shallow => "Shallow",
            Endgame::Deep => "Deep",
        }
    }
}

/// Identifies one match in a competition schedule
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchKey {
    pub level: MatchLevel,
    pub number: u32,
}

impl MatchKey {
    pub fn new(level: MatchLevel, number: u32) -> Self {
        Self { level, number }
    }
}

impl fmt::Display for MatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.level, KEY_DELIMITER, self.number)
    }
}

/// Identifies one alliance within one match
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AllianceKey {
    pub match_key: MatchKey,
    pub alliance: Alliance,
}

impl fmt::Display for AllianceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.match_key,
            KEY_DELIMITER,
            self.alliance.as_tag()
        )
    }
}

/// Identifies one team's performance within one match
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TeamKey {
    pub match_key: MatchKey,
    pub team_number: u32,
}

impl fmt::Display for TeamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.match_key, KEY_DELIMITER, self.team_number)
    }
}

/// One entry of an event's match schedule
///
/// Up to three team slots per alliance; absent slots (byes, surrogate gaps)
/// are simply omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEntry {
    #[serde(alias = "matchLevel", alias = "level")]
    pub match_level: MatchLevel,
    #[serde(alias = "matchNumber")]
    pub match_number: u32,
    #[serde(default, alias = "red_teams")]
    pub red: Vec<u32>,
    #[serde(default, alias = "blue_teams")]
    pub blue: Vec<u32>,
}

impl ScheduleEntry {
    pub fn match_key(&self) -> MatchKey {
        MatchKey::new(self.match_level.clone(), self.match_number)
    }

    /// Team slots for one alliance
    pub fn teams(&self, alliance: Alliance) -> &[u32] {
        match alliance {
            Alliance::Red => &self.red,
            Alliance::Blue => &self.blue,
        }
    }
}

/// One locally-scouted record: a single team's performance in a single match
///
/// Score-component fields are kept loosely typed; which field names exist and
/// how they alias is season configuration, not part of this model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoutedRecord {
    #[serde(alias = "matchLevel", alias = "level")]
    pub match_level: MatchLevel,
    #[serde(alias = "matchNumber")]
    pub match_number: u32,
    #[serde(alias = "teamNumber", alias = "team")]
    pub team_number: u32,
    #[serde(flatten)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl ScoutedRecord {
    pub fn team_key(&self) -> TeamKey {
        TeamKey {
            match_key: MatchKey::new(self.match_level.clone(), self.match_number),
            team_number: self.team_number,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_level_canonicalizes() {
        assert_eq!(MatchLevel::parse(" qm ").unwrap().as_str(), "QM");
        assert_eq!(MatchLevel::parse("Sf").unwrap().as_str(), "SF");
        assert_eq!(MatchLevel::parse("   "), None);
    }

    #[test]
    fn test_composite_key_format() {
        let key = AllianceKey {
            match_key: MatchKey::new(MatchLevel::parse("qm").unwrap(), 7),
            alliance: Alliance::Red,
        };
        assert_eq!(key.to_string(), "QM-7-RED");

        let key = TeamKey {
            match_key: MatchKey::new(MatchLevel::parse("F").unwrap(), 1),
            team_number: 1234,
        };
        assert_eq!(key.to_string(), "F-1-1234");
    }

    #[test]
    fn test_endgame_parse() {
        assert_eq!(Endgame::parse(" deep "), Some(Endgame::Deep));
        assert_eq!(Endgame::parse("SHALLOW"), Some(Endgame::Shallow));
        assert_eq!(Endgame::parse("unknown"), None);
        assert_eq!(Endgame::parse(""), None);
        assert_eq!(Endgame::Deep.label(), "Deep");
    }

    #[test]
    fn test_scouted_record_deserializes_flattened_fields() {
        let json = r#"{
            "matchLevel": "QM",
            "matchNumber": 12,
            "teamNumber": 254,
            "al4c": 3,
            "endgame": "park"
        }"#;
        let record: ScoutedRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.team_number, 254);
        assert_eq!(record.fields.get("al4c"), Some(&serde_json::json!(3)));
        assert_eq!(record.team_key().to_string(), "QM-12-254");
    }
}
