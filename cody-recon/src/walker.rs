//! Tree walker / entry collector
//!
//! External match-result payloads have no contractual shape: sometimes an
//! array of flat records, sometimes a map keyed by match identifier, often
//! nested several levels under wrapper keys like "data" or "matchData". The
//! walker traverses whatever it is given breadth-first, accumulating identity
//! context (match level, match number, team, alliance) from recognizable
//! fields as it descends, and emits a record wherever enough context has
//! resolved to form a complete composite key and the node itself carries at
//! least one allow-listed score field.
//!
//! Nodes with partial context contribute nothing themselves; their children
//! keep inheriting and may complete the key further down.

use crate::fields::FieldTable;
use crate::normalizer;
use cody_common::types::{Alliance, MatchLevel};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet, VecDeque};

/// Ordered alias lists per identity concept. First present and parseable key
/// wins; later aliases are not consulted.
const LEVEL_KEYS: &[&str] = &[
    "matchLevel",
    "match_level",
    "compLevel",
    "comp_level",
    "tournamentLevel",
    "level",
];
const NUMBER_KEYS: &[&str] = &["matchNumber", "match_number", "matchNum", "match"];
const TEAM_KEYS: &[&str] = &[
    "teamNumber",
    "team_number",
    "teamNum",
    "teamKey",
    "team_key",
    "team",
];
const ALLIANCE_KEYS: &[&str] = &["alliance", "allianceColor", "alliance_color", "color", "station"];
const EVENT_KEYS: &[&str] = &["eventKey", "event_key", "eventCode", "event"];
const SEASON_KEYS: &[&str] = &["season", "year"];

/// Wrapper keys whose child object maps alliance color tags to sub-records
const ALLIANCES_KEYS: &[&str] = &["alliances", "Alliances"];

/// Identity context accumulated along one traversal path
#[derive(Debug, Clone, Default)]
pub struct WalkContext {
    pub level: Option<MatchLevel>,
    pub number: Option<u32>,
    pub team: Option<u32>,
    pub alliance: Option<Alliance>,
    pub event_key: Option<String>,
    pub season: Option<u32>,
}

impl WalkContext {
    /// Inherit this context, overridden by whatever the object exposes
    ///
    /// A field overrides only when present and parseable; an unparseable
    /// value under a recognized key leaves the inherited value in place.
    fn absorb(&self, obj: &Map<String, Value>) -> WalkContext {
        let mut next = self.clone();
        if let Some(level) = first_match(obj, LEVEL_KEYS, normalizer::level) {
            next.level = Some(level);
        }
        if let Some(number) = first_match(obj, NUMBER_KEYS, normalizer::match_number) {
            next.number = Some(number);
        }
        if let Some(team) = first_match(obj, TEAM_KEYS, normalizer::team_number) {
            next.team = Some(team);
        }
        if let Some(alliance) = first_match(obj, ALLIANCE_KEYS, normalizer::alliance) {
            next.alliance = Some(alliance);
        }
        if let Some(event_key) = first_match(obj, EVENT_KEYS, |v| {
            v.as_str()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        }) {
            next.event_key = Some(event_key);
        }
        if let Some(season) = first_match(obj, SEASON_KEYS, normalizer::match_number) {
            next.season = Some(season);
        }
        next
    }
}

fn first_match<T>(
    obj: &Map<String, Value>,
    keys: &[&str],
    parse: impl Fn(&Value) -> Option<T>,
) -> Option<T> {
    keys.iter().find_map(|k| obj.get(*k).and_then(&parse))
}

/// One discovered record: identity context plus its recognized domain fields
///
/// Constructed fresh per traversal, never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledRecord {
    /// Composite key (`QM-7-RED` / `QM-7-254`)
    pub key: String,
    pub match_level: MatchLevel,
    pub match_number: u32,
    pub alliance: Option<Alliance>,
    pub team_number: Option<u32>,
    pub event_key: Option<String>,
    pub season: Option<u32>,
    /// Recognized score/endgame fields found on the record node, by raw key
    pub fields: BTreeMap<String, Value>,
}

/// Walk an arbitrary JSON value and collect every acceptable record
///
/// Traversal is breadth-first via an explicit queue; arrays are flattened; a
/// visited set keyed by node identity guards against re-visiting shared
/// subtrees. Output order is the traversal order, which is deterministic for
/// a given input.
pub fn collect_records(root: &Value, table: &FieldTable) -> Vec<ReconciledRecord> {
    let mut records = Vec::new();
    let mut queue: VecDeque<(&Value, WalkContext)> = VecDeque::new();
    let mut visited: HashSet<usize> = HashSet::new();

    visited.insert(root as *const Value as usize);
    queue.push_back((root, WalkContext::default()));

    while let Some((value, ctx)) = queue.pop_front() {
        match value {
            Value::Array(items) => {
                for item in items {
                    enqueue(&mut queue, &mut visited, item, ctx.clone());
                }
            }
            Value::Object(obj) => {
                let ctx = ctx.absorb(obj);

                if let Some(record) = accept(obj, &ctx, table) {
                    tracing::trace!(key = %record.key, "Accepted record");
                    records.push(record);
                    // Terminal record: nothing below it can add identity
                    continue;
                }

                for (key, child) in obj {
                    if ALLIANCES_KEYS.contains(&key.as_str()) {
                        if let Value::Object(by_color) = child {
                            // The sub-object's own keys ("Red"/"Blue") carry
                            // the alliance context for each subtree,
                            // independent of generic field detection.
                            for (color, sub) in by_color {
                                let mut sub_ctx = ctx.clone();
                                if let Some(alliance) = normalizer::alliance_tag(color) {
                                    sub_ctx.alliance = Some(alliance);
                                }
                                enqueue(&mut queue, &mut visited, sub, sub_ctx);
                            }
                            continue;
                        }
                    }
                    if child.is_object() || child.is_array() {
                        enqueue(&mut queue, &mut visited, child, ctx.clone());
                    }
                }
            }
            // Scalars carry no records
            _ => {}
        }
    }

    records
}

fn enqueue<'a>(
    queue: &mut VecDeque<(&'a Value, WalkContext)>,
    visited: &mut HashSet<usize>,
    value: &'a Value,
    ctx: WalkContext,
) {
    if visited.insert(value as *const Value as usize) {
        queue.push_back((value, ctx));
    }
}

/// Accept an object as a terminal record, or not
///
/// Requires a complete key (level + number + team, or level + number +
/// alliance) and at least one recognized domain field on the object itself.
fn accept(
    obj: &Map<String, Value>,
    ctx: &WalkContext,
    table: &FieldTable,
) -> Option<ReconciledRecord> {
    let level = ctx.level.as_ref()?;
    let number = ctx.number?;

    let key = if let Some(team) = ctx.team {
        normalizer::team_key(level, number, team)
    } else if let Some(alliance) = ctx.alliance {
        normalizer::alliance_key(level, number, alliance)
    } else {
        return None;
    };

    let fields: BTreeMap<String, Value> = obj
        .iter()
        .filter(|(k, _)| table.is_domain_key(k))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    if fields.is_empty() {
        return None;
    }

    Some(ReconciledRecord {
        key,
        match_level: level.clone(),
        match_number: number,
        alliance: ctx.alliance,
        team_number: ctx.team,
        event_key: ctx.event_key.clone(),
        season: ctx.season,
        fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flat_array_of_team_records() {
        let payload = json!([
            { "matchLevel": "qm", "matchNumber": 1, "teamNumber": 254, "al4c": 2 },
            { "matchLevel": "qm", "matchNumber": 1, "teamNumber": 1678, "al4c": 1 }
        ]);
        let records = collect_records(&payload, &FieldTable::season_2025());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].key, "QM-1-254");
        assert_eq!(records[1].key, "QM-1-1678");
    }

    #[test]
    fn test_alliances_sub_object_sets_alliance_context() {
        let payload = json!({
            "matchLevel": "qm",
            "matchNumber": 7,
            "alliances": {
                "Red": { "al4c": 2, "al3c": 1 },
                "Blue": { "al4c": 0 }
            }
        });
        let records = collect_records(&payload, &FieldTable::season_2025());
        assert_eq!(records.len(), 2);

        let red = records.iter().find(|r| r.key == "QM-7-RED").unwrap();
        assert_eq!(red.alliance, Some(Alliance::Red));
        assert_eq!(red.match_number, 7);
        assert_eq!(red.fields.get("al4c"), Some(&json!(2)));
        assert_eq!(red.fields.get("al3c"), Some(&json!(1)));

        assert!(records.iter().any(|r| r.key == "QM-7-BLUE"));
    }

    #[test]
    fn test_context_inherited_through_wrappers() {
        let payload = json!({
            "data": {
                "matchData": {
                    "matchLevel": "sf",
                    "matchNumber": "Match 3",
                    "entries": [
                        { "teamKey": "frc254", "tNet": 4 }
                    ]
                }
            }
        });
        let records = collect_records(&payload, &FieldTable::season_2025());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].key, "SF-3-254");
        assert_eq!(records[0].team_number, Some(254));
    }

    #[test]
    fn test_child_values_override_inherited() {
        let payload = json!({
            "matchLevel": "qm",
            "matchNumber": 1,
            "matches": [
                { "matchNumber": 2, "teamNumber": 33, "aNet": 1 }
            ]
        });
        let records = collect_records(&payload, &FieldTable::season_2025());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].key, "QM-2-33");
    }

    #[test]
    fn test_wrapper_with_complete_key_but_no_domain_fields_not_accepted() {
        let payload = json!({
            "matchLevel": "qm",
            "matchNumber": 4,
            "teamNumber": 118,
            "metadata": { "uploaded": true }
        });
        let records = collect_records(&payload, &FieldTable::season_2025());
        assert!(records.is_empty());
    }

    #[test]
    fn test_partial_context_contributes_nothing() {
        // Team known, match number never resolves anywhere
        let payload = json!({
            "teamNumber": 971,
            "scores": { "al4c": 3 }
        });
        let records = collect_records(&payload, &FieldTable::season_2025());
        assert!(records.is_empty());
    }

    #[test]
    fn test_unparseable_alias_value_keeps_inherited_context() {
        let payload = json!({
            "matchLevel": "f",
            "matchNumber": 1,
            "inner": {
                "matchNumber": "tbd",
                "teamNumber": 148,
                "aProc": 2
            }
        });
        let records = collect_records(&payload, &FieldTable::season_2025());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].key, "F-1-148");
    }

    #[test]
    fn test_team_key_preferred_over_alliance_key() {
        let payload = json!({
            "matchLevel": "qm",
            "matchNumber": 9,
            "alliance": "red",
            "teamNumber": 254,
            "tl4c": 5
        });
        let records = collect_records(&payload, &FieldTable::season_2025());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].key, "QM-9-254");
        assert_eq!(records[0].alliance, Some(Alliance::Red));
    }
}
