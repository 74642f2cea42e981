//! Per-alliance reconciliation reports
//!
//! Combines the three sources for one scheduled match: locally scouted
//! records (with any session overrides layered on top), and the externally
//! reported results indexed by the lookup. The external total for a field
//! prefers an alliance-level record when one was discovered, falling back to
//! summing that alliance's team records.

use crate::aggregate::{self, Comparison, SourceState, Verdict};
use crate::extract;
use crate::fields::FieldTable;
use crate::lookup::Lookup;
use crate::normalizer;
use crate::overrides::OverrideMap;
use cody_common::types::{Alliance, Endgame, ScheduleEntry, ScoutedRecord};
use std::collections::HashMap;

/// Scouted records indexed by team composite key
///
/// First-writer-wins on duplicate submissions, matching the lookup's
/// behavior for external records.
#[derive(Debug, Default)]
pub struct ScoutedIndex {
    by_key: HashMap<String, ScoutedRecord>,
}

impl ScoutedIndex {
    pub fn from_records(records: impl IntoIterator<Item = ScoutedRecord>) -> Self {
        let mut by_key = HashMap::new();
        for record in records {
            by_key
                .entry(record.team_key().to_string())
                .or_insert(record);
        }
        Self { by_key }
    }

    pub fn get(&self, entry: &ScheduleEntry, team: u32) -> Option<&ScoutedRecord> {
        self.by_key.get(&normalizer::team_key(
            &entry.match_level,
            entry.match_number,
            team,
        ))
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

/// One field's comparison within an alliance report
#[derive(Debug, Clone, PartialEq)]
pub struct FieldComparison {
    pub field: String,
    pub comparison: Comparison,
}

/// Reconciliation report for one alliance in one match
#[derive(Debug, Clone)]
pub struct AllianceReport {
    pub alliance: Alliance,
    pub teams: Vec<u32>,
    pub fields: Vec<FieldComparison>,
    /// Scouted endgame state per team slot, where reported
    pub endgame: Vec<(u32, Option<Endgame>)>,
}

impl AllianceReport {
    /// Overall verdict: any mismatch wins, then any pending, else match
    pub fn verdict(&self) -> Verdict {
        let mut verdict = Verdict::Match;
        for field in &self.fields {
            match field.comparison.verdict {
                Verdict::Mismatch => return Verdict::Mismatch,
                Verdict::Pending => verdict = Verdict::Pending,
                Verdict::Match => {}
            }
        }
        verdict
    }
}

/// Build the report for one alliance of one scheduled match
#[allow(clippy::too_many_arguments)]
pub fn alliance_report(
    entry: &ScheduleEntry,
    alliance: Alliance,
    scouted: &ScoutedIndex,
    overrides: &OverrideMap,
    lookup: &Lookup,
    table: &FieldTable,
    local_state: SourceState,
    external_state: SourceState,
) -> AllianceReport {
    let teams = entry.teams(alliance).to_vec();

    let fields = table
        .field_names()
        .map(|field| {
            let local = local_total(entry, &teams, scouted, overrides, table, field);
            let external = external_total(entry, alliance, &teams, lookup, table, field);
            FieldComparison {
                field: field.to_string(),
                comparison: aggregate::compare(local, external, local_state, external_state),
            }
        })
        .collect();

    let endgame = teams
        .iter()
        .map(|&team| {
            let state = scouted
                .get(entry, team)
                .and_then(|record| extract::endgame_field(&record.fields, table));
            (team, state)
        })
        .collect();

    AllianceReport {
        alliance,
        teams,
        fields,
        endgame,
    }
}

fn local_total(
    entry: &ScheduleEntry,
    teams: &[u32],
    scouted: &ScoutedIndex,
    overrides: &OverrideMap,
    table: &FieldTable,
    field: &str,
) -> Option<f64> {
    aggregate::sum_values(teams.iter().map(|&team| {
        let baseline = scouted
            .get(entry, team)
            .and_then(|record| extract::number_field(&record.fields, table, field));
        overrides.effective(team, field, baseline)
    }))
    .value()
}

fn external_total(
    entry: &ScheduleEntry,
    alliance: Alliance,
    teams: &[u32],
    lookup: &Lookup,
    table: &FieldTable,
    field: &str,
) -> Option<f64> {
    if let Some(record) = lookup.find_alliance(&entry.match_level, entry.match_number, alliance) {
        if let Some(value) = extract::number_field(&record.fields, table, field) {
            return Some(value);
        }
    }

    aggregate::sum_field(
        teams.iter().map(|&team| {
            lookup
                .find_team(&entry.match_level, entry.match_number, team)
                .map(|record| &record.fields)
        }),
        table,
        field,
    )
    .value()
}
