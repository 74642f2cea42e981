//! Local edit overlay
//!
//! Provisional per-team, per-field edits layered over the fetched baseline,
//! owned by one session's state and passed explicitly. The effective value of
//! a field is the override if one is recorded, otherwise the baseline. An
//! edit that lands back on the baseline removes the override entry instead of
//! storing a redundant no-op. Nothing here touches the backend; submission is
//! a separate action outside this module.

use std::collections::HashMap;

/// Inclusive bounds for an overridden score value
pub const OVERRIDE_MIN: f64 = 0.0;
pub const OVERRIDE_MAX: f64 = 99.0;

/// Sparse map of (team number, field name) → overridden value
#[derive(Debug, Clone, Default)]
pub struct OverrideMap {
    entries: HashMap<(u32, String), u32>,
}

impl OverrideMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Effective value: override if present, else baseline
    pub fn effective(&self, team: u32, field: &str, baseline: Option<f64>) -> Option<f64> {
        self.entries
            .get(&(team, field.to_string()))
            .map(|v| *v as f64)
            .or(baseline)
    }

    /// Record an edit to an absolute value
    ///
    /// The value is rounded to the nearest integer and clamped to
    /// [`OVERRIDE_MIN`, `OVERRIDE_MAX`]. If the result equals the baseline,
    /// any existing override is removed. Returns the new effective value.
    pub fn set(&mut self, team: u32, field: &str, baseline: Option<f64>, value: f64) -> f64 {
        let clamped = value.round().clamp(OVERRIDE_MIN, OVERRIDE_MAX);
        let key = (team, field.to_string());
        if baseline == Some(clamped) {
            self.entries.remove(&key);
        } else {
            self.entries.insert(key, clamped as u32);
        }
        clamped
    }

    /// Apply a relative adjustment (e.g. +1/-1 from a stepper control)
    ///
    /// A missing baseline counts as zero for the purpose of stepping, but
    /// does not cause the override to be dropped at zero: zero-over-absent is
    /// real data, not a no-op.
    pub fn adjust(&mut self, team: u32, field: &str, baseline: Option<f64>, delta: f64) -> f64 {
        let current = self.effective(team, field, baseline).unwrap_or(0.0);
        self.set(team, field, baseline, current + delta)
    }

    /// Whether an override is recorded for this team/field
    pub fn is_overridden(&self, team: u32, field: &str) -> bool {
        self.entries.contains_key(&(team, field.to_string()))
    }

    /// Drop all overrides
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
