//! Alliance-level aggregation and cross-source comparison
//!
//! Sums run across the (up to three) team contributions on one alliance. An
//! absent contribution adds zero without poisoning the sum, but a sum where
//! every contribution was absent is itself absent — "nobody reported" must
//! not render as a zero-total agreement.

use crate::extract;
use crate::fields::FieldTable;
use serde_json::Value;
use std::collections::BTreeMap;

/// Sum of one field across one alliance's team contributions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AllianceSum {
    pub total: f64,
    /// At least one contribution parsed
    pub has_value: bool,
}

impl AllianceSum {
    pub fn absent() -> Self {
        Self {
            total: 0.0,
            has_value: false,
        }
    }

    /// The total, or `None` when every contribution was absent
    pub fn value(&self) -> Option<f64> {
        if self.has_value {
            Some(self.total)
        } else {
            None
        }
    }
}

/// Sum per-team values, tracking whether any contribution was present
pub fn sum_values(values: impl IntoIterator<Item = Option<f64>>) -> AllianceSum {
    let mut sum = AllianceSum::absent();
    for value in values {
        if let Some(v) = value {
            sum.total += v;
            sum.has_value = true;
        }
    }
    sum
}

/// Sum one field across team records, tolerating absent records and fields
pub fn sum_field<'a>(
    teams: impl IntoIterator<Item = Option<&'a BTreeMap<String, Value>>>,
    table: &FieldTable,
    field: &str,
) -> AllianceSum {
    sum_values(
        teams
            .into_iter()
            .map(|fields| fields.and_then(|f| extract::number_field(f, table, field))),
    )
}

/// Readiness of one data source, as reported by the fetching layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceState {
    Loading,
    Error,
    Ready,
}

/// Outcome of comparing a local total against an external total
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Match,
    Mismatch,
    /// Not yet comparable: a source is loading/errored or has no data
    Pending,
}

/// A rendered comparison: the verdict plus the total on each side
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparison {
    pub verdict: Verdict,
    pub local: Option<f64>,
    pub external: Option<f64>,
}

/// Compare a locally-aggregated total against an externally-reported one
///
/// A verdict is only rendered once both sources are ready and both sides
/// have data; equality is exact.
pub fn compare(
    local: Option<f64>,
    external: Option<f64>,
    local_state: SourceState,
    external_state: SourceState,
) -> Comparison {
    let verdict = match (local_state, external_state, local, external) {
        (SourceState::Ready, SourceState::Ready, Some(l), Some(e)) => {
            if l == e {
                Verdict::Match
            } else {
                Verdict::Mismatch
            }
        }
        _ => Verdict::Pending,
    };
    Comparison {
        verdict,
        local,
        external,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sum_values_mixed_presence() {
        // {al4c: 2}, {al4c: absent}, {al4c: 1} → sum 3, has value
        let sum = sum_values([Some(2.0), None, Some(1.0)]);
        assert_eq!(sum.total, 3.0);
        assert!(sum.has_value);
        assert_eq!(sum.value(), Some(3.0));
    }

    #[test]
    fn test_sum_values_all_absent_is_absent_not_zero() {
        let sum = sum_values([None, None, None]);
        assert!(!sum.has_value);
        assert_eq!(sum.value(), None);
    }

    #[test]
    fn test_sum_field_over_records() {
        let table = FieldTable::season_2025();
        let a: BTreeMap<String, serde_json::Value> =
            [("al4c".to_string(), json!(2))].into_iter().collect();
        let b: BTreeMap<String, serde_json::Value> =
            [("al4c".to_string(), json!("1"))].into_iter().collect();

        let sum = sum_field([Some(&a), None, Some(&b)], &table, "al4c");
        assert_eq!(sum.value(), Some(3.0));

        let sum = sum_field([Some(&a), None, Some(&b)], &table, "tNet");
        assert_eq!(sum.value(), None);
    }

    #[test]
    fn test_compare_verdicts() {
        use SourceState::*;
        assert_eq!(
            compare(Some(3.0), Some(3.0), Ready, Ready).verdict,
            Verdict::Match
        );
        assert_eq!(
            compare(Some(3.0), Some(4.0), Ready, Ready).verdict,
            Verdict::Mismatch
        );
        assert_eq!(
            compare(Some(3.0), None, Ready, Ready).verdict,
            Verdict::Pending
        );
        assert_eq!(
            compare(None, Some(3.0), Ready, Ready).verdict,
            Verdict::Pending
        );
        assert_eq!(
            compare(Some(3.0), Some(3.0), Ready, Loading).verdict,
            Verdict::Pending
        );
        assert_eq!(
            compare(Some(3.0), Some(3.0), Error, Ready).verdict,
            Verdict::Pending
        );
    }

    #[test]
    fn test_compare_carries_totals_through() {
        let comparison = compare(Some(2.0), Some(5.0), SourceState::Ready, SourceState::Ready);
        assert_eq!(comparison.local, Some(2.0));
        assert_eq!(comparison.external, Some(5.0));
    }
}
