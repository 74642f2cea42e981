//! Composite-key lookup over discovered records
//!
//! [`Lookup::build`] indexes the walker's output by composite key with
//! first-writer-wins semantics: under the fixed breadth-first order, the
//! first record discovered for a key is retained and later duplicates are
//! ignored. Rebuilding from the same input therefore reproduces the same
//! table.
//!
//! [`LookupCache`] memoizes lookups per payload identity: the same
//! `Arc<Value>` gets the same `Arc<Lookup>` back without a rebuild, while a
//! structurally-identical payload behind a different `Arc` triggers a full
//! rebuild. Entries hold only a `Weak` payload reference and are pruned once
//! the payload itself is dropped, so stale payloads do not pin their derived
//! tables.

use crate::fields::FieldTable;
use crate::walker::{self, ReconciledRecord};
use cody_common::types::{Alliance, MatchLevel};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

/// Map from composite key to the first record discovered for it
#[derive(Debug, Default)]
pub struct Lookup {
    entries: HashMap<String, ReconciledRecord>,
}

impl Lookup {
    /// Build the lookup by walking a payload
    pub fn build(root: &Value, table: &FieldTable) -> Self {
        let mut entries: HashMap<String, ReconciledRecord> = HashMap::new();
        let mut duplicates = 0usize;
        for record in walker::collect_records(root, table) {
            if entries.contains_key(&record.key) {
                duplicates += 1;
                continue;
            }
            entries.insert(record.key.clone(), record);
        }
        if duplicates > 0 {
            tracing::debug!(duplicates, "Ignored duplicate records (first writer wins)");
        }
        Self { entries }
    }

    /// Look up by raw composite key string
    pub fn get(&self, key: &str) -> Option<&ReconciledRecord> {
        self.entries.get(key)
    }

    /// Look up one team's record for one match
    pub fn find_team(
        &self,
        level: &MatchLevel,
        number: u32,
        team: u32,
    ) -> Option<&ReconciledRecord> {
        self.get(&crate::normalizer::team_key(level, number, team))
    }

    /// Look up one alliance's record for one match
    pub fn find_alliance(
        &self,
        level: &MatchLevel,
        number: u32,
        alliance: Alliance,
    ) -> Option<&ReconciledRecord> {
        self.get(&crate::normalizer::alliance_key(level, number, alliance))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All composite keys, in arbitrary order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }
}

struct CacheEntry {
    payload: Weak<Value>,
    lookup: Arc<Lookup>,
}

/// Identity-keyed memoization of [`Lookup`] tables
///
/// Keyed by `Arc` pointer identity; an address hit is validated by upgrading
/// the weak reference and comparing pointers, so a recycled allocation at the
/// same address cannot serve a stale table.
pub struct LookupCache {
    table: FieldTable,
    entries: Mutex<HashMap<usize, CacheEntry>>,
}

impl LookupCache {
    pub fn new(table: FieldTable) -> Self {
        Self {
            table,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// The lookup for a payload, built on first sight and cached thereafter
    pub fn lookup(&self, payload: &Arc<Value>) -> Arc<Lookup> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        entries.retain(|_, entry| entry.payload.strong_count() > 0);

        let address = Arc::as_ptr(payload) as usize;
        if let Some(entry) = entries.get(&address) {
            if let Some(live) = entry.payload.upgrade() {
                if Arc::ptr_eq(&live, payload) {
                    tracing::trace!(address, "Lookup cache hit");
                    return Arc::clone(&entry.lookup);
                }
            }
        }

        tracing::debug!(address, "Lookup cache miss, building table");
        let lookup = Arc::new(Lookup::build(payload, &self.table));
        entries.insert(
            address,
            CacheEntry {
                payload: Arc::downgrade(payload),
                lookup: Arc::clone(&lookup),
            },
        );
        lookup
    }

    /// Number of live cache entries
    pub fn len(&self) -> usize {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.retain(|_, entry| entry.payload.strong_count() > 0);
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn table(&self) -> &FieldTable {
        &self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> Value {
        json!({
            "matchLevel": "qm",
            "matchNumber": 7,
            "alliances": {
                "Red": { "al4c": 2, "al3c": 1 },
                "Blue": { "al4c": 1 }
            }
        })
    }

    #[test]
    fn test_build_and_find() {
        let table = FieldTable::season_2025();
        let lookup = Lookup::build(&payload(), &table);
        assert_eq!(lookup.len(), 2);

        let level = MatchLevel::parse("QM").unwrap();
        let red = lookup.find_alliance(&level, 7, Alliance::Red).unwrap();
        assert_eq!(red.fields.get("al4c"), Some(&json!(2)));
        assert!(lookup.find_alliance(&level, 8, Alliance::Red).is_none());
    }

    #[test]
    fn test_first_writer_wins_on_duplicate_keys() {
        let table = FieldTable::season_2025();
        let payload = json!([
            { "matchLevel": "qm", "matchNumber": 3, "teamNumber": 254, "aNet": 1 },
            { "matchLevel": "qm", "matchNumber": 3, "teamNumber": 254, "aNet": 9 }
        ]);
        let lookup = Lookup::build(&payload, &table);
        assert_eq!(lookup.len(), 1);
        assert_eq!(
            lookup.get("QM-3-254").unwrap().fields.get("aNet"),
            Some(&json!(1))
        );
    }

    #[test]
    fn test_cache_idempotent_for_same_payload() {
        let cache = LookupCache::new(FieldTable::season_2025());
        let payload = Arc::new(payload());

        let first = cache.lookup(&payload);
        let second = cache.lookup(&payload);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_rebuilds_for_distinct_but_equal_payload() {
        let cache = LookupCache::new(FieldTable::season_2025());
        let a = Arc::new(payload());
        let b = Arc::new(payload());

        let lookup_a = cache.lookup(&a);
        let lookup_b = cache.lookup(&b);
        assert!(!Arc::ptr_eq(&lookup_a, &lookup_b));

        // Same keys and values either way
        let mut keys_a: Vec<&str> = lookup_a.keys().collect();
        let mut keys_b: Vec<&str> = lookup_b.keys().collect();
        keys_a.sort_unstable();
        keys_b.sort_unstable();
        assert_eq!(keys_a, keys_b);
        for key in keys_a {
            assert_eq!(lookup_a.get(key), lookup_b.get(key));
        }
    }

    #[test]
    fn test_cache_prunes_dropped_payloads() {
        let cache = LookupCache::new(FieldTable::season_2025());
        let payload = Arc::new(payload());
        let _lookup = cache.lookup(&payload);
        assert_eq!(cache.len(), 1);

        drop(payload);
        assert_eq!(cache.len(), 0);
    }
}
