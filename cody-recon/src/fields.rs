//! Season field table
//!
//! Which JSON keys count as score-component fields (and under which spelling
//! variants) is tied to one season's game rules. The walker and extractor
//! take the table as an argument rather than consulting a hard-coded list,
//! so an operator can supply a different table for another season via TOML.
//!
//! Alias lists are ordered: the canonical name first, then variants. Matching
//! is exact on the listed spellings.

use cody_common::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// One score-component field and its accepted spelling variants
#[derive(Debug, Clone, Deserialize)]
pub struct FieldSpec {
    /// Canonical field name (e.g. "aNet")
    pub name: String,
    /// Accepted variant spellings, in priority order
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl FieldSpec {
    fn matches(&self, key: &str) -> bool {
        self.name == key || self.aliases.iter().any(|a| a == key)
    }
}

/// Season-specific allow-list of score-component and endgame field names
#[derive(Debug, Clone)]
pub struct FieldTable {
    fields: Vec<FieldSpec>,
    endgame: Vec<String>,
}

impl FieldTable {
    /// Built-in table for the 2025 game
    ///
    /// Auto/teleop coral per reef level, algae in net and processor, plus the
    /// endgame cage state.
    pub fn season_2025() -> Self {
        fn spec(name: &str, aliases: &[&str]) -> FieldSpec {
            FieldSpec {
                name: name.to_string(),
                aliases: aliases.iter().map(|a| a.to_string()).collect(),
            }
        }

        Self {
            fields: vec![
                spec("al1c", &["a_l1_coral"]),
                spec("al2c", &["a_l2_coral"]),
                spec("al3c", &["a_l3_coral"]),
                spec("al4c", &["a_l4_coral"]),
                spec("tl1c", &["t_l1_coral"]),
                spec("tl2c", &["t_l2_coral"]),
                spec("tl3c", &["t_l3_coral"]),
                spec("tl4c", &["t_l4_coral"]),
                spec("aNet", &["anet", "a_net"]),
                spec("aProc", &["aproc", "a_proc"]),
                spec("tNet", &["tnet", "t_net"]),
                spec("tProc", &["tproc", "t_proc"]),
            ],
            endgame: vec![
                "endgame".to_string(),
                "endGame".to_string(),
                "end_game".to_string(),
                "cageState".to_string(),
                "cage_state".to_string(),
            ],
        }
    }

    /// Load a field table from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }

    /// Parse a field table from a TOML string
    ///
    /// Format:
    /// ```toml
    /// endgame = ["endgame", "cageState"]
    ///
    /// [[field]]
    /// name = "aNet"
    /// aliases = ["anet", "a_net"]
    /// ```
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        #[derive(Deserialize)]
        struct RawTable {
            #[serde(default)]
            endgame: Vec<String>,
            #[serde(default, rename = "field")]
            fields: Vec<FieldSpec>,
        }

        let raw: RawTable = toml::from_str(contents)
            .map_err(|e| Error::Config(format!("Invalid field table: {}", e)))?;
        if raw.fields.is_empty() {
            return Err(Error::Config(
                "Field table must define at least one [[field]]".to_string(),
            ));
        }
        Ok(Self {
            fields: raw.fields,
            endgame: raw.endgame,
        })
    }

    /// Ordered spellings for a field, canonical name first
    ///
    /// The requested name may itself be any listed spelling.
    pub fn spellings(&self, field: &str) -> Option<impl Iterator<Item = &str>> {
        self.fields
            .iter()
            .find(|f| f.matches(field))
            .map(|f| std::iter::once(f.name.as_str()).chain(f.aliases.iter().map(|a| a.as_str())))
    }

    /// Endgame field spellings, in priority order
    pub fn endgame_spellings(&self) -> impl Iterator<Item = &str> {
        self.endgame.iter().map(|s| s.as_str())
    }

    /// Canonical score-component field names, in table order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Whether a JSON key names a score-component field under any spelling
    pub fn is_score_key(&self, key: &str) -> bool {
        self.fields.iter().any(|f| f.matches(key))
    }

    /// Whether a JSON key names the endgame field under any spelling
    pub fn is_endgame_key(&self, key: &str) -> bool {
        self.endgame.iter().any(|a| a == key)
    }

    /// Whether a JSON key names any recognized domain field
    ///
    /// Used by the walker to reject generic wrapper objects that happen to
    /// carry a complete key context but no actual data.
    pub fn is_domain_key(&self, key: &str) -> bool {
        self.is_score_key(key) || self.is_endgame_key(key)
    }
}

impl Default for FieldTable {
    fn default() -> Self {
        Self::season_2025()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spellings_ordered_canonical_first() {
        let table = FieldTable::season_2025();
        let spellings: Vec<&str> = table.spellings("aNet").unwrap().collect();
        assert_eq!(spellings, vec!["aNet", "anet", "a_net"]);
    }

    #[test]
    fn test_spellings_resolves_variant_names() {
        let table = FieldTable::season_2025();
        let spellings: Vec<&str> = table.spellings("a_net").unwrap().collect();
        assert_eq!(spellings[0], "aNet");
        assert!(table.spellings("nosuchfield").is_none());
    }

    #[test]
    fn test_domain_key_detection() {
        let table = FieldTable::season_2025();
        assert!(table.is_domain_key("al4c"));
        assert!(table.is_domain_key("cageState"));
        assert!(!table.is_domain_key("matchNumber"));
        assert!(!table.is_domain_key("data"));
    }

    #[test]
    fn test_from_toml() {
        let table = FieldTable::from_toml_str(
            r#"
            endgame = ["finalState"]

            [[field]]
            name = "notesHigh"
            aliases = ["notes_high"]

            [[field]]
            name = "notesLow"
            "#,
        )
        .unwrap();
        assert!(table.is_score_key("notes_high"));
        assert!(table.is_endgame_key("finalState"));
        assert!(!table.is_score_key("al4c"));
    }

    #[test]
    fn test_load_from_file() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[[field]]\nname = \"notesHigh\"").unwrap();
        let table = FieldTable::load(file.path()).unwrap();
        assert!(table.is_score_key("notesHigh"));
        assert!(FieldTable::load(std::path::Path::new("/nonexistent.toml")).is_err());
    }

    #[test]
    fn test_empty_table_rejected() {
        assert!(FieldTable::from_toml_str("endgame = [\"x\"]").is_err());
    }
}
