//! Reference Table Loading and Indexing
//!
//! Loads the level-threshold record list (JSON array) once at startup and
//! keeps it as an immutable typed table, indexed by
//! (age bracket, gender, event, distance).
//!
//! Source rows use Japanese keys:
//! `年齢` bracket label, `性別` gender, `種目` event, `距離` distance,
//! `タイム` raw time, `級` level.

use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::utils::age_category::{find_bracket, parse_brackets, AgeBracket};
use crate::utils::time_parsing::{try_convert_raw_time, SENTINEL_TIME};

/// One row of the reference table, with time already in canonical seconds
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceRecord {
    pub age_bracket: String,
    pub gender: String,
    pub event: String,
    pub distance: String,
    pub time: f64,
    pub level: u32,
}

impl ReferenceRecord {
    pub fn group_key(&self) -> GroupKey {
        GroupKey::new(&self.age_bracket, &self.gender, &self.event, &self.distance)
    }

    /// Whether the row carries a usable threshold
    ///
    /// Sentinel-time rows and level 0 rows never rank.
    pub fn has_threshold(&self) -> bool {
        self.time > SENTINEL_TIME && self.level > 0
    }
}

/// Lookup key for one threshold group
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupKey {
    pub age_bracket: String,
    pub gender: String,
    pub event: String,
    pub distance: String,
}

impl GroupKey {
    pub fn new(age_bracket: &str, gender: &str, event: &str, distance: &str) -> Self {
        GroupKey {
            age_bracket: age_bracket.to_string(),
            gender: gender.to_string(),
            event: event.to_string(),
            distance: distance.to_string(),
        }
    }
}

/// Field that the source may store either as text or as a JSON number
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Number(serde_json::Number),
}

impl TextOrNumber {
    /// Render as text; integral numbers lose any fraction ("50", not "50.0")
    fn into_text(self) -> String {
        match self {
            TextOrNumber::Text(s) => s.trim().to_string(),
            TextOrNumber::Number(n) => match (n.as_u64(), n.as_f64()) {
                (Some(v), _) => v.to_string(),
                (None, Some(f)) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
                _ => n.to_string(),
            },
        }
    }
}

/// Row exactly as stored in the source file
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(rename = "年齢")]
    age_bracket: String,
    #[serde(rename = "性別")]
    gender: String,
    #[serde(rename = "種目")]
    event: String,
    #[serde(rename = "距離")]
    distance: TextOrNumber,
    #[serde(rename = "タイム", default)]
    time: Option<TextOrNumber>,
    #[serde(rename = "級")]
    level: TextOrNumber,
}

/// Immutable reference table
///
/// Built once, then only read. Rows whose raw time could not be converted keep
/// the sentinel time and are counted in `dirty_rows`.
#[derive(Debug, Clone, Default)]
pub struct LevelTable {
    records: Vec<ReferenceRecord>,

    /// GroupKey → row indices into `records`
    groups: FxHashMap<GroupKey, Vec<usize>>,

    /// Distinct parsable bracket labels, ordered by start age
    age_brackets: Vec<AgeBracket>,

    dirty_rows: usize,
}

impl LevelTable {
    /// Load the reference table from a JSON file
    ///
    /// Missing files and invalid JSON are fatal.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read reference records: {:?}", path))?;

        let table = Self::from_json_str(&contents)
            .with_context(|| format!("Failed to load reference records: {:?}", path))?;

        tracing::info!(
            "Loaded {} reference records ({} groups, {} age brackets, {} dirty rows) from {:?}",
            table.len(),
            table.group_count(),
            table.age_brackets.len(),
            table.dirty_rows,
            path
        );

        Ok(table)
    }

    /// Parse a JSON array of source rows
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: Vec<RawRecord> = serde_json::from_str(json)
            .with_context(|| "Failed to parse reference records JSON")?;

        let mut records = Vec::with_capacity(raw.len());

        for (idx, row) in raw.into_iter().enumerate() {
            let raw_time = row.time.map(TextOrNumber::into_text).unwrap_or_default();
            let time = match try_convert_raw_time(&raw_time) {
                Some(t) => t,
                None => {
                    tracing::warn!("Row {}: unreadable time {:?}, using sentinel", idx, raw_time);
                    SENTINEL_TIME
                }
            };

            let level_text = row.level.into_text();
            let level: u32 = level_text
                .parse()
                .with_context(|| format!("Row {}: invalid level {:?}", idx, level_text))?;
            if level == 0 {
                anyhow::bail!("Row {}: invalid level {:?}, levels start at 1", idx, level_text);
            }

            records.push(ReferenceRecord {
                age_bracket: row.age_bracket.trim().to_string(),
                gender: row.gender.trim().to_string(),
                event: row.event.trim().to_string(),
                distance: row.distance.into_text(),
                time,
                level,
            });
        }

        Ok(Self::from_records(records))
    }

    /// Build the table and its index from already-typed records
    pub fn from_records(records: Vec<ReferenceRecord>) -> Self {
        let mut groups: FxHashMap<GroupKey, Vec<usize>> = FxHashMap::default();
        for (idx, record) in records.iter().enumerate() {
            groups.entry(record.group_key()).or_default().push(idx);
        }

        let labels = distinct_sorted(records.iter().map(|r| r.age_bracket.as_str()));
        let age_brackets = parse_brackets(labels.iter().copied());
        if age_brackets.len() < labels.len() {
            for label in &labels {
                if !age_brackets.iter().any(|b| b.label == *label) {
                    tracing::warn!("Unparsable age bracket label {:?}; its rows are unreachable", label);
                }
            }
        }

        let dirty_rows = records.iter().filter(|r| !r.has_threshold()).count();

        LevelTable {
            records,
            groups,
            age_brackets,
            dirty_rows,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ReferenceRecord] {
        &self.records
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Rows whose time degraded to the sentinel
    pub fn dirty_rows(&self) -> usize {
        self.dirty_rows
    }

    /// All rows of one threshold group (empty when the group is absent)
    pub fn group<'a>(&'a self, key: &GroupKey) -> impl Iterator<Item = &'a ReferenceRecord> + 'a {
        self.groups
            .get(key)
            .map(|indices| indices.as_slice())
            .unwrap_or_default()
            .iter()
            .map(move |&idx| &self.records[idx])
    }

    /// Parsed age brackets, ordered by start age
    pub fn age_brackets(&self) -> &[AgeBracket] {
        &self.age_brackets
    }

    /// Bracket containing `age`, lowest start first
    pub fn resolve_age_bracket(&self, age: u32) -> Option<&AgeBracket> {
        find_bracket(&self.age_brackets, age)
    }

    /// Distinct genders, sorted
    pub fn genders(&self) -> Vec<&str> {
        distinct_sorted(self.records.iter().map(|r| r.gender.as_str()))
    }

    /// Distinct events, sorted
    pub fn events(&self) -> Vec<&str> {
        distinct_sorted(self.records.iter().map(|r| r.event.as_str()))
    }

    /// Distances recorded for an event, in ascending numeric order
    ///
    /// Non-numeric distances sort after numeric ones.
    pub fn available_distances(&self, event: &str) -> Vec<&str> {
        let mut distances = distinct_sorted(
            self.records
                .iter()
                .filter(|r| r.event == event)
                .map(|r| r.distance.as_str()),
        );
        distances.sort_by_key(|d| (d.parse::<u32>().unwrap_or(u32::MAX), d.to_string()));
        distances
    }

    pub fn has_event(&self, event: &str) -> bool {
        self.records.iter().any(|r| r.event == event)
    }
}

fn distinct_sorted<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut values: Vec<&str> = values.collect();
    values.sort_unstable();
    values.dedup();
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SAMPLE: &str = r#"[
        {"年齢": "25～29", "性別": "男性", "種目": "自由形", "距離": 50, "タイム": "0.36.00", "級": 5},
        {"年齢": "25～29", "性別": "男性", "種目": "自由形", "距離": 50, "タイム": "34.00", "級": 6},
        {"年齢": "25～29", "性別": "男性", "種目": "自由形", "距離": 100, "タイム": "1.20.50", "級": "5"},
        {"年齢": "30〜34", "性別": "女性", "種目": "背泳ぎ", "距離": "50", "タイム": "abc", "級": 4},
        {"年齢": "18～24", "性別": "女性", "種目": "自由形", "距離": 400, "タイム": 300.5, "級": 3}
    ]"#;

    #[test]
    fn test_from_json_str() {
        let table = LevelTable::from_json_str(SAMPLE).unwrap();

        assert_eq!(table.len(), 5);
        assert_eq!(table.group_count(), 4);
        assert_eq!(table.dirty_rows(), 1);

        let first = &table.records()[0];
        assert_eq!(first.distance, "50");
        assert_relative_eq!(first.time, 36.0);
        assert_eq!(first.level, 5);

        assert_relative_eq!(table.records()[2].time, 80.5, epsilon = 1e-9);
        assert_eq!(table.records()[2].level, 5);
        assert_eq!(table.records()[3].time, SENTINEL_TIME);
        assert!(!table.records()[3].has_threshold());
        assert_relative_eq!(table.records()[4].time, 300.5);
    }

    #[test]
    fn test_group_index() {
        let table = LevelTable::from_json_str(SAMPLE).unwrap();

        let key = GroupKey::new("25～29", "男性", "自由形", "50");
        let levels: Vec<u32> = table.group(&key).map(|r| r.level).collect();
        assert_eq!(levels, vec![5, 6]);

        let missing = GroupKey::new("25～29", "男性", "自由形", "1500");
        assert_eq!(table.group(&missing).count(), 0);
    }

    #[test]
    fn test_options() {
        let table = LevelTable::from_json_str(SAMPLE).unwrap();

        assert_eq!(table.genders(), vec!["女性", "男性"]);
        assert_eq!(table.events().len(), 2);
        assert_eq!(table.available_distances("自由形"), vec!["50", "100", "400"]);
        assert!(table.available_distances("バタフライ").is_empty());
        assert!(table.has_event("背泳ぎ"));
        assert!(!table.has_event("バタフライ"));
    }

    #[test]
    fn test_age_brackets() {
        let table = LevelTable::from_json_str(SAMPLE).unwrap();

        let labels: Vec<&str> = table.age_brackets().iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["18～24", "25～29", "30〜34"]);
        assert_eq!(table.resolve_age_bracket(32).map(|b| b.label.as_str()), Some("30〜34"));
        assert!(table.resolve_age_bracket(17).is_none());
    }

    #[test]
    fn test_invalid_level_is_fatal() {
        let json = r#"[{"年齢": "25～29", "性別": "男性", "種目": "自由形", "距離": 50, "タイム": "36.00", "級": "five"}]"#;
        let err = LevelTable::from_json_str(json).unwrap_err();
        assert!(format!("{:#}", err).contains("invalid level"));
    }

    #[test]
    fn test_zero_level_is_fatal() {
        let json = r#"[{"年齢": "25～29", "性別": "男性", "種目": "自由形", "距離": 50, "タイム": "36.00", "級": 0}]"#;
        let err = LevelTable::from_json_str(json).unwrap_err();
        assert!(format!("{:#}", err).contains("invalid level"));
    }

    #[test]
    fn test_zero_level_record_never_ranks() {
        let zero = ReferenceRecord {
            age_bracket: "25～29".to_string(),
            gender: "男性".to_string(),
            event: "自由形".to_string(),
            distance: "50".to_string(),
            time: 36.0,
            level: 0,
        };
        assert!(!zero.has_threshold());
        assert_eq!(LevelTable::from_records(vec![zero]).dirty_rows(), 1);
    }

    #[test]
    fn test_invalid_json_is_fatal() {
        assert!(LevelTable::from_json_str("{not json").is_err());
        assert!(LevelTable::load("/nonexistent/all_records.json").is_err());
    }

    #[test]
    fn test_missing_time_is_dirty() {
        let json = r#"[{"年齢": "25～29", "性別": "男性", "種目": "自由形", "距離": 50, "級": 1}]"#;
        let table = LevelTable::from_json_str(json).unwrap();
        assert_eq!(table.dirty_rows(), 1);
        assert_eq!(table.records()[0].time, SENTINEL_TIME);
    }
}
