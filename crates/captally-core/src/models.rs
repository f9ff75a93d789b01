// Rust guideline compliant 2026-10-17

//! Core data models for Captally.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Entity name used for entries that carry no `name` field.
pub const UNKNOWN_NAME: &str = "unknown";

/// Date buckets of a single entity, keyed by `YYYY-MM-DD`.
pub type DateBuckets = BTreeMap<String, Bucket>;

/// A single record read from a source snapshot.
///
/// The full JSON object is kept so that every field, including ones Captally
/// does not interpret, is written back verbatim and in its original order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceEntry(Map<String, Value>);

impl SourceEntry {
    /// Wraps a JSON object as a source entry.
    #[must_use]
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Returns the underlying JSON object.
    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Returns the raw value of a field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the entry timestamp in milliseconds since the Unix epoch.
    ///
    /// Missing, zero and non-numeric timestamps yield `None`; such entries are
    /// not aggregated. Fractional milliseconds are floored.
    #[must_use]
    pub fn timestamp_millis(&self) -> Option<i64> {
        let Value::Number(number) = self.0.get("timestamp")? else {
            return None;
        };

        if let Some(millis) = number.as_i64() {
            return (millis != 0).then_some(millis);
        }
        if number.is_u64() {
            // Beyond i64::MAX, no calendar date exists for it anyway.
            return None;
        }

        let millis = number.as_f64()?;
        if millis == 0.0 || !millis.is_finite() {
            return None;
        }
        let floored = millis.floor();
        if floored < i64::MIN as f64 || floored >= i64::MAX as f64 {
            return None;
        }
        Some(floored as i64)
    }

    /// Returns the entity name the entry is grouped under.
    ///
    /// Missing names resolve to [`UNKNOWN_NAME`]. Scalar non-string names are
    /// rendered the way a JSON object key would be written for them.
    #[must_use]
    pub fn name(&self) -> String {
        match self.0.get("name") {
            Some(Value::String(name)) => name.clone(),
            Some(Value::Null) => "null".to_string(),
            Some(Value::Bool(flag)) => flag.to_string(),
            Some(Value::Number(number)) => number.to_string(),
            Some(Value::Array(_) | Value::Object(_)) | None => UNKNOWN_NAME.to_string(),
        }
    }

    /// Returns the numeric capacity, if the entry has one.
    #[must_use]
    pub fn capacity(&self) -> Option<f64> {
        match self.0.get("capacity")? {
            Value::Number(number) => number.as_f64(),
            _ => None,
        }
    }
}

impl From<Map<String, Value>> for SourceEntry {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

/// Summary statistics replacing a raw bucket once it leaves the retention window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Mean of the numeric `capacity` values, or `None` when there were none.
    #[serde(default)]
    pub average_capacity: Option<f64>,
    /// Number of entries the bucket held, numeric capacity or not.
    pub entry_count: u64,
}

impl Summary {
    /// Summarizes a list of raw entries.
    ///
    /// # Arguments
    ///
    /// * `entries` - The raw entries of one (name, date) bucket
    ///
    /// # Returns
    ///
    /// A summary whose average covers only entries with a numeric capacity.
    #[must_use]
    pub fn from_entries(entries: &[SourceEntry]) -> Self {
        let (total, numeric) = entries
            .iter()
            .filter_map(SourceEntry::capacity)
            .fold((0.0_f64, 0_u64), |(total, count), capacity| {
                (total + capacity, count + 1)
            });

        Self {
            average_capacity: (numeric > 0).then(|| total / numeric as f64),
            entry_count: entries.len() as u64,
        }
    }
}

/// Contents of one (name, date) group.
///
/// Serialized as a JSON array while raw and as an object once compacted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bucket {
    /// Entries in fold order, not yet compacted.
    Raw(Vec<SourceEntry>),
    /// Summary statistics; never reopened.
    Compacted(Summary),
}

impl Bucket {
    /// Returns true if the bucket has been compacted.
    #[must_use]
    pub fn is_compacted(&self) -> bool {
        matches!(self, Bucket::Compacted(_))
    }

    /// Returns the number of entries represented by the bucket.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        match self {
            Bucket::Raw(entries) => entries.len() as u64,
            Bucket::Compacted(summary) => summary.entry_count,
        }
    }
}

impl Default for Bucket {
    fn default() -> Self {
        Bucket::Raw(Vec::new())
    }
}

/// Bookkeeping stored next to the aggregated data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Last revision folded into the aggregate.
    #[serde(rename = "lastCommit", default)]
    pub last_commit: Option<String>,
    /// Unrecognized metadata keys, kept as found.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The persisted, cumulative aggregate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateState {
    /// Cursor and other bookkeeping.
    #[serde(default)]
    pub metadata: Metadata,
    /// Buckets grouped by entity name, then by date.
    #[serde(default)]
    pub data: BTreeMap<String, DateBuckets>,
    /// Unrecognized top-level keys, kept as found.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AggregateState {
    /// Creates an empty aggregate with no processed revision.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the last folded revision, if any.
    #[must_use]
    pub fn last_commit(&self) -> Option<&str> {
        self.metadata.last_commit.as_deref()
    }

    /// Looks up the bucket for an entity on a given date.
    #[must_use]
    pub fn bucket(&self, name: &str, date: &str) -> Option<&Bucket> {
        self.data.get(name)?.get(date)
    }

    /// Returns the number of entities in the aggregate.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.data.len()
    }

    /// Returns `(raw, compacted)` bucket counts across all entities.
    #[must_use]
    pub fn bucket_counts(&self) -> (usize, usize) {
        self.data
            .values()
            .flat_map(BTreeMap::values)
            .fold((0, 0), |(raw, compacted), bucket| {
                if bucket.is_compacted() {
                    (raw, compacted + 1)
                } else {
                    (raw + 1, compacted)
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(value: Value) -> SourceEntry {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_timestamp_accessor() {
        let millis = 1_700_000_000_123_i64;
        assert_eq!(entry(json!({"timestamp": millis})).timestamp_millis(), Some(millis));
        assert_eq!(entry(json!({"timestamp": 1500.9})).timestamp_millis(), Some(1500));
        assert_eq!(entry(json!({"timestamp": -1.5})).timestamp_millis(), Some(-2));
        assert_eq!(entry(json!({"timestamp": 0})).timestamp_millis(), None);
        assert_eq!(entry(json!({"timestamp": null})).timestamp_millis(), None);
        assert_eq!(entry(json!({"timestamp": "1700000000000"})).timestamp_millis(), None);
        assert_eq!(entry(json!({"capacity": 1})).timestamp_millis(), None);
    }

    #[test]
    fn test_name_accessor() {
        assert_eq!(entry(json!({"name": "alpha"})).name(), "alpha");
        assert_eq!(entry(json!({})).name(), UNKNOWN_NAME);
        assert_eq!(entry(json!({"name": null})).name(), "null");
        assert_eq!(entry(json!({"name": 7})).name(), "7");
        assert_eq!(entry(json!({"name": ["a"]})).name(), UNKNOWN_NAME);
    }

    #[test]
    fn test_capacity_accessor() {
        assert_eq!(entry(json!({"capacity": 10})).capacity(), Some(10.0));
        assert_eq!(entry(json!({"capacity": 2.5})).capacity(), Some(2.5));
        assert_eq!(entry(json!({"capacity": "bad"})).capacity(), None);
        assert_eq!(entry(json!({"capacity": true})).capacity(), None);
        assert_eq!(entry(json!({})).capacity(), None);
    }

    #[test]
    fn test_entry_preserves_field_order() {
        let raw = r#"{"zeta":1,"timestamp":5,"alpha":{"nested":true},"name":"n"}"#;
        let parsed: SourceEntry = serde_json::from_str(raw).unwrap();
        assert_eq!(serde_json::to_string(&parsed).unwrap(), raw);
    }

    #[test]
    fn test_summary_from_entries() {
        let entries = vec![
            entry(json!({"capacity": 10})),
            entry(json!({"capacity": 20})),
            entry(json!({"capacity": "bad"})),
        ];
        let summary = Summary::from_entries(&entries);
        assert_eq!(summary.average_capacity, Some(15.0));
        assert_eq!(summary.entry_count, 3);

        let summary = Summary::from_entries(&[entry(json!({"name": "x"}))]);
        assert_eq!(summary.average_capacity, None);
        assert_eq!(summary.entry_count, 1);
    }

    #[test]
    fn test_bucket_shapes() {
        let raw: Bucket = serde_json::from_value(json!([{"capacity": 1}])).unwrap();
        assert!(!raw.is_compacted());
        assert_eq!(raw.entry_count(), 1);

        let compacted: Bucket =
            serde_json::from_value(json!({"average_capacity": null, "entry_count": 4})).unwrap();
        assert_eq!(
            compacted,
            Bucket::Compacted(Summary {
                average_capacity: None,
                entry_count: 4
            })
        );
        assert_eq!(
            serde_json::to_value(&compacted).unwrap(),
            json!({"average_capacity": null, "entry_count": 4})
        );
    }

    #[test]
    fn test_state_defaults_when_keys_missing() {
        let state: AggregateState = serde_json::from_str("{}").unwrap();
        assert_eq!(state, AggregateState::new());

        let state: AggregateState = serde_json::from_str(r#"{"metadata": {}}"#).unwrap();
        assert_eq!(state.last_commit(), None);
    }

    #[test]
    fn test_state_keeps_unknown_keys() {
        let raw = json!({
            "metadata": {"lastCommit": "abc", "owner": "ops"},
            "data": {},
            "schema": 2
        });
        let state: AggregateState = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(state.last_commit(), Some("abc"));
        assert_eq!(serde_json::to_value(&state).unwrap(), raw);
    }
}
