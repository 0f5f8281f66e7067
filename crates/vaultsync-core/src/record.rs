//! Secret record model.
//!
//! A [`SecretRecord`] is the canonical in-memory form of one secret, shared
//! by the remote gateway, the local cache, and both text converters. A
//! [`RecordIndex`] is the key-addressed view of a record sequence.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Prefix of ids synthesized for records that never came from the vault.
pub const LOCAL_ID_PREFIX: &str = "local-";

/// One secret: an opaque id, a unique key, its value, and a free-form note.
///
/// `id` is empty until the remote vault assigns one and is then omitted from
/// JSON output. `note` is always a string; absent or `null` notes read as `""`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretRecord {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub key: String,
    pub value: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub note: String,
}

impl SecretRecord {
    /// Create a record with no id.
    pub fn new(key: impl Into<String>, value: impl Into<String>, note: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            key: key.into(),
            value: value.into(),
            note: note.into(),
        }
    }

    /// Set the id, builder style.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Generate a fresh id for a record created outside the vault.
    pub fn local_id() -> String {
        format!("{LOCAL_ID_PREFIX}{}", uuid::Uuid::new_v4())
    }

    /// Whether the id was synthesized locally rather than assigned by the vault.
    pub fn is_local(&self) -> bool {
        self.id.starts_with(LOCAL_ID_PREFIX)
    }
}

/// Deserialize an optional string, reading `null` as `""`.
///
/// # Errors
///
/// Returns the deserializer's error if the value is neither a string nor `null`.
pub fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// The `{id, key}` pair returned when listing the remote vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretSummary {
    pub id: String,
    pub key: String,
}

/// Key-addressed view over a record sequence.
///
/// Built by applying records in document order with [`RecordIndex::merge`]:
/// a record whose key is already present replaces the earlier one, so the
/// last record for a key wins. Iteration is in key order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RecordIndex {
    entries: BTreeMap<String, SecretRecord>,
}

impl RecordIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from records in document order (last write wins).
    pub fn from_records(records: impl IntoIterator<Item = SecretRecord>) -> Self {
        let mut index = Self::new();
        for record in records {
            if let Some(replaced) = index.merge(record) {
                tracing::debug!(key = %replaced.key, "duplicate key, later record wins");
            }
        }
        index
    }

    /// Apply one record, returning the record it replaced, if any.
    pub fn merge(&mut self, record: SecretRecord) -> Option<SecretRecord> {
        self.entries.insert(record.key.clone(), record)
    }

    pub fn get(&self, key: &str) -> Option<&SecretRecord> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SecretRecord)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<SecretRecord> for RecordIndex {
    fn from_iter<I: IntoIterator<Item = SecretRecord>>(iter: I) -> Self {
        Self::from_records(iter)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn note_defaults_to_empty_when_absent_or_null() {
        let absent: SecretRecord =
            serde_json::from_str(r#"{"id":"1","key":"A","value":"x"}"#).unwrap();
        let null: SecretRecord =
            serde_json::from_str(r#"{"id":"1","key":"A","value":"x","note":null}"#).unwrap();
        assert_eq!(absent.note, "");
        assert_eq!(null.note, "");
    }

    #[test]
    fn empty_id_is_omitted_from_json() {
        let record = SecretRecord::new("MYAPP/DEV/API_KEY", "abc", "");
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("id").is_none());
        assert_eq!(json["key"], "MYAPP/DEV/API_KEY");
        assert_eq!(json["note"], "");
    }

    #[test]
    fn local_ids_are_unique_and_prefixed() {
        let a = SecretRecord::local_id();
        let b = SecretRecord::local_id();
        assert_ne!(a, b);
        assert!(a.starts_with("local-"));
        assert!(SecretRecord::new("K", "v", "").with_id(a).is_local());
    }

    #[test]
    fn index_last_write_wins() {
        let index = RecordIndex::from_records(vec![
            SecretRecord::new("DB", "old", "").with_id("1"),
            SecretRecord::new("API", "k", "").with_id("2"),
            SecretRecord::new("DB", "new", "").with_id("3"),
        ]);

        assert_eq!(index.len(), 2);
        let db = index.get("DB").unwrap();
        assert_eq!(db.value, "new");
        assert_eq!(db.id, "3");
    }

    #[test]
    fn merge_returns_replaced_record() {
        let mut index = RecordIndex::new();
        assert!(index.merge(SecretRecord::new("K", "1", "")).is_none());
        let replaced = index.merge(SecretRecord::new("K", "2", "")).unwrap();
        assert_eq!(replaced.value, "1");
    }

    #[test]
    fn index_serializes_as_object_keyed_by_name() {
        let index: RecordIndex = vec![
            SecretRecord::new("B", "2", "").with_id("b"),
            SecretRecord::new("A", "1", "").with_id("a"),
        ]
        .into_iter()
        .collect();
        let json = serde_json::to_value(&index).unwrap();
        assert_eq!(json["A"]["value"], "1");
        assert_eq!(json["B"]["id"], "b");
        assert_eq!(index.keys().collect::<Vec<_>>(), vec!["A", "B"]);
    }
}
