//! Persisted progress: a sparse, status-only projection of the display tree.
//!
//! Stored blobs may come from older catalogs or be hand-edited, so reading is
//! lenient at every depth: a field that is missing or has the wrong shape means
//! "no override" rather than an error. Only a blob that is not a JSON object at
//! all is rejected, and callers treat that the same as an empty snapshot.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::model::ids::TopicId;
use crate::model::status::ProgressStatus;

pub type ProgressEntries = BTreeMap<TopicId, ProgressEntry>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SnapshotError {
    #[error("snapshot is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("snapshot root must be a JSON object")]
    NotAnObject,
}

/// Override for a single topic plus overrides for its descendants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProgressEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<ProgressStatus>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    children: ProgressEntries,
}

impl ProgressEntry {
    #[must_use]
    pub fn new(status: Option<ProgressStatus>) -> Self {
        Self {
            status,
            children: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_status(status: ProgressStatus) -> Self {
        Self::new(Some(status))
    }

    #[must_use]
    pub fn with_child(mut self, id: TopicId, entry: ProgressEntry) -> Self {
        self.children.insert(id, entry);
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: ProgressEntries) -> Self {
        self.children = children;
        self
    }

    #[must_use]
    pub fn status(&self) -> Option<ProgressStatus> {
        self.status
    }

    #[must_use]
    pub fn children(&self) -> &ProgressEntries {
        &self.children
    }

    fn from_value(value: &Value) -> Self {
        let Some(fields) = value.as_object() else {
            return Self::default();
        };
        let status = fields
            .get("status")
            .and_then(Value::as_str)
            .and_then(|label| label.parse().ok());
        let children = fields
            .get("children")
            .and_then(Value::as_object)
            .map(entries_from_map)
            .unwrap_or_default();
        Self { status, children }
    }
}

impl<'de> Deserialize<'de> for ProgressEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

fn entries_from_map(map: &Map<String, Value>) -> ProgressEntries {
    map.iter()
        .filter_map(|(key, value)| {
            // Keys are matched verbatim; only the empty key is unusable.
            let id = TopicId::new(key.as_str()).ok()?;
            Some((id, ProgressEntry::from_value(value)))
        })
        .collect()
}

/// The whole persisted unit, keyed by top-level topic id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ProgressSnapshot {
    entries: ProgressEntries,
}

impl ProgressSnapshot {
    /// An empty snapshot: no progress recorded yet.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_entries(entries: ProgressEntries) -> Self {
        Self { entries }
    }

    /// Parse a stored blob.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError::Parse` for invalid JSON and
    /// `SnapshotError::NotAnObject` when the root is not an object.
    pub fn parse(text: &str) -> Result<Self, SnapshotError> {
        let value: Value = serde_json::from_str(text)?;
        let map = value.as_object().ok_or(SnapshotError::NotAnObject)?;
        Ok(Self {
            entries: entries_from_map(map),
        })
    }

    /// Serialize for storage. Absent statuses and empty children are omitted.
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    #[must_use]
    pub fn entries(&self) -> &ProgressEntries {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ProgressEntry> {
        self.entries.get(id)
    }

    pub fn insert(&mut self, id: TopicId, entry: ProgressEntry) {
        self.entries.insert(id, entry);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'de> Deserialize<'de> for ProgressSnapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let map = value
            .as_object()
            .ok_or_else(|| serde::de::Error::custom(SnapshotError::NotAnObject))?;
        Ok(Self {
            entries: entries_from_map(map),
        })
    }
}
