//! Group snapshots: every record of one group as last read from the source.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{ParticipantId, ParticipantRecord};

use super::keys::GroupIndex;
use super::store::StoreError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSnapshot {
    index: GroupIndex,
    records: BTreeMap<ParticipantId, ParticipantRecord>,
}

/// Stored form; records travel as a list so ids never become JSON map keys.
#[derive(Serialize, Deserialize)]
struct StoredSnapshot {
    group: i64,
    records: Vec<ParticipantRecord>,
}

impl GroupSnapshot {
    /// An empty snapshot is a valid, fresh result for a sparse id range.
    pub fn empty(index: GroupIndex) -> Self {
        Self {
            index,
            records: BTreeMap::new(),
        }
    }

    pub fn from_records(index: GroupIndex, records: Vec<ParticipantRecord>) -> Self {
        let records = records
            .into_iter()
            .map(|record| (record.id, record))
            .collect();
        Self { index, records }
    }

    pub fn index(&self) -> GroupIndex {
        self.index
    }

    pub fn get(&self, id: ParticipantId) -> Option<&ParticipantRecord> {
        self.records.get(&id)
    }

    /// Records in ascending id order.
    pub fn records(&self) -> impl Iterator<Item = &ParticipantRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn to_value(&self) -> Result<Value, StoreError> {
        let stored = StoredSnapshot {
            group: self.index.get(),
            records: self.records.values().cloned().collect(),
        };
        serde_json::to_value(stored).map_err(|err| StoreError::Codec(err.to_string()))
    }

    pub fn from_value(value: Value) -> Result<Self, StoreError> {
        let stored: StoredSnapshot =
            serde_json::from_value(value).map_err(|err| StoreError::Codec(err.to_string()))?;
        Ok(Self::from_records(GroupIndex::new(stored.group), stored.records))
    }
}
