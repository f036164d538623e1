//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{ParticipantId, ParticipantRecord};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Mutations against the participant system of record.
#[async_trait]
pub trait ParticipantsWriteRepo: Send + Sync {
    /// Insert the record or replace the field map of an existing one.
    async fn upsert_participant(&self, record: &ParticipantRecord) -> Result<(), RepoError>;

    /// Returns whether a row was removed.
    async fn delete_participant(&self, id: ParticipantId) -> Result<bool, RepoError>;

    /// Upsert many records in one transaction, returning the number written.
    async fn upsert_participants(&self, records: &[ParticipantRecord]) -> Result<u64, RepoError>;
}
