//! System of record seen from the cache.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::ParticipantRecord;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("participant range query failed: {0}")]
    Query(String),
    #[error("participant row could not be decoded: {0}")]
    Decode(String),
}

impl SourceError {
    pub fn query(err: impl std::fmt::Display) -> Self {
        Self::Query(err.to_string())
    }
}

/// Authoritative participant storage.
#[async_trait]
pub trait ParticipantSource: Send + Sync {
    /// Every record with `first <= id <= last`, ascending by id.
    async fn fetch_range(&self, first: i64, last: i64)
    -> Result<Vec<ParticipantRecord>, SourceError>;
}
