use std::collections::BTreeSet;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::application::repos::{ParticipantsWriteRepo, RepoError};
use crate::cache::{GroupIndex, ParticipantCache};
use crate::domain::{ParticipantId, ParticipantRecord};

#[derive(Debug, Error)]
pub enum ParticipantServiceError {
    #[error("{0}")]
    ConstraintViolation(&'static str),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Reads go through the cache; every write marks the touched groups stale.
#[derive(Clone)]
pub struct ParticipantService {
    writer: Arc<dyn ParticipantsWriteRepo>,
    cache: Arc<ParticipantCache>,
}

impl ParticipantService {
    pub fn new(writer: Arc<dyn ParticipantsWriteRepo>, cache: Arc<ParticipantCache>) -> Self {
        Self { writer, cache }
    }

    pub async fn find(&self, id: ParticipantId) -> Option<ParticipantRecord> {
        self.cache.get_participant(id).await
    }

    pub async fn save(&self, record: ParticipantRecord) -> Result<(), ParticipantServiceError> {
        ensure_positive(record.id)?;
        self.writer.upsert_participant(&record).await?;

        // Trigger cache invalidation
        self.cache.is_now_stale(record.id).await;

        Ok(())
    }

    pub async fn delete(&self, id: ParticipantId) -> Result<bool, ParticipantServiceError> {
        let removed = self.writer.delete_participant(id).await?;
        if removed {
            self.cache.is_now_stale(id).await;
        }
        Ok(removed)
    }

    /// Bulk write, e.g. a CSV import. A batch confined to one group flags that
    /// group; a batch spanning several groups flushes the whole staleness map.
    pub async fn import(
        &self,
        records: Vec<ParticipantRecord>,
    ) -> Result<u64, ParticipantServiceError> {
        for record in &records {
            ensure_positive(record.id)?;
        }
        if records.is_empty() {
            return Ok(0);
        }

        let written = self.writer.upsert_participants(&records).await?;

        let groups: BTreeSet<GroupIndex> = records
            .iter()
            .map(|record| self.cache.group_of(record.id))
            .collect();
        if groups.len() > 1 {
            self.cache.make_all_stale().await;
        } else {
            self.cache.is_now_stale(records[0].id).await;
        }

        info!(written, groups = groups.len(), "Participants imported");
        Ok(written)
    }
}

fn ensure_positive(id: ParticipantId) -> Result<(), ParticipantServiceError> {
    if id.get() <= 0 {
        return Err(ParticipantServiceError::ConstraintViolation(
            "participant id must be positive",
        ));
    }
    Ok(())
}
