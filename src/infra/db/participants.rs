use async_trait::async_trait;
use serde_json::Value;
use sqlx::types::Json;

use crate::{
    application::repos::{ParticipantsWriteRepo, RepoError},
    cache::{ParticipantSource, SourceError},
    domain::{ParticipantId, ParticipantRecord},
};

use super::{PostgresRepositories, map_source_error, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct ParticipantRow {
    id: i64,
    fields: Json<Value>,
}

impl TryFrom<ParticipantRow> for ParticipantRecord {
    type Error = SourceError;

    fn try_from(row: ParticipantRow) -> Result<Self, Self::Error> {
        ParticipantRecord::from_json_row(ParticipantId::new(row.id), row.fields.0)
            .map_err(|err| SourceError::Decode(err.to_string()))
    }
}

const UPSERT_PARTICIPANT: &str = r#"
    INSERT INTO participants (id, fields)
    VALUES ($1, $2)
    ON CONFLICT (id) DO UPDATE
        SET fields = EXCLUDED.fields,
            updated_at = now()
"#;

#[async_trait]
impl ParticipantSource for PostgresRepositories {
    async fn fetch_range(
        &self,
        first: i64,
        last: i64,
    ) -> Result<Vec<ParticipantRecord>, SourceError> {
        let rows = sqlx::query_as::<_, ParticipantRow>(
            r#"
            SELECT id, fields
            FROM participants
            WHERE id >= $1 AND id <= $2
            ORDER BY id ASC
            "#,
        )
        .bind(first)
        .bind(last)
        .fetch_all(self.pool())
        .await
        .map_err(map_source_error)?;

        rows.into_iter().map(ParticipantRecord::try_from).collect()
    }
}

#[async_trait]
impl ParticipantsWriteRepo for PostgresRepositories {
    async fn upsert_participant(&self, record: &ParticipantRecord) -> Result<(), RepoError> {
        sqlx::query(UPSERT_PARTICIPANT)
            .bind(record.id.get())
            .bind(Json(record.fields_json()))
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn delete_participant(&self, id: ParticipantId) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM participants WHERE id = $1")
            .bind(id.get())
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn upsert_participants(&self, records: &[ParticipantRecord]) -> Result<u64, RepoError> {
        let mut tx = self.begin().await.map_err(map_sqlx_error)?;
        let mut written = 0;
        for record in records {
            let result = sqlx::query(UPSERT_PARTICIPANT)
                .bind(record.id.get())
                .bind(Json(record.fields_json()))
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;
            written += result.rows_affected();
        }
        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(written)
    }
}
