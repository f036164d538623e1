use crate::application::repos::RepoError;
use crate::cache::{SourceError, StoreError};

pub fn map_sqlx_error(err: sqlx::Error) -> RepoError {
    match err {
        sqlx::Error::PoolTimedOut => RepoError::Timeout,
        sqlx::Error::Database(db) if db.message().starts_with("canceling statement") => {
            RepoError::Timeout
        }
        other => RepoError::from_persistence(other),
    }
}

pub fn map_source_error(err: sqlx::Error) -> SourceError {
    match err {
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            SourceError::Decode(err.to_string())
        }
        other => SourceError::query(other),
    }
}

pub fn map_store_error(err: sqlx::Error) -> StoreError {
    StoreError::unavailable(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_exhaustion_is_a_timeout() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolTimedOut),
            RepoError::Timeout
        ));
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolClosed),
            RepoError::Persistence(_)
        ));
    }

    #[test]
    fn decode_failures_are_not_query_failures() {
        let err = map_source_error(sqlx::Error::Decode("bad jsonb".into()));
        assert!(matches!(err, SourceError::Decode(_)));
        assert!(matches!(
            map_source_error(sqlx::Error::PoolClosed),
            SourceError::Query(_)
        ));
    }
}
