use thiserror::Error;

use crate::{
    application::participants::ParticipantServiceError, cache::SourceError, config::LoadError,
    infra::error::InfraError,
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] LoadError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Participants(#[from] ParticipantServiceError),
    #[error("resource not found")]
    NotFound,
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    /// Process exit code reported by the binary.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::NotFound => 2,
            AppError::Participants(ParticipantServiceError::ConstraintViolation(_)) => 3,
            AppError::Config(_) | AppError::Infra(InfraError::Configuration { .. }) => 4,
            AppError::Infra(_)
            | AppError::Source(_)
            | AppError::Participants(ParticipantServiceError::Repo(_))
            | AppError::Unexpected(_) => 1,
        }
    }
}
