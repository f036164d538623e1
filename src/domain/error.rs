use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("participant row could not be decoded: {message}")]
    InvalidRow { message: String },
}

impl DomainError {
    pub fn invalid_row(message: impl Into<String>) -> Self {
        Self::InvalidRow {
            message: message.into(),
        }
    }
}
