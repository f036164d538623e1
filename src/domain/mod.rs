//! Participant domain types.

pub mod error;
pub mod record;

pub use error::DomainError;
pub use record::{FieldValue, ParticipantId, ParticipantRecord};
