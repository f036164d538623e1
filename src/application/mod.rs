//! Application services on top of the cache and repositories.

pub mod error;
pub mod participants;
pub mod repos;
