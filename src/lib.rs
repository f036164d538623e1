//! Block-partitioned read-through cache for participant records.
//!
//! Records are grouped into fixed-size blocks of ids. Each block is read from
//! the system of record in a single range query, stored as one snapshot in a
//! key/value store with expiry, and served from there until the block is
//! marked stale or the entry disappears.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
