//! Participant cache.
//!
//! - **Group snapshots**: every record of one id block, stored as one entry
//! - **Staleness map**: one entry flagging which groups must be reloaded
//!
//! ## Configuration
//!
//! Cache behavior is controlled via `participant-cache.toml`:
//!
//! ```toml
//! [cache]
//! group_size = 100
//! ttl_seconds = 86400
//! # ... see config.rs for all options
//! ```

mod config;
mod keys;
mod lock;
pub mod metrics;
mod participant;
mod snapshot;
mod source;
mod staleness;
mod store;

pub use config::CacheConfig;
pub use keys::{CacheKey, GroupIndex};
pub use participant::ParticipantCache;
pub use snapshot::GroupSnapshot;
pub use source::{ParticipantSource, SourceError};
pub use staleness::{StalenessMap, StalenessRegistry};
pub use store::{KvStore, MemoryKvStore, StoreError};
