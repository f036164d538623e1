//! Cache key definitions.
//!
//! Defines `GroupIndex` for id partitions and `CacheKey` for store entries.

use std::fmt;
use std::num::NonZeroU64;

use crate::domain::ParticipantId;

/// Partition of the id space holding `group_size` consecutive ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupIndex(i64);

impl GroupIndex {
    pub const fn new(index: i64) -> Self {
        Self(index)
    }

    pub const fn get(self) -> i64 {
        self.0
    }

    /// Group owning `id`: `floor(id / group_size)`.
    pub fn of(id: ParticipantId, group_size: NonZeroU64) -> Self {
        Self(id.get().div_euclid(size_as_i64(group_size)))
    }

    /// First and last id covered by this group, both inclusive.
    ///
    /// The outermost groups are clamped to the `i64` bounds, so every id
    /// falls inside the bounds of its own group.
    pub fn bounds(self, group_size: NonZeroU64) -> (i64, i64) {
        let size = size_as_i64(group_size);
        let first = self.0.saturating_mul(size);
        let last = self
            .0
            .checked_add(1)
            .and_then(|next| next.checked_mul(size))
            .map_or(i64::MAX, |next_first| next_first - 1);
        (first, last)
    }
}

impl fmt::Display for GroupIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn size_as_i64(group_size: NonZeroU64) -> i64 {
    i64::try_from(group_size.get()).unwrap_or(i64::MAX)
}

/// Entries the cache keeps in the key/value store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// All records of one group.
    GroupSnapshot(GroupIndex),
    /// The shared group -> stale flag map.
    Staleness,
}

impl CacheKey {
    /// Deterministic store key under `prefix`.
    pub fn render(&self, prefix: &str) -> String {
        match self {
            Self::GroupSnapshot(index) => format!("{prefix}_participant_cache_{index}"),
            Self::Staleness => format!("{prefix}_cache_staleness"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(value: u64) -> NonZeroU64 {
        NonZeroU64::new(value).expect("non-zero size")
    }

    #[test]
    fn group_index_is_floor_division() {
        let hundred = size(100);
        assert_eq!(GroupIndex::of(ParticipantId::new(0), hundred), GroupIndex::new(0));
        assert_eq!(GroupIndex::of(ParticipantId::new(99), hundred), GroupIndex::new(0));
        assert_eq!(GroupIndex::of(ParticipantId::new(100), hundred), GroupIndex::new(1));
        assert_eq!(GroupIndex::of(ParticipantId::new(250), hundred), GroupIndex::new(2));
        assert_eq!(GroupIndex::of(ParticipantId::new(-1), hundred), GroupIndex::new(-1));
    }

    #[test]
    fn every_id_lies_inside_its_group_bounds() {
        for group_size in [1, 3, 7, 100] {
            for raw in -500..500 {
                let id = ParticipantId::new(raw);
                let (first, last) = GroupIndex::of(id, size(group_size)).bounds(size(group_size));
                assert!(first <= raw && raw <= last, "id {raw} outside [{first}, {last}]");
                assert_eq!(last - first + 1, group_size as i64);
            }
        }
    }

    #[test]
    fn outermost_groups_reach_the_i64_bounds() {
        let hundred = size(100);
        for raw in [i64::MAX, i64::MAX - 1, i64::MIN, i64::MIN + 1] {
            let (first, last) = GroupIndex::of(ParticipantId::new(raw), hundred).bounds(hundred);
            assert!(first <= raw && raw <= last, "id {raw} outside [{first}, {last}]");
        }

        let top = GroupIndex::of(ParticipantId::new(i64::MAX), hundred);
        assert_eq!(top.bounds(hundred), (9_223_372_036_854_775_800, i64::MAX));

        let bottom = GroupIndex::of(ParticipantId::new(i64::MIN), hundred);
        assert_eq!(bottom.bounds(hundred), (i64::MIN, -9_223_372_036_854_775_801));
    }

    #[test]
    fn rendered_keys_are_namespaced() {
        assert_eq!(
            CacheKey::GroupSnapshot(GroupIndex::new(4)).render("pdb"),
            "pdb_participant_cache_4"
        );
        assert_eq!(CacheKey::Staleness.render("pdb"), "pdb_cache_staleness");
        assert_ne!(
            CacheKey::GroupSnapshot(GroupIndex::new(1)).render("a"),
            CacheKey::GroupSnapshot(GroupIndex::new(1)).render("b")
        );
    }
}
