use crate::{
    instance::{EntityIdentity, EntityRef},
    path::{DependencyPath, DirtyPathSet},
};
use std::collections::{BTreeMap, btree_map};
use std::fmt;

///
/// ReindexingCollector
///
/// Short-lived, per-mutation-batch accumulator of entities whose documents
/// must be re-derived. Deduplicated by entity identity: visiting the same
/// entity through two different paths records it once. The expansion ledger
/// is the cycle guard for the runtime walk, keyed by identity plus the
/// dirty ordinals each expansion carried: a cycle repeating the same
/// ordinal stops, while a revisit through a new ordinal is re-examined, so
/// no reindex obligation is dropped.
///
/// Single-threaded by contract; the enclosing indexing plan serializes
/// access within one unit of work.
///

#[derive(Default)]
pub struct ReindexingCollector {
    expanded: BTreeMap<EntityIdentity, DirtyPathSet>,
    entries: BTreeMap<EntityIdentity, CollectedEntity>,
}

impl ReindexingCollector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that an instance is being expanded with `dirty`. Returns
    /// false when every ordinal of `dirty` was already expanded for this
    /// identity, which stops re-expansion through association cycles.
    pub fn mark_expanded(&mut self, identity: &EntityIdentity, dirty: &DirtyPathSet) -> bool {
        match self.expanded.entry(identity.clone()) {
            btree_map::Entry::Occupied(mut slot) => slot.get_mut().union_with(dirty),
            btree_map::Entry::Vacant(slot) => {
                slot.insert(dirty.clone());
                true
            }
        }
    }

    /// Record one entity to reindex. Returns false when the entity was
    /// already collected; the first trigger wins.
    pub fn collect(&mut self, entity: EntityRef, trigger: ReindexTrigger) -> bool {
        let identity = entity.identity();
        match self.entries.entry(identity) {
            btree_map::Entry::Occupied(_) => false,
            btree_map::Entry::Vacant(slot) => {
                slot.insert(CollectedEntity { entity, trigger });
                true
            }
        }
    }

    #[must_use]
    pub fn contains(&self, identity: &EntityIdentity) -> bool {
        self.entries.contains_key(identity)
    }

    /// Distinct entities to reindex. No cross-entry ordering is promised;
    /// the downstream indexing plan may batch and reorder freely.
    pub fn entries(&self) -> impl Iterator<Item = (&EntityIdentity, &CollectedEntity)> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

///
/// CollectedEntity
///

pub struct CollectedEntity {
    pub entity: EntityRef,
    pub trigger: ReindexTrigger,
}

///
/// ReindexTrigger
/// Why one entity landed in the collector.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ReindexTrigger {
    /// A dirty path on the entity itself intersected its own filter.
    DirtySelf,
    /// A contained entity changed; `via` is the forward association path on
    /// this (containing) entity.
    ContainedChanged { via: DependencyPath },
}

impl fmt::Display for ReindexTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DirtySelf => write!(f, "dirty_self"),
            Self::ContainedChanged { via } => write!(f, "contained_changed:{via}"),
        }
    }
}

///
/// TESTS
///
