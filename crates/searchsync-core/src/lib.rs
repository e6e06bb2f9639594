//! Core runtime for searchsync: the path model, the bootstrap-compiled
//! reindexing resolver graph, the per-batch collector, and the ergonomics
//! exported via the `prelude`.
#![warn(unreachable_pub)]

pub mod collector;
pub mod dirty;
pub mod error;
pub mod instance;
pub mod metadata;
pub mod obs;
pub mod path;
pub mod resolver;
pub mod typeinfo;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, builders, sinks, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        collector::{ReindexTrigger, ReindexingCollector},
        instance::{EntityIdentity, EntityInstance, EntityRef, IdentityKey, PropertyValue},
        path::{DependencyPath, DirtyPathSet, PathFilter, PathOrdinal},
        resolver::TypeManagerContainer,
        typeinfo::EntityTypeId,
    };
}
