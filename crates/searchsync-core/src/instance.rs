use crate::{
    metadata::ExtractorChain,
    path::DependencyPath,
    typeinfo::EntityTypeId,
};
use std::{fmt, sync::Arc};
use thiserror::Error as ThisError;

/// Shared handle to one live entity instance supplied by the loading
/// collaborator.
pub type EntityRef = Arc<dyn EntityInstance>;

///
/// EntityInstance
///
/// Access seam implemented by the identifier/loading collaborator. The core
/// never reflects over live objects: it only asks for the instance's type,
/// its identity, and the result of dereferencing one inverse path.
///

pub trait EntityInstance {
    /// Concrete type of this instance.
    fn type_id(&self) -> EntityTypeId;

    /// Opaque identity used as the collector's dedup key.
    fn identity(&self) -> EntityIdentity;

    /// Dereference one property path, unwrapping containers as described by
    /// `extraction`. Dereferencing may trigger blocking lazy-loading I/O in
    /// the collaborator.
    fn follow(
        &self,
        path: &DependencyPath,
        extraction: &ExtractorChain,
    ) -> Result<PropertyValue, LoadError>;
}

///
/// PropertyValue
/// Result of dereferencing one inverse path on a live instance.
///

#[derive(Clone, Default)]
pub enum PropertyValue {
    /// Severed or unset association; nothing to walk.
    #[default]
    Missing,
    One(EntityRef),
    Many(Vec<EntityRef>),
}

impl PropertyValue {
    /// Flatten into the zero, one, or many reachable instances.
    #[must_use]
    pub fn into_instances(self) -> Vec<EntityRef> {
        match self {
            Self::Missing => Vec::new(),
            Self::One(entity) => vec![entity],
            Self::Many(entities) => entities,
        }
    }
}

///
/// LoadError
///
/// Failure while dereferencing a path on a live instance. Lazy-load gaps are
/// the one tolerated class: a partially deleted graph legitimately fails to
/// load, and the walk treats that branch as exhausted.
///

#[derive(Clone, Debug, ThisError)]
pub enum LoadError {
    #[error("lazy load failed: {detail}")]
    LazyLoad { detail: String },

    #[error("entity access failed: {detail}")]
    Access { detail: String },
}

impl LoadError {
    #[must_use]
    pub fn lazy_load(detail: impl Into<String>) -> Self {
        Self::LazyLoad {
            detail: detail.into(),
        }
    }

    #[must_use]
    pub fn access(detail: impl Into<String>) -> Self {
        Self::Access {
            detail: detail.into(),
        }
    }

    #[must_use]
    pub const fn is_lazy_load(&self) -> bool {
        matches!(self, Self::LazyLoad { .. })
    }
}

///
/// EntityIdentity
/// (type, identifier) pair keying the collector's dedup set.
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct EntityIdentity {
    pub type_id: EntityTypeId,
    pub key: IdentityKey,
}

impl EntityIdentity {
    #[must_use]
    pub const fn new(type_id: EntityTypeId, key: IdentityKey) -> Self {
        Self { type_id, key }
    }
}

impl fmt::Display for EntityIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.type_id, self.key)
    }
}

///
/// IdentityKey
///
/// Small ordered identifier value. The core treats identifiers as opaque;
/// the variants only exist so identities can key ordered collections.
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum IdentityKey {
    Uint(u64),
    Int(i64),
    Text(String),
    Bytes(Vec<u8>),
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uint(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "{value}"),
            Self::Bytes(value) => write!(f, "0x{}", hex_lower(value)),
        }
    }
}

// Minimal lowercase hex rendering for byte identifiers in diagnostics.
fn hex_lower(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

///
/// TESTS
///
