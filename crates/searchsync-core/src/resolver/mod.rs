mod build;
mod walk;

#[cfg(test)]
mod tests;

pub use build::ReindexingResolverBuilder;

use crate::{
    dirty::DirtinessFilter,
    error::InternalError,
    metadata::ExtractorChain,
    path::{DependencyPath, DirtyPathSet, PathFilter, PathOrdinal, PathOrdinalTable},
    typeinfo::{EntityTypeId, TypeLattice},
};
use std::{collections::BTreeMap, sync::Arc};

///
/// ReindexingResolver
///
/// Compiled, immutable dependency-graph node for one entity type. Built once
/// at bootstrap from static metadata, then shared read-only across
/// arbitrarily many concurrent mutation-processing threads.
///

#[derive(Debug)]
pub struct ReindexingResolver {
    pub(crate) type_id: EntityTypeId,

    /// If a dirty path on an instance of this type intersects this filter,
    /// the instance itself must be reindexed.
    pub(crate) dirty_self_filter: PathFilter,

    /// Inverse-side edges: how to reach the containing entities whose
    /// documents embed data from this type.
    pub(crate) containing_edges: Vec<Arc<ContainingAssociationEdge>>,
}

impl ReindexingResolver {
    #[must_use]
    pub const fn type_id(&self) -> EntityTypeId {
        self.type_id
    }

    #[must_use]
    pub const fn dirty_self_filter(&self) -> &PathFilter {
        &self.dirty_self_filter
    }

    #[must_use]
    pub fn containing_edges(&self) -> &[Arc<ContainingAssociationEdge>] {
        &self.containing_edges
    }
}

///
/// ContainingAssociationEdge
///
/// One inverse-side edge compiled from an association a containing type
/// declared against this (contained) type. Closes over the inverse path per
/// concrete contained subtype, the container extraction, and the dirtiness
/// filter scoped to the contained side.
///

#[derive(Debug)]
pub struct ContainingAssociationEdge {
    pub(crate) containing_type: EntityTypeId,
    pub(crate) contained_type: EntityTypeId,

    /// Forward path on the containing type; reported as the "why" when the
    /// containing entity is collected.
    pub(crate) forward_path: DependencyPath,

    /// Ordinal of the forward path in the containing hierarchy's table;
    /// becomes the propagated dirty path on the containing side.
    pub(crate) forward_ordinal: PathOrdinal,

    /// Only dirty paths on the contained side that intersect this filter
    /// trigger the edge.
    pub(crate) scoped_filter: PathFilter,

    pub(crate) extraction: ExtractorChain,

    /// Inverse path per concrete contained subtype. Subtypes absent here do
    /// not participate in this edge.
    pub(crate) inverse_paths: BTreeMap<EntityTypeId, DependencyPath>,
}

///
/// TypeManager
///
/// Everything the runtime needs about one entity type: lattice, shared
/// hierarchy ordinal table, compiled resolver, and the dirtiness
/// short-circuit filter.
///

#[derive(Debug)]
pub struct TypeManager {
    pub(crate) lattice: TypeLattice,
    pub(crate) indexed: bool,
    pub(crate) ordinals: Arc<PathOrdinalTable>,
    pub(crate) resolver: ReindexingResolver,
    pub(crate) dirtiness: DirtinessFilter,
}

impl TypeManager {
    #[must_use]
    pub const fn type_id(&self) -> EntityTypeId {
        self.lattice.type_id
    }

    #[must_use]
    pub const fn resolver(&self) -> &ReindexingResolver {
        &self.resolver
    }

    #[must_use]
    pub const fn is_indexed(&self) -> bool {
        self.indexed
    }
}

///
/// TypeManagerContainer
///
/// Constructed-once registry of type managers, passed by reference to every
/// consumer. Exactly one manager per type identifier; lookups are exact or
/// supertype-aware. No global singleton, so teardown and tests stay clean.
///

#[derive(Debug)]
pub struct TypeManagerContainer {
    managers: BTreeMap<EntityTypeId, Arc<TypeManager>>,
}

impl TypeManagerContainer {
    pub(crate) const fn from_managers(managers: BTreeMap<EntityTypeId, Arc<TypeManager>>) -> Self {
        Self { managers }
    }

    /// Exact-type lookup.
    pub fn manager(&self, type_id: EntityTypeId) -> Result<&Arc<TypeManager>, InternalError> {
        self.managers.get(&type_id).ok_or_else(|| {
            InternalError::registry_not_found(format!("no type manager registered: {type_id}"))
        })
    }

    /// Supertype-aware lookup: the exact type's manager followed by the
    /// managers of its ascending supertypes that are part of the mapping.
    pub fn managers_for(
        &self,
        type_id: EntityTypeId,
    ) -> Result<Vec<Arc<TypeManager>>, InternalError> {
        let exact = self.manager(type_id)?;
        let mut chain = Vec::with_capacity(exact.lattice.ascending_supertypes.len());
        for ascending in &exact.lattice.ascending_supertypes {
            if let Some(manager) = self.managers.get(ascending) {
                chain.push(manager.clone());
            }
        }

        Ok(chain)
    }

    /// Build a dirty-path set against the hierarchy table of `type_id`.
    pub fn dirty_paths<'a>(
        &self,
        type_id: EntityTypeId,
        paths: impl IntoIterator<Item = &'a DependencyPath>,
    ) -> Result<DirtyPathSet, InternalError> {
        let manager = self.manager(type_id)?;
        let mut dirty = DirtyPathSet::new();
        for path in paths {
            dirty.insert(manager.ordinals.ordinal_of(path)?);
        }

        Ok(dirty)
    }

    /// True when some changed path is relevant to `type_id` or to any
    /// supertype it shares edges with; callers may skip resolution entirely
    /// when this is false.
    pub fn requires_resolution(
        &self,
        type_id: EntityTypeId,
        dirty: &DirtyPathSet,
    ) -> Result<bool, InternalError> {
        let chain = self.managers_for(type_id)?;

        Ok(chain
            .iter()
            .any(|manager| manager.dirtiness.requires_resolution(dirty)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.managers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.managers.is_empty()
    }
}
