use crate::{
    dirty::DirtinessFilter,
    error::InternalError,
    metadata::EntityTypeMetadata,
    obs::{
        metrics,
        sink::{ResolveTraceEvent, ResolveTraceSink, emit},
    },
    path::{PathFilter, PathOrdinalTable},
    resolver::{
        ContainingAssociationEdge, ReindexingResolver, TypeManager, TypeManagerContainer,
    },
    typeinfo::EntityTypeId,
};
use std::{
    collections::{BTreeMap, btree_map},
    sync::Arc,
};

///
/// ReindexingResolverBuilder
///
/// Single-threaded bootstrap pass compiling collaborator-supplied static
/// metadata into the immutable [`TypeManagerContainer`]. Configuration
/// errors fail the build fast; they are never retried.
///

#[derive(Debug, Default)]
pub struct ReindexingResolverBuilder {
    types: BTreeMap<EntityTypeId, EntityTypeMetadata>,
}

impl ReindexingResolverBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one entity type's metadata. Exactly one registration per
    /// type identifier.
    pub fn register(&mut self, mut metadata: EntityTypeMetadata) -> Result<(), InternalError> {
        metadata.lattice.normalize();
        let type_id = metadata.type_id();
        match self.types.entry(type_id) {
            btree_map::Entry::Occupied(_) => Err(InternalError::metadata_config(format!(
                "duplicate entity type registration: {type_id}"
            ))),
            btree_map::Entry::Vacant(slot) => {
                slot.insert(metadata);
                Ok(())
            }
        }
    }

    /// Compile every registered type into its immutable manager.
    pub fn build(
        self,
        sink: Option<&dyn ResolveTraceSink>,
    ) -> Result<TypeManagerContainer, InternalError> {
        self.validate()?;

        let mut tables = self.build_ordinal_tables()?;

        // Freeze one shared table per hierarchy root.
        let tables: BTreeMap<EntityTypeId, Arc<PathOrdinalTable>> = tables
            .iter_mut()
            .map(|(root, table)| (*root, Arc::new(std::mem::take(table))))
            .collect();

        let mut edges_by_type: BTreeMap<EntityTypeId, Vec<Arc<ContainingAssociationEdge>>> =
            BTreeMap::new();

        for metadata in self.types.values() {
            let containing_type = metadata.type_id();
            let containing_table = hierarchy_table(&tables, &self.types, containing_type)?;

            for association in &metadata.associations {
                let contained_type = association.contained_type;
                let contained_table = hierarchy_table(&tables, &self.types, contained_type)?;

                let mut inverse_paths = BTreeMap::new();
                for binding in &association.inverse_bindings {
                    if let Some(path) = &binding.inverse_path {
                        inverse_paths.insert(binding.subtype, path.clone());
                    }
                }

                // Zero participating subtypes is tolerated (the contained
                // entity may simply be unreachable) but surfaced, since it
                // usually indicates a latent mapping bug.
                if inverse_paths.is_empty() {
                    metrics::record_bootstrap_warning();
                    emit(
                        sink,
                        ResolveTraceEvent::BootstrapWarning {
                            containing: containing_type,
                            contained: contained_type,
                            forward_path: association.forward_path.to_string(),
                        },
                    );
                    continue;
                }

                let scoped_ordinals = association
                    .dependency_paths
                    .iter()
                    .map(|path| contained_table.ordinal_of(path))
                    .collect::<Result<Vec<_>, _>>()?;

                let edge = Arc::new(ContainingAssociationEdge {
                    containing_type,
                    contained_type,
                    forward_path: association.forward_path.clone(),
                    forward_ordinal: containing_table.ordinal_of(&association.forward_path)?,
                    scoped_filter: PathFilter::from_ordinals(scoped_ordinals),
                    extraction: association.extraction.clone(),
                    inverse_paths,
                });

                edges_by_type
                    .entry(contained_type)
                    .or_default()
                    .push(edge);
            }
        }

        let mut managers = BTreeMap::new();
        for metadata in self.types.values() {
            let type_id = metadata.type_id();
            let table = hierarchy_table(&tables, &self.types, type_id)?;

            let dirty_self_filter = if metadata.indexed {
                let ordinals = metadata
                    .indexed_paths
                    .iter()
                    .map(|path| table.ordinal_of(path))
                    .collect::<Result<Vec<_>, _>>()?;
                PathFilter::from_ordinals(ordinals)
            } else {
                PathFilter::empty()
            };

            let containing_edges = edges_by_type.remove(&type_id).unwrap_or_default();
            let dirtiness = DirtinessFilter::new(PathFilter::union(
                std::iter::once(&dirty_self_filter)
                    .chain(containing_edges.iter().map(|edge| &edge.scoped_filter)),
            ));

            managers.insert(
                type_id,
                Arc::new(TypeManager {
                    lattice: metadata.lattice.clone(),
                    indexed: metadata.indexed,
                    ordinals: table.clone(),
                    resolver: ReindexingResolver {
                        type_id,
                        dirty_self_filter,
                        containing_edges,
                    },
                    dirtiness,
                }),
            );
        }

        Ok(TypeManagerContainer::from_managers(managers))
    }

    // Fail-fast structural validation of the registered metadata set.
    fn validate(&self) -> Result<(), InternalError> {
        for metadata in self.types.values() {
            let containing_type = metadata.type_id();

            for association in &metadata.associations {
                let contained_type = association.contained_type;
                let Some(contained) = self.types.get(&contained_type) else {
                    return Err(InternalError::metadata_config(format!(
                        "association targets unregistered type: containing={containing_type} \
                         forward_path={} contained={contained_type}",
                        association.forward_path,
                    )));
                };

                if association.dependency_paths.is_empty() {
                    return Err(InternalError::metadata_config(format!(
                        "association declares no dependency paths: containing={containing_type} \
                         forward_path={}",
                        association.forward_path,
                    )));
                }

                for binding in &association.inverse_bindings {
                    if !self.types.contains_key(&binding.subtype) {
                        return Err(InternalError::metadata_config(format!(
                            "inverse binding names unregistered subtype: \
                             containing={containing_type} contained={contained_type} \
                             subtype={}",
                            binding.subtype,
                        )));
                    }
                    if !contained.lattice.concrete_subtypes.contains(&binding.subtype) {
                        return Err(InternalError::metadata_config(format!(
                            "inverse binding subtype is not a concrete subtype of the \
                             contained type: containing={containing_type} \
                             contained={contained_type} subtype={}",
                            binding.subtype,
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    // Assign dense ordinals per hierarchy root, covering indexed paths,
    // association forward paths, and contained-side dependency paths.
    fn build_ordinal_tables(
        &self,
    ) -> Result<BTreeMap<EntityTypeId, PathOrdinalTable>, InternalError> {
        let mut tables: BTreeMap<EntityTypeId, PathOrdinalTable> = BTreeMap::new();

        for metadata in self.types.values() {
            let root = hierarchy_root(&self.types, metadata.type_id())?;
            let table = tables.entry(root).or_default();
            for path in &metadata.indexed_paths {
                table.register(path)?;
            }
        }

        for metadata in self.types.values() {
            let containing_root = hierarchy_root(&self.types, metadata.type_id())?;
            for association in &metadata.associations {
                tables
                    .entry(containing_root)
                    .or_default()
                    .register(&association.forward_path)?;

                let contained_root = hierarchy_root(&self.types, association.contained_type)?;
                let contained_table = tables.entry(contained_root).or_default();
                for path in &association.dependency_paths {
                    contained_table.register(path)?;
                }
            }
        }

        Ok(tables)
    }
}

// Hierarchy root of one registered type: the last ascending supertype.
fn hierarchy_root(
    types: &BTreeMap<EntityTypeId, EntityTypeMetadata>,
    type_id: EntityTypeId,
) -> Result<EntityTypeId, InternalError> {
    let metadata = types.get(&type_id).ok_or_else(|| {
        InternalError::metadata_config(format!("unregistered entity type: {type_id}"))
    })?;

    Ok(metadata
        .lattice
        .ascending_supertypes
        .last()
        .copied()
        .unwrap_or(type_id))
}

// Shared ordinal table of one type's hierarchy.
fn hierarchy_table(
    tables: &BTreeMap<EntityTypeId, Arc<PathOrdinalTable>>,
    types: &BTreeMap<EntityTypeId, EntityTypeMetadata>,
    type_id: EntityTypeId,
) -> Result<Arc<PathOrdinalTable>, InternalError> {
    let root = hierarchy_root(types, type_id)?;
    tables.get(&root).cloned().ok_or_else(|| {
        InternalError::metadata_config(format!(
            "no ordinal table for hierarchy root: type={type_id} root={root}"
        ))
    })
}
