mod scenarios;

use crate::{
    metadata::{AssociationMetadata, EntityTypeMetadata, ExtractorChain, InverseBinding},
    path::DependencyPath,
    resolver::{ReindexingResolverBuilder, TypeManagerContainer},
    typeinfo::{EntityTypeId, TypeLattice},
};

pub(super) const OWNER: EntityTypeId = EntityTypeId::new("Owner");
pub(super) const CONTAINED: EntityTypeId = EntityTypeId::new("Contained");

// Bidirectional optional one-to-one: Owner embeds Contained, Contained
// points back through `owner`.
pub(super) fn one_to_one_container() -> TypeManagerContainer {
    let mut builder = ReindexingResolverBuilder::new();

    let mut owner = EntityTypeMetadata::new(TypeLattice::standalone(OWNER));
    owner.indexed_paths = vec![
        DependencyPath::parse("name"),
        DependencyPath::parse("contained"),
    ];
    owner.associations = vec![AssociationMetadata {
        forward_path: DependencyPath::parse("contained"),
        contained_type: CONTAINED,
        dependency_paths: vec![DependencyPath::parse("name")],
        extraction: ExtractorChain::direct(),
        inverse_bindings: vec![InverseBinding::bound(
            CONTAINED,
            DependencyPath::parse("owner"),
        )],
    }];
    builder.register(owner).expect("register owner");

    let mut contained = EntityTypeMetadata::new(TypeLattice::standalone(CONTAINED));
    contained.indexed_paths = vec![DependencyPath::parse("name")];
    builder.register(contained).expect("register contained");

    builder.build(None).expect("bootstrap should succeed")
}
