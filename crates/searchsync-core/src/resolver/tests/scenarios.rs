use super::{CONTAINED, OWNER, one_to_one_container};
use crate::{
    collector::{ReindexTrigger, ReindexingCollector},
    error::ErrorClass,
    instance::{EntityIdentity, EntityRef, IdentityKey},
    metadata::{AssociationMetadata, EntityTypeMetadata, ExtractorChain, InverseBinding},
    path::DependencyPath,
    resolver::ReindexingResolverBuilder,
    test_support::GraphEntity,
    typeinfo::{EntityTypeId, TypeLattice},
};

fn identity(type_id: EntityTypeId, key: u64) -> EntityIdentity {
    EntityIdentity::new(type_id, IdentityKey::Uint(key))
}

fn collected_identities(collector: &ReindexingCollector) -> Vec<EntityIdentity> {
    collector.entries().map(|(id, _)| id.clone()).collect()
}

#[test]
fn contained_change_reindexes_both_sides() {
    let container = one_to_one_container();
    let owner = GraphEntity::new(OWNER, 1);
    let contained = GraphEntity::new(CONTAINED, 2);
    contained.link_one("owner", &owner);

    let entity: EntityRef = contained;
    let dirty = container
        .dirty_paths(CONTAINED, [&DependencyPath::parse("name")])
        .expect("dirty set");
    let mut collector = ReindexingCollector::new();
    container
        .resolve_entities_to_reindex(&mut collector, None, &entity, &dirty)
        .expect("resolution should succeed");

    assert_eq!(
        collected_identities(&collector),
        vec![identity(CONTAINED, 2), identity(OWNER, 1)]
    );

    let (_, owner_entry) = collector
        .entries()
        .find(|(id, _)| **id == identity(OWNER, 1))
        .expect("owner collected");
    assert_eq!(
        owner_entry.trigger,
        ReindexTrigger::ContainedChanged {
            via: DependencyPath::parse("contained"),
        }
    );
}

#[test]
fn delete_owner_swallows_lazy_load_on_deleted_side() {
    let container = one_to_one_container();
    let contained = GraphEntity::new(CONTAINED, 2);
    // The owner row is gone; loading the inverse association now fails.
    contained.poison("owner");

    let entity: EntityRef = contained;
    let dirty = container
        .dirty_paths(CONTAINED, [&DependencyPath::parse("name")])
        .expect("dirty set");
    let mut collector = ReindexingCollector::new();
    container
        .resolve_entities_to_reindex(&mut collector, None, &entity, &dirty)
        .expect("lazy-load gap must not surface");

    assert_eq!(collected_identities(&collector), vec![identity(CONTAINED, 2)]);
}

#[test]
fn delete_non_owner_reindexes_surviving_owner_with_stale_reference() {
    let container = one_to_one_container();
    let owner = GraphEntity::new(OWNER, 1);
    // The contained side is deleted; the owner still holds a stale forward
    // reference, and its own change set names the association path.
    let entity: EntityRef = owner;
    let dirty = container
        .dirty_paths(OWNER, [&DependencyPath::parse("contained")])
        .expect("dirty set");
    let mut collector = ReindexingCollector::new();
    container
        .resolve_entities_to_reindex(&mut collector, None, &entity, &dirty)
        .expect("resolution should succeed");

    assert_eq!(collected_identities(&collector), vec![identity(OWNER, 1)]);
}

#[test]
fn delete_both_sides_resolves_to_deleted_entity_only() {
    let container = one_to_one_container();
    let contained = GraphEntity::new(CONTAINED, 2);
    contained.sever("owner");

    let entity: EntityRef = contained;
    let dirty = container
        .dirty_paths(CONTAINED, [&DependencyPath::parse("name")])
        .expect("dirty set");
    let mut collector = ReindexingCollector::new();
    container
        .resolve_entities_to_reindex(&mut collector, None, &entity, &dirty)
        .expect("resolution should succeed");

    assert_eq!(collected_identities(&collector), vec![identity(CONTAINED, 2)]);
}

#[test]
fn non_lazy_access_failure_is_wrapped_with_the_entity_identity() {
    let container = one_to_one_container();
    let contained = GraphEntity::new(CONTAINED, 2);
    contained.fail_access("owner");

    let entity: EntityRef = contained;
    let dirty = container
        .dirty_paths(CONTAINED, [&DependencyPath::parse("name")])
        .expect("dirty set");
    let mut collector = ReindexingCollector::new();
    let err = container
        .resolve_entities_to_reindex(&mut collector, None, &entity, &dirty)
        .expect_err("non-lazy failures must surface");

    assert_eq!(err.class, ErrorClass::Internal);
    assert!(err.message.contains("Contained#2"));
    assert!(err.message.contains("owner"));
}

#[test]
fn irrelevant_dirty_path_collects_nothing() {
    // Auditor's association is dropped at bootstrap (no participating
    // subtype), so its dependency path `internal` triggers nothing.
    let mut builder = ReindexingResolverBuilder::new();

    let mut owner = EntityTypeMetadata::new(TypeLattice::standalone(OWNER));
    owner.indexed_paths = vec![DependencyPath::parse("contained")];
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

    let auditor_type = EntityTypeId::new("Auditor");
    let mut auditor = EntityTypeMetadata::new(TypeLattice::standalone(auditor_type));
    auditor.indexed_paths = vec![DependencyPath::parse("trail")];
    auditor.associations = vec![AssociationMetadata {
        forward_path: DependencyPath::parse("trail"),
        contained_type: CONTAINED,
        dependency_paths: vec![DependencyPath::parse("internal")],
        extraction: ExtractorChain::direct(),
        inverse_bindings: vec![InverseBinding::unbound(CONTAINED)],
    }];
    builder.register(auditor).expect("register auditor");

    let mut contained = EntityTypeMetadata::new(TypeLattice::standalone(CONTAINED));
    contained.indexed_paths = vec![DependencyPath::parse("name")];
    builder.register(contained).expect("register contained");

    let container = builder.build(None).expect("bootstrap");

    let owner = GraphEntity::new(OWNER, 1);
    let contained = GraphEntity::new(CONTAINED, 2);
    contained.link_one("owner", &owner);

    let entity: EntityRef = contained;
    let dirty = container
        .dirty_paths(CONTAINED, [&DependencyPath::parse("internal")])
        .expect("dirty set");

    assert!(!container
        .requires_resolution(CONTAINED, &dirty)
        .expect("dirtiness check"));

    let mut collector = ReindexingCollector::new();
    container
        .resolve_entities_to_reindex(&mut collector, None, &entity, &dirty)
        .expect("resolution should succeed");

    assert!(collector.is_empty());
}

#[test]
fn polymorphic_inverse_paths_reach_the_root_through_the_binding_subtype() {
    const ROOT: EntityTypeId = EntityTypeId::new("Root");
    const CONTAINING_BASE: EntityTypeId = EntityTypeId::new("ContainingBase");
    const CONTAINING_FIRST: EntityTypeId = EntityTypeId::new("ContainingFirst");
    const CONTAINING_SECOND: EntityTypeId = EntityTypeId::new("ContainingSecond");
    const CONTAINED_POLY: EntityTypeId = EntityTypeId::new("ContainedPoly");

    let mut builder = ReindexingResolverBuilder::new();

    let mut root = EntityTypeMetadata::new(TypeLattice::standalone(ROOT));
    root.indexed_paths = vec![DependencyPath::parse("containing")];
    root.associations = vec![AssociationMetadata {
        forward_path: DependencyPath::parse("containing"),
        contained_type: CONTAINING_BASE,
        dependency_paths: vec![DependencyPath::parse("containedSingle")],
        extraction: ExtractorChain::direct(),
        inverse_bindings: vec![
            InverseBinding::bound(CONTAINING_FIRST, DependencyPath::parse("root")),
            InverseBinding::bound(CONTAINING_SECOND, DependencyPath::parse("root")),
        ],
    }];
    builder.register(root).expect("register root");

    let base = EntityTypeMetadata::new(TypeLattice {
        type_id: CONTAINING_BASE,
        ascending_supertypes: vec![CONTAINING_BASE],
        concrete_subtypes: vec![CONTAINING_FIRST, CONTAINING_SECOND],
        is_abstract: true,
    });
    builder.register(base).expect("register base");

    // The two concrete containing subtypes bind the abstract getter with
    // different inverse property names on the contained side.
    for (subtype, inverse) in [
        (CONTAINING_FIRST, "containingFirst"),
        (CONTAINING_SECOND, "containingSecond"),
    ] {
        let mut metadata = EntityTypeMetadata::new(TypeLattice {
            type_id: subtype,
            ascending_supertypes: vec![subtype, CONTAINING_BASE],
            concrete_subtypes: vec![subtype],
            is_abstract: false,
        });
        metadata.indexed_paths = vec![DependencyPath::parse("containedSingle")];
        metadata.associations = vec![AssociationMetadata {
            forward_path: DependencyPath::parse("containedSingle"),
            contained_type: CONTAINED_POLY,
            dependency_paths: vec![DependencyPath::parse("name")],
            extraction: ExtractorChain::direct(),
            inverse_bindings: vec![InverseBinding::bound(
                CONTAINED_POLY,
                DependencyPath::parse(inverse),
            )],
        }];
        builder.register(metadata).expect("register containing subtype");
    }

    let mut contained = EntityTypeMetadata::new(TypeLattice::standalone(CONTAINED_POLY));
    contained.indexed_paths = vec![DependencyPath::parse("name")];
    builder.register(contained).expect("register contained");

    let container = builder.build(None).expect("bootstrap");

    let root = GraphEntity::new(ROOT, 10);
    let first = GraphEntity::new(CONTAINING_FIRST, 20);
    let contained = GraphEntity::new(CONTAINED_POLY, 30);
    contained.link_one("containingFirst", &first);
    first.link_one("root", &root);
    // No `containingSecond` association exists: the Second edge is a no-op.

    let entity: EntityRef = contained;
    let dirty = container
        .dirty_paths(CONTAINED_POLY, [&DependencyPath::parse("name")])
        .expect("dirty set");
    let mut collector = ReindexingCollector::new();
    container
        .resolve_entities_to_reindex(&mut collector, None, &entity, &dirty)
        .expect("resolution should succeed");

    assert_eq!(
        collected_identities(&collector),
        vec![
            identity(CONTAINED_POLY, 30),
            identity(CONTAINING_FIRST, 20),
            identity(ROOT, 10),
        ]
    );
}

#[test]
fn pass_through_type_is_walked_but_never_collected() {
    const A: EntityTypeId = EntityTypeId::new("A");
    const B: EntityTypeId = EntityTypeId::new("B");
    const C: EntityTypeId = EntityTypeId::new("C");

    let mut builder = ReindexingResolverBuilder::new();

    let mut a = EntityTypeMetadata::new(TypeLattice::standalone(A));
    a.indexed_paths = vec![DependencyPath::parse("b")];
    a.associations = vec![AssociationMetadata {
        forward_path: DependencyPath::parse("b"),
        contained_type: B,
        dependency_paths: vec![DependencyPath::parse("c")],
        extraction: ExtractorChain::direct(),
        inverse_bindings: vec![InverseBinding::bound(B, DependencyPath::parse("a"))],
    }];
    builder.register(a).expect("register a");

    // B carries no document of its own; it only forwards dirtiness.
    let mut b = EntityTypeMetadata::new(TypeLattice::standalone(B));
    b.indexed = false;
    b.associations = vec![AssociationMetadata {
        forward_path: DependencyPath::parse("c"),
        contained_type: C,
        dependency_paths: vec![DependencyPath::parse("name")],
        extraction: ExtractorChain::direct(),
        inverse_bindings: vec![InverseBinding::bound(C, DependencyPath::parse("b"))],
    }];
    builder.register(b).expect("register b");

    let mut c = EntityTypeMetadata::new(TypeLattice::standalone(C));
    c.indexed_paths = vec![DependencyPath::parse("name")];
    builder.register(c).expect("register c");

    let container = builder.build(None).expect("bootstrap");

    let a = GraphEntity::new(A, 1);
    let b = GraphEntity::new(B, 2);
    let c = GraphEntity::new(C, 3);
    c.link_one("b", &b);
    b.link_one("a", &a);

    let entity: EntityRef = c;
    let dirty = container
        .dirty_paths(C, [&DependencyPath::parse("name")])
        .expect("dirty set");
    let mut collector = ReindexingCollector::new();
    container
        .resolve_entities_to_reindex(&mut collector, None, &entity, &dirty)
        .expect("resolution should succeed");

    assert_eq!(
        collected_identities(&collector),
        vec![identity(A, 1), identity(C, 3)]
    );
}

#[test]
fn bidirectional_cycle_terminates_with_each_entity_collected_once() {
    const A: EntityTypeId = EntityTypeId::new("CycleA");
    const B: EntityTypeId = EntityTypeId::new("CycleB");

    let mut builder = ReindexingResolverBuilder::new();

    let mut a = EntityTypeMetadata::new(TypeLattice::standalone(A));
    a.indexed_paths = vec![DependencyPath::parse("name"), DependencyPath::parse("b")];
    a.associations = vec![AssociationMetadata {
        forward_path: DependencyPath::parse("b"),
        contained_type: B,
        dependency_paths: vec![DependencyPath::parse("name"), DependencyPath::parse("a")],
        extraction: ExtractorChain::direct(),
        inverse_bindings: vec![InverseBinding::bound(B, DependencyPath::parse("a"))],
    }];
    builder.register(a).expect("register a");

    let mut b = EntityTypeMetadata::new(TypeLattice::standalone(B));
    b.indexed_paths = vec![DependencyPath::parse("name"), DependencyPath::parse("a")];
    b.associations = vec![AssociationMetadata {
        forward_path: DependencyPath::parse("a"),
        contained_type: A,
        dependency_paths: vec![DependencyPath::parse("name"), DependencyPath::parse("b")],
        extraction: ExtractorChain::direct(),
        inverse_bindings: vec![InverseBinding::bound(A, DependencyPath::parse("b"))],
    }];
    builder.register(b).expect("register b");

    let container = builder.build(None).expect("bootstrap");

    let a = GraphEntity::new(A, 1);
    let b = GraphEntity::new(B, 2);
    a.link_one("b", &b);
    b.link_one("a", &a);

    let entity: EntityRef = b;
    let dirty = container
        .dirty_paths(B, [&DependencyPath::parse("name")])
        .expect("dirty set");
    let mut collector = ReindexingCollector::new();
    container
        .resolve_entities_to_reindex(&mut collector, None, &entity, &dirty)
        .expect("cycle must terminate");

    assert_eq!(
        collected_identities(&collector),
        vec![identity(A, 1), identity(B, 2)]
    );
}

#[test]
fn cycle_back_into_the_origin_through_a_new_path_still_collects_it() {
    const A: EntityTypeId = EntityTypeId::new("RelayA");
    const B: EntityTypeId = EntityTypeId::new("RelayB");

    let mut builder = ReindexingResolverBuilder::new();

    // A's document embeds B's `detail`, which B itself does not index.
    let mut a = EntityTypeMetadata::new(TypeLattice::standalone(A));
    a.indexed_paths = vec![DependencyPath::parse("b")];
    a.associations = vec![AssociationMetadata {
        forward_path: DependencyPath::parse("b"),
        contained_type: B,
        dependency_paths: vec![DependencyPath::parse("detail")],
        extraction: ExtractorChain::direct(),
        inverse_bindings: vec![InverseBinding::bound(B, DependencyPath::parse("a"))],
    }];
    builder.register(a).expect("register a");

    // B's document embeds A's reference, so B depends on A through `a`.
    let mut b = EntityTypeMetadata::new(TypeLattice::standalone(B));
    b.indexed_paths = vec![DependencyPath::parse("a")];
    b.associations = vec![AssociationMetadata {
        forward_path: DependencyPath::parse("a"),
        contained_type: A,
        dependency_paths: vec![DependencyPath::parse("b")],
        extraction: ExtractorChain::direct(),
        inverse_bindings: vec![InverseBinding::bound(A, DependencyPath::parse("b"))],
    }];
    builder.register(b).expect("register b");

    let container = builder.build(None).expect("bootstrap");

    let a = GraphEntity::new(A, 1);
    let b = GraphEntity::new(B, 2);
    a.link_one("b", &b);
    b.link_one("a", &a);

    // `detail` misses B's own filter, so B is not collected at the origin.
    // The walk reaches A, then comes back into B along `a`, and that second
    // path does match B's filter: B must still be collected.
    let entity: EntityRef = b;
    let dirty = container
        .dirty_paths(B, [&DependencyPath::parse("detail")])
        .expect("dirty set");
    let mut collector = ReindexingCollector::new();
    container
        .resolve_entities_to_reindex(&mut collector, None, &entity, &dirty)
        .expect("resolution should succeed");

    assert_eq!(
        collected_identities(&collector),
        vec![identity(A, 1), identity(B, 2)]
    );

    let (_, origin_entry) = collector
        .entries()
        .find(|(id, _)| **id == identity(B, 2))
        .expect("origin collected on the way back");
    assert_eq!(
        origin_entry.trigger,
        ReindexTrigger::ContainedChanged {
            via: DependencyPath::parse("a"),
        }
    );
}

#[test]
fn many_valued_inverse_path_reindexes_every_container() {
    let container = one_to_one_container();
    let first = GraphEntity::new(OWNER, 1);
    let second = GraphEntity::new(OWNER, 2);
    let contained = GraphEntity::new(CONTAINED, 3);
    contained.link_many("owner", &[first, second]);

    let entity: EntityRef = contained;
    let dirty = container
        .dirty_paths(CONTAINED, [&DependencyPath::parse("name")])
        .expect("dirty set");
    let mut collector = ReindexingCollector::new();
    container
        .resolve_entities_to_reindex(&mut collector, None, &entity, &dirty)
        .expect("resolution should succeed");

    assert_eq!(
        collected_identities(&collector),
        vec![
            identity(CONTAINED, 3),
            identity(OWNER, 1),
            identity(OWNER, 2),
        ]
    );
}
