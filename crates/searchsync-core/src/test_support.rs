//! In-memory entity graph used by resolver tests.
//!
//! Instances are wired after construction through interior mutability so
//! tests can build cyclic and partially deleted association graphs.

use crate::{
    instance::{EntityIdentity, EntityInstance, EntityRef, IdentityKey, LoadError, PropertyValue},
    metadata::ExtractorChain,
    obs::sink::{ResolveTraceEvent, ResolveTraceSink},
    path::DependencyPath,
    typeinfo::EntityTypeId,
};
use std::{cell::RefCell, collections::BTreeMap, sync::Arc};

///
/// GraphEntity
///

pub(crate) struct GraphEntity {
    type_id: EntityTypeId,
    key: u64,
    links: RefCell<BTreeMap<DependencyPath, Link>>,
}

enum Link {
    One(EntityRef),
    Many(Vec<EntityRef>),
    Missing,
    LazyLoadFailure,
    AccessFailure,
}

impl GraphEntity {
    pub(crate) fn new(type_id: EntityTypeId, key: u64) -> Arc<Self> {
        Arc::new(Self {
            type_id,
            key,
            links: RefCell::new(BTreeMap::new()),
        })
    }

    pub(crate) fn link_one(&self, path: &str, target: &Arc<Self>) {
        self.links.borrow_mut().insert(
            DependencyPath::parse(path),
            Link::One(target.clone() as EntityRef),
        );
    }

    pub(crate) fn link_many(&self, path: &str, targets: &[Arc<Self>]) {
        self.links.borrow_mut().insert(
            DependencyPath::parse(path),
            Link::Many(
                targets
                    .iter()
                    .map(|target| target.clone() as EntityRef)
                    .collect(),
            ),
        );
    }

    /// Sever one association, as after deleting the referenced side.
    pub(crate) fn sever(&self, path: &str) {
        self.links
            .borrow_mut()
            .insert(DependencyPath::parse(path), Link::Missing);
    }

    /// Make one association fail with a lazy-load error, as on a deleted
    /// entity whose own references can no longer be loaded.
    pub(crate) fn poison(&self, path: &str) {
        self.links
            .borrow_mut()
            .insert(DependencyPath::parse(path), Link::LazyLoadFailure);
    }

    /// Make one association fail with a non-lazy access error.
    pub(crate) fn fail_access(&self, path: &str) {
        self.links
            .borrow_mut()
            .insert(DependencyPath::parse(path), Link::AccessFailure);
    }
}

impl EntityInstance for GraphEntity {
    fn type_id(&self) -> EntityTypeId {
        self.type_id
    }

    fn identity(&self) -> EntityIdentity {
        EntityIdentity::new(self.type_id, IdentityKey::Uint(self.key))
    }

    fn follow(
        &self,
        path: &DependencyPath,
        _extraction: &ExtractorChain,
    ) -> Result<PropertyValue, LoadError> {
        match self.links.borrow().get(path) {
            None | Some(Link::Missing) => Ok(PropertyValue::Missing),
            Some(Link::One(entity)) => Ok(PropertyValue::One(entity.clone())),
            Some(Link::Many(entities)) => Ok(PropertyValue::Many(entities.clone())),
            Some(Link::LazyLoadFailure) => {
                Err(LoadError::lazy_load(format!("could not load {path}")))
            }
            Some(Link::AccessFailure) => {
                Err(LoadError::access(format!("backend failure on {path}")))
            }
        }
    }
}

///
/// RecordingSink
///

#[derive(Default)]
pub(crate) struct RecordingSink {
    events: RefCell<Vec<ResolveTraceEvent>>,
}

impl RecordingSink {
    pub(crate) fn events(&self) -> Vec<ResolveTraceEvent> {
        self.events.borrow().clone()
    }
}

impl ResolveTraceSink for RecordingSink {
    fn on_event(&self, event: ResolveTraceEvent) {
        self.events.borrow_mut().push(event);
    }
}
