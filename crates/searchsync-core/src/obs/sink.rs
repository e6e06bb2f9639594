//! Resolver tracing boundary.
//!
//! Tracing is optional, injected by the caller, and must not affect
//! resolution semantics. Resolver logic never talks to obs::metrics
//! directly; everything flows through `ResolveTraceEvent`.

use crate::{instance::EntityIdentity, typeinfo::EntityTypeId};

///
/// ResolveTraceSink
///

pub trait ResolveTraceSink {
    fn on_event(&self, event: ResolveTraceEvent);
}

///
/// ResolveTraceEvent
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ResolveTraceEvent {
    /// One association ended up with zero participating concrete contained
    /// subtypes; the edge was dropped at bootstrap.
    BootstrapWarning {
        containing: EntityTypeId,
        contained: EntityTypeId,
        forward_path: String,
    },
    WalkStart {
        type_id: EntityTypeId,
    },
    EdgeSkipped {
        contained: EntityTypeId,
        containing: EntityTypeId,
    },
    LazyLoadGap {
        identity: EntityIdentity,
        inverse_path: String,
    },
    EntityCollected {
        identity: EntityIdentity,
    },
    WalkFinish {
        collected: u64,
    },
}

// Fan one event out to an optional sink.
pub(crate) fn emit(sink: Option<&dyn ResolveTraceSink>, event: ResolveTraceEvent) {
    if let Some(sink) = sink {
        sink.on_event(event);
    }
}

///
/// TESTS
///
