//! Ephemeral, in-memory counters for resolution activity.
//!
//! Counters are thread-local: each mutation-processing thread accumulates
//! its own totals, mirroring the collector's single-threaded batch scope.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;

///
/// ResolveMetrics
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
pub struct ResolveMetrics {
    pub walks_started: u64,
    pub walks_finished: u64,
    pub entities_collected: u64,
    pub edges_skipped: u64,
    pub lazy_load_gaps: u64,
    pub bootstrap_warnings: u64,
}

thread_local! {
    static METRICS: RefCell<ResolveMetrics> = RefCell::new(ResolveMetrics::default());
}

fn with_mut<R>(f: impl FnOnce(&mut ResolveMetrics) -> R) -> R {
    METRICS.with_borrow_mut(f)
}

/// Snapshot the current thread's counters.
#[must_use]
pub fn snapshot() -> ResolveMetrics {
    METRICS.with_borrow(Clone::clone)
}

/// Reset the current thread's counters.
pub fn reset() {
    with_mut(|metrics| *metrics = ResolveMetrics::default());
}

pub(crate) fn record_walk_started() {
    with_mut(|metrics| metrics.walks_started += 1);
}

pub(crate) fn record_walk_finished() {
    with_mut(|metrics| metrics.walks_finished += 1);
}

pub(crate) fn record_entity_collected() {
    with_mut(|metrics| metrics.entities_collected += 1);
}

pub(crate) fn record_edge_skipped() {
    with_mut(|metrics| metrics.edges_skipped += 1);
}

pub(crate) fn record_lazy_load_gap() {
    with_mut(|metrics| metrics.lazy_load_gaps += 1);
}

pub(crate) fn record_bootstrap_warning() {
    with_mut(|metrics| metrics.bootstrap_warnings += 1);
}

///
/// TESTS
///
