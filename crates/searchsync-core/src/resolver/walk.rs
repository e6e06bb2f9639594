use crate::{
    collector::{ReindexTrigger, ReindexingCollector},
    error::InternalError,
    instance::EntityRef,
    obs::{
        metrics,
        sink::{ResolveTraceEvent, ResolveTraceSink, emit},
    },
    path::DirtyPathSet,
    resolver::{ContainingAssociationEdge, TypeManager, TypeManagerContainer},
};
use std::sync::Arc;

impl TypeManagerContainer {
    /// Resolve the transitive closure of entities whose documents must be
    /// re-derived after `entity` changed along `dirty`.
    ///
    /// Contract:
    /// - the collector's expansion ledger, keyed by identity and dirty
    ///   ordinal, stops re-expansion through cycles, so the walk terminates
    ///   on any association graph; an instance reached again through an
    ///   ordinal it has not been expanded with is re-examined, so a second
    ///   path into an uncollected instance still collects it;
    /// - lazy-load gaps (partially deleted graphs) exhaust their branch
    ///   silently; every other failure is wrapped with the offending
    ///   entity's identity and surfaced.
    pub fn resolve_entities_to_reindex(
        &self,
        collector: &mut ReindexingCollector,
        sink: Option<&dyn ResolveTraceSink>,
        entity: &EntityRef,
        dirty: &DirtyPathSet,
    ) -> Result<(), InternalError> {
        let type_id = entity.type_id();
        metrics::record_walk_started();
        emit(sink, ResolveTraceEvent::WalkStart { type_id });

        let before = collector.len();
        let chain = self.managers_for(type_id)?;

        // Ledger the origin's own dirty ordinals so cycles cannot re-expand
        // the origin with an ordinal it already changed along.
        collector.mark_expanded(&entity.identity(), dirty);

        let exact_indexed = chain.first().is_some_and(|manager| manager.is_indexed());
        if exact_indexed
            && chain
                .iter()
                .any(|manager| manager.resolver.dirty_self_filter.test(dirty))
        {
            record_collected(collector, sink, entity.clone(), ReindexTrigger::DirtySelf);
        }

        for manager in &chain {
            self.walk_edges(collector, sink, entity, manager, dirty)?;
        }

        let collected = u64::try_from(collector.len() - before).unwrap_or(u64::MAX);
        emit(sink, ResolveTraceEvent::WalkFinish { collected });
        metrics::record_walk_finished();

        Ok(())
    }

    // Apply every edge of one manager whose scoped filter intersects the
    // dirty set for the given instance.
    fn walk_edges(
        &self,
        collector: &mut ReindexingCollector,
        sink: Option<&dyn ResolveTraceSink>,
        entity: &EntityRef,
        manager: &Arc<TypeManager>,
        dirty: &DirtyPathSet,
    ) -> Result<(), InternalError> {
        for edge in manager.resolver.containing_edges() {
            if !edge.scoped_filter.test(dirty) {
                metrics::record_edge_skipped();
                emit(
                    sink,
                    ResolveTraceEvent::EdgeSkipped {
                        contained: edge.contained_type,
                        containing: edge.containing_type,
                    },
                );
                continue;
            }
            self.walk_edge(collector, sink, entity, edge)?;
        }

        Ok(())
    }

    // Dereference one inverse edge and propagate into every containing
    // instance it reaches.
    fn walk_edge(
        &self,
        collector: &mut ReindexingCollector,
        sink: Option<&dyn ResolveTraceSink>,
        entity: &EntityRef,
        edge: &Arc<ContainingAssociationEdge>,
    ) -> Result<(), InternalError> {
        // Concrete subtypes without a binding simply do not participate.
        let Some(inverse_path) = edge.inverse_paths.get(&entity.type_id()) else {
            return Ok(());
        };

        let value = match entity.follow(inverse_path, &edge.extraction) {
            Ok(value) => value,
            Err(err) if err.is_lazy_load() => {
                // Post-deletion graphs are inherently incomplete; a branch
                // that fails to load has nothing more to resolve.
                metrics::record_lazy_load_gap();
                emit(
                    sink,
                    ResolveTraceEvent::LazyLoadGap {
                        identity: entity.identity(),
                        inverse_path: inverse_path.to_string(),
                    },
                );
                return Ok(());
            }
            Err(err) => {
                return Err(InternalError::resolver_internal(format!(
                    "reindexing resolution failed: entity={} inverse_path={inverse_path} ({err})",
                    entity.identity(),
                )));
            }
        };

        for containing in value.into_instances() {
            self.propagate(collector, sink, &containing, edge)?;
        }

        Ok(())
    }

    // Mark, collect, and continue walking one containing instance reached
    // through `via`. The propagated dirty set is the single ordinal of the
    // forward association path on the containing side.
    fn propagate(
        &self,
        collector: &mut ReindexingCollector,
        sink: Option<&dyn ResolveTraceSink>,
        instance: &EntityRef,
        via: &Arc<ContainingAssociationEdge>,
    ) -> Result<(), InternalError> {
        let identity = instance.identity();
        let dirty = DirtyPathSet::single(via.forward_ordinal);
        if !collector.mark_expanded(&identity, &dirty) {
            return Ok(());
        }

        let chain = self.managers_for(instance.type_id()).map_err(|err| {
            InternalError::resolver_internal(format!(
                "reindexing resolution failed: entity={identity} ({err})"
            ))
        })?;

        let exact_indexed = chain.first().is_some_and(|manager| manager.is_indexed());
        if exact_indexed
            && chain
                .iter()
                .any(|manager| manager.resolver.dirty_self_filter.test(&dirty))
        {
            record_collected(
                collector,
                sink,
                instance.clone(),
                ReindexTrigger::ContainedChanged {
                    via: via.forward_path.clone(),
                },
            );
        }

        for manager in &chain {
            self.walk_edges(collector, sink, instance, manager, &dirty)?;
        }

        Ok(())
    }
}

// Collect one entity and mirror the event to metrics and the trace sink.
fn record_collected(
    collector: &mut ReindexingCollector,
    sink: Option<&dyn ResolveTraceSink>,
    entity: EntityRef,
    trigger: ReindexTrigger,
) {
    let identity = entity.identity();
    if collector.collect(entity, trigger) {
        metrics::record_entity_collected();
        emit(sink, ResolveTraceEvent::EntityCollected { identity });
    }
}
