//! The memoizing reference resolver.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tracing::{debug, trace};

use cue_constraints::library::{ConstraintKind, ConstraintLibrary};
use cue_core::errors::EngineError;
use cue_core::ids::ConstraintId;

use crate::resolved::ResolvedConstraint;

/// Cache hit/miss counters, readable without locking.
#[derive(Debug, Default)]
pub struct ResolverStats {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResolverStats {
    /// Number of resolutions served from the cache.
    #[must_use]
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Number of resolutions that required walking the reference graph.
    #[must_use]
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}

/// Expands constraint references into resolved trees.
///
/// Bound to exactly one [`ConstraintLibrary`] instance; never share a
/// resolver across library instances, or a reload would serve stale trees.
/// The memo cache supports concurrent readers (multiple interactions may
/// resolve at once under a multi-connection transport); writes land only
/// after a subtree resolved completely, so an abandoned call can never leave
/// a partially-written entry behind.
pub struct ConstraintResolver {
    library: Arc<ConstraintLibrary>,
    cache: DashMap<ConstraintId, Arc<ResolvedConstraint>>,
    stats: ResolverStats,
}

impl ConstraintResolver {
    /// Create a resolver bound to a library instance.
    #[must_use]
    pub fn new(library: Arc<ConstraintLibrary>) -> Self {
        Self {
            library,
            cache: DashMap::new(),
            stats: ResolverStats::default(),
        }
    }

    /// The library this resolver reads from.
    #[must_use]
    pub fn library(&self) -> &Arc<ConstraintLibrary> {
        &self.library
    }

    /// Cache statistics.
    #[must_use]
    pub fn stats(&self) -> &ResolverStats {
        &self.stats
    }

    /// Number of memoized resolutions.
    #[must_use]
    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    /// Drop every memoized resolution.
    ///
    /// Must be called after any library mutation; the cache lifetime is the
    /// resolver instance lifetime otherwise.
    pub fn invalidate(&self) {
        debug!(entries = self.cache.len(), "Resolver cache invalidated");
        self.cache.clear();
    }

    /// Resolve a constraint id into its fully resolved tree.
    ///
    /// Atomic ids resolve to their leaf directly. Composite ids resolve each
    /// component recursively; a missing target fails with
    /// `ConstraintNotFound`, and a reference cycle fails with
    /// `CircularReference` carrying the full cycle path in traversal order.
    pub fn resolve(&self, id: &ConstraintId) -> Result<Arc<ResolvedConstraint>, EngineError> {
        let mut resolving = Vec::new();
        self.resolve_inner(id, &mut resolving)
    }

    fn resolve_inner(
        &self,
        id: &ConstraintId,
        resolving: &mut Vec<ConstraintId>,
    ) -> Result<Arc<ResolvedConstraint>, EngineError> {
        if let Some(hit) = self.cache.get(id) {
            let _ = self.stats.hits.fetch_add(1, Ordering::Relaxed);
            trace!(constraint_id = %id, "Resolution cache hit");
            return Ok(Arc::clone(&hit));
        }
        let _ = self.stats.misses.fetch_add(1, Ordering::Relaxed);

        let resolved = match self.library.get(id)? {
            ConstraintKind::Atomic(atomic) => Arc::new(ResolvedConstraint::Atomic(atomic.clone())),
            ConstraintKind::Composite(composite) => {
                // Cycle check before descending: a composite id already on the
                // stack means the graph loops back to it.
                if let Some(position) = resolving.iter().position(|seen| seen == id) {
                    let mut path: Vec<ConstraintId> = resolving[position..].to_vec();
                    path.push(id.clone());
                    return Err(EngineError::CircularReference { path });
                }

                resolving.push(id.clone());
                let mut components = Vec::with_capacity(composite.components.len());
                for reference in &composite.components {
                    match self.resolve_inner(&reference.target_id, resolving) {
                        Ok(component) => components.push(component),
                        Err(err) => {
                            // Unwind without caching anything on this path.
                            let _ = resolving.pop();
                            return Err(err);
                        }
                    }
                }
                let _ = resolving.pop();

                Arc::new(ResolvedConstraint::Composite {
                    constraint: composite.clone(),
                    components,
                })
            }
        };

        // All-or-nothing: the entry lands only after the whole subtree
        // resolved. Concurrent resolutions of the same id may both compute;
        // the results are identical and the last write wins.
        let _ = self.cache.insert(id.clone(), Arc::clone(&resolved));
        trace!(constraint_id = %id, leaves = resolved.leaf_count(), "Resolution cached");
        Ok(resolved)
    }
}

impl std::fmt::Debug for ConstraintResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstraintResolver")
            .field("library_constraints", &self.library.total_constraints())
            .field("cached", &self.cache.len())
            .field("hits", &self.stats.hits())
            .field("misses", &self.stats.misses())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    use cue_constraints::atomic::AtomicConstraint;
    use cue_constraints::composite::{
        CompositeConstraint, CompositionMetadata, ConstraintReference,
    };
    use cue_constraints::triggers::TriggerConfiguration;

    fn make_atomic(id: &str) -> AtomicConstraint {
        AtomicConstraint {
            id: ConstraintId::new(id),
            title: id.to_owned(),
            priority: 0.5,
            triggers: TriggerConfiguration::default(),
            reminders: vec![format!("{id} reminder")],
        }
    }

    fn make_sequential(id: &str, component_ids: &[&str]) -> CompositeConstraint {
        CompositeConstraint {
            id: ConstraintId::new(id),
            title: id.to_owned(),
            priority: 0.5,
            triggers: TriggerConfiguration::default(),
            components: component_ids
                .iter()
                .map(|target| ConstraintReference::to(*target))
                .collect(),
            composition: CompositionMetadata::Sequential,
        }
    }

    fn resolver_for(library: ConstraintLibrary) -> ConstraintResolver {
        ConstraintResolver::new(Arc::new(library))
    }

    #[test]
    fn atomic_resolves_directly() {
        let mut library = ConstraintLibrary::new();
        library.add_atomic(make_atomic("a")).unwrap();
        let resolver = resolver_for(library);

        let resolved = resolver.resolve(&ConstraintId::new("a")).unwrap();
        assert!(resolved.is_atomic());
        assert_eq!(resolved.id(), &ConstraintId::new("a"));
    }

    #[test]
    fn composite_resolves_to_tree_with_no_unresolved_ids() {
        let mut library = ConstraintLibrary::new();
        library.add_atomic(make_atomic("testing.write-test-first")).unwrap();
        library
            .add_composite(make_sequential("methodology.tdd", &["testing.write-test-first"]))
            .unwrap();
        let resolver = resolver_for(library);

        let resolved = resolver.resolve(&ConstraintId::new("methodology.tdd")).unwrap();
        assert_eq!(resolved.leaf_count(), 1);
        let reminders = resolved.collect_reminders();
        assert_eq!(reminders[0].0, ConstraintId::new("testing.write-test-first"));
        assert_eq!(reminders[0].1, "testing.write-test-first reminder");
    }

    #[test]
    fn missing_target_fails_at_resolve_time() {
        let mut library = ConstraintLibrary::new();
        library
            .add_composite(make_sequential("dangling", &["does-not-exist"]))
            .unwrap();
        let resolver = resolver_for(library);

        let err = resolver.resolve(&ConstraintId::new("dangling")).unwrap_err();
        assert_matches!(err, EngineError::ConstraintNotFound { ref constraint_id } => {
            assert_eq!(constraint_id, &ConstraintId::new("does-not-exist"));
        });
        // Nothing was cached for the broken branch.
        assert_eq!(resolver.cached_count(), 0);
    }

    #[test]
    fn two_cycle_reports_traversal_path() {
        let mut library = ConstraintLibrary::new();
        library.add_composite(make_sequential("X", &["Y"])).unwrap();
        library.add_composite(make_sequential("Y", &["X"])).unwrap();
        let resolver = resolver_for(library);

        let err = resolver.resolve(&ConstraintId::new("X")).unwrap_err();
        assert_matches!(err, EngineError::CircularReference { ref path } => {
            let rendered: Vec<&str> = path.iter().map(ConstraintId::as_str).collect();
            assert_eq!(rendered, vec!["X", "Y", "X"]);
        });
    }

    #[test]
    fn self_cycle_detected() {
        let mut library = ConstraintLibrary::new();
        library.add_composite(make_sequential("narcissus", &["narcissus"])).unwrap();
        let resolver = resolver_for(library);

        let err = resolver.resolve(&ConstraintId::new("narcissus")).unwrap_err();
        assert_matches!(err, EngineError::CircularReference { ref path } => {
            assert_eq!(path.len(), 2);
        });
    }

    #[test]
    fn long_cycle_detected_before_stack_overflow() {
        let mut library = ConstraintLibrary::new();
        // c0 -> c1 -> ... -> c49 -> c0
        for i in 0..50 {
            let next = (i + 1) % 50;
            library
                .add_composite(make_sequential(&format!("c{i}"), &[&format!("c{next}")]))
                .unwrap();
        }
        let resolver = resolver_for(library);

        let err = resolver.resolve(&ConstraintId::new("c0")).unwrap_err();
        assert_matches!(err, EngineError::CircularReference { ref path } => {
            assert_eq!(path.len(), 51);
            assert_eq!(path[0], path[50]);
        });
    }

    #[test]
    fn second_resolution_is_a_cache_hit() {
        let mut library = ConstraintLibrary::new();
        library.add_atomic(make_atomic("a")).unwrap();
        library.add_composite(make_sequential("c", &["a"])).unwrap();
        let resolver = resolver_for(library);

        let first = resolver.resolve(&ConstraintId::new("c")).unwrap();
        assert_eq!(resolver.stats().hits(), 0);

        let second = resolver.resolve(&ConstraintId::new("c")).unwrap();
        assert_eq!(resolver.stats().hits(), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn diamond_expands_shared_dependency_once() {
        let mut library = ConstraintLibrary::new();
        library.add_atomic(make_atomic("shared")).unwrap();
        library.add_composite(make_sequential("left", &["shared"])).unwrap();
        library.add_composite(make_sequential("right", &["shared"])).unwrap();
        library
            .add_composite(make_sequential("top", &["left", "right"]))
            .unwrap();
        let resolver = resolver_for(library);

        let top = resolver.resolve(&ConstraintId::new("top")).unwrap();
        // Four ids, four misses: "shared" was walked exactly once.
        assert_eq!(resolver.stats().misses(), 4);
        assert_eq!(resolver.stats().hits(), 1);

        // Both sides share the same memoized leaf.
        let left = top.component(&ConstraintId::new("left")).unwrap();
        let right = top.component(&ConstraintId::new("right")).unwrap();
        assert!(Arc::ptr_eq(
            &left.components()[0],
            &right.components()[0]
        ));
    }

    #[test]
    fn deep_hierarchy_resolves() {
        let mut library = ConstraintLibrary::new();
        library.add_atomic(make_atomic("leaf")).unwrap();
        let mut previous = "leaf".to_owned();
        for depth in 0..25 {
            let id = format!("depth{depth}");
            library
                .add_composite(make_sequential(&id, &[previous.as_str()]))
                .unwrap();
            previous = id;
        }
        let resolver = resolver_for(library);

        let resolved = resolver.resolve(&ConstraintId::new("depth24")).unwrap();
        assert_eq!(resolved.leaf_count(), 1);
        assert_eq!(resolver.cached_count(), 26);
    }

    #[test]
    fn invalidate_clears_cache_and_resolves_fresh() {
        let mut library = ConstraintLibrary::new();
        library.add_atomic(make_atomic("a")).unwrap();
        let resolver = resolver_for(library);

        let _ = resolver.resolve(&ConstraintId::new("a")).unwrap();
        assert_eq!(resolver.cached_count(), 1);

        resolver.invalidate();
        assert_eq!(resolver.cached_count(), 0);

        let _ = resolver.resolve(&ConstraintId::new("a")).unwrap();
        assert_eq!(resolver.stats().misses(), 2);
    }

    #[test]
    fn wide_composite_resolves_every_component() {
        let mut library = ConstraintLibrary::new();
        let ids: Vec<String> = (0..100).map(|i| format!("wide{i}")).collect();
        for id in &ids {
            library.add_atomic(make_atomic(id)).unwrap();
        }
        let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        library.add_composite(make_sequential("wide", &id_refs)).unwrap();
        let resolver = resolver_for(library);

        let resolved = resolver.resolve(&ConstraintId::new("wide")).unwrap();
        assert_eq!(resolved.leaf_count(), 100);
        assert_eq!(resolved.components().len(), 100);
    }
}
