//! Id-indexed constraint store.
//!
//! [`ConstraintLibrary`] holds atomic and composite constraints in two maps
//! keyed by [`ConstraintId`]. Insertion enforces global id uniqueness across
//! both maps (case-insensitive). Component references are *not* validated at
//! insertion time — forward references across load order are legal, and
//! missing targets surface as `ConstraintNotFound` at resolution. An optional
//! eager cycle pre-check is available for library-finalize time.
//!
//! The library is built once per process lifetime from an external loader and
//! is thereafter read-mostly. Incremental `add_*` is supported but is not
//! expected to race with concurrent resolution; callers needing runtime
//! mutation must serialize it externally.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use cue_core::errors::EngineError;
use cue_core::ids::ConstraintId;

use crate::atomic::AtomicConstraint;
use crate::composite::CompositeConstraint;
use crate::triggers::TriggerConfiguration;

/// Borrowed view of a stored constraint: the closed two-case variant.
#[derive(Clone, Copy, Debug)]
pub enum ConstraintKind<'a> {
    /// A leaf constraint.
    Atomic(&'a AtomicConstraint),
    /// A composition of other constraints.
    Composite(&'a CompositeConstraint),
}

impl<'a> ConstraintKind<'a> {
    /// The constraint's id.
    #[must_use]
    pub fn id(&self) -> &'a ConstraintId {
        match *self {
            Self::Atomic(c) => &c.id,
            Self::Composite(c) => &c.id,
        }
    }

    /// The constraint's title.
    #[must_use]
    pub fn title(&self) -> &'a str {
        match *self {
            Self::Atomic(c) => &c.title,
            Self::Composite(c) => &c.title,
        }
    }

    /// The constraint's priority.
    #[must_use]
    pub fn priority(&self) -> f64 {
        match self {
            Self::Atomic(c) => c.priority,
            Self::Composite(c) => c.priority,
        }
    }

    /// The constraint's trigger configuration.
    #[must_use]
    pub fn triggers(&self) -> &'a TriggerConfiguration {
        match *self {
            Self::Atomic(c) => &c.triggers,
            Self::Composite(c) => &c.triggers,
        }
    }

    /// Whether this is a composite.
    #[must_use]
    pub fn is_composite(&self) -> bool {
        matches!(self, Self::Composite(_))
    }
}

/// Id-indexed store of atomic and composite constraints.
#[derive(Clone, Debug, Default)]
pub struct ConstraintLibrary {
    atomic: HashMap<ConstraintId, AtomicConstraint>,
    composite: HashMap<ConstraintId, CompositeConstraint>,
}

impl ConstraintLibrary {
    /// Create an empty library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject ids already present in either map (case-insensitive).
    fn check_unique(&self, id: &ConstraintId) -> Result<(), EngineError> {
        if self.contains(id) {
            return Err(EngineError::DuplicateConstraint {
                constraint_id: id.clone(),
            });
        }
        Ok(())
    }

    /// Add an atomic constraint.
    ///
    /// Fails with `DuplicateConstraint` if the id already exists in either
    /// map (case-insensitive).
    pub fn add_atomic(&mut self, constraint: AtomicConstraint) -> Result<(), EngineError> {
        self.check_unique(&constraint.id)?;
        debug!(constraint_id = %constraint.id, "Atomic constraint added");
        let _ = self.atomic.insert(constraint.id.clone(), constraint);
        Ok(())
    }

    /// Add a composite constraint.
    ///
    /// Component references are not checked here; they resolve lazily.
    pub fn add_composite(&mut self, constraint: CompositeConstraint) -> Result<(), EngineError> {
        self.check_unique(&constraint.id)?;
        debug!(
            constraint_id = %constraint.id,
            composition = %constraint.composition_type(),
            components = constraint.components.len(),
            "Composite constraint added"
        );
        let _ = self.composite.insert(constraint.id.clone(), constraint);
        Ok(())
    }

    /// Look up a constraint by id.
    pub fn get(&self, id: &ConstraintId) -> Result<ConstraintKind<'_>, EngineError> {
        if let Some(atomic) = self.atomic.get(id) {
            return Ok(ConstraintKind::Atomic(atomic));
        }
        if let Some(composite) = self.composite.get(id) {
            return Ok(ConstraintKind::Composite(composite));
        }
        Err(EngineError::ConstraintNotFound {
            constraint_id: id.clone(),
        })
    }

    /// Look up an atomic constraint directly.
    #[must_use]
    pub fn get_atomic(&self, id: &ConstraintId) -> Option<&AtomicConstraint> {
        self.atomic.get(id)
    }

    /// Look up a composite constraint directly.
    #[must_use]
    pub fn get_composite(&self, id: &ConstraintId) -> Option<&CompositeConstraint> {
        self.composite.get(id)
    }

    /// Whether any constraint with this id exists.
    #[must_use]
    pub fn contains(&self, id: &ConstraintId) -> bool {
        self.atomic.contains_key(id) || self.composite.contains_key(id)
    }

    /// Total number of constraints across both maps.
    #[must_use]
    pub fn total_constraints(&self) -> usize {
        self.atomic.len() + self.composite.len()
    }

    /// Number of atomic constraints.
    #[must_use]
    pub fn atomic_count(&self) -> usize {
        self.atomic.len()
    }

    /// Number of composite constraints.
    #[must_use]
    pub fn composite_count(&self) -> usize {
        self.composite.len()
    }

    /// Iterate over every stored constraint (unordered).
    pub fn iter(&self) -> impl Iterator<Item = ConstraintKind<'_>> {
        self.atomic
            .values()
            .map(ConstraintKind::Atomic)
            .chain(self.composite.values().map(ConstraintKind::Composite))
    }

    /// All constraint ids, sorted ascending for deterministic output.
    #[must_use]
    pub fn ids(&self) -> Vec<ConstraintId> {
        let mut ids: Vec<ConstraintId> = self
            .atomic
            .keys()
            .chain(self.composite.keys())
            .cloned()
            .collect();
        ids.sort();
        ids
    }

    /// Optional eager cycle pre-check for library-finalize time.
    ///
    /// Walks every composite's reference graph. Missing targets are ignored
    /// here (they stay a lazy resolution concern); only reference cycles are
    /// reported, with the full cycle path in traversal order.
    pub fn verify_acyclic(&self) -> Result<(), EngineError> {
        let mut finished: HashSet<ConstraintId> = HashSet::new();
        for id in self.composite.keys() {
            if finished.contains(id) {
                continue;
            }
            let mut stack = Vec::new();
            self.walk_acyclic(id, &mut stack, &mut finished)?;
        }
        Ok(())
    }

    fn walk_acyclic(
        &self,
        id: &ConstraintId,
        stack: &mut Vec<ConstraintId>,
        finished: &mut HashSet<ConstraintId>,
    ) -> Result<(), EngineError> {
        if finished.contains(id) {
            return Ok(());
        }
        let Some(composite) = self.composite.get(id) else {
            // Atomic or missing: leaves cannot participate in a cycle.
            return Ok(());
        };

        if let Some(position) = stack.iter().position(|seen| seen == id) {
            let mut path: Vec<ConstraintId> = stack[position..].to_vec();
            path.push(id.clone());
            return Err(EngineError::CircularReference { path });
        }

        stack.push(id.clone());
        for reference in &composite.components {
            self.walk_acyclic(&reference.target_id, stack, finished)?;
        }
        let _ = stack.pop();
        let _ = finished.insert(id.clone());
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
