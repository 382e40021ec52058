//! Resolved constraint trees.
//!
//! The closed two-case variant the rest of the engine dispatches on: an
//! atomic leaf or a composite node whose children are already resolved.
//! Children are `Arc`-shared so a subtree memoized by the resolver can appear
//! in many parents without duplication.

use std::sync::Arc;

use cue_constraints::atomic::AtomicConstraint;
use cue_constraints::composite::{CompositeConstraint, CompositionType};
use cue_core::ids::ConstraintId;

/// A fully resolved constraint: no unresolved reference ids remain.
#[derive(Clone, Debug)]
pub enum ResolvedConstraint {
    /// A leaf, exactly as stored in the library.
    Atomic(AtomicConstraint),
    /// A composite whose components are all resolved.
    Composite {
        /// The composite definition (still holds the declarative references).
        constraint: CompositeConstraint,
        /// Resolved components, in the composite's declared order.
        components: Vec<Arc<ResolvedConstraint>>,
    },
}

impl ResolvedConstraint {
    /// The constraint's id.
    #[must_use]
    pub fn id(&self) -> &ConstraintId {
        match self {
            Self::Atomic(c) => &c.id,
            Self::Composite { constraint, .. } => &constraint.id,
        }
    }

    /// The constraint's priority.
    #[must_use]
    pub fn priority(&self) -> f64 {
        match self {
            Self::Atomic(c) => c.priority,
            Self::Composite { constraint, .. } => constraint.priority,
        }
    }

    /// Whether this is a leaf.
    #[must_use]
    pub fn is_atomic(&self) -> bool {
        matches!(self, Self::Atomic(_))
    }

    /// The composition type, if this is a composite.
    #[must_use]
    pub fn composition_type(&self) -> Option<CompositionType> {
        match self {
            Self::Atomic(_) => None,
            Self::Composite { constraint, .. } => Some(constraint.composition_type()),
        }
    }

    /// Resolved components (empty for a leaf).
    #[must_use]
    pub fn components(&self) -> &[Arc<ResolvedConstraint>] {
        match self {
            Self::Atomic(_) => &[],
            Self::Composite { components, .. } => components,
        }
    }

    /// Find a direct component by id.
    #[must_use]
    pub fn component(&self, id: &ConstraintId) -> Option<&Arc<ResolvedConstraint>> {
        self.components().iter().find(|c| c.id() == id)
    }

    /// Whether `id` appears anywhere in this tree (including the root).
    #[must_use]
    pub fn contains_id(&self, id: &ConstraintId) -> bool {
        if self.id() == id {
            return true;
        }
        self.components().iter().any(|c| c.contains_id(id))
    }

    /// Number of atomic leaves in the tree.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Atomic(_) => 1,
            Self::Composite { components, .. } => {
                components.iter().map(|c| c.leaf_count()).sum()
            }
        }
    }

    /// Collect every leaf's reminders in tree order as `(leaf id, line)` pairs.
    #[must_use]
    pub fn collect_reminders(&self) -> Vec<(ConstraintId, String)> {
        let mut out = Vec::new();
        self.collect_reminders_into(&mut out);
        out
    }

    fn collect_reminders_into(&self, out: &mut Vec<(ConstraintId, String)>) {
        match self {
            Self::Atomic(c) => {
                for reminder in &c.reminders {
                    out.push((c.id.clone(), reminder.clone()));
                }
            }
            Self::Composite { components, .. } => {
                for component in components {
                    component.collect_reminders_into(out);
                }
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
