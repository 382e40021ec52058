//! Hierarchical composition: levels unlocked bottom-up.
//!
//! Components are grouped into levels 0..N. Level k+1 becomes eligible only
//! once the caller marks level k satisfied. The lowest (most foundational)
//! eligible level always wins; within a level, ties are broken by priority
//! descending, then id ascending.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use cue_constraints::composite::HierarchyLevel;
use cue_core::ids::ConstraintId;
use cue_resolver::resolved::ResolvedConstraint;

use crate::decision::NextActivation;

/// Which hierarchy levels the caller has marked satisfied.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchicalProgress {
    /// Levels marked satisfied, in any order.
    pub satisfied: BTreeSet<u32>,
}

impl HierarchicalProgress {
    /// Initial state: nothing satisfied, level 0 due.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a level satisfied. Undeclared levels are ignored with a warning.
    pub fn mark_satisfied(&mut self, level: u32, levels: &[HierarchyLevel]) {
        if levels.iter().any(|l| l.level == level) {
            let _ = self.satisfied.insert(level);
        } else {
            warn!(level, "Ignoring satisfaction signal for undeclared hierarchy level");
        }
    }

    /// Forget all satisfaction marks.
    pub fn reset(&mut self) {
        self.satisfied.clear();
    }

    /// The lowest declared level not yet satisfied, if any.
    #[must_use]
    pub fn current_level<'a>(&self, levels: &'a [HierarchyLevel]) -> Option<&'a HierarchyLevel> {
        levels.iter().find(|l| !self.satisfied.contains(&l.level))
    }

    /// Decide what fires next: the lowest eligible level's members, ordered
    /// by priority descending then id ascending.
    #[must_use]
    pub fn next_activation(
        &self,
        levels: &[HierarchyLevel],
        components: &[Arc<ResolvedConstraint>],
    ) -> NextActivation {
        let Some(level) = self.current_level(levels) else {
            return NextActivation::exhausted("top level reached");
        };

        let mut members: Vec<(&ConstraintId, f64)> = level
            .member_ids
            .iter()
            .map(|id| {
                let priority = components
                    .iter()
                    .find(|c| c.id() == id)
                    .map_or(0.0, |c| c.priority());
                (id, priority)
            })
            .collect();
        // Priority descending, then id ascending.
        members.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });

        NextActivation::activate(
            members.into_iter().map(|(id, _)| id.clone()).collect(),
            format!("level {} due", level.level),
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
