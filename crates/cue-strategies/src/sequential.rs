//! Sequential composition: a fixed order, one step at a time.
//!
//! The canonical example is RED/GREEN/REFACTOR: the components form a fixed
//! order, the state is a single index, and advancing requires an explicit
//! external signal ("test now failing", "test now passing"). No index may be
//! skipped.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use cue_resolver::resolved::ResolvedConstraint;

use crate::decision::NextActivation;

/// Position within a sequential composition.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequentialProgress {
    /// Index of the component currently due. Starts at 0.
    pub index: usize,
}

impl SequentialProgress {
    /// Initial state: the first component is due.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether every component has been stepped past.
    #[must_use]
    pub fn is_exhausted(&self, component_count: usize) -> bool {
        self.index >= component_count
    }

    /// Advance one step. Saturates at the exhausted position; never skips.
    pub fn advance(&mut self, component_count: usize) {
        if self.index < component_count {
            self.index += 1;
        }
    }

    /// Return to the first step.
    pub fn reset(&mut self) {
        self.index = 0;
    }

    /// The component currently due.
    #[must_use]
    pub fn next_activation(&self, components: &[Arc<ResolvedConstraint>]) -> NextActivation {
        let Some(current) = components.get(self.index) else {
            return NextActivation::exhausted("sequence exhausted");
        };
        NextActivation::activate(
            vec![current.id().clone()],
            format!("step {} of {}", self.index + 1, components.len()),
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
