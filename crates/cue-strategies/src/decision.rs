//! The activation decision a strategy hands back to the plan builder.

use serde::{Deserialize, Serialize};

use cue_core::ids::ConstraintId;

/// Which resolved sub-constraint(s) fire next, and why.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextActivation {
    /// Ids of the sub-constraints due now, in activation order.
    pub targets: Vec<ConstraintId>,
    /// Extra guidance lines beyond the targets' own reminders (barrier stages).
    #[serde(default)]
    pub extra_guidance: Vec<String>,
    /// Human-readable explanation of the decision.
    pub reason: String,
    /// Whether the composition has nothing further to activate.
    pub exhausted: bool,
}

impl NextActivation {
    /// A decision activating the given targets.
    #[must_use]
    pub fn activate(targets: Vec<ConstraintId>, reason: impl Into<String>) -> Self {
        Self {
            targets,
            extra_guidance: Vec::new(),
            reason: reason.into(),
            exhausted: false,
        }
    }

    /// A terminal decision: the composition is exhausted.
    #[must_use]
    pub fn exhausted(reason: impl Into<String>) -> Self {
        Self {
            targets: Vec::new(),
            extra_guidance: Vec::new(),
            reason: reason.into(),
            exhausted: true,
        }
    }

    /// Attach extra guidance lines.
    #[must_use]
    pub fn with_guidance(mut self, guidance: Vec<String>) -> Self {
        self.extra_guidance = guidance;
        self
    }
}
