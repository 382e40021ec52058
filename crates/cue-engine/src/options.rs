//! Engine options and per-constraint overrides.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use cue_core::constants::{
    DEFAULT_ACTIVATION_LOG_CAPACITY, DEFAULT_CANDIDATE_BUDGET_MS, DEFAULT_CONFIDENCE_FLOOR,
    DEFAULT_MAX_PER_INJECTION,
};
use cue_core::ids::ConstraintId;

/// Per-constraint user override.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConstraintOverride {
    /// Force-enable or force-disable the constraint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Replace the constraint's declared priority.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<f64>,
}

/// Configuration for a [`CueEngine`](crate::CueEngine) instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineOptions {
    /// Ceiling on constraints activated per interaction.
    pub max_per_injection: usize,
    /// Per-candidate resolution budget in milliseconds; overruns are skipped.
    pub candidate_budget_ms: u64,
    /// Classification confidence floor (below it: `Unclear`, no activation).
    pub confidence_floor: f64,
    /// Capacity of the in-memory activation log.
    pub log_capacity: usize,
    /// Per-constraint overrides, keyed by constraint id.
    pub overrides: HashMap<ConstraintId, ConstraintOverride>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_per_injection: DEFAULT_MAX_PER_INJECTION,
            candidate_budget_ms: DEFAULT_CANDIDATE_BUDGET_MS,
            confidence_floor: DEFAULT_CONFIDENCE_FLOOR,
            log_capacity: DEFAULT_ACTIVATION_LOG_CAPACITY,
            overrides: HashMap::new(),
        }
    }
}

impl EngineOptions {
    /// Whether a constraint is enabled, accounting for overrides.
    #[must_use]
    pub fn is_enabled(&self, constraint_id: &ConstraintId) -> bool {
        self.overrides
            .get(constraint_id)
            .and_then(|o| o.enabled)
            .unwrap_or(true)
    }

    /// A constraint's effective priority, accounting for overrides.
    #[must_use]
    pub fn effective_priority(&self, constraint_id: &ConstraintId, declared: f64) -> f64 {
        self.overrides
            .get(constraint_id)
            .and_then(|o| o.priority)
            .unwrap_or(declared)
    }
}
