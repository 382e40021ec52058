//! The activation plan handed back to the transport.

use serde::{Deserialize, Serialize};

use cue_context::analyzer::ContextType;
use cue_core::ids::{ConstraintId, InteractionId};

/// One reminder line of the final payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedReminder {
    /// Constraint the line belongs to (the leaf that owns the text).
    pub constraint_id: ConstraintId,
    /// The reminder text to inject.
    pub reminder_text: String,
}

/// A candidate that qualified but was not activated, with the reason.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedCandidate {
    /// The skipped constraint.
    pub constraint_id: ConstraintId,
    /// Machine-readable error code, when the skip came from an error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Human-readable reason.
    pub reason: String,
}

/// The ordered reminder set for one interaction.
///
/// An empty `entries` list means "nothing qualifies"; the transport merges
/// the entries into its outgoing response verbatim. Skips are reported, not
/// silently dropped.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationPlan {
    /// Id of the interaction this plan answers.
    pub interaction_id: InteractionId,
    /// Context classification the plan was built for.
    pub context_type: ContextType,
    /// Classification confidence.
    pub confidence: f64,
    /// Ordered reminder lines.
    pub entries: Vec<PlannedReminder>,
    /// Candidates that qualified but were skipped (budget, exhaustion, errors).
    pub skipped: Vec<SkippedCandidate>,
    /// Wall-clock planning time in milliseconds.
    pub duration_ms: u64,
}

impl ActivationPlan {
    /// Whether the plan injects nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct constraint ids contributing entries, in first-seen order.
    #[must_use]
    pub fn activated_ids(&self) -> Vec<ConstraintId> {
        let mut ids: Vec<ConstraintId> = Vec::new();
        for entry in &self.entries {
            if !ids.contains(&entry.constraint_id) {
                ids.push(entry.constraint_id.clone());
            }
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_plan() {
        let plan = ActivationPlan {
            interaction_id: InteractionId::new(),
            context_type: ContextType::Unclear,
            confidence: 0.0,
            entries: Vec::new(),
            skipped: Vec::new(),
            duration_ms: 0,
        };
        assert!(plan.is_empty());
        assert!(plan.activated_ids().is_empty());
    }

    #[test]
    fn activated_ids_dedupe_in_order() {
        let entry = |id: &str, text: &str| PlannedReminder {
            constraint_id: ConstraintId::new(id),
            reminder_text: text.to_owned(),
        };
        let plan = ActivationPlan {
            interaction_id: InteractionId::new(),
            context_type: ContextType::Testing,
            confidence: 1.0,
            entries: vec![entry("a", "one"), entry("a", "two"), entry("b", "three")],
            skipped: Vec::new(),
            duration_ms: 1,
        };
        let ids: Vec<String> = plan.activated_ids().iter().map(ToString::to_string).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
