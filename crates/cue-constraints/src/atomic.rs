//! Atomic constraints: leaf reminder definitions.

use serde::{Deserialize, Serialize};

use cue_core::ids::ConstraintId;
use cue_core::validate::{ValidationErrors, Validator};

use crate::triggers::TriggerConfiguration;

/// A leaf constraint: its own triggers and reminder text, no references to
/// other constraints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtomicConstraint {
    /// Unique constraint key.
    pub id: ConstraintId,
    /// Human-readable title.
    pub title: String,
    /// Relative importance in `[0.0, 1.0]`; factors into candidate ranking.
    pub priority: f64,
    /// When this constraint is relevant.
    #[serde(default)]
    pub triggers: TriggerConfiguration,
    /// Reminder lines injected when the constraint activates, in order.
    pub reminders: Vec<String>,
}

impl AtomicConstraint {
    /// Create a validated atomic constraint.
    pub fn new(
        id: impl Into<ConstraintId>,
        title: impl Into<String>,
        priority: f64,
        triggers: TriggerConfiguration,
        reminders: Vec<String>,
    ) -> Result<Self, ValidationErrors> {
        let constraint = Self {
            id: id.into(),
            title: title.into(),
            priority,
            triggers,
            reminders,
        };
        constraint.validate()?;
        Ok(constraint)
    }

    /// Validate field invariants (used for both constructed and deserialized values).
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let subject = format!("atomic constraint {}", self.id);
        let mut validator = Validator::new(&subject)
            .check("id", !self.id.is_empty(), "must not be empty")
            .require_non_empty("title", &self.title)
            .require_unit_range("priority", self.priority)
            .require_non_empty_list("reminders", &self.reminders);
        if let Err(trigger_errors) = self.triggers.validate(&subject) {
            for error in trigger_errors.errors {
                validator = validator.push(error);
            }
        }
        validator.finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
