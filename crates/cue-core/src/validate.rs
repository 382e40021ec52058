//! Field validation pipeline.
//!
//! Every parameter-object constructor in the engine funnels through
//! [`Validator`]: check each field, collect every failure, and return them all
//! at once instead of stopping at the first. This replaces per-type
//! hand-rolled builders with one shared pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single failed field check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    /// Field that failed, e.g. `priority`.
    pub field: String,
    /// What was wrong with it.
    pub message: String,
}

impl ValidationError {
    /// Create a validation error for one field.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Join failed checks for display.
fn render_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// All field failures for one definition, reported together.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("invalid {subject}: {}", render_errors(.errors))]
pub struct ValidationErrors {
    /// What was being validated, e.g. `atomic constraint tdd.red`.
    pub subject: String,
    /// Every failed check.
    pub errors: Vec<ValidationError>,
}

impl ValidationErrors {
    /// Number of failed checks.
    #[must_use]
    pub fn count(&self) -> usize {
        self.errors.len()
    }
}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self {
            subject: "definition".to_owned(),
            errors,
        }
    }
}

/// Collects field checks for one subject and reports them all at once.
///
/// # Example
///
/// ```ignore
/// Validator::new("atomic constraint tdd.red")
///     .require_non_empty("title", title)
///     .require_unit_range("priority", priority)
///     .finish()?;
/// ```
#[derive(Debug)]
pub struct Validator {
    subject: String,
    errors: Vec<ValidationError>,
}

impl Validator {
    /// Start validating a named subject.
    #[must_use]
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            errors: Vec::new(),
        }
    }

    /// Require a string field to be non-empty after trimming.
    #[must_use]
    pub fn require_non_empty(mut self, field: &str, value: &str) -> Self {
        if value.trim().is_empty() {
            self.errors
                .push(ValidationError::new(field, "must not be empty"));
        }
        self
    }

    /// Require a collection field to contain at least one element.
    #[must_use]
    pub fn require_non_empty_list<T>(mut self, field: &str, values: &[T]) -> Self {
        if values.is_empty() {
            self.errors
                .push(ValidationError::new(field, "must contain at least one entry"));
        }
        self
    }

    /// Require a float field to be a finite value in `[0.0, 1.0]`.
    #[must_use]
    pub fn require_unit_range(mut self, field: &str, value: f64) -> Self {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            self.errors.push(ValidationError::new(
                field,
                format!("must be within [0.0, 1.0], got {value}"),
            ));
        }
        self
    }

    /// Apply an arbitrary check, recording `message` for `field` on failure.
    #[must_use]
    pub fn check(mut self, field: &str, ok: bool, message: impl Into<String>) -> Self {
        if !ok {
            self.errors.push(ValidationError::new(field, message));
        }
        self
    }

    /// Record an already-detected failure.
    #[must_use]
    pub fn push(mut self, error: ValidationError) -> Self {
        self.errors.push(error);
        self
    }

    /// Whether any check has failed so far.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Finish: `Ok(())` if every check passed, otherwise all failures.
    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors {
                subject: self.subject,
                errors: self.errors,
            })
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_validator_passes() {
        assert!(Validator::new("thing").finish().is_ok());
    }

    #[test]
    fn non_empty_string_check() {
        let result = Validator::new("thing")
            .require_non_empty("title", "  ")
            .finish();
        let errors = result.unwrap_err();
        assert_eq!(errors.count(), 1);
        assert_eq!(errors.errors[0].field, "title");
    }

    #[test]
    fn unit_range_accepts_bounds() {
        assert!(
            Validator::new("thing")
                .require_unit_range("priority", 0.0)
                .require_unit_range("priority", 1.0)
                .finish()
                .is_ok()
        );
    }

    #[test]
    fn unit_range_rejects_outside_and_nan() {
        let result = Validator::new("thing")
            .require_unit_range("a", 1.5)
            .require_unit_range("b", -0.1)
            .require_unit_range("c", f64::NAN)
            .finish();
        assert_eq!(result.unwrap_err().count(), 3);
    }

    #[test]
    fn collects_all_failures() {
        let result = Validator::new("atomic constraint x")
            .require_non_empty("id", "")
            .require_non_empty_list::<String>("reminders", &[])
            .require_unit_range("priority", 2.0)
            .finish();
        let errors = result.unwrap_err();
        assert_eq!(errors.count(), 3);
        let rendered = errors.to_string();
        assert!(rendered.contains("atomic constraint x"));
        assert!(rendered.contains("id"));
        assert!(rendered.contains("reminders"));
        assert!(rendered.contains("priority"));
    }

    #[test]
    fn check_records_message() {
        let errors = Validator::new("thing")
            .check("layers", false, "unknown layer in allow-list")
            .finish()
            .unwrap_err();
        assert_eq!(errors.errors[0].message, "unknown layer in allow-list");
    }

    #[test]
    fn has_errors_reflects_state() {
        let v = Validator::new("thing");
        assert!(!v.has_errors());
        let v = v.require_non_empty("id", "");
        assert!(v.has_errors());
    }

    #[test]
    fn display_joins_with_semicolons() {
        let errors = Validator::new("composite y")
            .require_non_empty("a", "")
            .require_non_empty("b", "")
            .finish()
            .unwrap_err();
        assert_eq!(
            errors.to_string(),
            "invalid composite y: a: must not be empty; b: must not be empty"
        );
    }
}
