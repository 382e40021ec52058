//! Error types for the Cue engine.
//!
//! Two families share one enum:
//!
//! - **Structural errors** (duplicate id, dangling reference, circular
//!   reference, invalid definition) indicate a broken library and fail fast
//!   at build or resolve time, carrying the complete offending path.
//! - **Activation-policy errors** (skip attempt, layer violation) mean "this
//!   activation is not allowed right now". They are recoverable: the engine
//!   reports them and continues serving other constraints.
//!
//! No error here should ever crash the hosting process; every failure is a
//! typed value the caller can branch on.

use thiserror::Error;

use crate::ids::ConstraintId;
use crate::validate::ValidationErrors;

/// Render a cycle path as `X -> Y -> X`.
fn cycle_path(path: &[ConstraintId]) -> String {
    path.iter()
        .map(ConstraintId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Errors surfaced by the constraint engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A constraint ID was inserted twice (case-insensitive).
    #[error("duplicate constraint id: {constraint_id}")]
    DuplicateConstraint {
        /// The ID that already exists in the library.
        constraint_id: ConstraintId,
    },

    /// A constraint ID was looked up but does not exist in the library.
    #[error("constraint not found: {constraint_id}")]
    ConstraintNotFound {
        /// The missing ID.
        constraint_id: ConstraintId,
    },

    /// A composite constraint transitively refers back to itself.
    #[error("circular constraint reference: {}", cycle_path(.path))]
    CircularReference {
        /// The full cycle in traversal order, e.g. `X -> Y -> X`.
        path: Vec<ConstraintId>,
    },

    /// A progressive composition was asked to jump past the next level.
    #[error("cannot skip to level {attempted_level}, expected level {expected_level}")]
    SkipAttempt {
        /// The level that was requested.
        attempted_level: u32,
        /// The only level that may be requested from the current one.
        expected_level: u32,
    },

    /// A layered composition detected a dependency outside an allow-list.
    #[error("layer violation: {source_layer} may not depend on {target_layer}")]
    LayerViolation {
        /// The layer declaring the dependency.
        source_layer: String,
        /// The disallowed target layer.
        target_layer: String,
    },

    /// A definition failed field validation.
    #[error("{0}")]
    Validation(#[from] ValidationErrors),
}

impl EngineError {
    /// Machine-readable error code for the transport boundary.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateConstraint { .. } => "DUPLICATE_CONSTRAINT",
            Self::ConstraintNotFound { .. } => "CONSTRAINT_NOT_FOUND",
            Self::CircularReference { .. } => "CIRCULAR_REFERENCE",
            Self::SkipAttempt { .. } => "SKIP_ATTEMPT",
            Self::LayerViolation { .. } => "LAYER_VIOLATION",
            Self::Validation(_) => "VALIDATION_ERROR",
        }
    }

    /// Whether this is a recoverable activation-policy refusal rather than a
    /// structural fault.
    #[must_use]
    pub fn is_policy(&self) -> bool {
        matches!(self, Self::SkipAttempt { .. } | Self::LayerViolation { .. })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
