//! # cue-constraints
//!
//! Constraint model and library for the Cue engine.
//!
//! - Constraint types: atomic leaves, composite compositions, id references
//! - Trigger configuration: keywords, file globs, context patterns, threshold
//! - [`ConstraintLibrary`]: id-indexed store enforcing global id uniqueness
//! - Built-in methodology pack (TDD, refactoring levels, clean architecture)
//!
//! Relationships between constraints are pure id references resolved against
//! the library; nothing here owns a pointer to another constraint.

#![deny(unsafe_code)]

pub mod atomic;
pub mod composite;
pub mod library;
pub mod packs;
pub mod triggers;

pub use atomic::AtomicConstraint;
pub use composite::{
    CompositeConstraint, CompositionMetadata, CompositionType, ConstraintReference,
    HierarchyLevel, LayerSpec, ProgressiveLevel,
};
pub use library::{ConstraintKind, ConstraintLibrary};
pub use triggers::{CompiledTriggers, TriggerConfiguration};
