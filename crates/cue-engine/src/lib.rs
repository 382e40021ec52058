//! # cue-engine
//!
//! Activation plan builder and engine facade.
//!
//! One interaction in, one activation plan out: the transport hands over an
//! [`InteractionSnapshot`](cue_context::InteractionSnapshot), the engine
//! classifies it, scores and ranks the library's constraints, resolves the
//! winners (budget-guarded), delegates composites to their composition
//! strategy, and returns an ordered list of `{constraint id, reminder text}`
//! pairs capped at the configured ceiling.
//!
//! The engine also owns:
//!
//! - [`EngineOptions`] with per-constraint overrides
//! - per-session [`SessionState`] holding each composite's strategy state
//! - the bounded [`ActivationLog`] consumed by the feedback subsystem

#![deny(unsafe_code)]

pub mod activation_log;
pub mod engine;
pub mod options;
pub mod plan;
pub mod session;

pub use activation_log::{ActivationLog, ActivationRecord};
pub use engine::CueEngine;
pub use options::{ConstraintOverride, EngineOptions};
pub use plan::{ActivationPlan, PlannedReminder, SkippedCandidate};
pub use session::SessionState;
