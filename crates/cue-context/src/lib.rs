//! # cue-context
//!
//! Context analysis and trigger matching for the Cue engine.
//!
//! - [`InteractionSnapshot`]: the raw signals the transport hands over per
//!   interaction (tool name, free text, touched paths, recent actions)
//! - [`ContextAnalyzer`]: classifies a snapshot into a [`SessionContext`]
//!   development-context signal, with a confidence floor guarding against
//!   over-triggering
//! - [`TriggerMatcher`]: scores every library constraint against the session
//!   context and ranks the candidates deterministically

#![deny(unsafe_code)]

pub mod analyzer;
pub mod matching;
pub mod snapshot;

pub use analyzer::{ContextAnalyzer, ContextType, SessionContext};
pub use matching::{ActivationCandidate, MatchReason, TriggerMatcher};
pub use snapshot::InteractionSnapshot;
