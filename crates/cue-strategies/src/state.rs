//! Per-composite strategy state and dispatch.
//!
//! [`StrategyState`] is the closed variant the engine stores per composite:
//! one case per composition type, dispatched on the tag. Signals mutate it;
//! [`StrategyState::next_activation`] reads it. Layered compositions are a
//! stateless policy, so their case carries nothing.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use cue_constraints::composite::CompositionMetadata;
use cue_core::errors::EngineError;
use cue_resolver::resolved::ResolvedConstraint;

use crate::decision::NextActivation;
use crate::hierarchical::HierarchicalProgress;
use crate::layered::LayeredPolicy;
use crate::progressive::ProgressiveProgress;
use crate::sequential::SequentialProgress;
use crate::signals::TransitionSignal;

/// Mutable state for one composite's composition strategy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "camelCase")]
pub enum StrategyState {
    /// Position in a sequential composition.
    Sequential(SequentialProgress),
    /// Satisfaction marks of a hierarchical composition.
    Hierarchical(HierarchicalProgress),
    /// Level and history of a progressive composition.
    Progressive(ProgressiveProgress),
    /// Layered policy is stateless.
    Layered,
}

impl StrategyState {
    /// Initial state for a composition: not started / level 0 / index 0.
    #[must_use]
    pub fn for_composition(metadata: &CompositionMetadata) -> Self {
        match metadata {
            CompositionMetadata::Sequential => Self::Sequential(SequentialProgress::new()),
            CompositionMetadata::Hierarchical { .. } => {
                Self::Hierarchical(HierarchicalProgress::new())
            }
            CompositionMetadata::Progressive { .. } => {
                Self::Progressive(ProgressiveProgress::new())
            }
            CompositionMetadata::Layered { .. } => Self::Layered,
        }
    }

    /// Apply an explicit external transition signal.
    ///
    /// `component_count` bounds sequential advancement. A signal that does
    /// not fit the composition type is logged and ignored; a refused
    /// progressive jump surfaces as `SkipAttempt`.
    pub fn apply_signal(
        &mut self,
        metadata: &CompositionMetadata,
        signal: &TransitionSignal,
        component_count: usize,
    ) -> Result<(), EngineError> {
        if matches!(signal, TransitionSignal::Reset) {
            self.reset();
            return Ok(());
        }

        match (self, metadata, signal) {
            (Self::Sequential(progress), CompositionMetadata::Sequential, TransitionSignal::PhaseComplete) => {
                progress.advance(component_count);
                Ok(())
            }
            (
                Self::Hierarchical(progress),
                CompositionMetadata::Hierarchical { levels },
                TransitionSignal::LevelSatisfied { level },
            ) => {
                progress.mark_satisfied(*level, levels);
                Ok(())
            }
            (
                Self::Progressive(progress),
                CompositionMetadata::Progressive { levels },
                TransitionSignal::AdvanceToLevel { level },
            ) => progress.advance_to_level(*level, levels),
            (state, metadata, signal) => {
                warn!(
                    composition = %metadata.composition_type(),
                    ?signal,
                    ?state,
                    "Ignoring transition signal that does not fit the composition"
                );
                Ok(())
            }
        }
    }

    /// Return to the initial state.
    pub fn reset(&mut self) {
        match self {
            Self::Sequential(progress) => progress.reset(),
            Self::Hierarchical(progress) => progress.reset(),
            Self::Progressive(progress) => progress.reset(),
            Self::Layered => {}
        }
    }

    /// Decide which sub-constraint(s) of the composite fire next.
    #[must_use]
    pub fn next_activation(
        &self,
        metadata: &CompositionMetadata,
        components: &[Arc<ResolvedConstraint>],
    ) -> NextActivation {
        match (self, metadata) {
            (Self::Sequential(progress), CompositionMetadata::Sequential) => {
                progress.next_activation(components)
            }
            (Self::Hierarchical(progress), CompositionMetadata::Hierarchical { levels }) => {
                progress.next_activation(levels, components)
            }
            (Self::Progressive(progress), CompositionMetadata::Progressive { levels }) => {
                progress.next_activation(levels)
            }
            (Self::Layered, CompositionMetadata::Layered { layers }) => {
                LayeredPolicy::new(layers).next_activation()
            }
            (state, metadata) => {
                // State built for one composition cannot read another's metadata.
                warn!(
                    composition = %metadata.composition_type(),
                    ?state,
                    "Strategy state does not match composition metadata"
                );
                NextActivation::exhausted("strategy state mismatch")
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
