//! Per-session strategy state.
//!
//! Composition strategies are stateful across interactions within one
//! assistant session: the TDD sequence remembers its step, the refactoring
//! levels remember how far the session has climbed. [`SessionState`] holds
//! each composite's [`StrategyState`], created lazily on first use and fed
//! by explicit transition signals routed from the transport.

use std::collections::HashMap;

use tracing::debug;

use cue_constraints::composite::CompositeConstraint;
use cue_core::errors::EngineError;
use cue_core::ids::{ConstraintId, SessionId};
use cue_strategies::signals::TransitionSignal;
use cue_strategies::state::StrategyState;

/// Strategy state for every composite touched by one session.
#[derive(Debug)]
pub struct SessionState {
    session_id: SessionId,
    strategies: HashMap<ConstraintId, StrategyState>,
}

impl SessionState {
    /// Fresh state for a session: every composition starts "not started".
    #[must_use]
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            strategies: HashMap::new(),
        }
    }

    /// The owning session id.
    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Strategy state for a composite, created at its initial state on first
    /// access.
    pub fn strategy_mut(&mut self, composite: &CompositeConstraint) -> &mut StrategyState {
        self.strategies
            .entry(composite.id.clone())
            .or_insert_with(|| StrategyState::for_composition(&composite.composition))
    }

    /// Read-only view of a composite's strategy state, if it was ever touched.
    #[must_use]
    pub fn strategy(&self, composite_id: &ConstraintId) -> Option<&StrategyState> {
        self.strategies.get(composite_id)
    }

    /// Apply an explicit transition signal to a composite's state machine.
    pub fn apply_signal(
        &mut self,
        composite: &CompositeConstraint,
        signal: &TransitionSignal,
    ) -> Result<(), EngineError> {
        let component_count = composite.components.len();
        debug!(
            session_id = %self.session_id,
            constraint_id = %composite.id,
            ?signal,
            "Applying transition signal"
        );
        self.strategy_mut(composite)
            .apply_signal(&composite.composition, signal, component_count)
    }

    /// Number of composites with tracked state.
    #[must_use]
    pub fn tracked_count(&self) -> usize {
        self.strategies.len()
    }

    /// Drop all strategy state, returning every composition to its initial
    /// state on next use.
    pub fn clear(&mut self) {
        self.strategies.clear();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
