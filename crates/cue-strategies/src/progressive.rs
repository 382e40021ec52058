//! Progressive composition: ordered levels with skip prevention.
//!
//! Levels are numbered from 1 (level 0 means "not started"). Advancing is
//! legal only to the next declared level; any larger jump fails with
//! `SkipAttempt{attempted_level, expected_level}`. Barrier levels append
//! extra guidance entries beyond the base reminder set, typically where users
//! historically stall. The state tracks the current level and a timestamped
//! level history for observability.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use cue_constraints::composite::ProgressiveLevel;
use cue_core::errors::EngineError;

use crate::decision::NextActivation;

/// One recorded level transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelTransition {
    /// Level before the transition (0 = not started).
    pub from: u32,
    /// Level after the transition.
    pub to: u32,
    /// When the transition was applied.
    pub at: DateTime<Utc>,
}

/// Position and history within a progressive composition.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressiveProgress {
    /// Current level; 0 means not started.
    pub current_level: u32,
    /// Every applied transition, oldest first.
    pub level_history: Vec<LevelTransition>,
}

impl ProgressiveProgress {
    /// Initial state: not started, level 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The next declared level after the current one, if any.
    #[must_use]
    pub fn expected_level(&self, levels: &[ProgressiveLevel]) -> Option<u32> {
        levels
            .iter()
            .map(|l| l.level)
            .find(|level| *level > self.current_level)
    }

    /// Advance to a specific level.
    ///
    /// Succeeds only for the next declared level. Any other request fails
    /// with `SkipAttempt`; at the top level there is no legal advance and the
    /// expected level reported is the current one.
    pub fn advance_to_level(
        &mut self,
        attempted_level: u32,
        levels: &[ProgressiveLevel],
    ) -> Result<(), EngineError> {
        let expected = self.expected_level(levels).unwrap_or(self.current_level);
        if attempted_level != expected || expected == self.current_level {
            return Err(EngineError::SkipAttempt {
                attempted_level,
                expected_level: expected,
            });
        }

        debug!(from = self.current_level, to = attempted_level, "Progressive level advance");
        self.level_history.push(LevelTransition {
            from: self.current_level,
            to: attempted_level,
            at: Utc::now(),
        });
        self.current_level = attempted_level;
        Ok(())
    }

    /// Return to the initial state, clearing history.
    pub fn reset(&mut self) {
        self.current_level = 0;
        self.level_history.clear();
    }

    /// The declared level struct for the current position, if started.
    #[must_use]
    pub fn current<'a>(&self, levels: &'a [ProgressiveLevel]) -> Option<&'a ProgressiveLevel> {
        levels.iter().find(|l| l.level == self.current_level)
    }

    /// Decide what fires next.
    ///
    /// Not started: the first declared level is due. Started: the current
    /// level's members are due; barrier levels carry their extra guidance.
    /// Past the last level there is nothing further.
    #[must_use]
    pub fn next_activation(&self, levels: &[ProgressiveLevel]) -> NextActivation {
        let due = if self.current_level == 0 {
            levels.first()
        } else {
            self.current(levels)
        };

        let Some(level) = due else {
            return NextActivation::exhausted("top level reached");
        };

        let reason = if self.current_level == 0 {
            format!("level {} due (not started)", level.level)
        } else if level.is_barrier {
            format!("level {} active (barrier)", level.level)
        } else {
            format!("level {} active", level.level)
        };

        let decision = NextActivation::activate(level.member_ids.clone(), reason);
        if level.is_barrier && self.current_level == level.level {
            decision.with_guidance(level.barrier_guidance.clone())
        } else {
            decision
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
