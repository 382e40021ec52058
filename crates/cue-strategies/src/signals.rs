//! External transition signals.
//!
//! Strategy state never changes on its own: the transport layer reports
//! explicit phase transitions ("tests now failing", "level 2 reached") and
//! the engine routes them to the owning composite's state machine.

use serde::{Deserialize, Serialize};

/// An explicit phase-transition signal from the transport layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TransitionSignal {
    /// The current sequential step completed; move to the next one.
    PhaseComplete,
    /// A hierarchical level has been satisfied by the caller.
    LevelSatisfied {
        /// The satisfied level.
        level: u32,
    },
    /// Request to advance a progressive composition to a specific level.
    AdvanceToLevel {
        /// The requested level.
        level: u32,
    },
    /// Return the composition to its initial state.
    Reset,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_tagged() {
        let json = serde_json::to_value(TransitionSignal::AdvanceToLevel { level: 3 }).unwrap();
        assert_eq!(json.get("type").and_then(|v| v.as_str()), Some("advanceToLevel"));
        assert_eq!(json.get("level").and_then(serde_json::Value::as_u64), Some(3));
    }

    #[test]
    fn phase_complete_roundtrip() {
        let json = serde_json::to_string(&TransitionSignal::PhaseComplete).unwrap();
        let back: TransitionSignal = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TransitionSignal::PhaseComplete);
    }
}
