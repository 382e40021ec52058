//! Bounded in-memory activation log.
//!
//! The feedback subsystem rates constraint effectiveness after the fact; the
//! engine's side of that boundary is this log: constraint id, activation
//! timestamp, and reason codes per activation. The core never reads or
//! writes feedback data itself.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use cue_context::analyzer::ContextType;
use cue_context::matching::MatchReason;
use cue_core::ids::{ActivationId, ConstraintId, SessionId};

/// One constraint activation, for feedback attribution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationRecord {
    /// Unique id of this activation.
    pub activation_id: ActivationId,
    /// The activated constraint.
    pub constraint_id: ConstraintId,
    /// Session the activation belongs to, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    /// Context classification at activation time.
    pub context_type: ContextType,
    /// Why the constraint matched.
    pub reasons: Vec<MatchReason>,
    /// When the activation happened.
    pub activated_at: DateTime<Utc>,
}

/// Bounded ring of activation records.
///
/// Appends from the planning path; the oldest record is dropped once the
/// capacity is reached. Interior mutability keeps the planning path `&self`.
#[derive(Debug)]
pub struct ActivationLog {
    entries: Mutex<VecDeque<ActivationRecord>>,
    capacity: usize,
}

impl ActivationLog {
    /// A log holding at most `capacity` records.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity.min(64))),
            capacity: capacity.max(1),
        }
    }

    /// Append a record, evicting the oldest when full.
    pub fn record(&self, record: ActivationRecord) {
        let mut entries = self.entries.lock();
        if entries.len() == self.capacity {
            let _ = entries.pop_front();
        }
        entries.push_back(record);
    }

    /// The most recent `n` records, newest last.
    #[must_use]
    pub fn recent(&self, n: usize) -> Vec<ActivationRecord> {
        let entries = self.entries.lock();
        let skip = entries.len().saturating_sub(n);
        entries.iter().skip(skip).cloned().collect()
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Drop every record.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
