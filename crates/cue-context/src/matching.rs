//! Trigger matching: score and rank constraints against a session context.
//!
//! For every atomic constraint and every composite's root, a relevance score
//! combines the keyword-overlap ratio, a file-pattern hit, and a
//! context-pattern hit, each weighted. A constraint becomes an
//! [`ActivationCandidate`] only when its score exceeds its own confidence
//! threshold. Candidates are ranked by `score × priority` descending; ties
//! break by ascending constraint id, so ranking is reproducible across runs
//! and insertion orders.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use cue_constraints::library::ConstraintLibrary;
use cue_constraints::triggers::CompiledTriggers;
use cue_core::constants::{CONTEXT_PATTERN_WEIGHT, FILE_PATTERN_WEIGHT, KEYWORD_WEIGHT};
use cue_core::ids::ConstraintId;

use crate::analyzer::SessionContext;

/// Why a candidate matched, for downstream feedback attribution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchReason {
    /// Trigger keywords overlapped the extracted keywords.
    KeywordMatch,
    /// A file pattern matched a touched path.
    FileMatch,
    /// A context pattern matched the classification.
    ContextMatch,
}

impl fmt::Display for MatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeywordMatch => write!(f, "keyword-match"),
            Self::FileMatch => write!(f, "file-match"),
            Self::ContextMatch => write!(f, "context-match"),
        }
    }
}

/// A constraint whose relevance score exceeded its threshold.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationCandidate {
    /// The matching constraint.
    pub constraint_id: ConstraintId,
    /// Relevance score in `[0.0, 1.0]`.
    pub score: f64,
    /// The constraint's declared priority.
    pub priority: f64,
    /// Whether the constraint is a composite.
    pub is_composite: bool,
    /// Why it matched.
    pub reasons: Vec<MatchReason>,
}

impl ActivationCandidate {
    /// Ranking key: `score × priority`.
    #[must_use]
    pub fn rank(&self) -> f64 {
        self.score * self.priority
    }
}

/// One constraint's compiled matching data.
#[derive(Debug)]
struct CompiledEntry {
    constraint_id: ConstraintId,
    priority: f64,
    is_composite: bool,
    triggers: CompiledTriggers,
}

/// Scores library constraints against session contexts.
///
/// Trigger configurations are compiled once at construction; scoring per
/// interaction touches no I/O and allocates only the candidate list.
#[derive(Debug)]
pub struct TriggerMatcher {
    entries: Vec<CompiledEntry>,
}

impl TriggerMatcher {
    /// Compile every constraint's triggers from a library.
    ///
    /// A constraint whose trigger configuration fails to compile is skipped
    /// with a warning; validated libraries never hit this path.
    #[must_use]
    pub fn new(library: &ConstraintLibrary) -> Self {
        let mut entries = Vec::with_capacity(library.total_constraints());
        for kind in library.iter() {
            match kind.triggers().compile() {
                Ok(triggers) => entries.push(CompiledEntry {
                    constraint_id: kind.id().clone(),
                    priority: kind.priority(),
                    is_composite: kind.is_composite(),
                    triggers,
                }),
                Err(err) => {
                    warn!(constraint_id = %kind.id(), %err, "Skipping constraint with invalid triggers");
                }
            }
        }
        debug!(entries = entries.len(), "Trigger matcher compiled");
        Self { entries }
    }

    /// Number of compiled constraints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no constraint compiled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Score every constraint and return the ranked candidates.
    ///
    /// Only constraints whose score strictly exceeds their own threshold
    /// qualify. A context with no matching signal therefore produces an
    /// empty list.
    #[must_use]
    pub fn rank(&self, context: &SessionContext) -> Vec<ActivationCandidate> {
        let mut candidates: Vec<ActivationCandidate> = self
            .entries
            .iter()
            .filter_map(|entry| score_entry(entry, context))
            .collect();

        // score × priority descending; equal products fall back to ascending
        // id so the ordering is deterministic across runs.
        candidates.sort_by(|a, b| {
            b.rank()
                .partial_cmp(&a.rank())
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.constraint_id.cmp(&b.constraint_id))
        });

        debug!(candidates = candidates.len(), context = %context.context_type, "Candidates ranked");
        candidates
    }
}

/// Score one constraint; `None` when it does not qualify.
fn score_entry(entry: &CompiledEntry, context: &SessionContext) -> Option<ActivationCandidate> {
    let triggers = &entry.triggers;
    let mut score = 0.0;
    let mut reasons = Vec::new();

    if !triggers.keywords.is_empty() {
        let overlap = triggers
            .keywords
            .iter()
            .filter(|keyword| context.has_keyword(keyword))
            .count();
        if overlap > 0 {
            #[allow(clippy::cast_precision_loss)]
            let ratio = overlap as f64 / triggers.keywords.len() as f64;
            score += KEYWORD_WEIGHT * ratio;
            reasons.push(MatchReason::KeywordMatch);
        }
    }

    if context
        .touched_paths
        .iter()
        .any(|path| triggers.matches_file(path))
    {
        score += FILE_PATTERN_WEIGHT;
        reasons.push(MatchReason::FileMatch);
    }

    if triggers
        .context_patterns
        .iter()
        .any(|pattern| context.matches_pattern(pattern))
    {
        score += CONTEXT_PATTERN_WEIGHT;
        reasons.push(MatchReason::ContextMatch);
    }

    if score > triggers.confidence_threshold {
        Some(ActivationCandidate {
            constraint_id: entry.constraint_id.clone(),
            score,
            priority: entry.priority,
            is_composite: entry.is_composite,
            reasons,
        })
    } else {
        None
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    use cue_constraints::atomic::AtomicConstraint;
    use cue_constraints::triggers::TriggerConfiguration;

    use crate::analyzer::{ContextAnalyzer, ContextType};
    use crate::snapshot::InteractionSnapshot;

    fn make_atomic(id: &str, priority: f64, triggers: TriggerConfiguration) -> AtomicConstraint {
        AtomicConstraint {
            id: ConstraintId::new(id),
            title: id.to_owned(),
            priority,
            triggers,
            reminders: vec![format!("{id} reminder")],
        }
    }

    fn testing_context() -> SessionContext {
        ContextAnalyzer::new().analyze(
            &InteractionSnapshot::new()
                .with_text("write a failing test before the implementation")
                .with_path("tests/parser.rs"),
        )
    }

    #[test]
    fn unclear_context_yields_no_candidates() {
        let mut library = ConstraintLibrary::new();
        library
            .add_atomic(make_atomic(
                "testing.write-test-first",
                0.9,
                TriggerConfiguration::new(&["test"], &["tests/**"], &["testing"], 0.3),
            ))
            .unwrap();
        let matcher = TriggerMatcher::new(&library);

        let context = ContextAnalyzer::new().analyze(&InteractionSnapshot::new());
        assert_eq!(context.context_type, ContextType::Unclear);
        assert!(matcher.rank(&context).is_empty());
    }

    #[test]
    fn matching_constraint_becomes_candidate_with_reasons() {
        let mut library = ConstraintLibrary::new();
        library
            .add_atomic(make_atomic(
                "testing.write-test-first",
                0.9,
                TriggerConfiguration::new(&["test"], &["tests/**"], &["testing"], 0.3),
            ))
            .unwrap();
        let matcher = TriggerMatcher::new(&library);

        let candidates = matcher.rank(&testing_context());
        assert_eq!(candidates.len(), 1);
        let candidate = &candidates[0];
        // Full keyword overlap + file hit + context hit.
        assert!((candidate.score - 1.0).abs() < 1e-9);
        assert_eq!(
            candidate.reasons,
            vec![MatchReason::KeywordMatch, MatchReason::FileMatch, MatchReason::ContextMatch]
        );
    }

    #[test]
    fn score_must_strictly_exceed_threshold() {
        let mut library = ConstraintLibrary::new();
        // Keyword-only trigger: full overlap scores exactly KEYWORD_WEIGHT.
        library
            .add_atomic(make_atomic(
                "edge.exact-threshold",
                0.9,
                TriggerConfiguration::new(&["test"], &[], &[], KEYWORD_WEIGHT),
            ))
            .unwrap();
        let matcher = TriggerMatcher::new(&library);

        let context = ContextAnalyzer::new()
            .analyze(&InteractionSnapshot::new().with_text("test"));
        assert!(matcher.rank(&context).is_empty());
    }

    #[test]
    fn partial_keyword_overlap_scales_score() {
        let mut library = ConstraintLibrary::new();
        library
            .add_atomic(make_atomic(
                "half.overlap",
                1.0,
                TriggerConfiguration::new(&["test", "unrelatedword"], &[], &[], 0.1),
            ))
            .unwrap();
        let matcher = TriggerMatcher::new(&library);

        let context = ContextAnalyzer::new()
            .analyze(&InteractionSnapshot::new().with_text("run the test"));
        let candidates = matcher.rank(&context);
        assert_eq!(candidates.len(), 1);
        assert!((candidates[0].score - KEYWORD_WEIGHT * 0.5).abs() < 1e-9);
    }

    #[test]
    fn ranked_by_score_times_priority() {
        let mut library = ConstraintLibrary::new();
        let triggers = TriggerConfiguration::new(&["test"], &[], &[], 0.1);
        library
            .add_atomic(make_atomic("low.priority", 0.2, triggers.clone()))
            .unwrap();
        library
            .add_atomic(make_atomic("high.priority", 0.9, triggers))
            .unwrap();
        let matcher = TriggerMatcher::new(&library);

        let context = ContextAnalyzer::new()
            .analyze(&InteractionSnapshot::new().with_text("test this"));
        let candidates = matcher.rank(&context);
        assert_eq!(candidates[0].constraint_id, ConstraintId::new("high.priority"));
        assert_eq!(candidates[1].constraint_id, ConstraintId::new("low.priority"));
    }

    #[test]
    fn equal_rank_ties_break_by_ascending_id() {
        let mut library = ConstraintLibrary::new();
        let triggers = TriggerConfiguration::new(&["test"], &[], &[], 0.1);
        // Insert in descending id order to prove insertion order is irrelevant.
        library
            .add_atomic(make_atomic("zeta.rule", 0.5, triggers.clone()))
            .unwrap();
        library
            .add_atomic(make_atomic("alpha.rule", 0.5, triggers))
            .unwrap();
        let matcher = TriggerMatcher::new(&library);

        let context = ContextAnalyzer::new()
            .analyze(&InteractionSnapshot::new().with_text("test"));
        let candidates = matcher.rank(&context);
        assert_eq!(candidates[0].constraint_id, ConstraintId::new("alpha.rule"));
        assert_eq!(candidates[1].constraint_id, ConstraintId::new("zeta.rule"));
    }

    #[test]
    fn composite_roots_are_scored_too() {
        use cue_constraints::composite::{
            CompositeConstraint, CompositionMetadata, ConstraintReference,
        };

        let mut library = ConstraintLibrary::new();
        library
            .add_atomic(make_atomic(
                "testing.write-test-first",
                0.9,
                TriggerConfiguration::new(&["test"], &[], &[], 0.9),
            ))
            .unwrap();
        library
            .add_composite(CompositeConstraint {
                id: ConstraintId::new("methodology.tdd"),
                title: "TDD".to_owned(),
                priority: 0.9,
                triggers: TriggerConfiguration::new(&["test"], &[], &["testing"], 0.3),
                components: vec![ConstraintReference::to("testing.write-test-first")],
                composition: CompositionMetadata::Sequential,
            })
            .unwrap();
        let matcher = TriggerMatcher::new(&library);

        let candidates = matcher.rank(&testing_context());
        assert!(candidates.iter().any(|c| c.is_composite));
    }

    proptest! {
        /// Ranking is independent of library insertion order.
        #[test]
        fn ranking_is_deterministic_under_permutation(order in Just(vec![0usize, 1, 2, 3]).prop_shuffle()) {
            let definitions: Vec<AtomicConstraint> = vec![
                make_atomic("a.one", 0.5, TriggerConfiguration::new(&["test"], &[], &[], 0.1)),
                make_atomic("b.two", 0.5, TriggerConfiguration::new(&["test"], &[], &[], 0.1)),
                make_atomic("c.three", 0.7, TriggerConfiguration::new(&["test"], &[], &[], 0.1)),
                make_atomic("d.four", 0.3, TriggerConfiguration::new(&["test"], &[], &[], 0.1)),
            ];

            let mut library = ConstraintLibrary::new();
            for index in &order {
                library.add_atomic(definitions[*index].clone()).unwrap();
            }
            let matcher = TriggerMatcher::new(&library);

            let context = ContextAnalyzer::new()
                .analyze(&InteractionSnapshot::new().with_text("test"));
            let ranked: Vec<String> = matcher
                .rank(&context)
                .iter()
                .map(|c| c.constraint_id.to_string())
                .collect();
            prop_assert_eq!(ranked, vec!["c.three", "a.one", "b.two", "d.four"]);
        }
    }
}
