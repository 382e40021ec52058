//! The engine facade: one interaction in, one activation plan out.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use cue_constraints::composite::CompositionMetadata;
use cue_constraints::library::ConstraintLibrary;
use cue_constraints::packs;
use cue_context::analyzer::ContextAnalyzer;
use cue_context::matching::{ActivationCandidate, TriggerMatcher};
use cue_context::snapshot::InteractionSnapshot;
use cue_core::errors::EngineError;
use cue_core::ids::{ActivationId, ConstraintId, InteractionId};
use cue_resolver::resolved::ResolvedConstraint;
use cue_resolver::resolver::ConstraintResolver;
use cue_strategies::layered::LayeredPolicy;
use cue_strategies::signals::TransitionSignal;

use crate::activation_log::{ActivationLog, ActivationRecord};
use crate::options::EngineOptions;
use crate::plan::{ActivationPlan, PlannedReminder, SkippedCandidate};
use crate::session::SessionState;

/// The constraint engine.
///
/// Holds the library, its bound resolver, the compiled trigger matcher, and
/// the activation log. The library is supplied once at construction and
/// treated as immutable for the engine's lifetime; reloading means building a
/// fresh engine (and with it a fresh resolver cache).
pub struct CueEngine {
    library: Arc<ConstraintLibrary>,
    resolver: ConstraintResolver,
    analyzer: ContextAnalyzer,
    matcher: TriggerMatcher,
    options: EngineOptions,
    activation_log: ActivationLog,
}

impl CueEngine {
    /// Create an engine over a loaded library.
    #[must_use]
    pub fn new(library: Arc<ConstraintLibrary>, options: EngineOptions) -> Self {
        let analyzer = ContextAnalyzer::with_floor(options.confidence_floor);
        let matcher = TriggerMatcher::new(&library);
        let resolver = ConstraintResolver::new(Arc::clone(&library));
        let activation_log = ActivationLog::new(options.log_capacity);

        debug!(
            constraints = library.total_constraints(),
            max_per_injection = options.max_per_injection,
            "CueEngine initialized"
        );

        Self {
            library,
            resolver,
            analyzer,
            matcher,
            options,
            activation_log,
        }
    }

    /// Engine over the built-in methodology pack with default options.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(Arc::new(packs::default_library()), EngineOptions::default())
    }

    /// The constraint library.
    #[must_use]
    pub fn library(&self) -> &Arc<ConstraintLibrary> {
        &self.library
    }

    /// The bound resolver (for cache statistics).
    #[must_use]
    pub fn resolver(&self) -> &ConstraintResolver {
        &self.resolver
    }

    /// The engine options.
    #[must_use]
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// The activation log consumed by the feedback boundary.
    #[must_use]
    pub fn activation_log(&self) -> &ActivationLog {
        &self.activation_log
    }

    /// Build the activation plan for one interaction.
    ///
    /// Classifies the snapshot, ranks candidates, resolves each winner under
    /// the per-candidate budget, delegates composites to their strategy
    /// state, and enforces the per-injection ceiling. Failures on individual
    /// candidates are reported in `skipped` and never abort the plan.
    pub fn plan(
        &self,
        snapshot: &InteractionSnapshot,
        session: &mut SessionState,
    ) -> ActivationPlan {
        let start = Instant::now();
        let interaction_id = InteractionId::new();

        let context = self.analyzer.analyze(snapshot);
        let mut candidates = self.matcher.rank(&context);
        candidates.retain(|candidate| {
            let enabled = self.options.is_enabled(&candidate.constraint_id);
            if !enabled {
                debug!(constraint_id = %candidate.constraint_id, "Candidate disabled by override");
            }
            enabled
        });
        self.apply_priority_overrides(&mut candidates);

        let mut entries: Vec<PlannedReminder> = Vec::new();
        let mut skipped: Vec<SkippedCandidate> = Vec::new();
        let mut activated = 0usize;

        for candidate in candidates {
            if activated >= self.options.max_per_injection {
                skipped.push(SkippedCandidate {
                    constraint_id: candidate.constraint_id,
                    code: None,
                    reason: "per-injection ceiling reached".to_owned(),
                });
                continue;
            }

            let candidate_start = Instant::now();
            let resolved = match self.resolver.resolve(&candidate.constraint_id) {
                Ok(resolved) => resolved,
                Err(err) => {
                    warn!(constraint_id = %candidate.constraint_id, %err, "Candidate failed to resolve");
                    skipped.push(SkippedCandidate {
                        constraint_id: candidate.constraint_id,
                        code: Some(err.code().to_owned()),
                        reason: err.to_string(),
                    });
                    continue;
                }
            };

            let elapsed_ms = u64::try_from(candidate_start.elapsed().as_millis()).unwrap_or(u64::MAX);
            if elapsed_ms > self.options.candidate_budget_ms {
                warn!(
                    constraint_id = %candidate.constraint_id,
                    elapsed_ms,
                    budget_ms = self.options.candidate_budget_ms,
                    "Candidate skipped: resolution budget exceeded"
                );
                skipped.push(SkippedCandidate {
                    constraint_id: candidate.constraint_id,
                    code: None,
                    reason: format!("resolution budget exceeded ({elapsed_ms} ms)"),
                });
                continue;
            }

            if emit_candidate(&candidate, resolved.as_ref(), session, &mut entries, &mut skipped) {
                activated += 1;
                self.activation_log.record(ActivationRecord {
                    activation_id: ActivationId::new(),
                    constraint_id: resolved.id().clone(),
                    session_id: Some(session.session_id().clone()),
                    context_type: context.context_type,
                    reasons: candidate.reasons,
                    activated_at: chrono::Utc::now(),
                });
            }
        }

        let plan = ActivationPlan {
            interaction_id,
            context_type: context.context_type,
            confidence: context.confidence,
            entries,
            skipped,
            duration_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        };

        debug!(
            interaction_id = %plan.interaction_id,
            context = %plan.context_type,
            entries = plan.entries.len(),
            skipped = plan.skipped.len(),
            duration_ms = plan.duration_ms,
            "Activation plan built"
        );
        plan
    }

    /// Route an explicit transition signal to a composite's state machine.
    pub fn apply_signal(
        &self,
        session: &mut SessionState,
        composite_id: &ConstraintId,
        signal: &TransitionSignal,
    ) -> Result<(), EngineError> {
        let composite = self.library.get_composite(composite_id).ok_or_else(|| {
            EngineError::ConstraintNotFound {
                constraint_id: composite_id.clone(),
            }
        })?;
        session.apply_signal(composite, signal)
    }

    /// Check one observed dependency against a layered composite's
    /// allow-lists. Non-layered composites have no layer rules and are
    /// permissive.
    pub fn check_layer_dependency(
        &self,
        composite_id: &ConstraintId,
        source_layer: &str,
        target_layer: &str,
    ) -> Result<(), EngineError> {
        let composite = self.library.get_composite(composite_id).ok_or_else(|| {
            EngineError::ConstraintNotFound {
                constraint_id: composite_id.clone(),
            }
        })?;
        match &composite.composition {
            CompositionMetadata::Layered { layers } => {
                LayeredPolicy::new(layers).check_dependency(source_layer, target_layer)
            }
            _ => Ok(()),
        }
    }

    /// Re-sort candidates after applying priority overrides.
    fn apply_priority_overrides(&self, candidates: &mut [ActivationCandidate]) {
        if self.options.overrides.is_empty() {
            return;
        }
        for candidate in candidates.iter_mut() {
            candidate.priority = self
                .options
                .effective_priority(&candidate.constraint_id, candidate.priority);
        }
        candidates.sort_by(|a, b| {
            b.rank()
                .partial_cmp(&a.rank())
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.constraint_id.cmp(&b.constraint_id))
        });
    }
}

/// Emit one candidate's reminders. Returns whether it activated.
fn emit_candidate(
    candidate: &ActivationCandidate,
    resolved: &ResolvedConstraint,
    session: &mut SessionState,
    entries: &mut Vec<PlannedReminder>,
    skipped: &mut Vec<SkippedCandidate>,
) -> bool {
    match resolved {
        ResolvedConstraint::Atomic(atomic) => {
            for reminder in &atomic.reminders {
                entries.push(PlannedReminder {
                    constraint_id: atomic.id.clone(),
                    reminder_text: reminder.clone(),
                });
            }
            true
        }
        ResolvedConstraint::Composite {
            constraint,
            components,
        } => {
            let decision = session
                .strategy_mut(constraint)
                .next_activation(&constraint.composition, components);

            if decision.exhausted {
                debug!(constraint_id = %constraint.id, reason = %decision.reason, "Composite exhausted");
                skipped.push(SkippedCandidate {
                    constraint_id: candidate.constraint_id.clone(),
                    code: None,
                    reason: decision.reason,
                });
                return false;
            }

            let before = entries.len();
            for target in &decision.targets {
                let Some(component) = resolved.component(target) else {
                    // Metadata consistency is validated at construction; a
                    // miss here means the library changed underneath us.
                    warn!(constraint_id = %constraint.id, target = %target, "Decision target not among components");
                    continue;
                };
                for (leaf_id, line) in component.collect_reminders() {
                    entries.push(PlannedReminder {
                        constraint_id: leaf_id,
                        reminder_text: line,
                    });
                }
            }
            for guidance in decision.extra_guidance {
                entries.push(PlannedReminder {
                    constraint_id: constraint.id.clone(),
                    reminder_text: guidance,
                });
            }
            entries.len() > before
        }
    }
}

impl std::fmt::Debug for CueEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CueEngine")
            .field("constraints", &self.library.total_constraints())
            .field("compiled", &self.matcher.len())
            .field("max_per_injection", &self.options.max_per_injection)
            .field("logged_activations", &self.activation_log.len())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
