//! Package-level constants and engine defaults.

/// Current version of the Cue engine (sourced from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Package name.
pub const NAME: &str = "cue";

/// Weight of the keyword-overlap ratio in the relevance score.
pub const KEYWORD_WEIGHT: f64 = 0.5;

/// Weight of a file-pattern hit in the relevance score.
pub const FILE_PATTERN_WEIGHT: f64 = 0.3;

/// Weight of a context-pattern hit in the relevance score.
pub const CONTEXT_PATTERN_WEIGHT: f64 = 0.2;

/// Minimum classification confidence below which the context is `Unclear`.
///
/// This floor is the deliberate guard against over-triggering: an interaction
/// with no meaningful signal produces no reminders at all.
pub const DEFAULT_CONFIDENCE_FLOOR: f64 = 0.3;

/// Default ceiling on reminders injected per interaction.
pub const DEFAULT_MAX_PER_INJECTION: usize = 3;

/// Default per-candidate resolution budget in milliseconds.
///
/// A candidate whose resolution exceeds this is skipped for the current
/// interaction; the rest of the plan still goes out.
pub const DEFAULT_CANDIDATE_BUDGET_MS: u64 = 50;

/// Default capacity of the in-memory activation log.
pub const DEFAULT_ACTIVATION_LOG_CAPACITY: usize = 1000;
