//! Context classification.
//!
//! [`ContextAnalyzer`] turns an [`InteractionSnapshot`] into a
//! [`SessionContext`]: keyword-frequency matching over the free text, file
//! path evidence, and recent-action heuristics each cast votes for a
//! development context; the winner must clear a confidence floor or the
//! context is [`ContextType::Unclear`].

use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use cue_core::constants::DEFAULT_CONFIDENCE_FLOOR;

use crate::snapshot::InteractionSnapshot;

/// Development context classification of one interaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContextType {
    /// Writing or running tests.
    Testing,
    /// Building new functionality.
    FeatureDevelopment,
    /// Restructuring existing code.
    Refactoring,
    /// Chasing a defect.
    Debugging,
    /// Working on structure and boundaries.
    Architecture,
    /// Reviewing existing work.
    Review,
    /// Writing documentation.
    Documentation,
    /// No signal crossed the confidence floor.
    Unclear,
}

impl ContextType {
    /// The kebab-case slug used by context patterns.
    #[must_use]
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Testing => "testing",
            Self::FeatureDevelopment => "feature-development",
            Self::Refactoring => "refactoring",
            Self::Debugging => "debugging",
            Self::Architecture => "architecture",
            Self::Review => "review",
            Self::Documentation => "documentation",
            Self::Unclear => "unclear",
        }
    }
}

impl fmt::Display for ContextType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Classified context signal consumed by trigger matching.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    /// Winning classification.
    pub context_type: ContextType,
    /// Extracted keyword frequencies (lowercased).
    pub keywords: BTreeMap<String, usize>,
    /// Touched file paths, verbatim from the snapshot.
    pub touched_paths: Vec<String>,
    /// Path-derived evidence slugs (e.g. `test-file`).
    pub path_evidence: Vec<String>,
    /// Classification confidence in `[0.0, 1.0]`.
    pub confidence: f64,
}

impl SessionContext {
    /// Whether a (lowercased) keyword was extracted.
    #[must_use]
    pub fn has_keyword(&self, keyword: &str) -> bool {
        self.keywords.contains_key(keyword)
    }

    /// Whether a named context pattern matches this session.
    ///
    /// A pattern matches the winning context slug or any path evidence slug.
    #[must_use]
    pub fn matches_pattern(&self, pattern: &str) -> bool {
        self.context_type.slug() == pattern
            || self.path_evidence.iter().any(|slug| slug == pattern)
    }
}

/// Keyword vocabulary: which word votes for which context.
const KEYWORD_SIGNALS: &[(&str, ContextType)] = &[
    ("test", ContextType::Testing),
    ("tests", ContextType::Testing),
    ("tdd", ContextType::Testing),
    ("spec", ContextType::Testing),
    ("assert", ContextType::Testing),
    ("failing", ContextType::Testing),
    ("coverage", ContextType::Testing),
    ("implement", ContextType::FeatureDevelopment),
    ("feature", ContextType::FeatureDevelopment),
    ("add", ContextType::FeatureDevelopment),
    ("build", ContextType::FeatureDevelopment),
    ("create", ContextType::FeatureDevelopment),
    ("refactor", ContextType::Refactoring),
    ("rename", ContextType::Refactoring),
    ("extract", ContextType::Refactoring),
    ("cleanup", ContextType::Refactoring),
    ("restructure", ContextType::Refactoring),
    ("duplication", ContextType::Refactoring),
    ("bug", ContextType::Debugging),
    ("fix", ContextType::Debugging),
    ("error", ContextType::Debugging),
    ("crash", ContextType::Debugging),
    ("debug", ContextType::Debugging),
    ("regression", ContextType::Debugging),
    ("architecture", ContextType::Architecture),
    ("layer", ContextType::Architecture),
    ("boundary", ContextType::Architecture),
    ("dependency", ContextType::Architecture),
    ("module", ContextType::Architecture),
    ("review", ContextType::Review),
    ("feedback", ContextType::Review),
    ("approve", ContextType::Review),
    ("document", ContextType::Documentation),
    ("documentation", ContextType::Documentation),
    ("readme", ContextType::Documentation),
    ("changelog", ContextType::Documentation),
];

/// Weight of one recent-action hit relative to a keyword vote.
const ACTION_VOTE_WEIGHT: f64 = 0.5;

/// Build the recent-action patterns.
fn action_signals() -> Vec<(Regex, ContextType)> {
    vec![
        (Regex::new(r"(?i)test").unwrap(), ContextType::Testing),
        (Regex::new(r"(?i)review|comment").unwrap(), ContextType::Review),
        (Regex::new(r"(?i)debug|breakpoint").unwrap(), ContextType::Debugging),
    ]
}

/// Classifies interaction snapshots into session contexts.
#[derive(Clone, Debug)]
pub struct ContextAnalyzer {
    confidence_floor: f64,
    action_signals: Vec<(Regex, ContextType)>,
}

impl Default for ContextAnalyzer {
    fn default() -> Self {
        Self {
            confidence_floor: DEFAULT_CONFIDENCE_FLOOR,
            action_signals: action_signals(),
        }
    }
}

impl ContextAnalyzer {
    /// Analyzer with the default confidence floor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyzer with a custom confidence floor.
    #[must_use]
    pub fn with_floor(confidence_floor: f64) -> Self {
        Self {
            confidence_floor,
            action_signals: action_signals(),
        }
    }

    /// Classify one interaction.
    #[must_use]
    pub fn analyze(&self, snapshot: &InteractionSnapshot) -> SessionContext {
        let keywords = extract_keywords(snapshot);
        let path_evidence = collect_path_evidence(&snapshot.file_paths);

        let mut votes: BTreeMap<ContextType, f64> = BTreeMap::new();

        // Keyword frequencies vote for their context.
        for (keyword, count) in &keywords {
            for (signal, context) in KEYWORD_SIGNALS {
                if keyword == signal {
                    #[allow(clippy::cast_precision_loss)]
                    let weight = *count as f64;
                    *votes.entry(*context).or_insert(0.0) += weight;
                }
            }
        }

        // Path evidence votes once per path.
        for slug in &path_evidence {
            if let Some(context) = evidence_context(slug) {
                *votes.entry(context).or_insert(0.0) += 1.0;
            }
        }

        // Recent-action heuristics: action names vote like weak keywords.
        for action in &snapshot.recent_actions {
            for (pattern, context) in &self.action_signals {
                if pattern.is_match(action) {
                    *votes.entry(*context).or_insert(0.0) += ACTION_VOTE_WEIGHT;
                }
            }
        }

        let total: f64 = votes.values().sum();
        let winner = votes
            .iter()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(context, weight)| (*context, *weight));

        let (context_type, confidence) = match winner {
            Some((context, weight)) if total > 0.0 => {
                let confidence = weight / total;
                if confidence >= self.confidence_floor {
                    (context, confidence)
                } else {
                    (ContextType::Unclear, confidence)
                }
            }
            _ => (ContextType::Unclear, 0.0),
        };

        debug!(
            context = %context_type,
            confidence,
            keyword_count = keywords.len(),
            "Interaction classified"
        );

        SessionContext {
            context_type,
            keywords,
            touched_paths: snapshot.file_paths.clone(),
            path_evidence,
            confidence,
        }
    }
}

/// Tokenize free text and tool name into lowercased keyword frequencies.
fn extract_keywords(snapshot: &InteractionSnapshot) -> BTreeMap<String, usize> {
    let mut keywords = BTreeMap::new();
    let mut feed = |text: &str| {
        for token in text.split(|c: char| !c.is_alphanumeric()) {
            if token.len() >= 3 {
                *keywords.entry(token.to_lowercase()).or_insert(0) += 1;
            }
        }
    };
    if let Some(text) = &snapshot.free_text {
        feed(text);
    }
    if let Some(tool) = &snapshot.tool_name {
        feed(tool);
    }
    keywords
}

/// Derive evidence slugs from touched file paths.
fn collect_path_evidence(paths: &[String]) -> Vec<String> {
    let mut evidence = Vec::new();
    let mut add = |slug: &str| {
        if !evidence.iter().any(|s| s == slug) {
            evidence.push(slug.to_owned());
        }
    };

    for path in paths {
        let lower = path.to_lowercase();
        if lower.contains("test") || lower.contains("spec") {
            add("test-file");
        }
        if lower.ends_with(".md") {
            add("doc-file");
        }
        for layer in ["domain", "application", "infrastructure", "presentation"] {
            if lower.contains(&format!("/{layer}/")) || lower.starts_with(&format!("{layer}/")) {
                add("layered-path");
            }
        }
    }
    evidence
}

/// Which context a path-evidence slug votes for.
fn evidence_context(slug: &str) -> Option<ContextType> {
    match slug {
        "test-file" => Some(ContextType::Testing),
        "doc-file" => Some(ContextType::Documentation),
        "layered-path" => Some(ContextType::Architecture),
        _ => None,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_snapshot_is_unclear() {
        let context = ContextAnalyzer::new().analyze(&InteractionSnapshot::new());
        assert_eq!(context.context_type, ContextType::Unclear);
        assert!(context.confidence.abs() < f64::EPSILON);
        assert!(context.keywords.is_empty());
    }

    #[test]
    fn test_heavy_text_classifies_as_testing() {
        let snapshot = InteractionSnapshot::new()
            .with_text("write a failing test for the parser, then run the tests");
        let context = ContextAnalyzer::new().analyze(&snapshot);
        assert_eq!(context.context_type, ContextType::Testing);
        assert!(context.confidence > 0.5);
        assert!(context.has_keyword("test"));
    }

    #[test]
    fn refactoring_keywords_win() {
        let snapshot =
            InteractionSnapshot::new().with_text("refactor this module, extract the duplication");
        let context = ContextAnalyzer::new().analyze(&snapshot);
        assert_eq!(context.context_type, ContextType::Refactoring);
    }

    #[test]
    fn test_paths_count_as_evidence() {
        let snapshot = InteractionSnapshot::new().with_path("src/parser_test.rs");
        let context = ContextAnalyzer::new().analyze(&snapshot);
        assert_eq!(context.context_type, ContextType::Testing);
        assert!(context.path_evidence.contains(&"test-file".to_owned()));
    }

    #[test]
    fn layered_paths_vote_for_architecture() {
        let snapshot = InteractionSnapshot::new()
            .with_path("src/domain/order.rs")
            .with_path("src/infrastructure/repo.rs");
        let context = ContextAnalyzer::new().analyze(&snapshot);
        assert_eq!(context.context_type, ContextType::Architecture);
    }

    #[test]
    fn recent_test_actions_nudge_testing() {
        let snapshot = InteractionSnapshot::new()
            .with_action("run_tests")
            .with_action("run_tests");
        let context = ContextAnalyzer::new().analyze(&snapshot);
        assert_eq!(context.context_type, ContextType::Testing);
    }

    #[test]
    fn mixed_weak_signal_falls_below_floor() {
        // One vote each for four contexts: winner holds 25%, below the floor.
        let snapshot = InteractionSnapshot::new()
            .with_text("test feature refactor bug");
        let context = ContextAnalyzer::with_floor(0.5).analyze(&snapshot);
        assert_eq!(context.context_type, ContextType::Unclear);
        assert!(context.confidence > 0.0);
    }

    #[test]
    fn matches_pattern_on_slug_and_evidence() {
        let snapshot = InteractionSnapshot::new()
            .with_text("write the test first")
            .with_path("tests/parser.rs");
        let context = ContextAnalyzer::new().analyze(&snapshot);
        assert!(context.matches_pattern("testing"));
        assert!(context.matches_pattern("test-file"));
        assert!(!context.matches_pattern("architecture"));
    }

    #[test]
    fn short_tokens_dropped() {
        let snapshot = InteractionSnapshot::new().with_text("do it to a of in");
        let context = ContextAnalyzer::new().analyze(&snapshot);
        assert!(context.keywords.is_empty());
    }

    #[test]
    fn context_type_slugs() {
        assert_eq!(ContextType::FeatureDevelopment.slug(), "feature-development");
        assert_eq!(ContextType::Unclear.to_string(), "unclear");
    }

    #[test]
    fn serde_kebab_case() {
        let json = serde_json::to_string(&ContextType::FeatureDevelopment).unwrap();
        assert_eq!(json, "\"feature-development\"");
    }
}
