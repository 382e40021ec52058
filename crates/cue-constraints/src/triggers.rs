//! Trigger configuration: when is a constraint relevant at all?
//!
//! Every constraint (atomic or composite) carries a [`TriggerConfiguration`]
//! describing the signals that make it a candidate: keywords in the
//! interaction text, glob patterns over touched file paths, and named context
//! patterns. The per-constraint `confidence_threshold` is compared against
//! the weighted relevance score computed by the matching engine.
//!
//! Glob patterns are validated at [`TriggerConfiguration::compile`] time;
//! an invalid pattern is a definition error, not a silent non-match.

use std::collections::BTreeSet;

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

use cue_core::validate::{ValidationError, ValidationErrors, Validator};

/// Default per-constraint confidence threshold.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.5;

/// Declarative trigger configuration attached to a constraint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TriggerConfiguration {
    /// Keywords matched against the interaction's extracted keywords.
    pub keywords: BTreeSet<String>,
    /// Glob patterns matched against touched file paths.
    pub file_patterns: BTreeSet<String>,
    /// Named context patterns matched against the session classification.
    pub context_patterns: BTreeSet<String>,
    /// Minimum relevance score for this constraint to become a candidate.
    pub confidence_threshold: f64,
}

impl Default for TriggerConfiguration {
    fn default() -> Self {
        Self {
            keywords: BTreeSet::new(),
            file_patterns: BTreeSet::new(),
            context_patterns: BTreeSet::new(),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

impl TriggerConfiguration {
    /// Convenience constructor from string slices.
    #[must_use]
    pub fn new(
        keywords: &[&str],
        file_patterns: &[&str],
        context_patterns: &[&str],
        confidence_threshold: f64,
    ) -> Self {
        Self {
            keywords: keywords.iter().map(|s| (*s).to_owned()).collect(),
            file_patterns: file_patterns.iter().map(|s| (*s).to_owned()).collect(),
            context_patterns: context_patterns.iter().map(|s| (*s).to_owned()).collect(),
            confidence_threshold,
        }
    }

    /// Whether this configuration declares no signal at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
            && self.file_patterns.is_empty()
            && self.context_patterns.is_empty()
    }

    /// Validate field ranges and glob syntax without building a matcher.
    pub fn validate(&self, subject: &str) -> Result<(), ValidationErrors> {
        let mut validator = Validator::new(subject)
            .require_unit_range("confidenceThreshold", self.confidence_threshold);
        for pattern in &self.file_patterns {
            if let Err(err) = Glob::new(pattern) {
                validator = validator.check(
                    "filePatterns",
                    false,
                    format!("invalid glob {pattern:?}: {err}"),
                );
            }
        }
        validator.finish()
    }

    /// Compile into a matcher usable on the scoring hot path.
    pub fn compile(&self) -> Result<CompiledTriggers, ValidationErrors> {
        self.validate("trigger configuration")?;

        let mut builder = GlobSetBuilder::new();
        for pattern in &self.file_patterns {
            // Validated above; re-parse to feed the builder.
            if let Ok(glob) = Glob::new(pattern) {
                let _ = builder.add(glob);
            }
        }
        let glob_set = builder.build().map_err(|err| ValidationErrors {
            subject: "trigger configuration".to_owned(),
            errors: vec![ValidationError::new("filePatterns", err.to_string())],
        })?;

        Ok(CompiledTriggers {
            keywords: self.keywords.iter().map(|k| k.to_lowercase()).collect(),
            glob_set,
            has_file_patterns: !self.file_patterns.is_empty(),
            context_patterns: self.context_patterns.clone(),
            confidence_threshold: self.confidence_threshold,
        })
    }
}

/// A [`TriggerConfiguration`] compiled for repeated matching.
#[derive(Clone, Debug)]
pub struct CompiledTriggers {
    /// Lowercased keywords.
    pub keywords: BTreeSet<String>,
    /// Compiled file-pattern globs.
    pub glob_set: GlobSet,
    /// Whether any file pattern was declared (an empty `GlobSet` matches nothing).
    pub has_file_patterns: bool,
    /// Named context patterns, verbatim.
    pub context_patterns: BTreeSet<String>,
    /// Minimum relevance score for candidacy.
    pub confidence_threshold: f64,
}

impl CompiledTriggers {
    /// Whether any declared file pattern matches the given path.
    #[must_use]
    pub fn matches_file(&self, path: &str) -> bool {
        self.has_file_patterns && self.glob_set.is_match(path)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
