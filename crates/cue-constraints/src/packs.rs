//! Built-in methodology pack.
//!
//! The engine works with any externally loaded library; this module is the
//! out-of-the-box configuration. One constructor per constraint, assembled by
//! [`default_library`].
//!
//! ## Composites (4)
//! - `methodology.tdd` — RED/GREEN/REFACTOR as a sequential composition
//! - `methodology.refactoring-levels` — six progressive levels, barrier at 3
//! - `architecture.clean-layers` — layered dependency enforcement
//! - `quality.foundations` — hierarchical quality baseline
//!
//! Atomic leaves live under `testing.*`, `implementation.*`, `refactoring.*`,
//! `architecture.*`, and `quality.*`.

use std::collections::BTreeSet;

use tracing::warn;

use cue_core::ids::ConstraintId;

use crate::atomic::AtomicConstraint;
use crate::composite::{
    CompositeConstraint, CompositionMetadata, ConstraintReference, HierarchyLevel, LayerSpec,
    ProgressiveLevel,
};
use crate::library::ConstraintLibrary;
use crate::triggers::TriggerConfiguration;

/// Build the default constraint library.
///
/// Built-in definitions are statically unique; a collision here is a packaging
/// mistake and is logged and skipped rather than propagated.
#[must_use]
pub fn default_library() -> ConstraintLibrary {
    let mut library = ConstraintLibrary::new();

    for constraint in default_atomics() {
        if let Err(err) = library.add_atomic(constraint) {
            warn!(%err, "Skipping built-in atomic constraint");
        }
    }
    for constraint in default_composites() {
        if let Err(err) = library.add_composite(constraint) {
            warn!(%err, "Skipping built-in composite constraint");
        }
    }

    library
}

/// All built-in atomic constraints.
#[must_use]
pub fn default_atomics() -> Vec<AtomicConstraint> {
    vec![
        testing_write_test_first(),
        testing_watch_it_fail(),
        implementation_simplest_thing(),
        refactoring_remove_duplication(),
        refactoring_readability(),
        refactoring_reduce_complexity(),
        refactoring_separate_responsibilities(),
        refactoring_improve_abstractions(),
        refactoring_apply_patterns(),
        refactoring_solid_principles(),
        architecture_domain_isolation(),
        architecture_application_boundaries(),
        architecture_infrastructure_adapters(),
        architecture_presentation_thin(),
        quality_lint_clean(),
        quality_cover_behavior(),
        quality_document_decisions(),
    ]
}

/// All built-in composite constraints.
#[must_use]
pub fn default_composites() -> Vec<CompositeConstraint> {
    vec![
        methodology_tdd(),
        methodology_refactoring_levels(),
        architecture_clean_layers(),
        quality_foundations(),
    ]
}

fn atomic(
    id: &str,
    title: &str,
    priority: f64,
    triggers: TriggerConfiguration,
    reminders: &[&str],
) -> AtomicConstraint {
    AtomicConstraint {
        id: ConstraintId::new(id),
        title: title.to_owned(),
        priority,
        triggers,
        reminders: reminders.iter().map(|r| (*r).to_owned()).collect(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Testing / TDD
// ─────────────────────────────────────────────────────────────────────────────

fn testing_write_test_first() -> AtomicConstraint {
    atomic(
        "testing.write-test-first",
        "Write the test first",
        0.9,
        TriggerConfiguration::new(
            &["test", "tdd", "spec", "implement"],
            &["**/*_test.*", "**/*.test.*", "tests/**"],
            &["testing", "feature-development"],
            0.4,
        ),
        &["Write a failing test before touching the implementation."],
    )
}

fn testing_watch_it_fail() -> AtomicConstraint {
    atomic(
        "testing.watch-it-fail",
        "Watch the test fail",
        0.85,
        TriggerConfiguration::new(&["test", "tdd", "red"], &[], &["testing"], 0.4),
        &["Run the new test and watch it fail; a test that never failed proves nothing."],
    )
}

fn implementation_simplest_thing() -> AtomicConstraint {
    atomic(
        "implementation.simplest-thing",
        "Do the simplest thing",
        0.8,
        TriggerConfiguration::new(&["implement", "green", "pass"], &[], &["feature-development"], 0.5),
        &[
            "Write the simplest code that makes the failing test pass.",
            "Resist implementing beyond what the test demands.",
        ],
    )
}

fn refactoring_remove_duplication() -> AtomicConstraint {
    atomic(
        "refactoring.remove-duplication",
        "Remove duplication while green",
        0.75,
        TriggerConfiguration::new(&["refactor", "duplicate", "duplication"], &[], &["refactoring"], 0.5),
        &["With the tests green, remove duplication before moving on."],
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Refactoring levels
// ─────────────────────────────────────────────────────────────────────────────

fn refactoring_readability() -> AtomicConstraint {
    atomic(
        "refactoring.readability",
        "Readability first",
        0.7,
        TriggerConfiguration::new(&["rename", "readability", "cleanup"], &[], &["refactoring"], 0.5),
        &["Rename unclear identifiers and delete dead code before anything structural."],
    )
}

fn refactoring_reduce_complexity() -> AtomicConstraint {
    atomic(
        "refactoring.reduce-complexity",
        "Reduce complexity",
        0.7,
        TriggerConfiguration::new(&["complexity", "extract", "nested"], &[], &["refactoring"], 0.5),
        &["Extract long methods and flatten nested conditionals."],
    )
}

fn refactoring_separate_responsibilities() -> AtomicConstraint {
    atomic(
        "refactoring.separate-responsibilities",
        "Separate responsibilities",
        0.75,
        TriggerConfiguration::new(&["responsibility", "split", "class"], &[], &["refactoring"], 0.5),
        &["Split classes and modules that have more than one reason to change."],
    )
}

fn refactoring_improve_abstractions() -> AtomicConstraint {
    atomic(
        "refactoring.improve-abstractions",
        "Improve abstractions",
        0.7,
        TriggerConfiguration::new(&["abstraction", "interface", "boundary"], &[], &["refactoring"], 0.5),
        &["Introduce interfaces where concrete types leak across boundaries."],
    )
}

fn refactoring_apply_patterns() -> AtomicConstraint {
    atomic(
        "refactoring.apply-patterns",
        "Apply patterns deliberately",
        0.65,
        TriggerConfiguration::new(&["pattern", "design"], &[], &["refactoring"], 0.5),
        &["Reach for a design pattern only once the duplication shows its shape."],
    )
}

fn refactoring_solid_principles() -> AtomicConstraint {
    atomic(
        "refactoring.solid-principles",
        "Check SOLID principles",
        0.65,
        TriggerConfiguration::new(&["solid", "dependency", "inversion"], &[], &["refactoring"], 0.5),
        &["Check that dependencies point at abstractions, not concretions."],
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Clean architecture layers
// ─────────────────────────────────────────────────────────────────────────────

fn architecture_domain_isolation() -> AtomicConstraint {
    atomic(
        "architecture.domain-isolation",
        "Keep the domain pure",
        0.85,
        TriggerConfiguration::new(
            &["domain", "entity", "business"],
            &["**/domain/**"],
            &["architecture"],
            0.5,
        ),
        &["Keep domain logic free of framework, database, and transport concerns."],
    )
}

fn architecture_application_boundaries() -> AtomicConstraint {
    atomic(
        "architecture.application-boundaries",
        "Application orchestrates",
        0.8,
        TriggerConfiguration::new(
            &["service", "usecase", "application"],
            &["**/application/**"],
            &["architecture"],
            0.5,
        ),
        &["Application services orchestrate; domain objects decide."],
    )
}

fn architecture_infrastructure_adapters() -> AtomicConstraint {
    atomic(
        "architecture.infrastructure-adapters",
        "Adapters at the edge",
        0.75,
        TriggerConfiguration::new(
            &["repository", "adapter", "database"],
            &["**/infrastructure/**"],
            &["architecture"],
            0.5,
        ),
        &["Implement ports behind adapters; never let SQL or HTTP leak upward."],
    )
}

fn architecture_presentation_thin() -> AtomicConstraint {
    atomic(
        "architecture.presentation-thin",
        "Thin presentation layer",
        0.7,
        TriggerConfiguration::new(
            &["handler", "controller", "endpoint"],
            &["**/presentation/**", "**/api/**"],
            &["architecture"],
            0.5,
        ),
        &["Keep handlers thin: parse, delegate, present."],
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Quality baseline
// ─────────────────────────────────────────────────────────────────────────────

fn quality_lint_clean() -> AtomicConstraint {
    atomic(
        "quality.lint-clean",
        "Warning-free build",
        0.6,
        TriggerConfiguration::new(&["lint", "warning", "build"], &[], &["review"], 0.5),
        &["Make the build warning-free before adding features."],
    )
}

fn quality_cover_behavior() -> AtomicConstraint {
    atomic(
        "quality.cover-behavior",
        "Cover behavior, not internals",
        0.6,
        TriggerConfiguration::new(&["coverage", "test"], &[], &["review", "testing"], 0.5),
        &["Cover observable behavior, not implementation details."],
    )
}

fn quality_document_decisions() -> AtomicConstraint {
    atomic(
        "quality.document-decisions",
        "Document the decision",
        0.55,
        TriggerConfiguration::new(&["document", "decision", "adr"], &[], &["review"], 0.5),
        &["Record the decision and its rationale where the next reader will look."],
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Composites
// ─────────────────────────────────────────────────────────────────────────────

fn methodology_tdd() -> CompositeConstraint {
    CompositeConstraint {
        id: ConstraintId::new("methodology.tdd"),
        title: "Test-Driven Development".to_owned(),
        priority: 0.9,
        triggers: TriggerConfiguration::new(
            &["test", "tdd", "feature", "implement"],
            &["**/*_test.*", "**/*.test.*", "tests/**"],
            &["testing", "feature-development"],
            0.4,
        ),
        components: vec![
            ConstraintReference::to("testing.write-test-first").with_role("red"),
            ConstraintReference::to("testing.watch-it-fail").with_role("red"),
            ConstraintReference::to("implementation.simplest-thing").with_role("green"),
            ConstraintReference::to("refactoring.remove-duplication").with_role("refactor"),
        ],
        composition: CompositionMetadata::Sequential,
    }
}

fn methodology_refactoring_levels() -> CompositeConstraint {
    let level = |n: u32, id: &str| ProgressiveLevel {
        level: n,
        member_ids: vec![ConstraintId::new(id)],
        is_barrier: false,
        barrier_guidance: Vec::new(),
    };

    CompositeConstraint {
        id: ConstraintId::new("methodology.refactoring-levels"),
        title: "Refactoring levels".to_owned(),
        priority: 0.8,
        triggers: TriggerConfiguration::new(
            &["refactor", "cleanup", "restructure"],
            &[],
            &["refactoring"],
            0.4,
        ),
        components: vec![
            ConstraintReference::to("refactoring.readability"),
            ConstraintReference::to("refactoring.reduce-complexity"),
            ConstraintReference::to("refactoring.separate-responsibilities"),
            ConstraintReference::to("refactoring.improve-abstractions"),
            ConstraintReference::to("refactoring.apply-patterns"),
            ConstraintReference::to("refactoring.solid-principles"),
        ],
        composition: CompositionMetadata::Progressive {
            levels: vec![
                level(1, "refactoring.readability"),
                level(2, "refactoring.reduce-complexity"),
                ProgressiveLevel {
                    level: 3,
                    member_ids: vec![ConstraintId::new("refactoring.separate-responsibilities")],
                    is_barrier: true,
                    barrier_guidance: vec![
                        "Most refactoring efforts stall here: responsibilities are tangled with data access.".to_owned(),
                        "Finish the class-level split before reaching for new abstractions.".to_owned(),
                    ],
                },
                level(4, "refactoring.improve-abstractions"),
                level(5, "refactoring.apply-patterns"),
                level(6, "refactoring.solid-principles"),
            ],
        },
    }
}

fn architecture_clean_layers() -> CompositeConstraint {
    let allow = |names: &[&str]| -> BTreeSet<String> {
        names.iter().map(|n| (*n).to_owned()).collect()
    };

    CompositeConstraint {
        id: ConstraintId::new("architecture.clean-layers"),
        title: "Clean architecture layers".to_owned(),
        priority: 0.85,
        triggers: TriggerConfiguration::new(
            &["architecture", "layer", "dependency", "import"],
            &[],
            &["architecture"],
            0.4,
        ),
        components: vec![
            ConstraintReference::to("architecture.domain-isolation"),
            ConstraintReference::to("architecture.application-boundaries"),
            ConstraintReference::to("architecture.infrastructure-adapters"),
            ConstraintReference::to("architecture.presentation-thin"),
        ],
        composition: CompositionMetadata::Layered {
            layers: vec![
                LayerSpec {
                    name: "domain".to_owned(),
                    member_ids: vec![ConstraintId::new("architecture.domain-isolation")],
                    may_depend_on: BTreeSet::new(),
                },
                LayerSpec {
                    name: "application".to_owned(),
                    member_ids: vec![ConstraintId::new("architecture.application-boundaries")],
                    may_depend_on: allow(&["domain"]),
                },
                LayerSpec {
                    name: "infrastructure".to_owned(),
                    member_ids: vec![ConstraintId::new("architecture.infrastructure-adapters")],
                    may_depend_on: allow(&["domain", "application"]),
                },
                LayerSpec {
                    name: "presentation".to_owned(),
                    member_ids: vec![ConstraintId::new("architecture.presentation-thin")],
                    may_depend_on: allow(&["domain", "application"]),
                },
            ],
        },
    }
}

fn quality_foundations() -> CompositeConstraint {
    CompositeConstraint {
        id: ConstraintId::new("quality.foundations"),
        title: "Quality foundations".to_owned(),
        priority: 0.7,
        triggers: TriggerConfiguration::new(
            &["quality", "review", "cleanup"],
            &[],
            &["review", "refactoring"],
            0.4,
        ),
        components: vec![
            ConstraintReference::to("quality.lint-clean"),
            ConstraintReference::to("quality.cover-behavior"),
            ConstraintReference::to("quality.document-decisions"),
        ],
        composition: CompositionMetadata::Hierarchical {
            levels: vec![
                HierarchyLevel {
                    level: 0,
                    member_ids: vec![ConstraintId::new("quality.lint-clean")],
                },
                HierarchyLevel {
                    level: 1,
                    member_ids: vec![ConstraintId::new("quality.cover-behavior")],
                },
                HierarchyLevel {
                    level: 2,
                    member_ids: vec![ConstraintId::new("quality.document-decisions")],
                },
            ],
        },
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_library_counts() {
        let library = default_library();
        assert_eq!(library.atomic_count(), 17);
        assert_eq!(library.composite_count(), 4);
        assert_eq!(library.total_constraints(), 21);
    }

    #[test]
    fn every_definition_validates() {
        for constraint in default_atomics() {
            constraint.validate().unwrap();
        }
        for constraint in default_composites() {
            constraint.validate().unwrap();
        }
    }

    #[test]
    fn default_library_is_acyclic() {
        default_library().verify_acyclic().unwrap();
    }

    #[test]
    fn every_component_reference_resolves() {
        let library = default_library();
        for composite in default_composites() {
            for reference in &composite.components {
                assert!(
                    library.contains(&reference.target_id),
                    "dangling reference: {}",
                    reference.target_id
                );
            }
        }
    }

    #[test]
    fn tdd_sequence_starts_with_the_test() {
        let tdd = methodology_tdd();
        assert_eq!(
            tdd.components[0].target_id,
            ConstraintId::new("testing.write-test-first")
        );
        assert_eq!(tdd.components[0].role.as_deref(), Some("red"));
    }

    #[test]
    fn refactoring_barrier_sits_at_level_three() {
        let composite = methodology_refactoring_levels();
        let CompositionMetadata::Progressive { levels } = &composite.composition else {
            panic!("expected progressive metadata");
        };
        let barrier = levels.iter().find(|l| l.is_barrier).unwrap();
        assert_eq!(barrier.level, 3);
        assert!(!barrier.barrier_guidance.is_empty());
    }

    #[test]
    fn domain_layer_allows_nothing() {
        let composite = architecture_clean_layers();
        let CompositionMetadata::Layered { layers } = &composite.composition else {
            panic!("expected layered metadata");
        };
        let domain = layers.iter().find(|l| l.name == "domain").unwrap();
        assert!(domain.may_depend_on.is_empty());
    }
}
