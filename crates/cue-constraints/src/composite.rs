//! Composite constraints: named compositions of other constraints.
//!
//! A composite holds an ordered list of [`ConstraintReference`]s plus
//! composition-type-specific metadata. References are pure ids resolved
//! against the library at resolution time; forward references across load
//! order are legal, so nothing is checked against the library here.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use cue_core::ids::ConstraintId;
use cue_core::validate::{ValidationErrors, Validator};

use crate::triggers::TriggerConfiguration;

/// Activation-ordering semantics of a composite.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompositionType {
    /// Fixed order, advanced one step at a time by external signals.
    Sequential,
    /// Levels 0..N; a level unlocks once the previous one is satisfied.
    Hierarchical,
    /// Ordered levels 1..N with skip prevention and optional barriers.
    Progressive,
    /// Named layers with explicit dependency allow-lists.
    Layered,
}

impl std::fmt::Display for CompositionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sequential => write!(f, "sequential"),
            Self::Hierarchical => write!(f, "hierarchical"),
            Self::Progressive => write!(f, "progressive"),
            Self::Layered => write!(f, "layered"),
        }
    }
}

/// An id reference to another constraint. Never owns the target.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintReference {
    /// Id of the referenced constraint (atomic or composite).
    pub target_id: ConstraintId,
    /// Optional role/condition tag, e.g. `red` in a TDD sequence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl ConstraintReference {
    /// Reference a constraint by id.
    #[must_use]
    pub fn to(target_id: impl Into<ConstraintId>) -> Self {
        Self {
            target_id: target_id.into(),
            role: None,
        }
    }

    /// Attach a role tag.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}

/// One level of a hierarchical composition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyLevel {
    /// Level number, 0 = most foundational.
    pub level: u32,
    /// Component ids grouped into this level.
    pub member_ids: Vec<ConstraintId>,
}

/// One level of a progressive composition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressiveLevel {
    /// Level number, starting at 1.
    pub level: u32,
    /// Component ids activated at this level.
    pub member_ids: Vec<ConstraintId>,
    /// Barrier levels append extra guidance beyond the base reminders.
    #[serde(default)]
    pub is_barrier: bool,
    /// Extra guidance entries shown at a barrier level.
    #[serde(default)]
    pub barrier_guidance: Vec<String>,
}

/// One layer of a layered composition, in declared activation order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerSpec {
    /// Layer name, e.g. `domain`.
    pub name: String,
    /// Component ids enforcing this layer.
    pub member_ids: Vec<ConstraintId>,
    /// Layers this layer may depend on. Anything else is a violation.
    #[serde(default)]
    pub may_depend_on: BTreeSet<String>,
}

/// Composition-type-specific metadata.
///
/// A closed tagged variant: dispatch happens on the tag, never through a
/// class hierarchy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CompositionMetadata {
    /// Components fire strictly in list order.
    Sequential,
    /// Components grouped into levels 0..N.
    Hierarchical {
        /// Levels in ascending order.
        levels: Vec<HierarchyLevel>,
    },
    /// Ordered levels 1..N with skip prevention.
    Progressive {
        /// Levels in ascending order.
        levels: Vec<ProgressiveLevel>,
    },
    /// Named layers with dependency allow-lists.
    Layered {
        /// Layers in declared activation order.
        layers: Vec<LayerSpec>,
    },
}

impl CompositionMetadata {
    /// The composition type this metadata belongs to.
    #[must_use]
    pub fn composition_type(&self) -> CompositionType {
        match self {
            Self::Sequential => CompositionType::Sequential,
            Self::Hierarchical { .. } => CompositionType::Hierarchical,
            Self::Progressive { .. } => CompositionType::Progressive,
            Self::Layered { .. } => CompositionType::Layered,
        }
    }
}

/// A named composition of other constraints under one orchestration strategy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeConstraint {
    /// Unique constraint key.
    pub id: ConstraintId,
    /// Human-readable title.
    pub title: String,
    /// Relative importance in `[0.0, 1.0]`.
    pub priority: f64,
    /// When this composite's root is relevant.
    #[serde(default)]
    pub triggers: TriggerConfiguration,
    /// Ordered component references.
    pub components: Vec<ConstraintReference>,
    /// Composition-type-specific metadata.
    pub composition: CompositionMetadata,
}

impl CompositeConstraint {
    /// Create a validated composite constraint.
    pub fn new(
        id: impl Into<ConstraintId>,
        title: impl Into<String>,
        priority: f64,
        triggers: TriggerConfiguration,
        components: Vec<ConstraintReference>,
        composition: CompositionMetadata,
    ) -> Result<Self, ValidationErrors> {
        let constraint = Self {
            id: id.into(),
            title: title.into(),
            priority,
            triggers,
            components,
            composition,
        };
        constraint.validate()?;
        Ok(constraint)
    }

    /// The composition type of this composite.
    #[must_use]
    pub fn composition_type(&self) -> CompositionType {
        self.composition.composition_type()
    }

    /// Ids of all components, in declared order.
    #[must_use]
    pub fn component_ids(&self) -> Vec<&ConstraintId> {
        self.components.iter().map(|r| &r.target_id).collect()
    }

    /// Validate field invariants and metadata consistency.
    ///
    /// Component references are *not* checked against any library here
    /// (forward references are legal); only internal consistency is:
    /// metadata member ids must appear in the component list, and level
    /// numbers must be strictly increasing.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let subject = format!("composite constraint {}", self.id);
        let mut validator = Validator::new(&subject)
            .check("id", !self.id.is_empty(), "must not be empty")
            .require_non_empty("title", &self.title)
            .require_unit_range("priority", self.priority)
            .require_non_empty_list("components", &self.components);
        if let Err(trigger_errors) = self.triggers.validate(&subject) {
            for error in trigger_errors.errors {
                validator = validator.push(error);
            }
        }

        let component_ids: BTreeSet<&ConstraintId> =
            self.components.iter().map(|r| &r.target_id).collect();

        match &self.composition {
            CompositionMetadata::Sequential => {}
            CompositionMetadata::Hierarchical { levels } => {
                validator = validator.require_non_empty_list("levels", levels);
                validator = check_levels_increasing(
                    validator,
                    levels.iter().map(|l| l.level),
                );
                validator = check_members_declared(
                    validator,
                    levels.iter().flat_map(|l| l.member_ids.iter()),
                    &component_ids,
                );
            }
            CompositionMetadata::Progressive { levels } => {
                validator = validator.require_non_empty_list("levels", levels);
                validator = check_levels_increasing(
                    validator,
                    levels.iter().map(|l| l.level),
                );
                validator = check_members_declared(
                    validator,
                    levels.iter().flat_map(|l| l.member_ids.iter()),
                    &component_ids,
                );
                for level in levels {
                    if level.is_barrier && level.barrier_guidance.is_empty() {
                        validator = validator.check(
                            "levels",
                            false,
                            format!("barrier level {} declares no guidance", level.level),
                        );
                    }
                }
            }
            CompositionMetadata::Layered { layers } => {
                validator = validator.require_non_empty_list("layers", layers);
                let mut seen = BTreeSet::new();
                for layer in layers {
                    if !seen.insert(layer.name.as_str()) {
                        validator = validator.check(
                            "layers",
                            false,
                            format!("duplicate layer name {:?}", layer.name),
                        );
                    }
                }
                validator = check_members_declared(
                    validator,
                    layers.iter().flat_map(|l| l.member_ids.iter()),
                    &component_ids,
                );
            }
        }

        validator.finish()
    }
}

/// Require level numbers to be strictly increasing.
fn check_levels_increasing(
    mut validator: Validator,
    levels: impl Iterator<Item = u32>,
) -> Validator {
    let mut previous: Option<u32> = None;
    for level in levels {
        if let Some(prev) = previous {
            if level <= prev {
                validator = validator.check(
                    "levels",
                    false,
                    format!("level numbers must be strictly increasing ({prev} then {level})"),
                );
            }
        }
        previous = Some(level);
    }
    validator
}

/// Require every metadata member id to appear in the component list.
fn check_members_declared<'a>(
    mut validator: Validator,
    members: impl Iterator<Item = &'a ConstraintId>,
    component_ids: &BTreeSet<&ConstraintId>,
) -> Validator {
    for member in members {
        if !component_ids.contains(member) {
            validator = validator.check(
                "components",
                false,
                format!("metadata references {member} which is not a component"),
            );
        }
    }
    validator
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn refs(ids: &[&str]) -> Vec<ConstraintReference> {
        ids.iter().map(|id| ConstraintReference::to(*id)).collect()
    }

    #[test]
    fn sequential_composite_constructs() {
        let composite = CompositeConstraint::new(
            "methodology.tdd",
            "Test-Driven Development",
            0.9,
            TriggerConfiguration::default(),
            refs(&["testing.write-test-first", "implementation.simplest-thing"]),
            CompositionMetadata::Sequential,
        )
        .unwrap();
        assert_eq!(composite.composition_type(), CompositionType::Sequential);
        assert_eq!(composite.component_ids().len(), 2);
    }

    #[test]
    fn rejects_empty_components() {
        let result = CompositeConstraint::new(
            "x",
            "X",
            0.5,
            TriggerConfiguration::default(),
            Vec::new(),
            CompositionMetadata::Sequential,
        );
        let errors = result.unwrap_err();
        assert!(errors.errors.iter().any(|e| e.field == "components"));
    }

    #[test]
    fn hierarchical_levels_must_increase() {
        let result = CompositeConstraint::new(
            "x",
            "X",
            0.5,
            TriggerConfiguration::default(),
            refs(&["a", "b"]),
            CompositionMetadata::Hierarchical {
                levels: vec![
                    HierarchyLevel {
                        level: 1,
                        member_ids: vec![ConstraintId::new("a")],
                    },
                    HierarchyLevel {
                        level: 0,
                        member_ids: vec![ConstraintId::new("b")],
                    },
                ],
            },
        );
        let errors = result.unwrap_err();
        assert!(errors.errors.iter().any(|e| e.field == "levels"));
    }

    #[test]
    fn metadata_members_must_be_components() {
        let result = CompositeConstraint::new(
            "x",
            "X",
            0.5,
            TriggerConfiguration::default(),
            refs(&["a"]),
            CompositionMetadata::Progressive {
                levels: vec![ProgressiveLevel {
                    level: 1,
                    member_ids: vec![ConstraintId::new("not-a-component")],
                    is_barrier: false,
                    barrier_guidance: Vec::new(),
                }],
            },
        );
        let errors = result.unwrap_err();
        assert!(
            errors
                .errors
                .iter()
                .any(|e| e.message.contains("not-a-component"))
        );
    }

    #[test]
    fn barrier_level_requires_guidance() {
        let result = CompositeConstraint::new(
            "x",
            "X",
            0.5,
            TriggerConfiguration::default(),
            refs(&["a"]),
            CompositionMetadata::Progressive {
                levels: vec![ProgressiveLevel {
                    level: 1,
                    member_ids: vec![ConstraintId::new("a")],
                    is_barrier: true,
                    barrier_guidance: Vec::new(),
                }],
            },
        );
        assert!(result.is_err());
    }

    #[test]
    fn duplicate_layer_names_rejected() {
        let result = CompositeConstraint::new(
            "x",
            "X",
            0.5,
            TriggerConfiguration::default(),
            refs(&["a", "b"]),
            CompositionMetadata::Layered {
                layers: vec![
                    LayerSpec {
                        name: "domain".to_owned(),
                        member_ids: vec![ConstraintId::new("a")],
                        may_depend_on: BTreeSet::new(),
                    },
                    LayerSpec {
                        name: "domain".to_owned(),
                        member_ids: vec![ConstraintId::new("b")],
                        may_depend_on: BTreeSet::new(),
                    },
                ],
            },
        );
        assert!(result.is_err());
    }

    #[test]
    fn metadata_serde_is_tagged() {
        let metadata = CompositionMetadata::Layered {
            layers: vec![LayerSpec {
                name: "domain".to_owned(),
                member_ids: vec![ConstraintId::new("a")],
                may_depend_on: BTreeSet::new(),
            }],
        };
        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json.get("type").and_then(|v| v.as_str()), Some("layered"));
        let back: CompositionMetadata = serde_json::from_value(json).unwrap();
        assert_eq!(back, metadata);
    }

    #[test]
    fn composition_type_display() {
        assert_eq!(CompositionType::Sequential.to_string(), "sequential");
        assert_eq!(CompositionType::Hierarchical.to_string(), "hierarchical");
        assert_eq!(CompositionType::Progressive.to_string(), "progressive");
        assert_eq!(CompositionType::Layered.to_string(), "layered");
    }

    #[test]
    fn reference_role_tag() {
        let reference = ConstraintReference::to("testing.write-test-first").with_role("red");
        assert_eq!(reference.role.as_deref(), Some("red"));
    }
}
