//! Layered composition: dependency allow-lists over named layers.
//!
//! Each layer declares which layers it may depend on. A dependency on
//! anything else is a violation. A source layer with no declared rule
//! defaults to "no violation" (permissive), and a layer may always depend on
//! itself. Layer constraints activate in declared layer order; violations are
//! reported as distinct errors, never silently dropped.

use cue_constraints::composite::LayerSpec;
use cue_core::errors::EngineError;

use crate::decision::NextActivation;

/// Stateless dependency policy derived from layered metadata.
#[derive(Clone, Copy, Debug)]
pub struct LayeredPolicy<'a> {
    layers: &'a [LayerSpec],
}

impl<'a> LayeredPolicy<'a> {
    /// Wrap the declared layers.
    #[must_use]
    pub fn new(layers: &'a [LayerSpec]) -> Self {
        Self { layers }
    }

    /// Look up a layer by name.
    #[must_use]
    pub fn layer(&self, name: &str) -> Option<&'a LayerSpec> {
        self.layers.iter().find(|l| l.name == name)
    }

    /// Whether a dependency from `source_layer` to `target_layer` violates
    /// the declared allow-lists.
    ///
    /// An unknown source layer is permissive, and self-dependencies are
    /// always allowed.
    #[must_use]
    pub fn is_violation(&self, source_layer: &str, target_layer: &str) -> bool {
        if source_layer == target_layer {
            return false;
        }
        let Some(source) = self.layer(source_layer) else {
            return false;
        };
        !source.may_depend_on.contains(target_layer)
    }

    /// Check one dependency, surfacing a violation as a typed error.
    pub fn check_dependency(
        &self,
        source_layer: &str,
        target_layer: &str,
    ) -> Result<(), EngineError> {
        if self.is_violation(source_layer, target_layer) {
            return Err(EngineError::LayerViolation {
                source_layer: source_layer.to_owned(),
                target_layer: target_layer.to_owned(),
            });
        }
        Ok(())
    }

    /// Check a batch of observed dependencies, collecting every violation.
    #[must_use]
    pub fn check_dependencies(&self, observed: &[(String, String)]) -> Vec<EngineError> {
        observed
            .iter()
            .filter_map(|(source, target)| self.check_dependency(source, target).err())
            .collect()
    }

    /// Decide what fires next: every layer's members in declared order.
    #[must_use]
    pub fn next_activation(&self) -> NextActivation {
        let targets = self
            .layers
            .iter()
            .flat_map(|layer| layer.member_ids.iter().cloned())
            .collect();
        NextActivation::activate(targets, "layers in declared order")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
