//! Branded ID newtypes for type safety.
//!
//! Every entity in the Cue system has a distinct ID type implemented as a
//! newtype wrapper around `String`. This prevents accidentally passing an
//! activation ID where an interaction ID is expected.
//!
//! Random IDs are UUID v7 (time-ordered) generated via [`uuid::Uuid::now_v7`].
//! [`ConstraintId`] is different: it is a human-declared key, normalized on
//! construction and compared case-insensitively.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use uuid::Uuid;

/// Generate a new UUID v7 string (time-ordered).
fn new_v7() -> String {
    Uuid::now_v7().to_string()
}

macro_rules! branded_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new random ID (UUID v7, time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(new_v7())
            }

            /// Create from an existing string value.
            #[must_use]
            pub fn from_string(s: String) -> Self {
                Self(s)
            }

            /// Return the inner string as a slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume self and return the inner `String`.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

branded_id! {
    /// Unique identifier for a single constraint activation.
    ActivationId
}

branded_id! {
    /// Unique identifier for one incoming interaction.
    InteractionId
}

branded_id! {
    /// Unique identifier for an assistant session.
    SessionId
}

// ─────────────────────────────────────────────────────────────────────────────
// ConstraintId
// ─────────────────────────────────────────────────────────────────────────────

/// Normalized constraint key.
///
/// Declared by library authors (e.g. `testing.write-test-first`). The value is
/// trimmed on construction; equality, hashing, and ordering are ASCII
/// case-insensitive so that `Tdd.Red` and `tdd.red` name the same constraint.
/// The original casing is preserved for display.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ConstraintId(String);

impl ConstraintId {
    /// Create a constraint ID, trimming surrounding whitespace.
    #[must_use]
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_owned())
    }

    /// Return the ID as declared (trimmed, original casing).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the ID is empty after trimming.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq for ConstraintId {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for ConstraintId {}

impl Hash for ConstraintId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.0.bytes() {
            state.write_u8(b.to_ascii_lowercase());
        }
    }
}

impl PartialOrd for ConstraintId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ConstraintId {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = self.0.bytes().map(|b| b.to_ascii_lowercase());
        let rhs = other.0.bytes().map(|b| b.to_ascii_lowercase());
        lhs.cmp(rhs)
    }
}

impl fmt::Display for ConstraintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ConstraintId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for ConstraintId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<ConstraintId> for String {
    fn from(id: ConstraintId) -> Self {
        id.0
    }
}

impl AsRef<str> for ConstraintId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn activation_id_new_is_uuid_v7() {
        let id = ActivationId::new();
        let parsed = Uuid::parse_str(id.as_str()).expect("should be valid UUID");
        assert_eq!(parsed.get_version(), Some(uuid::Version::SortRand));
    }

    #[test]
    fn ids_are_unique() {
        let a = ActivationId::new();
        let b = ActivationId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn branded_display() {
        let id = InteractionId::from("display-me");
        assert_eq!(format!("{id}"), "display-me");
    }

    #[test]
    fn branded_serde_roundtrip() {
        let id = SessionId::from("serde-test");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"serde-test\"");
        let back: SessionId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn constraint_id_trims() {
        let id = ConstraintId::new("  testing.write-test-first  ");
        assert_eq!(id.as_str(), "testing.write-test-first");
    }

    #[test]
    fn constraint_id_case_insensitive_eq() {
        assert_eq!(
            ConstraintId::new("Methodology.TDD"),
            ConstraintId::new("methodology.tdd")
        );
    }

    #[test]
    fn constraint_id_preserves_display_casing() {
        let id = ConstraintId::new("Methodology.TDD");
        assert_eq!(id.to_string(), "Methodology.TDD");
    }

    #[test]
    fn constraint_id_hash_matches_eq() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        let _ = set.insert(ConstraintId::new("A.B"));
        let _ = set.insert(ConstraintId::new("a.b"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn constraint_id_ordering_ignores_case() {
        let mut ids = vec![
            ConstraintId::new("Zeta"),
            ConstraintId::new("alpha"),
            ConstraintId::new("Mid"),
        ];
        ids.sort();
        let order: Vec<&str> = ids.iter().map(ConstraintId::as_str).collect();
        assert_eq!(order, vec!["alpha", "Mid", "Zeta"]);
    }

    #[test]
    fn constraint_id_serde_trims_on_deserialize() {
        let id: ConstraintId = serde_json::from_str("\" padded.id \"").unwrap();
        assert_eq!(id.as_str(), "padded.id");
    }

    #[test]
    fn constraint_id_empty_after_trim() {
        assert!(ConstraintId::new("   ").is_empty());
        assert!(!ConstraintId::new("x").is_empty());
    }

    proptest! {
        #[test]
        fn constraint_id_eq_is_case_class(s in "[a-zA-Z][a-zA-Z0-9.-]{0,30}") {
            let lower = ConstraintId::new(s.to_lowercase());
            let upper = ConstraintId::new(s.to_uppercase());
            let original = ConstraintId::new(&s);
            prop_assert_eq!(&lower, &original);
            prop_assert_eq!(&upper, &original);
        }

        #[test]
        fn constraint_id_trim_is_idempotent(s in "\\s{0,3}[a-z][a-z0-9.-]{0,20}\\s{0,3}") {
            let once = ConstraintId::new(&s);
            let twice = ConstraintId::new(once.as_str());
            prop_assert_eq!(once.as_str(), twice.as_str());
        }
    }
}
