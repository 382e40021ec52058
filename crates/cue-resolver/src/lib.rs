//! # cue-resolver
//!
//! Reference resolver for the Cue engine.
//!
//! Expands a composite constraint's id references into a fully resolved tree:
//!
//! - **Cycle detection**: an ordered "currently resolving" stack; a repeated
//!   composite id fails immediately with the full cycle path
//! - **Memoization**: completed resolutions are cached so diamond-shaped
//!   reference graphs are expanded once
//! - **Concurrency**: the cache supports concurrent readers; writes are
//!   all-or-nothing per resolved id
//!
//! One resolver instance is bound to exactly one library instance. The cache
//! is invalidated wholesale on any library mutation.

#![deny(unsafe_code)]

pub mod resolved;
pub mod resolver;

pub use resolved::ResolvedConstraint;
pub use resolver::{ConstraintResolver, ResolverStats};
