//! # cue-core
//!
//! Foundation types, errors, branded IDs, and validation for the Cue engine.
//!
//! This crate provides the shared vocabulary that all other Cue crates depend on:
//!
//! - **Branded IDs**: `ActivationId`, `InteractionId`, `SessionId` as newtypes
//!   for type safety, plus the normalized `ConstraintId` key
//! - **Errors**: `EngineError` hierarchy via `thiserror`, split into structural
//!   failures and recoverable activation-policy refusals
//! - **Validation**: a generic validate-and-collect pipeline shared by every
//!   parameter-object constructor
//! - **Constants**: scoring weights, confidence floor, injection ceiling

#![deny(unsafe_code)]

pub mod constants;
pub mod errors;
pub mod ids;
pub mod validate;

pub use errors::EngineError;
pub use ids::{ActivationId, ConstraintId, InteractionId, SessionId};
pub use validate::{ValidationError, ValidationErrors, Validator};
