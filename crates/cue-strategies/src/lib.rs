//! # cue-strategies
//!
//! Composition-strategy state machines for the Cue engine.
//!
//! Four interchangeable orchestration algorithms decide which sub-constraint
//! of a composite is due next:
//!
//! - **Sequential** — fixed order (RED/GREEN/REFACTOR), advanced only by an
//!   explicit external signal, no skipping
//! - **Hierarchical** — levels 0..N, each unlocked by satisfying the one below
//! - **Progressive** — ordered levels with skip prevention and barrier stages
//! - **Layered** — named layers with dependency allow-lists
//!
//! The machines are intentionally minimal: initial state is "not started",
//! terminal state is "exhausted / top level reached", and every transition is
//! attributable to an explicit [`TransitionSignal`]. There are no hidden
//! states.

#![deny(unsafe_code)]

pub mod decision;
pub mod hierarchical;
pub mod layered;
pub mod progressive;
pub mod sequential;
pub mod signals;
pub mod state;

pub use decision::NextActivation;
pub use hierarchical::HierarchicalProgress;
pub use layered::LayeredPolicy;
pub use progressive::ProgressiveProgress;
pub use sequential::SequentialProgress;
pub use signals::TransitionSignal;
pub use state::StrategyState;
