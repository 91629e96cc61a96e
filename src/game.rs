//! Game layer for Yun.
//!
//! Implements the rules of the duel:
//! - Validated rule parameters (energy cap, attack/defend levels)
//! - Action encoding and legality masks
//! - Energy transition and round adjudication
//! - Dual-perspective observation encoding

mod action;
mod engine;
mod invariants;
mod observation;
mod rule;

pub use action::{Action, ActionId, ActionMask};
pub use engine::{Outcome, Transition};
pub use invariants::{check_transition, InvariantViolation};
pub use observation::{Observation, ObservationCodec};
pub use rule::GameRule;
