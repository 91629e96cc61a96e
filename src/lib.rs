// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Yun: a rule engine for the charge / attack / defend duel.
//!
//! Two players move simultaneously each round: charge one energy, attack at a
//! level they can afford, or defend at a level. A higher attack beats a lower
//! one unless the defender blocked exactly that level. This crate provides:
//! - Action encoding and legality masks
//! - The deterministic round transition and adjudication
//! - Dual-perspective integer observations with terminal sentinels
//! - An episode state machine with cycle-detection truncation
//! - Stock policies and a parallel self-play runner
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │     Self-play / Match Runner        │
//! ├─────────────────────────────────────┤
//! │   Episode (reset / step, history)   │
//! ├─────────────────────────────────────┤
//! │ Actions │ Rule engine │ Observations│
//! └─────────────────────────────────────┘
//! ```

pub mod config;
pub mod episode;
pub mod error;
pub mod game;
pub mod policy;
pub mod selfplay;

pub use config::EnvConfig;
pub use error::{
    ConfigError, EpisodeError, InvalidActionError, LifecycleError, MatchError, ObservationError,
    PolicyError,
};

// Re-export key game types at crate root for convenience
pub use episode::{Episode, EpisodeStatus, PlayedAction, StepInfo, StepResult};
pub use game::{
    Action, ActionId, ActionMask, GameRule, Observation, ObservationCodec, Outcome, Transition,
};
pub use policy::{Policy, SelectionMode, TablePolicy, UniformPolicy};
pub use selfplay::{MatchResult, SelfPlaySummary, play_match, run_matches, run_self_play};

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_reference_game_round_trip() {
        let mut episode = Episode::new(EnvConfig::default()).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let (obs, info) = episode.reset(false, &mut rng);
        assert_eq!(obs.value(), 7);
        let debug = format!("{info:?}");
        assert!(debug.contains("agent_energy: 1"));
    }
}
