//! Error types for the duel engine.
//!
//! Only programmer misuse is an error. Overspending energy or defending above
//! the opponent's energy are ordinary game outcomes and never surface here.

use thiserror::Error;

use crate::game::ActionId;

/// Invalid construction-time configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// `max_energy` must be at least 1.
    #[error("max energy must be at least 1, got {0}")]
    MaxEnergy(u32),
    /// `level` must be at least 1.
    #[error("level must be at least 1, got {0}")]
    Level(u32),
    /// `init_energy` must lie in `[0, max_energy]`.
    #[error("initial energy {init} exceeds max energy {max}")]
    InitEnergy {
        /// Requested initial energy.
        init: u32,
        /// Configured maximum energy.
        max: u32,
    },
    /// The observation space `(max_energy + 1)^2 + 2` does not fit in `usize`.
    #[error("max energy {0} makes the observation space overflow")]
    ObservationSpace(u32),
    /// `max_episode_steps` must be at least 1.
    #[error("max episode steps must be at least 1, got {0}")]
    MaxEpisodeSteps(u32),
}

/// An action id or action that does not belong to the action space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidActionError {
    /// Action id outside `[0, 2 * level]`.
    #[error("action id {id} outside action space of size {size}")]
    OutOfRange {
        /// The offending id.
        id: ActionId,
        /// Size of the action space (`1 + 2 * level`).
        size: usize,
    },
    /// Attack or defend level outside `[1, level]`.
    #[error("action level {level} outside [1, {max_level}]")]
    Level {
        /// The offending level.
        level: u32,
        /// Highest level of the rule.
        max_level: u32,
    },
}

/// An observation that cannot be interpreted the requested way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ObservationError {
    /// Raw value outside the observation space.
    #[error("observation {value} outside observation space of size {size}")]
    OutOfRange {
        /// The offending raw value.
        value: usize,
        /// Size of the observation space (`(max_energy + 1)^2 + 2`).
        size: usize,
    },
    /// Terminal sentinels carry no energy pair.
    #[error("observation {0} is a terminal sentinel")]
    Terminal(usize),
}

/// Episode methods called in the wrong lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// `step` was called before the first `reset`.
    #[error("episode has not been reset")]
    NotStarted,
    /// `step` was called after the episode terminated or was truncated.
    #[error("episode already finished after {steps} steps")]
    Finished {
        /// Steps taken before the episode finished.
        steps: u32,
    },
}

/// Failure of a single episode step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EpisodeError {
    /// Lifecycle misuse.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    /// Agent or opponent chose an id outside the action space.
    #[error(transparent)]
    InvalidAction(#[from] InvalidActionError),
}

/// Failure while playing out a whole match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MatchError {
    /// The match configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// A step failed, typically a policy returning an id outside the action space.
    #[error("match aborted: {0}")]
    Episode(#[from] EpisodeError),
}

/// Invalid policy table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// Table row count differs from the observation space size.
    #[error("policy table has {rows} rows, expected {expected}")]
    Rows {
        /// Rows present.
        rows: usize,
        /// Observation space size.
        expected: usize,
    },
    /// A row's length differs from the action space size.
    #[error("policy table row {row} has {len} entries, expected {expected}")]
    Columns {
        /// Row index.
        row: usize,
        /// Entries present.
        len: usize,
        /// Action space size.
        expected: usize,
    },
    /// Weights must be finite and non-negative.
    #[error("policy table entry ({row}, {column}) is negative or not finite")]
    Weight {
        /// Row index.
        row: usize,
        /// Column index.
        column: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = InvalidActionError::OutOfRange { id: 9, size: 7 };
        assert_eq!(err.to_string(), "action id 9 outside action space of size 7");

        let err = ConfigError::InitEnergy { init: 6, max: 5 };
        assert!(err.to_string().contains("exceeds"));
    }

    #[test]
    fn test_episode_error_is_transparent() {
        let err: EpisodeError = LifecycleError::NotStarted.into();
        assert_eq!(err.to_string(), "episode has not been reset");
        assert!(matches!(err, EpisodeError::Lifecycle(LifecycleError::NotStarted)));
    }
}
