//! Observation encoding.
//!
//! A live observation packs `(own, opp)` as `own * (max_energy + 1) + opp`.
//! The two values right after that range are sentinels for a lost and a won
//! game, so every observation fits in `[0, (max_energy + 1)^2 + 2)`.

use std::fmt;

use serde::Serialize;

use crate::error::ObservationError;
use crate::game::{ActionMask, GameRule, Outcome};

/// Integer observation of the game from one player's perspective.
///
/// Only obtainable from an [`ObservationCodec`], so it always lies inside the
/// observation space of the rule that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Observation(usize);

impl Observation {
    /// The raw integer value.
    #[must_use]
    pub const fn value(self) -> usize {
        self.0
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Converts between energy pairs and observations for a fixed rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservationCodec {
    rule: GameRule,
}

impl ObservationCodec {
    /// Create a codec for `rule`.
    #[must_use]
    pub const fn new(rule: GameRule) -> Self {
        Self { rule }
    }

    /// The rule this codec encodes for.
    #[must_use]
    pub const fn rule(&self) -> GameRule {
        self.rule
    }

    /// Number of distinct observations.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.rule.observation_space_size()
    }

    /// Sentinel for a game the observer lost.
    #[must_use]
    pub const fn loss_sentinel(&self) -> Observation {
        let n = self.rule.energy_states();
        Observation(n * n)
    }

    /// Sentinel for a game the observer won.
    #[must_use]
    pub const fn win_sentinel(&self) -> Observation {
        let n = self.rule.energy_states();
        Observation(n * n + 1)
    }

    /// Validate a raw integer as an observation.
    ///
    /// # Errors
    ///
    /// Returns [`ObservationError::OutOfRange`] if `value` is outside the space.
    pub const fn observation(&self, value: usize) -> Result<Observation, ObservationError> {
        if value < self.size() {
            Ok(Observation(value))
        } else {
            Err(ObservationError::OutOfRange {
                value,
                size: self.size(),
            })
        }
    }

    /// Encode the observer's energy, the other side's energy and the outcome
    /// as seen by the observer. Energies above the cap are clamped.
    #[must_use]
    pub fn encode(&self, own: u32, opp: u32, outcome: Outcome) -> Observation {
        match outcome {
            Outcome::Continue => {
                let max = self.rule.max_energy();
                let own = own.min(max) as usize;
                let opp = opp.min(max) as usize;
                Observation(own * self.rule.energy_states() + opp)
            }
            Outcome::AgentLoses => self.loss_sentinel(),
            Outcome::AgentWins => self.win_sentinel(),
        }
    }

    /// Whether `obs` is one of the two terminal sentinels.
    #[must_use]
    pub const fn is_terminal(&self, obs: Observation) -> bool {
        obs.0 >= self.loss_sentinel().0
    }

    /// The outcome `obs` represents for its observer.
    #[must_use]
    pub fn outcome(&self, obs: Observation) -> Outcome {
        if obs == self.loss_sentinel() {
            Outcome::AgentLoses
        } else if obs == self.win_sentinel() {
            Outcome::AgentWins
        } else {
            Outcome::Continue
        }
    }

    /// Recover `(own, opp)` energies from a live observation.
    ///
    /// # Errors
    ///
    /// Returns [`ObservationError::Terminal`] for sentinels.
    #[allow(clippy::cast_possible_truncation)]
    pub const fn decode(&self, obs: Observation) -> Result<(u32, u32), ObservationError> {
        if self.is_terminal(obs) {
            return Err(ObservationError::Terminal(obs.0));
        }
        let n = self.rule.energy_states();
        // Both parts are at most `max_energy`, which came from a u32.
        Ok(((obs.0 / n) as u32, (obs.0 % n) as u32))
    }

    /// The other player's observation of the same round.
    ///
    /// Live observations swap `own`/`opp`; sentinels swap with each other.
    #[must_use]
    pub const fn mirror(&self, obs: Observation) -> Observation {
        let n = self.rule.energy_states();
        if obs.0 == self.loss_sentinel().0 {
            self.win_sentinel()
        } else if obs.0 == self.win_sentinel().0 {
            self.loss_sentinel()
        } else {
            Observation((obs.0 % n) * n + obs.0 / n)
        }
    }

    /// Legal actions for the observer. Terminal observations allow everything.
    #[must_use]
    pub fn legal_actions(&self, obs: Observation) -> ActionMask {
        match self.decode(obs) {
            Ok((own, opp)) => self.rule.legal_actions(own, opp),
            Err(_) => ActionMask::all(self.rule.action_space_size()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> ObservationCodec {
        ObservationCodec::new(GameRule::default())
    }

    #[test]
    fn test_encode_live() {
        let codec = codec();
        assert_eq!(codec.encode(0, 0, Outcome::Continue).value(), 0);
        assert_eq!(codec.encode(2, 3, Outcome::Continue).value(), 15);
        assert_eq!(codec.encode(5, 5, Outcome::Continue).value(), 35);
    }

    #[test]
    fn test_encode_clamps() {
        let codec = codec();
        assert_eq!(
            codec.encode(9, 1, Outcome::Continue),
            codec.encode(5, 1, Outcome::Continue)
        );
    }

    #[test]
    fn test_sentinels() {
        let codec = codec();
        assert_eq!(codec.encode(1, 1, Outcome::AgentLoses).value(), 36);
        assert_eq!(codec.encode(1, 1, Outcome::AgentWins).value(), 37);
        assert!(codec.is_terminal(codec.loss_sentinel()));
        assert_eq!(codec.outcome(codec.win_sentinel()), Outcome::AgentWins);
        assert_eq!(
            codec.decode(codec.loss_sentinel()),
            Err(ObservationError::Terminal(36))
        );
    }

    #[test]
    fn test_decode() {
        let codec = codec();
        let obs = codec.encode(4, 2, Outcome::Continue);
        assert_eq!(codec.decode(obs), Ok((4, 2)));
        assert_eq!(codec.outcome(obs), Outcome::Continue);
    }

    #[test]
    fn test_observation_validation() {
        let codec = codec();
        assert!(codec.observation(37).is_ok());
        assert_eq!(
            codec.observation(38),
            Err(ObservationError::OutOfRange { value: 38, size: 38 })
        );
    }

    #[test]
    fn test_mirror() {
        let codec = codec();
        let obs = codec.encode(4, 2, Outcome::Continue);
        assert_eq!(codec.mirror(obs), codec.encode(2, 4, Outcome::Continue));
        assert_eq!(codec.mirror(codec.loss_sentinel()), codec.win_sentinel());
        assert_eq!(codec.mirror(codec.win_sentinel()), codec.loss_sentinel());
        for value in 0..codec.size() {
            let obs = codec.observation(value).unwrap();
            assert_eq!(codec.mirror(codec.mirror(obs)), obs);
        }
    }

    #[test]
    fn test_legal_actions() {
        let codec = codec();
        let obs = codec.encode(1, 0, Outcome::Continue);
        assert_eq!(codec.legal_actions(obs).legal_ids().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(codec.legal_actions(codec.win_sentinel()).count_legal(), 7);
    }
}
