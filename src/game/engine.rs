//! Energy transition and round adjudication.
//!
//! Both players move simultaneously. Energies are updated first, then the
//! agent is checked for infeasible moves, then attacks are compared. The rule
//! is deliberately asymmetric: an opponent that overspends is forgiven (its
//! attack is cancelled), while an agent that overspends or defends above the
//! opponent's energy loses on the spot.

use serde::Serialize;
use tracing::debug;

use crate::error::InvalidActionError;
use crate::game::{ActionId, GameRule};

/// Result of a round from the agent's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Outcome {
    /// Nobody won; the game goes on.
    #[default]
    Continue,
    /// The agent landed an attack.
    AgentWins,
    /// The agent was hit or was punished for an infeasible move.
    AgentLoses,
}

impl Outcome {
    /// Numeric code: `0` continue, `1` agent loses, `2` agent wins.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Continue => 0,
            Self::AgentLoses => 1,
            Self::AgentWins => 2,
        }
    }

    /// Reward for the agent: `+1`, `0` or `-1`.
    #[must_use]
    pub const fn reward(self) -> i32 {
        match self {
            Self::Continue => 0,
            Self::AgentWins => 1,
            Self::AgentLoses => -1,
        }
    }

    /// Whether this outcome ends the episode.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Continue)
    }

    /// The same outcome seen from the opponent's side.
    #[must_use]
    pub const fn mirrored(self) -> Self {
        match self {
            Self::Continue => Self::Continue,
            Self::AgentWins => Self::AgentLoses,
            Self::AgentLoses => Self::AgentWins,
        }
    }
}

/// Energies after a round and the round's outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Transition {
    /// Agent energy after the round.
    pub agent: u32,
    /// Opponent energy after the round.
    pub opponent: u32,
    /// Adjudicated outcome.
    pub outcome: Outcome,
}

impl GameRule {
    /// Resolve one simultaneous round.
    ///
    /// Energies are expected to lie in `[0, max_energy]`. Illegal but decodable
    /// actions are never errors; they are handled by the forgiveness and
    /// punishment rules.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidActionError`] if either id is outside the action space.
    pub fn resolve(
        &self,
        agent_energy: u32,
        opponent_energy: u32,
        agent_action: ActionId,
        opponent_action: ActionId,
    ) -> Result<Transition, InvalidActionError> {
        let (c1, a1, d1) = self.decode_action(agent_action)?.components();
        let (c2, mut a2, d2) = self.decode_action(opponent_action)?.components();
        let max = i64::from(self.max_energy());

        let agent_next = (i64::from(agent_energy) + i64::from(c1) - i64::from(a1)).min(max);
        let mut opponent_next =
            (i64::from(opponent_energy) + i64::from(c2) - i64::from(a2)).min(max);

        // Opponent overspend: the attack simply does not happen.
        if opponent_next < 0 {
            opponent_next = 0;
            a2 = 0;
        }
        let opponent = clamp_energy(opponent_next);

        if agent_next < 0 {
            debug!(agent_energy, attack = a1, "agent attacked beyond its energy");
            return Ok(Transition {
                agent: 0,
                opponent,
                outcome: Outcome::AgentLoses,
            });
        }
        let agent = clamp_energy(agent_next);

        // Compared against the opponent's energy before this round.
        if d1 > opponent_energy {
            debug!(opponent_energy, defend = d1, "agent defended above opponent energy");
            return Ok(Transition {
                agent,
                opponent,
                outcome: Outcome::AgentLoses,
            });
        }

        let outcome = if a1 > 0 && a1 > a2 && a1 != d2 {
            Outcome::AgentWins
        } else if a2 > 0 && a2 > a1 && a2 != d1 {
            Outcome::AgentLoses
        } else {
            Outcome::Continue
        };

        Ok(Transition {
            agent,
            opponent,
            outcome,
        })
    }
}

/// Convert a non-negative, already capped energy back to `u32`.
fn clamp_energy(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule() -> GameRule {
        GameRule::new(5, 3, 1).unwrap()
    }

    fn resolve(a: u32, o: u32, aa: ActionId, oa: ActionId) -> Transition {
        rule().resolve(a, o, aa, oa).unwrap()
    }

    #[test]
    fn test_attack_beats_charge() {
        let t = resolve(2, 2, 2, 0);
        assert_eq!((t.agent, t.opponent, t.outcome), (0, 3, Outcome::AgentWins));
    }

    #[test]
    fn test_matched_defense_neutralizes() {
        let t = resolve(3, 3, 2, 5);
        assert_eq!((t.agent, t.opponent, t.outcome), (1, 3, Outcome::Continue));
    }

    #[test]
    fn test_mismatched_defense_loses() {
        // Defend(1) does not stop Attack(2).
        let t = resolve(3, 3, 2, 4);
        assert_eq!(t.outcome, Outcome::AgentWins);
    }

    #[test]
    fn test_defense_overreach() {
        for opp_action in 0..7 {
            let t = resolve(3, 1, 6, opp_action);
            assert_eq!(t.outcome, Outcome::AgentLoses, "opponent action {opp_action}");
        }
    }

    #[test]
    fn test_opponent_defense_overreach_unpunished() {
        // Opponent defends at 3 while the agent holds no energy.
        let t = resolve(0, 3, 0, 6);
        assert_eq!((t.agent, t.opponent, t.outcome), (1, 3, Outcome::Continue));

        // The oversized defense simply fails to block a lower attack.
        let t = resolve(1, 2, 1, 6);
        assert_eq!((t.agent, t.opponent, t.outcome), (0, 2, Outcome::AgentWins));
    }

    #[test]
    fn test_agent_overspend_punished() {
        let t = resolve(1, 3, 3, 0);
        assert_eq!((t.agent, t.opponent, t.outcome), (0, 4, Outcome::AgentLoses));
    }

    #[test]
    fn test_opponent_overspend_forgiven() {
        // Opponent attacks at 3 with 1 energy: the attack is cancelled.
        let t = resolve(2, 1, 0, 3);
        assert_eq!((t.agent, t.opponent, t.outcome), (3, 0, Outcome::Continue));

        // The agent's own attack still lands against the forgiven opponent.
        let t = resolve(2, 1, 1, 3);
        assert_eq!((t.agent, t.opponent, t.outcome), (1, 0, Outcome::AgentWins));
    }

    #[test]
    fn test_higher_attack_wins() {
        let t = resolve(3, 3, 1, 2);
        assert_eq!(t.outcome, Outcome::AgentLoses);
        let t = resolve(3, 3, 3, 2);
        assert_eq!(t.outcome, Outcome::AgentWins);
    }

    #[test]
    fn test_equal_attacks_continue() {
        let t = resolve(2, 2, 2, 2);
        assert_eq!((t.agent, t.opponent, t.outcome), (0, 0, Outcome::Continue));
    }

    #[test]
    fn test_opponent_attack_blocked_by_agent_defense() {
        let t = resolve(2, 2, 5, 2);
        assert_eq!((t.agent, t.opponent, t.outcome), (2, 0, Outcome::Continue));
    }

    #[test]
    fn test_charge_capped_at_max() {
        let t = resolve(5, 5, 0, 0);
        assert_eq!((t.agent, t.opponent, t.outcome), (5, 5, Outcome::Continue));
    }

    #[test]
    fn test_invalid_action_id() {
        assert!(rule().resolve(1, 1, 7, 0).is_err());
        assert!(rule().resolve(1, 1, 0, 99).is_err());
    }

    #[test]
    fn test_outcome_helpers() {
        assert_eq!(Outcome::AgentWins.reward(), 1);
        assert_eq!(Outcome::AgentLoses.code(), 1);
        assert_eq!(Outcome::AgentWins.mirrored(), Outcome::AgentLoses);
        assert!(!Outcome::Continue.is_terminal());
    }
}
