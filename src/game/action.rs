//! Action encoding and legality.
//!
//! The action space is laid out as `[Charge, Attack(1..=level), Defend(1..=level)]`,
//! so id `0` is always charge, ids `1..=level` attack and the rest defend.

use std::fmt;

use serde::Serialize;

use crate::error::InvalidActionError;
use crate::game::GameRule;

/// Integer index of an action in the action space.
pub type ActionId = usize;

/// One player's move for a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Action {
    /// Gain one energy.
    Charge,
    /// Spend energy equal to the level and strike at that level.
    Attack(u32),
    /// Block an attack of exactly this level.
    Defend(u32),
}

impl Action {
    /// Split into the `(charge, attack, defend)` triple used by the rule engine.
    ///
    /// Exactly one component is non-zero.
    #[must_use]
    pub const fn components(self) -> (u32, u32, u32) {
        match self {
            Self::Charge => (1, 0, 0),
            Self::Attack(level) => (0, level, 0),
            Self::Defend(level) => (0, 0, level),
        }
    }

    /// Short label used in text output, e.g. `C`, `A2`, `D1`.
    #[must_use]
    pub fn label(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Charge => write!(f, "C"),
            Self::Attack(level) => write!(f, "A{level}"),
            Self::Defend(level) => write!(f, "D{level}"),
        }
    }
}

/// Legality of every action id, one flag per id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ActionMask {
    legal: Vec<bool>,
}

impl ActionMask {
    /// A mask of `len` actions with every action legal.
    #[must_use]
    pub fn all(len: usize) -> Self {
        Self {
            legal: vec![true; len],
        }
    }

    /// A mask of `len` actions with only charge (id 0) legal.
    #[must_use]
    pub fn charge_only(len: usize) -> Self {
        let mut legal = vec![false; len];
        if let Some(first) = legal.first_mut() {
            *first = true;
        }
        Self { legal }
    }

    /// Whether `id` is legal. Ids beyond the mask are illegal.
    #[must_use]
    #[inline]
    pub fn is_legal(&self, id: ActionId) -> bool {
        self.legal.get(id).copied().unwrap_or(false)
    }

    /// Size of the action space this mask covers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.legal.len()
    }

    /// Whether the mask covers no actions at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.legal.is_empty()
    }

    /// Number of legal actions.
    #[must_use]
    pub fn count_legal(&self) -> usize {
        self.legal.iter().filter(|&&l| l).count()
    }

    /// Iterate over the ids of legal actions in ascending order.
    pub fn legal_ids(&self) -> impl Iterator<Item = ActionId> + '_ {
        self.legal
            .iter()
            .enumerate()
            .filter_map(|(id, &l)| l.then_some(id))
    }

    /// The flags as a slice indexed by action id.
    #[must_use]
    pub fn as_slice(&self) -> &[bool] {
        &self.legal
    }
}

impl GameRule {
    /// Decode an action id.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidActionError::OutOfRange`] if `id > 2 * level`.
    pub fn decode_action(&self, id: ActionId) -> Result<Action, InvalidActionError> {
        let out_of_range = InvalidActionError::OutOfRange {
            id,
            size: self.action_space_size(),
        };
        let raw = u32::try_from(id).map_err(|_| out_of_range)?;
        let level = self.level();
        match raw {
            0 => Ok(Action::Charge),
            r if r <= level => Ok(Action::Attack(r)),
            r if r - level <= level => Ok(Action::Defend(r - level)),
            _ => Err(out_of_range),
        }
    }

    /// Encode an action into its id. Exact inverse of [`GameRule::decode_action`].
    ///
    /// # Errors
    ///
    /// Returns [`InvalidActionError::Level`] if the attack or defend level is
    /// outside `[1, level]`.
    pub fn encode_action(&self, action: Action) -> Result<ActionId, InvalidActionError> {
        let check = |level: u32| {
            if (1..=self.level()).contains(&level) {
                Ok(level as usize)
            } else {
                Err(InvalidActionError::Level {
                    level,
                    max_level: self.level(),
                })
            }
        };
        match action {
            Action::Charge => Ok(0),
            Action::Attack(level) => check(level),
            Action::Defend(level) => Ok(check(level)? + self.level() as usize),
        }
    }

    /// Legal actions for a player holding `own` energy against an opponent holding `opp`.
    ///
    /// Charge is always legal. Attack `a` needs `a <= own`. Defend `d` is keyed to
    /// the opponent: it needs `d <= opp`, since nobody can attack above their energy.
    #[must_use]
    pub fn legal_actions(&self, own: u32, opp: u32) -> ActionMask {
        let level = self.level();
        let mut mask = ActionMask::charge_only(self.action_space_size());
        for a in 1..=level.min(own) {
            mask.legal[a as usize] = true;
        }
        for d in 1..=level.min(opp) {
            mask.legal[(level + d) as usize] = true;
        }
        mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_layout() {
        let rule = GameRule::default();
        assert_eq!(rule.decode_action(0), Ok(Action::Charge));
        assert_eq!(rule.decode_action(1), Ok(Action::Attack(1)));
        assert_eq!(rule.decode_action(3), Ok(Action::Attack(3)));
        assert_eq!(rule.decode_action(4), Ok(Action::Defend(1)));
        assert_eq!(rule.decode_action(6), Ok(Action::Defend(3)));
        assert_eq!(
            rule.decode_action(7),
            Err(InvalidActionError::OutOfRange { id: 7, size: 7 })
        );
    }

    #[test]
    fn test_encode_round_trip() {
        let rule = GameRule::default();
        for id in 0..rule.action_space_size() {
            let action = rule.decode_action(id).unwrap();
            assert_eq!(rule.encode_action(action), Ok(id));
        }
    }

    #[test]
    fn test_encode_rejects_bad_levels() {
        let rule = GameRule::default();
        assert_eq!(
            rule.encode_action(Action::Attack(0)),
            Err(InvalidActionError::Level { level: 0, max_level: 3 })
        );
        assert_eq!(
            rule.encode_action(Action::Defend(4)),
            Err(InvalidActionError::Level { level: 4, max_level: 3 })
        );
    }

    #[test]
    fn test_components() {
        assert_eq!(Action::Charge.components(), (1, 0, 0));
        assert_eq!(Action::Attack(2).components(), (0, 2, 0));
        assert_eq!(Action::Defend(3).components(), (0, 0, 3));
    }

    #[test]
    fn test_legal_actions_zero_energy() {
        let rule = GameRule::default();
        let mask = rule.legal_actions(0, 0);
        assert_eq!(mask.legal_ids().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_legal_actions_asymmetric() {
        let rule = GameRule::default();
        // Two energy of our own, one for the opponent.
        let mask = rule.legal_actions(2, 1);
        assert_eq!(mask.len(), 7);
        assert_eq!(mask.legal_ids().collect::<Vec<_>>(), vec![0, 1, 2, 4]);
        assert!(!mask.is_legal(3));
        assert!(!mask.is_legal(5));
        assert!(!mask.is_legal(100));
    }

    #[test]
    fn test_legal_actions_capped_by_level() {
        let rule = GameRule::default();
        let mask = rule.legal_actions(5, 5);
        assert_eq!(mask.count_legal(), 7);
    }

    #[test]
    fn test_action_labels() {
        assert_eq!(Action::Charge.label(), "C");
        assert_eq!(Action::Attack(2).label(), "A2");
        assert_eq!(Action::Defend(1).to_string(), "D1");
    }
}
