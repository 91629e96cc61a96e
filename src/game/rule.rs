//! Rule parameters shared by every component of an episode.

use serde::Serialize;

use crate::error::ConfigError;

/// Immutable game configuration.
///
/// Fields are private so a `GameRule` can only exist in a validated state:
/// `max_energy >= 1`, `level >= 1`, `init_energy <= max_energy`, and the
/// observation space size fits in `usize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct GameRule {
    max_energy: u32,
    level: u32,
    init_energy: u32,
}

impl Default for GameRule {
    fn default() -> Self {
        Self {
            max_energy: 5,
            level: 3,
            init_energy: 1,
        }
    }
}

impl GameRule {
    /// Create a validated rule.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any parameter is out of range.
    pub const fn new(max_energy: u32, level: u32, init_energy: u32) -> Result<Self, ConfigError> {
        if max_energy < 1 {
            return Err(ConfigError::MaxEnergy(max_energy));
        }
        if level < 1 {
            return Err(ConfigError::Level(level));
        }
        if init_energy > max_energy {
            return Err(ConfigError::InitEnergy {
                init: init_energy,
                max: max_energy,
            });
        }
        let states = max_energy as usize + 1;
        match states.checked_mul(states) {
            Some(pairs) if pairs.checked_add(2).is_some() => {}
            _ => return Err(ConfigError::ObservationSpace(max_energy)),
        }
        Ok(Self {
            max_energy,
            level,
            init_energy,
        })
    }

    /// Energy cap for both players.
    #[must_use]
    pub const fn max_energy(&self) -> u32 {
        self.max_energy
    }

    /// Highest attack/defend level.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Energy both players start with on a non-randomized reset.
    #[must_use]
    pub const fn init_energy(&self) -> u32 {
        self.init_energy
    }

    /// Number of distinct actions: one charge, `level` attacks, `level` defenses.
    #[must_use]
    pub const fn action_space_size(&self) -> usize {
        1 + 2 * self.level as usize
    }

    /// Number of distinct energy values (`max_energy + 1`).
    #[must_use]
    pub const fn energy_states(&self) -> usize {
        self.max_energy as usize + 1
    }

    /// Number of distinct observations: every energy pair plus two sentinels.
    #[must_use]
    pub const fn observation_space_size(&self) -> usize {
        let n = self.energy_states();
        n * n + 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rule() {
        let rule = GameRule::default();
        assert_eq!(rule.max_energy(), 5);
        assert_eq!(rule.level(), 3);
        assert_eq!(rule.init_energy(), 1);
        assert_eq!(rule.action_space_size(), 7);
        assert_eq!(rule.observation_space_size(), 38);
    }

    #[test]
    fn test_rule_validation() {
        assert_eq!(GameRule::new(0, 3, 0), Err(ConfigError::MaxEnergy(0)));
        assert_eq!(GameRule::new(5, 0, 1), Err(ConfigError::Level(0)));
        assert_eq!(
            GameRule::new(5, 3, 6),
            Err(ConfigError::InitEnergy { init: 6, max: 5 })
        );
        assert!(GameRule::new(1, 1, 1).is_ok());
        assert!(GameRule::new(5, 3, 0).is_ok());
    }

    #[test]
    fn test_observation_space_overflow_rejected() {
        assert_eq!(
            GameRule::new(u32::MAX, 1, 0),
            Err(ConfigError::ObservationSpace(u32::MAX))
        );
        let rule = GameRule::new(1 << 16, 1, 0).unwrap();
        assert_eq!(rule.observation_space_size(), (1 << 16) * (1 << 16) + 2 * (1 << 16) + 3);
    }

    #[test]
    fn test_level_may_exceed_max_energy() {
        // Attacks above the energy cap exist in the action space but are never legal.
        let rule = GameRule::new(2, 4, 0).unwrap();
        assert_eq!(rule.action_space_size(), 9);
    }
}
