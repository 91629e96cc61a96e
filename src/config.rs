//! Environment configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::game::GameRule;

/// Construction-time configuration of an episode.
///
/// Plain data; call [`EnvConfig::validate`] (or construct an
/// [`Episode`](crate::episode::Episode), which does) before use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvConfig {
    /// Energy cap for both players.
    pub max_energy: u32,
    /// Highest attack/defend level.
    pub level: u32,
    /// Starting energy on a non-randomized reset.
    pub init_energy: u32,
    /// Step budget; the episode is truncated when it is exhausted.
    pub max_episode_steps: u32,
}

impl Default for EnvConfig {
    fn default() -> Self {
        let rule = GameRule::default();
        Self {
            max_energy: rule.max_energy(),
            level: rule.level(),
            init_energy: rule.init_energy(),
            max_episode_steps: 20,
        }
    }
}

impl EnvConfig {
    /// Build the validated game rule.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the rule parameters are out of range.
    pub const fn rule(&self) -> Result<GameRule, ConfigError> {
        GameRule::new(self.max_energy, self.level, self.init_energy)
    }

    /// Validate every field.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub const fn validate(&self) -> Result<GameRule, ConfigError> {
        if self.max_episode_steps < 1 {
            return Err(ConfigError::MaxEpisodeSteps(self.max_episode_steps));
        }
        self.rule()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EnvConfig::default();
        assert_eq!(config.max_episode_steps, 20);
        assert_eq!(config.validate(), Ok(GameRule::default()));
    }

    #[test]
    fn test_invalid_config() {
        let config = EnvConfig {
            max_episode_steps: 0,
            ..EnvConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::MaxEpisodeSteps(0)));

        let config = EnvConfig {
            level: 0,
            ..EnvConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::Level(0)));

        let config = EnvConfig {
            max_energy: u32::MAX,
            level: 1,
            init_energy: 0,
            max_episode_steps: 5,
        };
        assert_eq!(config.validate(), Err(ConfigError::ObservationSpace(u32::MAX)));
    }

    #[test]
    fn test_config_from_json() {
        let config: EnvConfig =
            serde_json::from_str(r#"{"max_energy": 3, "level": 2}"#).unwrap();
        assert_eq!(config.max_energy, 3);
        assert_eq!(config.level, 2);
        assert_eq!(config.init_energy, 1);
        assert_eq!(config.max_episode_steps, 20);

        assert!(serde_json::from_str::<EnvConfig>(r#"{"levels": 2}"#).is_err());
    }
}
