//! Episode state machine.
//!
//! An [`Episode`] owns the energies, outcome and observation history of one
//! playthrough. It moves `Idle -> Active` on [`Episode::reset`] and from
//! `Active` to `Terminated` (someone won) or `Truncated` (a state repeated or
//! the step budget ran out). Both end states are final until the next reset.

use rand::Rng;
use serde::Serialize;
use tracing::{debug, trace};

use crate::config::EnvConfig;
use crate::error::{ConfigError, EpisodeError, LifecycleError};
use crate::game::{
    Action, ActionId, ActionMask, GameRule, Observation, ObservationCodec, Outcome,
};
use crate::policy::Policy;

/// Lifecycle state of an episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum EpisodeStatus {
    /// Created but never reset.
    #[default]
    Idle,
    /// Accepting steps.
    Active,
    /// A round produced a winner.
    Terminated,
    /// Ended without a winner.
    Truncated,
}

impl EpisodeStatus {
    /// Whether no further steps are accepted.
    #[must_use]
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Terminated | Self::Truncated)
    }
}

/// An action id together with its decoded meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlayedAction {
    /// Raw id.
    pub id: ActionId,
    /// Decoded action.
    pub action: Action,
}

/// Diagnostic snapshot for external analysis. The engine never reads it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepInfo {
    /// Agent move of the last round (`None` right after a reset).
    pub agent_action: Option<PlayedAction>,
    /// Opponent move of the last round (`None` right after a reset).
    pub opponent_action: Option<PlayedAction>,
    /// Agent energy.
    pub agent_energy: u32,
    /// Opponent energy.
    pub opponent_energy: u32,
    /// Agent observation.
    pub observation: Observation,
    /// Outcome so far.
    pub outcome: Outcome,
    /// Outcome code: `0` continue, `1` agent loses, `2` agent wins.
    pub outcome_code: u8,
}

/// Everything one call to [`Episode::step`] returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepResult {
    /// Agent observation after the round.
    pub observation: Observation,
    /// `+1` win, `0` nothing yet, `-1` loss.
    pub reward: i32,
    /// The round produced a winner.
    pub terminated: bool,
    /// An observation repeated or the step budget ran out.
    pub truncated: bool,
    /// Diagnostics.
    pub info: StepInfo,
}

impl StepResult {
    /// Whether the episode is over.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.terminated || self.truncated
    }
}

/// One playthrough of the duel.
#[derive(Debug, Clone)]
pub struct Episode {
    rule: GameRule,
    codec: ObservationCodec,
    max_episode_steps: u32,
    status: EpisodeStatus,
    agent_energy: u32,
    opponent_energy: u32,
    outcome: Outcome,
    last_actions: (Option<PlayedAction>, Option<PlayedAction>),
    history: Vec<Observation>,
    step_count: u32,
}

impl Episode {
    /// Create an idle episode.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `config` is invalid.
    pub fn new(config: EnvConfig) -> Result<Self, ConfigError> {
        let rule = config.validate()?;
        Ok(Self {
            rule,
            codec: ObservationCodec::new(rule),
            max_episode_steps: config.max_episode_steps,
            status: EpisodeStatus::Idle,
            agent_energy: rule.init_energy(),
            opponent_energy: rule.init_energy(),
            outcome: Outcome::Continue,
            last_actions: (None, None),
            history: Vec::new(),
            step_count: 0,
        })
    }

    /// Start a new playthrough.
    ///
    /// Both players start at the rule's initial energy, or, with `randomize`,
    /// at independent uniform draws from `[0, max_energy]`.
    pub fn reset<R: Rng + ?Sized>(&mut self, randomize: bool, rng: &mut R) -> (Observation, StepInfo) {
        if randomize {
            let max = self.rule.max_energy();
            self.agent_energy = rng.gen_range(0..=max);
            self.opponent_energy = rng.gen_range(0..=max);
        } else {
            self.agent_energy = self.rule.init_energy();
            self.opponent_energy = self.rule.init_energy();
        }
        self.outcome = Outcome::Continue;
        self.last_actions = (None, None);
        self.history.clear();
        // A repeat truncates, so history never outgrows the observation space.
        let bound = (self.max_episode_steps as usize).min(self.codec.size());
        self.history.reserve(bound);
        self.step_count = 0;
        self.status = EpisodeStatus::Active;

        debug!(
            agent_energy = self.agent_energy,
            opponent_energy = self.opponent_energy,
            randomize,
            "episode reset"
        );
        (self.current_observation(), self.info())
    }

    /// Play one round.
    ///
    /// The opponent acts on the mirrored observation and its legality mask.
    /// Without a policy it draws uniformly from the whole action space,
    /// legal or not.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError`] before the first reset or after the episode
    /// finished, and [`InvalidActionError`](crate::error::InvalidActionError)
    /// if either id is outside the action space. Episode state is left
    /// unchanged on error. An invalid agent id is rejected before the
    /// opponent is consulted; an invalid opponent id is only seen after the
    /// opponent policy (or `rng`) has been drawn from.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        action: ActionId,
        opponent: Option<&mut dyn Policy>,
        rng: &mut R,
    ) -> Result<StepResult, EpisodeError> {
        match self.status {
            EpisodeStatus::Idle => return Err(LifecycleError::NotStarted.into()),
            EpisodeStatus::Terminated | EpisodeStatus::Truncated => {
                return Err(LifecycleError::Finished {
                    steps: self.step_count,
                }
                .into());
            }
            EpisodeStatus::Active => {}
        }

        let agent_played = PlayedAction {
            id: action,
            action: self.rule.decode_action(action)?,
        };

        let opponent_action = match opponent {
            Some(policy) => {
                let view = self.codec.mirror(self.current_observation());
                policy.select_action(view, &self.codec.legal_actions(view))
            }
            None => rng.gen_range(0..self.rule.action_space_size()),
        };

        let transition =
            self.rule
                .resolve(self.agent_energy, self.opponent_energy, action, opponent_action)?;
        let opponent_played = PlayedAction {
            id: opponent_action,
            action: self.rule.decode_action(opponent_action)?,
        };

        self.agent_energy = transition.agent;
        self.opponent_energy = transition.opponent;
        self.outcome = transition.outcome;
        self.last_actions = (Some(agent_played), Some(opponent_played));

        let observation = self.current_observation();
        let terminated = self.outcome.is_terminal();
        let truncated = self.history.contains(&observation)
            || self.step_count + 1 >= self.max_episode_steps;
        self.history.push(observation);
        self.step_count += 1;

        self.status = if terminated {
            EpisodeStatus::Terminated
        } else if truncated {
            EpisodeStatus::Truncated
        } else {
            EpisodeStatus::Active
        };

        trace!(
            step = self.step_count,
            agent = %agent_played.action,
            opponent = %opponent_played.action,
            agent_energy = self.agent_energy,
            opponent_energy = self.opponent_energy,
            outcome = ?self.outcome,
            "round resolved"
        );

        Ok(StepResult {
            observation,
            reward: self.outcome.reward(),
            terminated,
            truncated,
            info: self.info(),
        })
    }

    /// Diagnostic snapshot of the current state.
    #[must_use]
    pub fn info(&self) -> StepInfo {
        StepInfo {
            agent_action: self.last_actions.0,
            opponent_action: self.last_actions.1,
            agent_energy: self.agent_energy,
            opponent_energy: self.opponent_energy,
            observation: self.current_observation(),
            outcome: self.outcome,
            outcome_code: self.outcome.code(),
        }
    }

    /// The agent's current observation.
    #[must_use]
    pub fn current_observation(&self) -> Observation {
        self.codec
            .encode(self.agent_energy, self.opponent_energy, self.outcome)
    }

    /// Legal actions for the agent in the current state.
    #[must_use]
    pub fn agent_legal_actions(&self) -> ActionMask {
        self.codec.legal_actions(self.current_observation())
    }

    /// Lifecycle state.
    #[must_use]
    pub const fn status(&self) -> EpisodeStatus {
        self.status
    }

    /// `(agent, opponent)` energies.
    #[must_use]
    pub const fn energies(&self) -> (u32, u32) {
        (self.agent_energy, self.opponent_energy)
    }

    /// Outcome of the last round.
    #[must_use]
    pub const fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Observations produced by steps since the last reset, in order.
    #[must_use]
    pub fn history(&self) -> &[Observation] {
        &self.history
    }

    /// Steps taken since the last reset.
    #[must_use]
    pub const fn step_count(&self) -> u32 {
        self.step_count
    }

    /// Step budget.
    #[must_use]
    pub const fn max_episode_steps(&self) -> u32 {
        self.max_episode_steps
    }

    /// The rule in force.
    #[must_use]
    pub const fn rule(&self) -> &GameRule {
        &self.rule
    }

    /// The observation codec for this rule.
    #[must_use]
    pub const fn codec(&self) -> &ObservationCodec {
        &self.codec
    }
}
