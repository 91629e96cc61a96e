//! Match runner and parallel self-play.
//!
//! Provides a pure function interface: `(config, seed, policies) -> MatchResult`.
//! Every match builds its own [`Episode`], random stream and policies, so
//! matches share nothing but the `Copy` configuration and run in parallel
//! with rayon. [`run_matches`] pits two policy families against each other;
//! [`run_self_play`] is the symmetric special case.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::EnvConfig;
use crate::episode::{Episode, StepInfo};
use crate::error::MatchError;
use crate::policy::Policy;

/// Seed stream multiplier separating the agent and opponent policy streams.
const POLICY_STREAM: u64 = 0x9E37_79B9_7F4A_7C15;

/// Final result of one match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    /// Seed of the episode's random stream.
    pub seed: u64,
    /// Agent reward of the last step: `+1`, `0` or `-1`.
    pub reward: i32,
    /// Steps played.
    pub steps: u32,
    /// The match produced a winner.
    pub terminated: bool,
    /// The match was cut short by a repeated state or the step budget.
    pub truncated: bool,
    /// Diagnostics of the last step.
    pub final_info: StepInfo,
}

/// Play one match to completion.
///
/// The agent acts on its own observation and legality mask; the opponent on
/// the mirrored view. The episode random stream is seeded from `seed`.
///
/// # Errors
///
/// Returns [`MatchError`] if `config` is invalid or a policy picks an id
/// outside the action space.
pub fn play_match(
    config: EnvConfig,
    seed: u64,
    randomize: bool,
    agent: &mut dyn Policy,
    opponent: &mut dyn Policy,
) -> Result<MatchResult, MatchError> {
    let mut episode = Episode::new(config)?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let (mut observation, _) = episode.reset(randomize, &mut rng);

    loop {
        let legal = episode.codec().legal_actions(observation);
        let action = agent.select_action(observation, &legal);
        let result = episode.step(action, Some(&mut *opponent), &mut rng)?;
        observation = result.observation;

        if result.is_done() {
            debug!(seed, reward = result.reward, steps = episode.step_count(), "match finished");
            return Ok(MatchResult {
                seed,
                reward: result.reward,
                steps: episode.step_count(),
                terminated: result.terminated,
                truncated: result.truncated,
                final_info: result.info,
            });
        }
    }
}

/// Aggregated results of many matches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SelfPlaySummary {
    /// Matches played.
    pub games: u64,
    /// Matches the agent won.
    pub wins: u64,
    /// Matches the agent lost.
    pub losses: u64,
    /// Matches truncated without a winner.
    pub unfinished: u64,
    /// Sum of final rewards.
    pub total_reward: i64,
    /// Sum of steps over all matches.
    pub total_steps: u64,
    /// Sum of squared steps, for the spread of match lengths.
    pub total_steps_sq: u64,
}

impl SelfPlaySummary {
    /// Add a match result.
    pub fn add_result(&mut self, result: &MatchResult) {
        self.games += 1;
        self.total_steps += u64::from(result.steps);
        self.total_steps_sq += u64::from(result.steps) * u64::from(result.steps);
        self.total_reward += i64::from(result.reward);
        match result.reward {
            1 => self.wins += 1,
            -1 => self.losses += 1,
            _ => self.unfinished += 1,
        }
    }

    /// Merge another summary into this one.
    pub fn merge(&mut self, other: &Self) {
        self.games += other.games;
        self.wins += other.wins;
        self.losses += other.losses;
        self.unfinished += other.unfinished;
        self.total_reward += other.total_reward;
        self.total_steps += other.total_steps;
        self.total_steps_sq += other.total_steps_sq;
    }

    /// Share of decided matches the agent won, `None` if none were decided.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn decided_win_rate(&self) -> Option<f64> {
        let decided = self.wins + self.losses;
        (decided > 0).then(|| self.wins as f64 / decided as f64)
    }

    /// Mean agent reward, `0.0` when no games were played.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_reward(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.total_reward as f64 / self.games as f64
        }
    }

    /// Mean match length in steps.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_steps(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.total_steps as f64 / self.games as f64
        }
    }

    /// Standard error of the mean match length.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn steps_std_error(&self) -> f64 {
        if self.games < 2 {
            return 0.0;
        }
        let n = self.games as f64;
        let mean = self.mean_steps();
        let variance = (self.total_steps_sq as f64 - n * mean * mean) / (n - 1.0);
        (variance.max(0.0) / n).sqrt()
    }

    /// Statistical tolerance `1 / sqrt(games)` of the mean reward.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn tolerance(&self) -> f64 {
        if self.games == 0 {
            f64::INFINITY
        } else {
            1.0 / (self.games as f64).sqrt()
        }
    }

    /// Whether the mean reward lies within `sigmas` tolerances of zero.
    #[must_use]
    pub fn is_balanced(&self, sigmas: f64) -> bool {
        self.mean_reward().abs() <= sigmas * self.tolerance()
    }
}

/// Seed for one side's policy in the match seeded with `seed`.
///
/// `side` is `0` for the agent and `1` for the opponent.
#[must_use]
pub const fn policy_seed(seed: u64, side: u64) -> u64 {
    seed.wrapping_mul(POLICY_STREAM).wrapping_add(side + 1)
}

/// Play `games` matches of a policy against an identically built copy.
///
/// Shorthand for [`run_matches`] with the same factory on both sides.
///
/// # Errors
///
/// Returns the first [`MatchError`] encountered.
pub fn run_self_play<P, F>(
    config: EnvConfig,
    games: u64,
    base_seed: u64,
    randomize: bool,
    make_policy: F,
) -> Result<SelfPlaySummary, MatchError>
where
    P: Policy,
    F: Fn(u64) -> P + Sync,
{
    run_matches(config, games, base_seed, randomize, &make_policy, &make_policy)
}

/// Play `games` matches of one policy family against another.
///
/// Match `i` uses episode seed `base_seed + i`; the factories receive
/// [`policy_seed`] for their side. Matches run in parallel on the global rayon
/// pool and fold into per-thread summaries that are merged at the end.
///
/// # Errors
///
/// Returns the first [`MatchError`] encountered.
pub fn run_matches<A, O, FA, FO>(
    config: EnvConfig,
    games: u64,
    base_seed: u64,
    randomize: bool,
    make_agent: FA,
    make_opponent: FO,
) -> Result<SelfPlaySummary, MatchError>
where
    A: Policy,
    O: Policy,
    FA: Fn(u64) -> A + Sync,
    FO: Fn(u64) -> O + Sync,
{
    config.validate()?;

    let summary = (0..games)
        .into_par_iter()
        .map(|i| {
            let seed = base_seed.wrapping_add(i);
            let mut agent = make_agent(policy_seed(seed, 0));
            let mut opponent = make_opponent(policy_seed(seed, 1));
            play_match(config, seed, randomize, &mut agent, &mut opponent)
        })
        .try_fold(SelfPlaySummary::default, |mut local, result| {
            local.add_result(&result?);
            Ok::<_, MatchError>(local)
        })
        .try_reduce(SelfPlaySummary::default, |mut a, b| {
            a.merge(&b);
            Ok(a)
        })?;

    info!(
        games = summary.games,
        wins = summary.wins,
        losses = summary.losses,
        mean_reward = summary.mean_reward(),
        mean_steps = summary.mean_steps(),
        "matches finished"
    );
    Ok(summary)
}
