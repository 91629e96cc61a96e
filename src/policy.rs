//! Policies: anything that picks an action from an observation and a legality mask.
//!
//! The engine only consumes the [`Policy`] capability. Two stock
//! implementations are provided for matches and tests: [`UniformPolicy`] and
//! the table-driven [`TablePolicy`]. Closures of the right shape are policies
//! too.

use rand::SeedableRng;
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::IteratorRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::PolicyError;
use crate::game::{ActionId, ActionMask, GameRule, Observation};

/// Chooses an action for one side of the duel.
///
/// Implementations should return an id that `legal` marks as legal. The
/// engine does not check this: whatever id comes back is resolved under the
/// normal forgiveness and punishment rules.
pub trait Policy {
    /// Pick an action for `observation`.
    fn select_action(&mut self, observation: Observation, legal: &ActionMask) -> ActionId;
}

impl<F> Policy for F
where
    F: FnMut(Observation, &ActionMask) -> ActionId,
{
    fn select_action(&mut self, observation: Observation, legal: &ActionMask) -> ActionId {
        self(observation, legal)
    }
}

/// Uniformly random over the legal actions.
#[derive(Debug, Clone)]
pub struct UniformPolicy {
    rng: ChaCha8Rng,
}

impl UniformPolicy {
    /// Create a policy with its own seeded random stream.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Policy for UniformPolicy {
    fn select_action(&mut self, _observation: Observation, legal: &ActionMask) -> ActionId {
        legal.legal_ids().choose(&mut self.rng).unwrap_or(0)
    }
}

/// How a [`TablePolicy`] turns a row of weights into an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// Highest-weight legal action; ties go to the lowest id.
    Greedy,
    /// Draw a legal action with probability proportional to its weight.
    #[default]
    Sample,
}

/// Behavioural strategy table: one row of action weights per observation.
///
/// Weights need not be normalized. Illegal actions are masked out before
/// selection; a row whose legal weights are all zero falls back to a uniform
/// draw over the legal actions.
#[derive(Debug, Clone)]
pub struct TablePolicy {
    table: Vec<Vec<f64>>,
    mode: SelectionMode,
    rng: ChaCha8Rng,
}

impl TablePolicy {
    /// Create a table policy for `rule`.
    ///
    /// The table must have one row per observation and one column per action.
    ///
    /// # Errors
    ///
    /// Returns a [`PolicyError`] on a shape mismatch or a negative/non-finite weight.
    pub fn new(
        rule: &GameRule,
        table: Vec<Vec<f64>>,
        mode: SelectionMode,
        seed: u64,
    ) -> Result<Self, PolicyError> {
        let rows = rule.observation_space_size();
        let columns = rule.action_space_size();
        if table.len() != rows {
            return Err(PolicyError::Rows {
                rows: table.len(),
                expected: rows,
            });
        }
        for (row, weights) in table.iter().enumerate() {
            if weights.len() != columns {
                return Err(PolicyError::Columns {
                    row,
                    len: weights.len(),
                    expected: columns,
                });
            }
            if let Some(column) = weights.iter().position(|w| !w.is_finite() || *w < 0.0) {
                return Err(PolicyError::Weight { row, column });
            }
        }
        Ok(Self {
            table,
            mode,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    /// A table with equal weight on every action.
    #[must_use]
    pub fn uniform(rule: &GameRule, mode: SelectionMode, seed: u64) -> Self {
        Self {
            table: vec![vec![1.0; rule.action_space_size()]; rule.observation_space_size()],
            mode,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// A copy of this policy drawing from a fresh random stream.
    #[must_use]
    pub fn with_seed(&self, seed: u64) -> Self {
        Self {
            table: self.table.clone(),
            mode: self.mode,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Selection mode.
    #[must_use]
    pub const fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Legal weights for `observation`, normalized to sum to one.
    ///
    /// Illegal actions get probability zero. All-zero rows become uniform
    /// over the legal actions.
    #[must_use]
    pub fn probabilities(&self, observation: Observation, legal: &ActionMask) -> Vec<f64> {
        let mut probs = self.legal_weights(observation, legal);
        let total: f64 = probs.iter().sum();
        if total > 0.0 {
            for p in &mut probs {
                *p /= total;
            }
        } else {
            #[allow(clippy::cast_precision_loss)]
            let share = 1.0 / legal.count_legal().max(1) as f64;
            for id in legal.legal_ids() {
                probs[id] = share;
            }
        }
        probs
    }

    /// Row weights with illegal entries zeroed. Unknown observations weigh nothing.
    fn legal_weights(&self, observation: Observation, legal: &ActionMask) -> Vec<f64> {
        let row = self.table.get(observation.value());
        (0..legal.len())
            .map(|id| {
                if legal.is_legal(id) {
                    row.and_then(|r| r.get(id)).copied().unwrap_or(0.0)
                } else {
                    0.0
                }
            })
            .collect()
    }
}

impl Policy for TablePolicy {
    fn select_action(&mut self, observation: Observation, legal: &ActionMask) -> ActionId {
        let weights = self.legal_weights(observation, legal);
        match self.mode {
            SelectionMode::Greedy => {
                let mut best: Option<(ActionId, f64)> = None;
                for id in legal.legal_ids() {
                    if best.is_none_or(|(_, w)| weights[id] > w) {
                        best = Some((id, weights[id]));
                    }
                }
                best.map_or(0, |(id, _)| id)
            }
            SelectionMode::Sample => match WeightedIndex::new(&weights) {
                Ok(dist) => dist.sample(&mut self.rng),
                Err(_) => legal.legal_ids().choose(&mut self.rng).unwrap_or(0),
            },
        }
    }
}
