//! Output formatting utilities for CLI.

use serde::Serialize;
use std::time::Duration;
use yun::{EnvConfig, PlayedAction, SelfPlaySummary, StepInfo, StepResult};

/// JSON-serializable match transcript.
#[derive(Debug, Serialize)]
pub(super) struct JsonMatch<'a> {
    /// Seed of the episode random stream.
    pub(super) seed: u64,
    /// Configuration the match was played under.
    pub(super) config: EnvConfig,
    /// Reset snapshot followed by one snapshot per round.
    pub(super) rounds: &'a [StepInfo],
    /// Final agent reward.
    pub(super) reward: i32,
    /// The match produced a winner.
    pub(super) terminated: bool,
    /// The match ended without a winner.
    pub(super) truncated: bool,
}

fn played(action: Option<PlayedAction>) -> String {
    action.map_or_else(|| "-".to_string(), |p| p.action.label())
}

/// Format a match transcript as human-readable text.
pub(super) fn format_match_text(rounds: &[StepInfo], last: &StepResult) -> String {
    let mut output = String::new();

    output.push_str(" Round  Agent  Opponent  Energy\n");
    for (round, info) in rounds.iter().enumerate() {
        output.push_str(&format!(
            " {round:>5}  {:>5}  {:>8}  {}-{}\n",
            played(info.agent_action),
            played(info.opponent_action),
            info.agent_energy,
            info.opponent_energy
        ));
    }
    output.push('\n');

    let verdict = match last.reward {
        1 => "Agent wins",
        -1 => "Opponent wins",
        _ if last.truncated => "No winner (truncated)",
        _ => "No winner",
    };
    output.push_str(&format!("Result: {verdict}\n"));
    output.push_str(&format!("  Reward: {}\n", last.reward));
    output.push_str(&format!("  Rounds: {}\n", rounds.len().saturating_sub(1)));

    output
}

/// JSON-serializable self-play summary.
#[derive(Debug, Serialize)]
pub(super) struct JsonSelfPlay {
    /// Base seed; match `i` uses `base_seed + i`.
    base_seed: u64,
    /// Configuration the matches were played under.
    config: EnvConfig,
    /// Raw counters.
    summary: SelfPlaySummary,
    /// Mean agent reward.
    mean_reward: f64,
    /// Standard tolerance of the mean reward.
    tolerance: f64,
    /// Mean reward within three tolerances of zero.
    balanced: bool,
    /// Share of decided matches the agent won.
    decided_win_rate: Option<f64>,
    /// Mean match length in steps.
    mean_steps: f64,
    /// Standard error of the mean match length.
    steps_std_error: f64,
    /// Wall-clock time in seconds.
    duration_secs: f64,
}

impl JsonSelfPlay {
    /// Create from a summary.
    pub(super) fn new(
        summary: &SelfPlaySummary,
        base_seed: u64,
        config: EnvConfig,
        duration: Duration,
    ) -> Self {
        Self {
            base_seed,
            config,
            summary: *summary,
            mean_reward: summary.mean_reward(),
            tolerance: summary.tolerance(),
            balanced: summary.is_balanced(3.0),
            decided_win_rate: summary.decided_win_rate(),
            mean_steps: summary.mean_steps(),
            steps_std_error: summary.steps_std_error(),
            duration_secs: duration.as_secs_f64(),
        }
    }
}

/// Format a self-play summary as human-readable text.
#[allow(clippy::cast_precision_loss)]
pub(super) fn format_selfplay_text(summary: &SelfPlaySummary, base_seed: u64) -> String {
    let mut output = String::new();
    let percent = |n: u64| {
        if summary.games == 0 {
            0.0
        } else {
            n as f64 / summary.games as f64 * 100.0
        }
    };

    output.push_str(&format!(
        "Self-play Results ({} games, base seed {base_seed})\n",
        summary.games
    ));
    output.push_str("========================================\n\n");
    output.push_str(&format!("  Agent wins:    {} ({:.1}%)\n", summary.wins, percent(summary.wins)));
    output.push_str(&format!(
        "  Opponent wins: {} ({:.1}%)\n",
        summary.losses,
        percent(summary.losses)
    ));
    output.push_str(&format!(
        "  Unfinished:    {} ({:.1}%)\n\n",
        summary.unfinished,
        percent(summary.unfinished)
    ));
    output.push_str(&format!(
        "Mean reward: {:+.4} (+/- {:.4})\n",
        summary.mean_reward(),
        summary.tolerance()
    ));
    if let Some(rate) = summary.decided_win_rate() {
        output.push_str(&format!("Agent share of decided matches: {:.1}%\n", rate * 100.0));
    }
    let verdict = if summary.is_balanced(3.0) {
        "balanced"
    } else {
        "UNBALANCED"
    };
    output.push_str(&format!("Balance: {verdict}\n"));
    output.push_str(&format!(
        "Average match length: {:.2} (+/- {:.2}) steps\n",
        summary.mean_steps(),
        summary.steps_std_error()
    ));

    output
}
