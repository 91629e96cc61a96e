//! Run command implementation.

use super::output::{JsonMatch, format_match_text};
use super::{CliError, GameArgs, ModeArg, OutputFormat, PolicySpec, resolve_seed};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use yun::selfplay::policy_seed;
use yun::{Episode, Policy};

/// Execute the run command.
///
/// # Errors
///
/// Returns an error if the configuration or a policy table is invalid.
pub(crate) fn execute(
    game: &GameArgs,
    agent: &str,
    opponent: &str,
    mode: ModeArg,
    seed: Option<u64>,
    format: OutputFormat,
) -> Result<(), CliError> {
    let config = game.env_config()?;
    let rule = config.validate()?;
    let seed = resolve_seed(seed);

    let mut agent = PolicySpec::load(agent, &rule, mode)?.build(policy_seed(seed, 0));
    let mut opponent = PolicySpec::load(opponent, &rule, mode)?.build(policy_seed(seed, 1));

    let mut episode = Episode::new(config)?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let (mut observation, info) = episode.reset(game.random_start, &mut rng);

    let mut rounds = vec![info];
    let last = loop {
        let legal = episode.codec().legal_actions(observation);
        let action = agent.select_action(observation, &legal);
        let result = episode.step(action, Some(&mut opponent), &mut rng)?;
        rounds.push(result.info);
        observation = result.observation;
        if result.is_done() {
            break result;
        }
    };

    match format {
        OutputFormat::Text => {
            println!("Running match with seed {seed}...");
            println!();
            print!("{}", format_match_text(&rounds, &last));
        }
        OutputFormat::Json => {
            let json_result = JsonMatch {
                seed,
                config,
                rounds: &rounds,
                reward: last.reward,
                terminated: last.terminated,
                truncated: last.truncated,
            };
            let json = serde_json::to_string_pretty(&json_result)
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
    }

    Ok(())
}
