//! Self-play command implementation.

use super::output::{JsonSelfPlay, format_selfplay_text};
use super::{CliError, GameArgs, ModeArg, OutputFormat, PolicySpec, resolve_seed};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Instant;
use yun::run_matches;

/// Execute the selfplay command.
///
/// # Errors
///
/// Returns an error if the configuration or a policy table is invalid.
#[allow(clippy::too_many_arguments)]
pub(crate) fn execute(
    game: &GameArgs,
    policy: &str,
    opponent: Option<&str>,
    mode: ModeArg,
    games: u64,
    seed: Option<u64>,
    threads: Option<usize>,
    format: OutputFormat,
    progress: bool,
) -> Result<(), CliError> {
    let config = game.env_config()?;
    let rule = config.validate()?;
    let agent = PolicySpec::load(policy, &rule, mode)?;
    let opponent = match opponent {
        Some(spec) => PolicySpec::load(spec, &rule, mode)?,
        None => agent.clone(),
    };

    // Set thread pool size if specified
    if let Some(num_threads) = threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .ok(); // Ignore error if already initialized
    }

    let base_seed = resolve_seed(seed);

    let pb = if progress {
        let pb = ProgressBar::new(games);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} games")
            .map_err(|e| CliError::new(format!("Invalid progress template: {e}")))?
            .progress_chars("=>-");
        pb.set_style(style);
        Some(pb)
    } else {
        None
    };

    let start = Instant::now();
    let summary = run_matches(
        config,
        games,
        base_seed,
        game.random_start,
        |s| agent.build(s),
        |s| opponent.build(s),
    )?;
    let duration = start.elapsed();

    // Matches fold per thread, so the bar only moves once they are merged
    if let Some(pb) = pb {
        pb.set_position(summary.games);
        pb.finish_with_message("done");
    }

    #[allow(clippy::cast_precision_loss)]
    let games_per_sec = if duration.as_secs_f64() > 0.0 {
        summary.games as f64 / duration.as_secs_f64()
    } else {
        0.0
    };

    match format {
        OutputFormat::Text => {
            println!();
            print!("{}", format_selfplay_text(&summary, base_seed));
            println!();
            println!("Duration: {:.2}s ({games_per_sec:.0} games/sec)", duration.as_secs_f64());
        }
        OutputFormat::Json => {
            let json_result = JsonSelfPlay::new(&summary, base_seed, config, duration);
            let json = serde_json::to_string_pretty(&json_result)
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
    }

    Ok(())
}
