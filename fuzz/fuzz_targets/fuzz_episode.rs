#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use yun::{EnvConfig, Episode, EpisodeStatus};

/// Structured input for a whole episode driven by raw action ids.
#[derive(Arbitrary, Debug)]
struct EpisodeInput {
    /// Energy cap.
    max_energy: u8,
    /// Highest attack/defend level.
    level: u8,
    /// Starting energy.
    init_energy: u8,
    /// Step budget.
    max_episode_steps: u8,
    /// Random starting energies.
    randomize: bool,
    /// Seed of the fallback opponent.
    seed: u64,
    /// Agent action ids, one per round.
    actions: Vec<u8>,
}

fuzz_target!(|input: EpisodeInput| {
    let config = EnvConfig {
        max_energy: u32::from(input.max_energy),
        level: u32::from(input.level % 16),
        init_energy: u32::from(input.init_energy),
        max_episode_steps: u32::from(input.max_episode_steps),
    };
    let Ok(mut episode) = Episode::new(config) else {
        return;
    };
    let mut rng = ChaCha8Rng::seed_from_u64(input.seed);
    episode.reset(input.randomize, &mut rng);

    for &raw in &input.actions {
        let before = episode.step_count();
        match episode.step(usize::from(raw), None, &mut rng) {
            Ok(result) => {
                assert_eq!(episode.step_count(), before + 1);
                assert!(episode.step_count() <= config.max_episode_steps);
                assert_eq!(result.is_done(), episode.status().is_finished());
                let (agent, opponent) = episode.energies();
                assert!(agent <= config.max_energy && opponent <= config.max_energy);
            }
            Err(_) => {
                // Rejected steps leave the episode untouched
                assert_eq!(episode.step_count(), before);
                if episode.status() == EpisodeStatus::Active {
                    continue;
                }
                break;
            }
        }
    }
});
