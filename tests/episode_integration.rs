//! Multi-round integration tests for the episode controller.
//!
//! These tests drive whole episodes through the public API: worked rounds,
//! lifecycle errors, seeded determinism and the symmetry of self-play.
//!
//! Run with: cargo test --release episode_integration

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use yun::{
    Action, ActionId, ActionMask, EnvConfig, Episode, EpisodeError, EpisodeStatus, GameRule,
    LifecycleError, Observation, Outcome, SelectionMode, TablePolicy, UniformPolicy, play_match,
    run_self_play,
};

fn fixed(id: ActionId) -> impl FnMut(Observation, &ActionMask) -> ActionId {
    move |_, _| id
}

#[test]
fn test_attack_beats_charge() {
    let rule = GameRule::default();
    let t = rule.resolve(2, 2, 2, 0).unwrap();
    assert_eq!((t.agent, t.opponent, t.outcome), (0, 3, Outcome::AgentWins));
}

#[test]
fn test_matched_defense_neutralizes() {
    let rule = GameRule::default();
    assert_eq!(rule.decode_action(5).unwrap(), Action::Defend(2));
    let t = rule.resolve(3, 3, 2, 5).unwrap();
    assert_eq!((t.agent, t.opponent, t.outcome), (1, 3, Outcome::Continue));
}

#[test]
fn test_defense_overreach_loses() {
    let rule = GameRule::default();
    for opponent_action in 0..rule.action_space_size() {
        let t = rule.resolve(2, 1, 6, opponent_action).unwrap();
        assert_eq!(t.outcome, Outcome::AgentLoses, "opponent played {opponent_action}");
    }
}

#[test]
fn test_charge_race_then_attack() {
    let mut episode = Episode::new(EnvConfig::default()).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    episode.reset(false, &mut rng);

    // Agent charges while the opponent defends at 1: (1,1) -> (2,1).
    let mut defend = fixed(4);
    let result = episode.step(0, Some(&mut defend), &mut rng).unwrap();
    assert_eq!(episode.energies(), (2, 1));
    assert!(!result.is_done());

    // Attack at 2 against a defense at 1 wins.
    let result = episode.step(2, Some(&mut defend), &mut rng).unwrap();
    assert_eq!(result.reward, 1);
    assert!(result.terminated);
    assert_eq!(result.info.agent_action.unwrap().action, Action::Attack(2));
    assert_eq!(result.info.opponent_action.unwrap().action, Action::Defend(1));
    assert_eq!(episode.status(), EpisodeStatus::Terminated);
}

#[test]
fn test_reset_restarts_finished_episode() {
    let mut episode = Episode::new(EnvConfig::default()).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    episode.reset(false, &mut rng);
    let mut charge = fixed(0);
    episode.step(1, Some(&mut charge), &mut rng).unwrap();
    assert_eq!(
        episode.step(0, Some(&mut charge), &mut rng),
        Err(EpisodeError::Lifecycle(LifecycleError::Finished { steps: 1 }))
    );

    let (obs, info) = episode.reset(false, &mut rng);
    assert_eq!(episode.status(), EpisodeStatus::Active);
    assert_eq!(info.outcome, Outcome::Continue);
    assert_eq!(episode.codec().decode(obs), Ok((1, 1)));
    assert!(episode.history().is_empty());
    assert!(episode.step(0, Some(&mut charge), &mut rng).is_ok());
}

#[test]
fn test_seeded_matches_repeat() {
    let config = EnvConfig::default();
    let run = |seed: u64| {
        let mut agent = UniformPolicy::new(seed);
        let mut opponent = UniformPolicy::new(seed ^ 1);
        play_match(config, seed, true, &mut agent, &mut opponent).unwrap()
    };
    for seed in 0..20 {
        assert_eq!(run(seed), run(seed));
    }
}

#[test]
fn test_greedy_attacker_beats_charger() {
    let config = EnvConfig::default();
    let rule = config.validate().unwrap();

    // Prefer the highest affordable attack, then charge, never defend.
    let row = vec![1.0, 2.0, 3.0, 4.0, 0.0, 0.0, 0.0];
    let table = vec![row; rule.observation_space_size()];
    let mut agent = TablePolicy::new(&rule, table, SelectionMode::Greedy, 0).unwrap();
    let mut charge = fixed(0);

    let result = play_match(config, 0, false, &mut agent, &mut charge).unwrap();
    assert_eq!(result.reward, 1);
    assert_eq!(result.steps, 1);
    assert_eq!(result.final_info.agent_action.unwrap().action, Action::Attack(1));
}

#[test]
fn test_self_play_is_balanced() {
    for randomize in [false, true] {
        let summary =
            run_self_play(EnvConfig::default(), 2000, 17, randomize, UniformPolicy::new).unwrap();
        assert_eq!(summary.games, 2000);
        assert!(
            summary.is_balanced(4.0),
            "mean reward {} outside 4 x {}",
            summary.mean_reward(),
            summary.tolerance()
        );
    }
}
