#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use yun::game::check_transition;
use yun::{GameRule, ObservationCodec, Outcome};

/// Structured input for a single round.
#[derive(Arbitrary, Debug)]
struct RoundInput {
    /// Energy cap.
    max_energy: u8,
    /// Highest attack/defend level.
    level: u8,
    /// Agent energy before the round.
    agent_energy: u8,
    /// Opponent energy before the round.
    opponent_energy: u8,
    /// Agent action id (may be out of range).
    agent_action: u8,
    /// Opponent action id (may be out of range).
    opponent_action: u8,
}

fuzz_target!(|input: RoundInput| {
    let Ok(rule) = GameRule::new(u32::from(input.max_energy), u32::from(input.level % 16), 0) else {
        return;
    };
    let agent_energy = u32::from(input.agent_energy).min(rule.max_energy());
    let opponent_energy = u32::from(input.opponent_energy).min(rule.max_energy());
    let agent_action = usize::from(input.agent_action);
    let opponent_action = usize::from(input.opponent_action);

    // Out-of-range ids are errors, never panics
    let transition = match rule.resolve(agent_energy, opponent_energy, agent_action, opponent_action) {
        Ok(t) => t,
        Err(_) => {
            assert!(
                agent_action >= rule.action_space_size()
                    || opponent_action >= rule.action_space_size()
            );
            return;
        }
    };

    let violations = check_transition(&rule, (agent_energy, opponent_energy), &transition);
    assert!(violations.is_empty(), "Invariants violated: {violations:?}");

    // Observations stay inside the space and mirror consistently
    let codec = ObservationCodec::new(rule);
    let obs = codec.encode(transition.agent, transition.opponent, transition.outcome);
    assert!(obs.value() < codec.size());
    let mirrored = codec.mirror(obs);
    assert_eq!(codec.mirror(mirrored), obs);
    if transition.outcome == Outcome::Continue {
        assert_eq!(codec.decode(obs), Ok((transition.agent, transition.opponent)));
        assert_eq!(codec.decode(mirrored), Ok((transition.opponent, transition.agent)));
    } else {
        assert_eq!(codec.outcome(mirrored), transition.outcome.mirrored());
    }
});
