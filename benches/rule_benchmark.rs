//! Benchmarks for the round transition and complete episodes.
//!
//! Self-play throughput is bounded by how fast a single episode runs.

#![allow(missing_docs)]

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use yun::{EnvConfig, GameRule, ObservationCodec, UniformPolicy, play_match, run_self_play};

fn bench_resolve(c: &mut Criterion) {
    let rule = GameRule::default();
    let actions = rule.action_space_size();

    c.bench_function("resolve_all_pairs", |b| {
        b.iter(|| {
            for a in 0..actions {
                for o in 0..actions {
                    let t = rule.resolve(black_box(3), black_box(2), a, o);
                    black_box(t.ok());
                }
            }
        });
    });
}

fn bench_legal_actions(c: &mut Criterion) {
    let codec = ObservationCodec::new(GameRule::default());

    c.bench_function("legal_actions_all_observations", |b| {
        b.iter(|| {
            for raw in 0..codec.size() {
                if let Ok(obs) = codec.observation(raw) {
                    black_box(codec.legal_actions(black_box(obs)));
                }
            }
        });
    });
}

fn bench_single_match(c: &mut Criterion) {
    let config = EnvConfig::default();

    c.bench_function("single_match_uniform", |b| {
        b.iter(|| {
            let mut agent = UniformPolicy::new(1);
            let mut opponent = UniformPolicy::new(2);
            let result = play_match(config, black_box(42), true, &mut agent, &mut opponent);
            black_box(result.ok())
        });
    });
}

fn bench_self_play_batch(c: &mut Criterion) {
    let config = EnvConfig::default();

    let mut group = c.benchmark_group("self_play");
    group.sample_size(20);
    group.bench_function("1000_matches_parallel", |b| {
        b.iter(|| {
            let summary = run_self_play(config, 1000, black_box(7), true, UniformPolicy::new);
            black_box(summary.ok())
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_resolve,
    bench_legal_actions,
    bench_single_match,
    bench_self_play_batch
);
criterion_main!(benches);
