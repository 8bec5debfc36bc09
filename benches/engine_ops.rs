use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use std::hint::black_box;

use ludo_engine::board::layout;
use ludo_engine::core::{Animal, GameConfig, GameRng, GameState};
use ludo_engine::rules;

fn started(players: usize) -> GameState {
    let waiting = GameConfig::local(&Animal::ALL[..players]).build().unwrap();
    rules::start(&waiting).unwrap()
}

/// Snapshots from a seeded game, sampled every few steps.
fn corpus() -> Vec<GameState> {
    let mut rng = GameRng::new(42);
    let mut state = started(4);
    let mut out = Vec::new();
    for i in 0..400 {
        if state.is_finished() {
            break;
        }
        state = if state.dice_value.is_none() {
            rules::roll(&state, &mut rng).unwrap()
        } else if rules::must_pass(&state) {
            rules::pass_turn(&state).unwrap()
        } else {
            let pick = rules::movable_pawns(&state)[0].clone();
            rules::select_pawn(&state, &pick).unwrap()
        };
        if i % 8 == 0 {
            out.push(state.clone());
        }
    }
    out
}

fn bench_full_game(c: &mut Criterion) {
    c.bench_function("game/4p_seeded", |b| {
        b.iter_batched(
            || (started(4), GameRng::new(7)),
            |(mut state, mut rng)| {
                while !state.is_finished() {
                    state = if state.dice_value.is_none() {
                        rules::roll(&state, &mut rng).unwrap()
                    } else if rules::must_pass(&state) {
                        rules::pass_turn(&state).unwrap()
                    } else {
                        let pick = rules::movable_pawns(&state)[0].clone();
                        rules::select_pawn(&state, &pick).unwrap()
                    };
                }
                black_box(state.sequence)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_queries(c: &mut Criterion) {
    let states = corpus();
    c.bench_function("rules/movable_pawns", |b| {
        b.iter(|| {
            let mut acc = 0usize;
            for s in &states {
                acc += rules::movable_pawns(black_box(s)).len();
            }
            black_box(acc)
        })
    });
    c.bench_function("board/layout", |b| {
        b.iter(|| {
            let mut acc = 0.0f64;
            for s in &states {
                for (_, p) in layout(black_box(s)) {
                    acc += p.x + p.y;
                }
            }
            black_box(acc)
        })
    });
}

criterion_group!(benches, bench_full_game, bench_queries);
criterion_main!(benches);
