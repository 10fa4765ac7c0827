use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::atomic::AtomicBool;

use bawo::board::Field;
use bawo::eval::evaluate;
use bawo::game::State;
use bawo::rules::Variant;
use bawo::search::{search, SearchLimits};

fn bench_evaluate(c: &mut Criterion) {
    let state = State::new(Variant::Yawana.rules());
    c.bench_function("evaluate_yawana_opening", |b| {
        b.iter(|| evaluate(black_box(Field::Upper), black_box(&state)))
    });
}

fn bench_movegen(c: &mut Criterion) {
    for variant in [Variant::Ntchuwa, Variant::Yabambo, Variant::Yawana] {
        let state = State::new(variant.rules());
        c.bench_function(&format!("movegen_{}_opening", variant), |b| {
            // Clones start with an empty cache, so every iteration generates.
            b.iter(|| black_box(state.clone()).legal_moves().map(|m| m.len()))
        });
    }
}

fn bench_execute(c: &mut Criterion) {
    let state = State::new(Variant::Ntchuwa.rules());
    let mv = "A1L".parse().unwrap();
    c.bench_function("execute_ntchuwa_a1l", |b| {
        b.iter(|| state.execute(black_box(mv), |_, _| {}))
    });
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    group.sample_size(10);
    for depth in [2, 3] {
        let state = State::new(Variant::Yawana.rules());
        let limits = SearchLimits { depth, movetime: None };
        group.bench_function(format!("yawana_depth_{}", depth), |b| {
            b.iter(|| {
                let mut out = Vec::new();
                search(black_box(&state), &limits, &mut out, &AtomicBool::new(false))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_evaluate, bench_movegen, bench_execute, bench_search);
criterion_main!(benches);
