use criterion::Criterion;
use criterion::{criterion_group, criterion_main};
use ntsim::aggregate::{estimate, Strategy};
use ntsim::experiment::{Coprime, DivisionCount};
use num::BigUint;

fn bench_strategies(c: &mut Criterion) {
    let n = BigUint::from(10_u32).pow(100);
    let trials = 10_000;

    let strategies = [
        ("sequential", Strategy::sequential()),
        (
            "threads, 2 workers",
            Strategy::Threads {
                workers: 2,
                batch_size: 100,
            },
        ),
        (
            "threads, 8 workers",
            Strategy::Threads {
                workers: 8,
                batch_size: 100,
            },
        ),
    ];

    let mut group = c.benchmark_group("coprime, 10^4 trials");
    group.sample_size(20);
    for (name, strategy) in &strategies {
        group.bench_function(*name, |b| {
            b.iter(|| estimate(&Coprime, &n, trials, strategy, Some(1)).unwrap())
        });
    }
    group.finish();

    let mut group = c.benchmark_group("division count, 10^4 trials");
    group.sample_size(20);
    for (name, strategy) in &strategies {
        group.bench_function(*name, |b| {
            b.iter(|| estimate(&DivisionCount, &n, trials, strategy, Some(1)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(strategy_benches, bench_strategies);
criterion_main!(strategy_benches);
