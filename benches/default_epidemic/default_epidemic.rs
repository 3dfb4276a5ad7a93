use criterion::{criterion_group, criterion_main, Criterion};
use epiwave::engine::{run_to_completion, EngineState};
use epiwave::parameters::Parameters;

static SEED: u64 = 123;

fn default_epidemic() -> EngineState {
    let parameters = Parameters::default();
    let state = EngineState::new(&parameters, SEED).expect("default parameters validate");
    run_to_completion(state, &parameters).expect("default epidemic runs to completion")
}

pub fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("default epidemic", |bencher| {
        bencher.iter_with_large_drop(default_epidemic)
    });
}

criterion_group!(epidemic_benches, criterion_benchmark);
criterion_main!(epidemic_benches);
