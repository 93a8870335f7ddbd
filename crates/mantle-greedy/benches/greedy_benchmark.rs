// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use mantle_greedy::{
    config::GreedyConfig, engine::IteratedGreedyEngine, monitor::no_op::NoOperationMonitor,
};
use mantle_model::generator::ProblemGenerator;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::hint::black_box;

fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("greedy_engine");
    group.sample_size(10);

    for (universe, subsets, max_cost) in [(50, 100, 1.0), (100, 300, 1.0), (100, 300, 50.0)] {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let problem = ProblemGenerator::new(universe, subsets)
            .cost(1.0, max_cost)
            .integral_costs(true)
            .generate(&mut rng)
            .unwrap_or_else(|e| panic!("Failed to generate instance: {}", e));
        let engine = IteratedGreedyEngine::new(GreedyConfig::default())
            .unwrap_or_else(|e| panic!("Invalid configuration: {}", e));

        let label = format!("{}x{}-{}", universe, subsets, problem.cost_class());
        group.throughput(Throughput::Elements(subsets as u64));
        group.bench_with_input(BenchmarkId::new("run", &label), &problem, |b, problem| {
            b.iter(|| {
                let mut rng = ChaCha8Rng::seed_from_u64(7);
                let outcome = engine
                    .run(black_box(problem), None, &mut NoOperationMonitor, &mut rng)
                    .unwrap();
                black_box(outcome.statistics().iterations)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_engine);
criterion_main!(benches);
