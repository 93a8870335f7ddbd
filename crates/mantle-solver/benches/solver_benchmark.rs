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
use mantle_greedy::config::GreedyConfig;
use mantle_model::generator::ProblemGenerator;
use mantle_solver::{
    convert::partition::PartitionCover,
    greedy::IteratedGreedySolver,
    optimizer::CoverOptimizer,
    reduction::{reduce::ReducedCover, utility::FrequencyUtility},
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::hint::black_box;

fn solver() -> IteratedGreedySolver {
    IteratedGreedySolver::new(GreedyConfig::default().with_seed(7))
        .unwrap_or_else(|e| panic!("Invalid configuration: {}", e))
}

fn bench_solvers(c: &mut Criterion) {
    let mut group = c.benchmark_group("solvers");
    group.sample_size(10);

    for (universe, subsets) in [(50, 200), (100, 600)] {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let problem = ProblemGenerator::new(universe, subsets)
            .cost(1.0, 20.0)
            .integral_costs(true)
            .generate(&mut rng)
            .unwrap_or_else(|e| panic!("Failed to generate instance: {}", e));
        let label = format!("{}x{}", universe, subsets);
        group.throughput(Throughput::Elements(subsets as u64));

        group.bench_with_input(BenchmarkId::new("greedy", &label), &problem, |b, problem| {
            b.iter(|| {
                let found = solver().optimize(black_box(problem), None).unwrap();
                black_box(found.map(|f| f.cost()))
            })
        });

        group.bench_with_input(BenchmarkId::new("reduced", &label), &problem, |b, problem| {
            b.iter(|| {
                let mut reduced = ReducedCover::from_config(
                    solver(),
                    FrequencyUtility::default(),
                    subsets / 4,
                    &GreedyConfig::default(),
                );
                let found = reduced.optimize(black_box(problem), None).unwrap();
                black_box(found.map(|f| f.cost()))
            })
        });

        group.bench_with_input(BenchmarkId::new("partition", &label), &problem, |b, problem| {
            b.iter(|| {
                let found = PartitionCover::new(solver())
                    .optimize(black_box(problem), None)
                    .unwrap();
                black_box(found.map(|f| f.len()))
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_solvers);
criterion_main!(benches);
