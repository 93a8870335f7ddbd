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

use mantle_greedy::config::GreedyConfig;
use mantle_model::{
    generator::ProblemGenerator,
    index::SubsetIndex,
    loading::ProblemLoader,
    problem::{Problem, ProblemBuilder},
};
use mantle_solver::{
    convert::{
        bounded::BoundedCover, decision::DecisionByOptimization, partial::PartialCover,
        partition::PartitionCover,
    },
    greedy::IteratedGreedySolver,
    optimizer::{CoverDecision, CoverOptimizer},
    reduction::{
        reduce::{ReducedCover, ReductionCover},
        selection::EssentialSelection,
        utility::FrequencyUtility,
    },
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Once;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const ABC_INSTANCE: &str = "
# rows columns
4 3
# column costs
1 1 3
# covering columns per row
2 1 3
2 1 3
2 2 3
2 2 3
";

static INIT: Once = Once::new();

/// Routes solver events to the test output, filtered by `RUST_LOG`.
fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        tracing_subscriber::registry()
            .with(fmt::layer().with_test_writer())
            .with(filter)
            .init();
    });
}

fn solver(seed: u64) -> IteratedGreedySolver {
    init_tracing();
    let config = GreedyConfig::default().with_iterations(25).with_seed(seed);
    IteratedGreedySolver::new(config).unwrap()
}

fn generated(universe: usize, subsets: usize, max_cost: f64, seed: u64) -> Problem {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    ProblemGenerator::new(universe, subsets)
        .density(0.1, 0.4)
        .cost(1.0, max_cost)
        .integral_costs(true)
        .generate(&mut rng)
        .unwrap()
}

#[test]
fn test_prefers_two_cheap_subsets() {
    let problem = ProblemLoader::new().from_str(ABC_INSTANCE).unwrap();
    let cover = solver(42).optimize(&problem, None).unwrap().unwrap();

    assert!(cover.is_complete());
    assert_eq!(cover.cost(), 2.0);
    assert!(cover.frequencies().iter().all(|&f| f == 1));
    assert_eq!(
        cover.members().collect::<Vec<_>>(),
        vec![SubsetIndex::new(0), SubsetIndex::new(1)]
    );
}

#[test]
fn test_reports_uncovered_elements() {
    let mut builder = ProblemBuilder::new(3);
    builder.add_subset([0], 1.0).unwrap();
    let problem = builder.build().unwrap();

    let outcome = solver(42).solve(&problem, None).unwrap();
    assert!(!outcome.is_feasible());
    assert!(outcome.cover().is_none());
    let partial = outcome.family().unwrap();
    assert_eq!(partial.uncovered_count(), 2);
    assert!(!partial.is_complete());
}

#[test]
fn test_stacked_adapters() {
    // Element 4 cannot be covered; at most two subsets may be chosen.
    let mut builder = ProblemBuilder::new(5);
    builder.add_subset([0, 1], 1.0).unwrap();
    builder.add_subset([2, 3], 1.0).unwrap();
    builder.add_subset([0], 0.5).unwrap();
    builder.add_subset([1], 0.5).unwrap();
    builder.add_subset([2], 0.5).unwrap();
    builder.add_subset([3], 0.5).unwrap();
    let problem = builder.build().unwrap();

    let mut stacked = PartialCover::new(BoundedCover::new(solver(42), 2));
    let found = stacked.optimize(&problem, None).unwrap().unwrap();
    assert!(found.belongs_to(&problem));
    assert_eq!(found.uncovered_count(), 1);
    assert!(found.len() <= 2);

    let report = stacked.statistics();
    assert!(report.contains("PartialCover: 1 problems processed"));
    assert!(report.contains("BoundedCover: 1 problems processed"));
    assert!(report.contains("IteratedGreedySolver: 1 problems processed"));
}

#[test]
fn test_decision_over_partitioning() {
    let mut builder = ProblemBuilder::new(4);
    builder.add_subset([0, 1, 2], 1.0).unwrap();
    builder.add_subset([1, 2, 3], 1.0).unwrap();
    builder.add_subset([3], 1.5).unwrap();
    let problem = builder.build().unwrap();

    let mut decision = DecisionByOptimization::new(PartitionCover::new(solver(42)));
    assert!(decision.decide(&problem, 2.5, None).unwrap().is_none());
    let found = decision.decide(&problem, 3.0, None).unwrap().unwrap();
    assert_eq!(found.cost(), 2.5);
    assert_eq!(found.multiple_count(), 0);
}

#[test]
fn test_reduced_cover_on_generated_instance() {
    let problem = generated(30, 120, 10.0, 11);
    let mut reduced = ReducedCover::from_config(
        solver(3),
        FrequencyUtility::default(),
        40,
        &GreedyConfig::default(),
    );
    let found = reduced.optimize(&problem, None).unwrap().unwrap();
    assert!(found.belongs_to(&problem));
    assert!(found.is_complete());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_greedy_cover_is_complete_and_not_worse_than_all_subsets(
        universe in 4usize..16,
        subsets in 4usize..24,
        seed in 1u64..1000,
    ) {
        let problem = generated(universe, subsets, 5.0, seed);
        let cover = solver(seed).optimize(&problem, None).unwrap().unwrap();
        prop_assert!(cover.is_complete());
        prop_assert!(cover.cost() <= problem.full_family().cost());
    }

    #[test]
    fn prop_partitions_cover_every_element_once(
        universe in 3usize..12,
        subsets in 3usize..16,
        seed in 1u64..1000,
    ) {
        let problem = generated(universe, subsets, 4.0, seed);
        let mut partition = PartitionCover::new(solver(seed));
        if let Some(found) = partition.optimize(&problem, None).unwrap() {
            prop_assert!(found.frequencies().iter().all(|&f| f == 1));
        }
    }

    #[test]
    fn prop_partial_cover_of_coverable_problem_is_undelegated_result(
        universe in 3usize..12,
        subsets in 3usize..16,
        seed in 1u64..1000,
    ) {
        let problem = generated(universe, subsets, 3.0, seed);
        let direct = solver(seed).optimize(&problem, None).unwrap();
        let converted = PartialCover::new(solver(seed)).optimize(&problem, None).unwrap();
        prop_assert_eq!(direct, converted);
    }

    #[test]
    fn prop_reduction_leaves_only_necessary_or_margin_members(
        universe in 3usize..16,
        subsets in 3usize..30,
        margin in 0.0f64..3.0,
        seed in 1u64..1000,
    ) {
        let problem = generated(universe, subsets, 5.0, seed);
        let mut selection = EssentialSelection::new(
            &problem,
            FrequencyUtility::default(),
            problem.len(),
            margin,
            0,
        );
        selection.offer_all(problem.indices());
        for min_size in (1..problem.len()).rev() {
            selection.set_min_size(min_size);
        }

        let family = selection.selection();
        prop_assert!(family.is_complete());
        let removable = family.members().filter(|&m| selection.is_removable(m)).count();
        prop_assert!(removable == 0 || family.len() <= selection.effective_min_size());

        let cover = ReductionCover::new(FrequencyUtility::default(), 0)
            .optimize(&problem, None)
            .unwrap()
            .unwrap();
        prop_assert!(cover.is_complete());
        prop_assert_eq!(cover.unnecessary_count(), 0);
    }
}
