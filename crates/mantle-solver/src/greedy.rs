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

//! The iterated greedy heuristic as a `CoverOptimizer`.

use crate::{
    error::SolveError,
    optimizer::{CoverOptimizer, processed_report},
};
use mantle_core::num::saturating::SaturatingAddVal;
use mantle_greedy::{
    config::GreedyConfig,
    engine::IteratedGreedyEngine,
    monitor::{
        composite::CompositeMonitor, greedy_monitor::GreedyMonitor, log::LogMonitor,
        time::TimeLimitMonitor,
    },
    result::GreedyOutcome,
    stats::GreedyStatistics,
};
use mantle_model::{family::Family, problem::Problem};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Solves problems with the iterated randomized greedy engine.
///
/// The random generator is seeded once from `GreedyConfig::seed`; a seed of
/// zero draws one from the system clock. Consecutive calls continue the same
/// random stream, so a fixed seed makes a whole sequence of calls
/// reproducible.
#[derive(Debug, Clone)]
pub struct IteratedGreedySolver {
    engine: IteratedGreedyEngine,
    rng: ChaCha8Rng,
    time_limit: Option<Duration>,
    processed: u64,
    last_statistics: Option<GreedyStatistics>,
}

impl IteratedGreedySolver {
    /// Creates a solver.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` holds an out-of-range parameter.
    pub fn new(config: GreedyConfig) -> Result<Self, SolveError> {
        let rng = seeded_rng(config.seed);
        let engine = IteratedGreedyEngine::new(config)?;
        Ok(Self {
            engine,
            rng,
            time_limit: None,
            processed: 0,
            last_statistics: None,
        })
    }

    /// Stops each run once `time_limit` has elapsed.
    #[inline]
    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = Some(time_limit);
        self
    }

    #[inline]
    pub fn config(&self) -> &GreedyConfig {
        self.engine.config()
    }

    /// Returns the number of problems solved so far.
    #[inline]
    pub fn processed(&self) -> u64 {
        self.processed
    }

    /// Returns the statistics of the most recent run.
    #[inline]
    pub fn last_statistics(&self) -> Option<&GreedyStatistics> {
        self.last_statistics.as_ref()
    }

    /// Runs the engine and returns its full outcome.
    ///
    /// # Errors
    ///
    /// Returns an error if `known` belongs to another problem or is not a
    /// complete cover.
    pub fn solve<'p>(
        &mut self,
        problem: &'p Problem,
        known: Option<&Family<'p>>,
    ) -> Result<GreedyOutcome<'p>, SolveError> {
        let mut monitor = CompositeMonitor::with_capacity(2);
        monitor.add_monitor(LogMonitor::default());
        if let Some(time_limit) = self.time_limit {
            monitor.add_monitor(TimeLimitMonitor::new(time_limit));
        }
        tracing::debug!(
            universe = problem.universe(),
            subsets = problem.len(),
            monitor = monitor.name(),
            "solving problem"
        );

        self.processed = self.processed.saturating_add_val(1);
        let outcome = self.engine.run(problem, known, &mut monitor, &mut self.rng)?;
        self.last_statistics = Some(outcome.statistics().clone());
        Ok(outcome)
    }
}

impl CoverOptimizer for IteratedGreedySolver {
    fn name(&self) -> &str {
        "IteratedGreedySolver"
    }

    fn optimize<'p>(
        &mut self,
        problem: &'p Problem,
        known: Option<&Family<'p>>,
    ) -> Result<Option<Family<'p>>, SolveError> {
        Ok(self.solve(problem, known)?.into_family())
    }

    fn statistics(&self) -> String {
        processed_report(self.name(), self.processed)
    }
}

/// Seeds a generator, drawing the seed from the clock when `seed` is zero.
fn seeded_rng(seed: u64) -> ChaCha8Rng {
    if seed != 0 {
        return ChaCha8Rng::seed_from_u64(seed);
    }
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default();
    ChaCha8Rng::seed_from_u64(nanos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mantle_greedy::{
        config::{ConfigError, ShrinkingKind},
        error::GreedyError,
        result::GreedyTerminationReason,
    };
    use mantle_model::problem::ProblemBuilder;

    fn abc_problem() -> Problem {
        let mut builder = ProblemBuilder::new(3);
        builder.add_subset([0, 1], 1.0).unwrap();
        builder.add_subset([1, 2], 1.0).unwrap();
        builder.add_subset([2], 1.0).unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = GreedyConfig::default().with_remove_probability(1.5);
        let err = IteratedGreedySolver::new(config).unwrap_err();
        assert!(matches!(
            err,
            SolveError::Greedy(GreedyError::Config(ConfigError::InvalidProbability { .. }))
        ));
    }

    #[test]
    fn test_optimize_counts_problems() {
        let problem = abc_problem();
        let config = GreedyConfig::default().with_iterations(50).with_seed(42);
        let mut solver = IteratedGreedySolver::new(config).unwrap();

        let cover = solver.optimize(&problem, None).unwrap().unwrap();
        assert!(cover.is_complete());
        assert_eq!(cover.cost(), 2.0);

        let again = solver.optimize(&problem, Some(&cover)).unwrap().unwrap();
        assert!(again.cost() <= cover.cost());
        assert_eq!(solver.processed(), 2);
        assert_eq!(solver.statistics(), "IteratedGreedySolver: 2 problems processed");
        assert!(solver.last_statistics().is_some());
    }

    #[test]
    fn test_time_limit_stops_run() {
        let problem = abc_problem();
        let config = GreedyConfig::default().with_iterations(u64::MAX).with_seed(7);
        let mut solver = IteratedGreedySolver::new(config)
            .unwrap()
            .with_time_limit(Duration::ZERO);

        let outcome = solver.solve(&problem, None).unwrap();
        assert!(matches!(
            outcome.termination_reason(),
            GreedyTerminationReason::Aborted(_)
        ));
    }

    #[test]
    fn test_proportional_shrinking_of_redundant_known_cover() {
        let mut builder = ProblemBuilder::new(2);
        builder.add_subset([0, 1], 1.0).unwrap();
        builder.add_subset([1], 1.0).unwrap();
        builder.add_subset([1], 2.0).unwrap();
        builder.add_subset([0], 3.0).unwrap();
        let problem = builder.build().unwrap();
        let known = Family::from_indices(&problem, problem.indices().take(3)).unwrap();

        let config = GreedyConfig::default()
            .with_seed(1)
            .with_shrinking(ShrinkingKind::Proportional);
        let mut solver = IteratedGreedySolver::new(config).unwrap();
        let cover = solver.optimize(&problem, Some(&known)).unwrap().unwrap();
        assert!(cover.is_complete());
        assert!(cover.cost() <= known.cost());
        assert_eq!(cover.unnecessary_count(), 0);
    }

    #[test]
    fn test_same_seed_same_cover() {
        let problem = abc_problem();
        let config = GreedyConfig::default().with_iterations(20).with_seed(3);
        let a = IteratedGreedySolver::new(config.clone())
            .unwrap()
            .optimize(&problem, None)
            .unwrap();
        let b = IteratedGreedySolver::new(config)
            .unwrap()
            .optimize(&problem, None)
            .unwrap();
        assert_eq!(a, b);
    }
}
