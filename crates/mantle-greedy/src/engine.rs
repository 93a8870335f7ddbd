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

//! Iterated randomized greedy driver.
//!
//! Each iteration grows the current partial cover into a complete one,
//! improves it with the configured repair passes and compares it with the
//! best cover found so far. Unless the run is over, the best cover is then
//! shrunk into the partial cover the next iteration grows from.
//!
//! The rating is chosen per iteration by the mixing policy, which is
//! rewarded whenever the grown cover beats the best one. Growth under the
//! probability rating, and on every weighted problem, proposes all subsets
//! that make progress; unicost growth otherwise proposes only the subsets
//! covering the most. The first iteration selects greedily, without random
//! exploration.
//!
//! Subsets that alone cover some element belong to every cover. They are
//! inserted up front and never removed by shrinking; if they already cover
//! the universe the run ends before the first iteration.

use crate::{
    config::GreedyConfig,
    creation::Creation,
    error::GreedyError,
    grow::GreedyGrowth,
    monitor::greedy_monitor::{GreedyMonitor, SearchCommand},
    optimization::{Optimization, sequence::SequenceOptimization, support::RepairContext},
    policy::{Mixing, MixingPolicy},
    rating::{ChvatalRating, Rating},
    result::{GreedyOutcome, GreedyTerminationReason},
    selection::BestRatingSelection,
    shrinking::{FamilyShrinking, Shrinking},
    stats::GreedyStatistics,
};
use mantle_model::{error::ModelError, family::Family, problem::Problem};
use rand::Rng;
use std::time::Instant;

/// The iterated greedy engine.
///
/// The engine holds a validated configuration and can be run any number of
/// times on different problems.
#[derive(Debug, Clone, PartialEq)]
pub struct IteratedGreedyEngine {
    config: GreedyConfig,
}

impl IteratedGreedyEngine {
    /// Creates an engine.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` holds an out-of-range parameter.
    pub fn new(config: GreedyConfig) -> Result<Self, GreedyError> {
        config.validate()?;
        Ok(Self { config })
    }

    #[inline]
    pub fn config(&self) -> &GreedyConfig {
        &self.config
    }

    /// Runs the heuristic on `problem`.
    ///
    /// A `known` solution, if given, is the initial best cover and the
    /// starting point of the first iteration.
    ///
    /// # Errors
    ///
    /// Returns an error if `known` belongs to another problem or is not a
    /// complete cover.
    pub fn run<'p, M, R>(
        &self,
        problem: &'p Problem,
        known: Option<&Family<'p>>,
        monitor: &mut M,
        rng: &mut R,
    ) -> Result<GreedyOutcome<'p>, GreedyError>
    where
        M: GreedyMonitor + ?Sized,
        R: Rng + ?Sized,
    {
        if let Some(known) = known {
            if !known.belongs_to(problem) {
                return Err(ModelError::ForeignFamily.into());
            }
            if !known.is_complete() {
                return Err(GreedyError::IncompleteKnownSolution {
                    uncovered: known.uncovered_count(),
                });
            }
        }

        let start_time = Instant::now();
        let mut stats = GreedyStatistics::default();
        monitor.on_start(problem);

        let selection = BestRatingSelection::new(
            self.config.add_random,
            self.config.remove_random,
            self.config.tie_epsilon,
        );
        let growth = GreedyGrowth::new(self.config.remove_probability);

        if !problem.is_coverable() {
            // No complete cover exists; report how far a greedy growth gets.
            let mut partial = problem.empty_family();
            let creation = Creation::for_problem(problem);
            let rating = Rating::Chvatal(ChvatalRating);
            let summary = growth.grow(
                &mut partial,
                None,
                &creation,
                &rating,
                &selection.greedy(),
                rng,
            );
            stats.on_growth(summary.additions, summary.removals);
            stats.set_total_time(start_time.elapsed());
            tracing::debug!(
                uncoverable = problem.uncoverable_count(),
                uncovered = partial.uncovered_count(),
                "problem cannot be covered"
            );
            monitor.on_end(None, &stats);
            return Ok(GreedyOutcome::infeasible(partial, stats));
        }

        let fixed = problem.full_family().necessary_subsets();
        let necessary = Family::from_indices(problem, fixed.iter().copied())?;
        if necessary.is_complete() {
            stats.set_total_time(start_time.elapsed());
            tracing::debug!(subsets = necessary.len(), "necessary subsets form a cover");
            monitor.on_end(Some(&necessary), &stats);
            return Ok(GreedyOutcome::necessary(necessary, stats));
        }

        let shrinking = Shrinking::from_config(&self.config);
        let repair = SequenceOptimization::from_config(&self.config);
        let mut mixing = Mixing::for_problem(&self.config, problem);

        let mut best: Option<Family<'p>> = known.cloned();
        let mut current = match &best {
            Some(known) => shrinking.shrink(known, &fixed, rng),
            None => necessary,
        };

        let termination_reason = loop {
            if let SearchCommand::Terminate(reason) = monitor.search_command(&stats) {
                break GreedyTerminationReason::Aborted(reason);
            }
            if stats.iterations >= self.config.iterations {
                break GreedyTerminationReason::IterationsExhausted;
            }

            let iteration = stats.iterations;
            let rating = mixing.choose_rating(iteration, rng);
            let creation = Creation::for_rating(problem, &rating);
            let selection = if iteration == 0 {
                selection.greedy()
            } else {
                selection
            };

            let summary = growth.grow(
                &mut current,
                best.as_ref(),
                &creation,
                &rating,
                &selection,
                rng,
            );
            stats.on_growth(summary.additions, summary.removals);

            if current.is_complete() {
                let ctx = RepairContext::new(
                    &creation,
                    &rating,
                    &selection,
                    self.config.full_opt_border,
                );
                if let Some(repaired) = repair.optimize(&current, best.as_ref(), &ctx, rng) {
                    current = repaired;
                    stats.on_repair_improvement();
                }
            }

            stats.on_iteration();
            let improved = best.as_ref().is_none_or(|b| current.is_better_than(b));
            mixing.reward(improved);
            tracing::trace!(
                iteration,
                rating = %rating,
                cost = current.cost(),
                uncovered = current.uncovered_count(),
                improved,
                "iteration finished"
            );

            // Equally good covers are accepted too, to move across plateaus.
            let accepted = best.as_ref().is_none_or(|b| !b.is_better_than(&current));
            if accepted {
                best = Some(current.clone());
            }
            if improved && let Some(best) = &best {
                stats.on_improvement();
                tracing::debug!(
                    iteration,
                    cost = best.cost(),
                    subsets = best.len(),
                    "new best cover"
                );
                monitor.on_improvement(best, &stats);
            }
            monitor.on_iteration(&current, &stats);

            if stats.iterations < self.config.iterations {
                let source = best.as_ref().unwrap_or(&current);
                current = shrinking.shrink(source, &fixed, rng);
            }
        };

        stats.set_total_time(start_time.elapsed());
        monitor.on_end(best.as_ref(), &stats);

        match termination_reason {
            GreedyTerminationReason::Aborted(msg) => {
                Ok(GreedyOutcome::aborted(best, msg, stats))
            }
            _ => Ok(GreedyOutcome::exhausted(best, stats)),
        }
    }
}
