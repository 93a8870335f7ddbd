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

use crate::{
    error::SolveError,
    optimizer::{CoverOptimizer, map_to_original, processed_report},
    reduction::{selection::EssentialSelection, utility::ReductionUtility},
};
use mantle_core::num::saturating::SaturatingAddVal;
use mantle_greedy::config::GreedyConfig;
use mantle_model::{
    error::ModelError, family::Family, index::SubsetIndex, problem::Problem, subset::Subset,
};
use rustc_hash::FxHashMap;

/// Uses the reduction alone as a cover heuristic.
///
/// Every subset is offered to a selection whose minimum size is the number
/// of subsets, which is then lowered step by step down to one. What remains
/// covers everything coverable and holds no removable member with a
/// positive cost. A known family is returned instead if it is better.
#[derive(Debug, Clone)]
pub struct ReductionCover<U> {
    utility: U,
    min_frequency: u32,
    processed: u64,
}

impl<U> ReductionCover<U>
where
    U: ReductionUtility + Clone,
{
    #[inline]
    pub fn new(utility: U, min_frequency: u32) -> Self {
        Self {
            utility,
            min_frequency,
            processed: 0,
        }
    }

    #[inline]
    pub fn from_config(utility: U, config: &GreedyConfig) -> Self {
        Self::new(utility, config.reduction_min_frequency)
    }
}

impl<U> CoverOptimizer for ReductionCover<U>
where
    U: ReductionUtility + Clone,
{
    fn name(&self) -> &str {
        "ReductionCover"
    }

    fn optimize<'p>(
        &mut self,
        problem: &'p Problem,
        known: Option<&Family<'p>>,
    ) -> Result<Option<Family<'p>>, SolveError> {
        if known.is_some_and(|k| !k.belongs_to(problem)) {
            return Err(ModelError::ForeignFamily.into());
        }
        self.processed = self.processed.saturating_add_val(1);

        let len = problem.len();
        let mut selection =
            EssentialSelection::new(problem, self.utility.clone(), len, 0.0, self.min_frequency);
        selection.offer_all(problem.indices());
        for min_size in (1..len).rev() {
            selection.set_min_size(min_size);
        }
        let found = selection.into_family();
        tracing::debug!(
            subsets = found.len(),
            cost = found.cost(),
            uncovered = found.uncovered_count(),
            "reduced problem to a cover"
        );

        Ok(Some(match known {
            Some(known) if known.is_better_than(&found) => known.clone(),
            _ => found,
        }))
    }

    fn statistics(&self) -> String {
        processed_report(self.name(), self.processed)
    }
}

/// Reduces a problem to a bounded selection of subsets and solves the
/// reduced problem with another optimizer.
///
/// Problems with at most `capacity` subsets are handed over unchanged.
#[derive(Debug, Clone)]
pub struct ReducedCover<O, U> {
    inner: O,
    utility: U,
    capacity: usize,
    margin: f64,
    min_frequency: u32,
    processed: u64,
}

impl<O, U> ReducedCover<O, U>
where
    O: CoverOptimizer,
    U: ReductionUtility + Clone,
{
    /// Creates the adapter.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or `margin` is negative or not finite.
    pub fn new(inner: O, utility: U, capacity: usize, margin: f64, min_frequency: u32) -> Self {
        assert!(
            capacity > 0,
            "called `ReducedCover::new()` with zero capacity"
        );
        assert!(
            margin.is_finite() && margin >= 0.0,
            "called `ReducedCover::new()` with invalid margin {}",
            margin
        );
        Self {
            inner,
            utility,
            capacity,
            margin,
            min_frequency,
            processed: 0,
        }
    }

    /// Creates the adapter with the margin and frequency floor of `config`.
    pub fn from_config(inner: O, utility: U, capacity: usize, config: &GreedyConfig) -> Self {
        Self::new(
            inner,
            utility,
            capacity,
            config.reduction_margin,
            config.reduction_min_frequency,
        )
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn inner(&self) -> &O {
        &self.inner
    }

    /// Returns the selected subsets of `problem`.
    fn select(&self, problem: &Problem, known: Option<&Family<'_>>) -> Vec<SubsetIndex> {
        let mut selection = EssentialSelection::new(
            problem,
            self.utility.clone(),
            self.capacity,
            self.margin,
            self.min_frequency,
        );
        if let Some(known) = known {
            selection.offer_all(known.members());
        }
        selection.offer_all(problem.indices());
        selection.reduce();
        selection.selection().members().collect()
    }
}

impl<O, U> CoverOptimizer for ReducedCover<O, U>
where
    O: CoverOptimizer,
    U: ReductionUtility + Clone,
{
    fn name(&self) -> &str {
        "ReducedCover"
    }

    fn optimize<'p>(
        &mut self,
        problem: &'p Problem,
        known: Option<&Family<'p>>,
    ) -> Result<Option<Family<'p>>, SolveError> {
        if known.is_some_and(|k| !k.belongs_to(problem)) {
            return Err(ModelError::ForeignFamily.into());
        }
        self.processed = self.processed.saturating_add_val(1);

        if problem.len() <= self.capacity {
            return self.inner.optimize(problem, known);
        }

        let selected = self.select(problem, known);
        let positions: FxHashMap<SubsetIndex, SubsetIndex> = selected
            .iter()
            .enumerate()
            .map(|(i, &s)| (s, SubsetIndex::new(i)))
            .collect();
        let subsets: Vec<Subset> = selected
            .iter()
            .map(|&s| problem.subset(s).clone().with_origin(s))
            .collect();
        let reduced = Problem::with_cap(
            problem.universe(),
            subsets,
            problem.max_subsets(),
            problem.excess_cost(),
        )?;
        tracing::debug!(
            from = problem.len(),
            to = reduced.len(),
            "reduced candidate subsets"
        );

        // The known family carries over only if all of its members survived.
        let reduced_known = match known {
            Some(known) => known
                .members()
                .map(|s| positions.get(&s).copied())
                .collect::<Option<Vec<_>>>()
                .map(|members| Family::from_indices(&reduced, members))
                .transpose()?,
            None => None,
        };

        let found = match self.inner.optimize(&reduced, reduced_known.as_ref())? {
            Some(found) => map_to_original(problem, &found)?,
            None => return Ok(known.cloned()),
        };
        Ok(Some(match known {
            Some(known) if known.is_better_than(&found) => known.clone(),
            _ => found,
        }))
    }

    fn statistics(&self) -> String {
        format!(
            "{}\n{}",
            processed_report(self.name(), self.processed),
            self.inner.statistics()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{greedy::IteratedGreedySolver, reduction::utility::FrequencyUtility};
    use mantle_model::problem::ProblemBuilder;

    fn idx(i: usize) -> SubsetIndex {
        SubsetIndex::new(i)
    }

    fn problem() -> Problem {
        let mut builder = ProblemBuilder::new(4);
        builder.add_subset([0, 1], 1.0).unwrap();
        builder.add_subset([2, 3], 1.0).unwrap();
        builder.add_subset([0, 1, 2, 3], 3.0).unwrap();
        builder.add_subset([1, 2], 1.0).unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn test_reduction_cover() {
        let problem = problem();
        let mut reduction = ReductionCover::new(FrequencyUtility::default(), 0);
        let found = reduction.optimize(&problem, None).unwrap().unwrap();
        assert!(found.is_complete());
        assert_eq!(found.unnecessary_count(), 0);
        assert_eq!(found.cost(), 2.0);
        assert_eq!(reduction.statistics(), "ReductionCover: 1 problems processed");
    }

    #[test]
    fn test_reduction_cover_prefers_better_known() {
        let mut builder = ProblemBuilder::new(3);
        builder.add_subset([0, 1], 1.0).unwrap();
        builder.add_subset([1, 2], 1.0).unwrap();
        builder.add_subset([0], 0.6).unwrap();
        builder.add_subset([2], 0.6).unwrap();
        let problem = builder.build().unwrap();

        // The cheap singletons go first, leaving the two pairs.
        let mut reduction = ReductionCover::new(FrequencyUtility::default(), 0);
        let found = reduction.optimize(&problem, None).unwrap().unwrap();
        assert_eq!(found.members().collect::<Vec<_>>(), vec![idx(0), idx(1)]);

        let known = Family::from_indices(&problem, [idx(0), idx(3)]).unwrap();
        let found = reduction.optimize(&problem, Some(&known)).unwrap().unwrap();
        assert_eq!(found, known);
    }

    #[test]
    fn test_reduction_cover_of_uncoverable_problem() {
        let mut builder = ProblemBuilder::new(3);
        builder.add_subset([0], 1.0).unwrap();
        let problem = builder.build().unwrap();

        let mut reduction = ReductionCover::new(FrequencyUtility::default(), 0);
        let found = reduction.optimize(&problem, None).unwrap().unwrap();
        assert_eq!(found.uncovered_count(), 2);
    }

    #[test]
    fn test_reduced_cover_maps_back() {
        let problem = problem();
        let config = GreedyConfig::default().with_iterations(10).with_seed(42);
        let solver = IteratedGreedySolver::new(config.clone()).unwrap();
        let mut reduced = ReducedCover::new(solver, FrequencyUtility::default(), 2, 0.0, 0);

        let found = reduced.optimize(&problem, None).unwrap().unwrap();
        assert!(found.belongs_to(&problem));
        assert!(found.is_complete());
        assert_eq!(found.cost(), 2.0);
        assert_eq!(reduced.inner().processed(), 1);
    }

    #[test]
    fn test_reduced_cover_keeps_known_members() {
        let problem = problem();
        let config = GreedyConfig::default().with_iterations(10).with_seed(42);
        let solver = IteratedGreedySolver::new(config.clone()).unwrap();
        let mut reduced =
            ReducedCover::from_config(solver, FrequencyUtility::default(), 2, &config);

        let known = Family::from_indices(&problem, [idx(2)]).unwrap();
        let found = reduced.optimize(&problem, Some(&known)).unwrap().unwrap();
        assert!(found.is_complete());
        assert!(found.cost() <= known.cost());
    }

    #[test]
    fn test_small_problem_is_delegated() {
        let problem = problem();
        let config = GreedyConfig::default().with_iterations(10).with_seed(42);
        let solver = IteratedGreedySolver::new(config).unwrap();
        let mut reduced = ReducedCover::new(solver, FrequencyUtility::default(), 10, 1.0, 0);
        let found = reduced.optimize(&problem, None).unwrap().unwrap();
        assert_eq!(found.cost(), 2.0);
        assert!(reduced.statistics().starts_with("ReducedCover: 1 problems processed"));
    }
}
