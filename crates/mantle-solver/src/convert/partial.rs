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
};
use fixedbitset::FixedBitSet;
use mantle_core::num::saturating::SaturatingAddVal;
use mantle_model::{
    error::ModelError, family::Family, problem::Problem, subset::Subset,
};

/// Covers every coverable element of a problem that cannot be covered
/// completely.
///
/// Every subset is extended by the uncoverable elements, the extended problem
/// is solved by the inner optimizer and the result is mapped back to the
/// original subsets. Problems without uncoverable elements are passed to the
/// inner optimizer unchanged.
#[derive(Debug, Clone)]
pub struct PartialCover<O> {
    inner: O,
    processed: u64,
}

impl<O> PartialCover<O>
where
    O: CoverOptimizer,
{
    #[inline]
    pub fn new(inner: O) -> Self {
        Self {
            inner,
            processed: 0,
        }
    }

    #[inline]
    pub fn inner(&self) -> &O {
        &self.inner
    }

    #[inline]
    pub fn into_inner(self) -> O {
        self.inner
    }

    /// Builds the problem whose subsets also hold every uncoverable element.
    fn extend(problem: &Problem) -> Result<Problem, ModelError> {
        let mut missing = FixedBitSet::with_capacity(problem.universe());
        missing.insert_range(..);
        missing.difference_with(problem.coverable());

        let subsets = problem
            .indices()
            .map(|s| {
                let mut subset = problem.subset(s).clone().with_origin(s);
                subset.union_with(&missing)?;
                Ok(subset)
            })
            .collect::<Result<Vec<Subset>, ModelError>>()?;
        Problem::with_cap(
            problem.universe(),
            subsets,
            problem.max_subsets(),
            problem.excess_cost(),
        )
    }
}

impl<O> CoverOptimizer for PartialCover<O>
where
    O: CoverOptimizer,
{
    fn name(&self) -> &str {
        "PartialCover"
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

        if problem.coverable().is_clear() {
            return Ok(Some(problem.empty_family()));
        }
        if problem.is_coverable() {
            return self.inner.optimize(problem, known);
        }

        let extended = Self::extend(problem)?;
        tracing::debug!(
            uncoverable = problem.uncoverable_count(),
            subsets = extended.len(),
            "extended subsets by uncoverable elements"
        );

        // Only a family covering everything coverable is a cover of the
        // extended problem.
        let extended_known = known
            .filter(|k| !k.is_empty() && k.uncovered_count() == problem.uncoverable_count())
            .map(|k| Family::from_indices(&extended, k.members()))
            .transpose()?;

        match self.inner.optimize(&extended, extended_known.as_ref())? {
            Some(found) => Ok(Some(map_to_original(problem, &found)?)),
            None => Ok(None),
        }
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
    use crate::greedy::IteratedGreedySolver;
    use mantle_greedy::config::GreedyConfig;
    use mantle_model::{index::SubsetIndex, problem::ProblemBuilder};

    fn solver(seed: u64) -> IteratedGreedySolver {
        IteratedGreedySolver::new(GreedyConfig::default().with_iterations(20).with_seed(seed))
            .unwrap()
    }

    #[test]
    fn test_covers_coverable_elements() {
        // Element 3 is in no subset.
        let mut builder = ProblemBuilder::new(4);
        builder.add_subset([0, 1], 1.0).unwrap();
        builder.add_subset([1, 2], 1.0).unwrap();
        builder.add_subset([2], 1.0).unwrap();
        builder.add_subset([0, 1, 2], 5.0).unwrap();
        let problem = builder.build().unwrap();

        let mut partial = PartialCover::new(solver(42));
        let found = partial.optimize(&problem, None).unwrap().unwrap();
        assert!(found.belongs_to(&problem));
        assert_eq!(found.uncovered_count(), 1);
        assert_eq!(found.frequencies()[3], 0);
        assert_eq!(found.cost(), 2.0);
    }

    #[test]
    fn test_nothing_coverable_gives_empty_family() {
        let mut builder = ProblemBuilder::new(3);
        builder.add_subset(std::iter::empty::<usize>(), 1.0).unwrap();
        let problem = builder.build().unwrap();

        let mut partial = PartialCover::new(solver(42));
        let found = partial.optimize(&problem, None).unwrap().unwrap();
        assert!(found.is_empty());
        assert_eq!(found.uncovered_count(), 3);
        assert_eq!(partial.inner().processed(), 0);
    }

    #[test]
    fn test_coverable_problem_is_delegated() {
        let mut builder = ProblemBuilder::new(4);
        builder.add_subset([0, 1], 1.0).unwrap();
        builder.add_subset([2, 3], 1.0).unwrap();
        builder.add_subset([0, 1, 2, 3], 3.0).unwrap();
        let problem = builder.build().unwrap();

        let direct = solver(5).optimize(&problem, None).unwrap();
        let mut partial = PartialCover::new(solver(5));
        let converted = partial.optimize(&problem, None).unwrap();
        assert_eq!(direct, converted);
        assert!(partial.statistics().starts_with("PartialCover: 1 problems processed"));
    }

    #[test]
    fn test_uses_known_partial_cover() {
        let mut builder = ProblemBuilder::new(3);
        builder.add_subset([0], 1.0).unwrap();
        builder.add_subset([0, 1], 3.0).unwrap();
        let problem = builder.build().unwrap();
        let known = Family::from_indices(&problem, [SubsetIndex::new(1)]).unwrap();

        let mut partial = PartialCover::new(solver(42));
        let found = partial.optimize(&problem, Some(&known)).unwrap().unwrap();
        assert_eq!(found.uncovered_count(), 1);
        assert!(found.contains(SubsetIndex::new(1)));
    }

    #[test]
    fn test_rejects_foreign_known_family() {
        let mut builder = ProblemBuilder::new(1);
        builder.add_subset([0], 1.0).unwrap();
        let problem = builder.build().unwrap();
        let other = problem.clone();
        let known = other.full_family();

        let mut partial = PartialCover::new(solver(42));
        assert_eq!(
            partial.optimize(&problem, Some(&known)).unwrap_err(),
            SolveError::Model(ModelError::ForeignFamily)
        );
    }
}
