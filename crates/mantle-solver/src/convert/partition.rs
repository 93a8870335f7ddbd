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

//! Set partitioning through set covering.
//!
//! Every subset `s` is re-costed to `cost(s) + total × inflation × |s|`,
//! where `total` is the summed cost of all subsets. Covering an element
//! twice then costs more than any choice of subsets can save, so a cheapest
//! cover of the re-costed problem is a partitioning whenever one exists.
//! A returned cover that still covers an element twice is rejected.

use crate::{
    error::{ConvertError, SolveError},
    optimizer::{CoverOptimizer, map_to_original, processed_report},
};
use mantle_core::num::saturating::SaturatingAddVal;
use mantle_greedy::config::GreedyConfig;
use mantle_model::{error::ModelError, family::Family, problem::Problem, subset::Subset};

#[derive(Debug, Clone)]
pub struct PartitionCover<O> {
    inner: O,
    inflation: f64,
    processed: u64,
}

impl<O> PartitionCover<O>
where
    O: CoverOptimizer,
{
    pub const DEFAULT_INFLATION: f64 = 1.1;

    #[inline]
    pub fn new(inner: O) -> Self {
        Self::with_inflation(inner, Self::DEFAULT_INFLATION)
    }

    /// Creates the adapter with the inflation factor of `config`.
    #[inline]
    pub fn from_config(inner: O, config: &GreedyConfig) -> Self {
        Self::with_inflation(inner, config.partition_inflation)
    }

    /// Creates the adapter with a custom cost inflation factor.
    ///
    /// # Panics
    ///
    /// Panics if `inflation` is not finite and greater than one.
    pub fn with_inflation(inner: O, inflation: f64) -> Self {
        assert!(
            inflation.is_finite() && inflation > 1.0,
            "called `PartitionCover::with_inflation()` with inflation {} not above one",
            inflation
        );
        Self {
            inner,
            inflation,
            processed: 0,
        }
    }

    #[inline]
    pub fn inflation(&self) -> f64 {
        self.inflation
    }

    #[inline]
    pub fn inner(&self) -> &O {
        &self.inner
    }

    fn inflate(&self, problem: &Problem) -> Result<Problem, ModelError> {
        let surcharge = problem.total_cost() * self.inflation;
        let subsets = problem
            .indices()
            .map(|s| {
                let mut subset = problem.subset(s).clone().with_origin(s);
                subset.set_cost(subset.cost() + surcharge * subset.len() as f64)?;
                Ok(subset)
            })
            .collect::<Result<Vec<Subset>, ModelError>>()?;
        Problem::new(problem.universe(), subsets)
    }
}

impl<O> CoverOptimizer for PartitionCover<O>
where
    O: CoverOptimizer,
{
    fn name(&self) -> &str {
        "PartitionCover"
    }

    /// Returns a partitioning of `problem`, or `None` if none was found.
    ///
    /// # Errors
    ///
    /// Returns `ConvertError::NonLinearCosts` if the problem caps the family
    /// size.
    fn optimize<'p>(
        &mut self,
        problem: &'p Problem,
        known: Option<&Family<'p>>,
    ) -> Result<Option<Family<'p>>, SolveError> {
        let class = problem.cost_class();
        if !class.is_linear() {
            return Err(ConvertError::NonLinearCosts { class }.into());
        }
        if known.is_some_and(|k| !k.belongs_to(problem)) {
            return Err(ModelError::ForeignFamily.into());
        }
        self.processed = self.processed.saturating_add_val(1);

        if !problem.is_coverable() {
            return Ok(None);
        }

        let inflated = self.inflate(problem)?;
        tracing::debug!(
            subsets = inflated.len(),
            total_cost = problem.total_cost(),
            inflation = self.inflation,
            "inflated subset costs for partitioning"
        );

        let inflated_known = known
            .map(|k| Family::from_indices(&inflated, k.members()))
            .transpose()?;
        let Some(found) = self.inner.optimize(&inflated, inflated_known.as_ref())? else {
            return Ok(None);
        };
        if !found.is_complete() || found.multiple_count() > 0 {
            tracing::debug!(
                multiple = found.multiple_count(),
                "cover found is no partitioning"
            );
            return Ok(None);
        }
        Ok(Some(map_to_original(problem, &found)?))
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
    use mantle_model::{index::SubsetIndex, problem::ProblemBuilder};

    fn solver() -> IteratedGreedySolver {
        IteratedGreedySolver::new(GreedyConfig::default().with_iterations(20).with_seed(42))
            .unwrap()
    }

    #[test]
    fn test_prefers_partition_over_cheaper_cover() {
        // {0, 1} is the cheapest cover but overlaps on elements 1 and 2.
        let mut builder = ProblemBuilder::new(4);
        builder.add_subset([0, 1, 2], 1.0).unwrap();
        builder.add_subset([1, 2, 3], 1.0).unwrap();
        builder.add_subset([3], 1.5).unwrap();
        let problem = builder.build().unwrap();

        let mut partition = PartitionCover::from_config(solver(), &GreedyConfig::default());
        assert_eq!(partition.inflation(), 1.1);
        let found = partition.optimize(&problem, None).unwrap().unwrap();
        assert!(found.belongs_to(&problem));
        assert!(found.is_complete());
        assert_eq!(found.multiple_count(), 0);
        assert_eq!(
            found.members().collect::<Vec<_>>(),
            vec![SubsetIndex::new(0), SubsetIndex::new(2)]
        );
        assert_eq!(found.cost(), 2.5);
    }

    #[test]
    fn test_no_partition_exists() {
        let mut builder = ProblemBuilder::new(3);
        builder.add_subset([0, 1], 1.0).unwrap();
        builder.add_subset([1, 2], 1.0).unwrap();
        let problem = builder.build().unwrap();

        let mut partition = PartitionCover::new(solver());
        assert!(partition.optimize(&problem, None).unwrap().is_none());
    }

    #[test]
    fn test_uncoverable_problem_has_no_partition() {
        let mut builder = ProblemBuilder::new(2);
        builder.add_subset([0], 1.0).unwrap();
        let problem = builder.build().unwrap();

        let mut partition = PartitionCover::new(solver());
        assert!(partition.optimize(&problem, None).unwrap().is_none());
    }

    #[test]
    fn test_rejects_non_linear_costs() {
        let mut builder = ProblemBuilder::new(2).max_subsets(1, 1.0);
        builder.add_subset([0], 1.0).unwrap();
        builder.add_subset([1], 1.0).unwrap();
        let problem = builder.build().unwrap();

        let mut partition = PartitionCover::new(solver());
        let err = partition.optimize(&problem, None).unwrap_err();
        assert!(matches!(
            err,
            SolveError::Convert(ConvertError::NonLinearCosts { .. })
        ));
    }

    #[test]
    #[should_panic(expected = "not above one")]
    fn test_rejects_small_inflation() {
        let _ = PartitionCover::with_inflation(solver(), 1.0);
    }
}
