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

//! Covers with a bounded number of subsets.
//!
//! The problem is re-costed with a family-size cap whose surcharge is the
//! largest marginal cost of a single subset, so exceeding the cap never pays
//! off against choosing a larger subset. Uniform problems are handed to the
//! inner optimizer unchanged, since their cheapest cover is already a
//! smallest one.

use crate::{
    error::SolveError,
    optimizer::{CoverOptimizer, processed_report},
};
use mantle_core::num::saturating::SaturatingAddVal;
use mantle_model::{error::ModelError, family::Family, problem::Problem};

#[derive(Debug, Clone)]
pub struct BoundedCover<O> {
    inner: O,
    max_subsets: usize,
    processed: u64,
}

impl<O> BoundedCover<O>
where
    O: CoverOptimizer,
{
    /// Creates the adapter.
    ///
    /// # Panics
    ///
    /// Panics if `max_subsets` is zero.
    pub fn new(inner: O, max_subsets: usize) -> Self {
        assert!(
            max_subsets > 0,
            "called `BoundedCover::new()` with a zero family size bound"
        );
        Self {
            inner,
            max_subsets,
            processed: 0,
        }
    }

    #[inline]
    pub fn max_subsets(&self) -> usize {
        self.max_subsets
    }

    #[inline]
    pub fn inner(&self) -> &O {
        &self.inner
    }

    /// Solves `problem` recapped with `surcharge` and maps the result back.
    fn solve_capped<'p>(
        &mut self,
        problem: &'p Problem,
        surcharge: f64,
        known: Option<&Family<'p>>,
    ) -> Result<Option<Family<'p>>, SolveError> {
        let capped = problem.recapped(self.max_subsets, surcharge)?;
        tracing::debug!(
            max_subsets = self.max_subsets,
            surcharge,
            "recapped problem"
        );

        let capped_known = known
            .map(|k| Family::from_indices(&capped, k.members()))
            .transpose()?;
        match self.inner.optimize(&capped, capped_known.as_ref())? {
            Some(found) => Ok(Some(Family::from_indices(problem, found.members())?)),
            None => Ok(None),
        }
    }
}

/// Returns the largest cost change a single insertion or removal causes.
fn largest_marginal_cost(family: &Family<'_>) -> f64 {
    family
        .problem()
        .indices()
        .map(|s| {
            if family.contains(s) {
                family.remove_cost(s)
            } else {
                family.add_cost(s)
            }
        })
        .fold(0.0, f64::max)
}

/// Orders results by size first, cost second.
fn is_smaller(a: &Family<'_>, b: &Family<'_>) -> bool {
    match a.len().cmp(&b.len()) {
        std::cmp::Ordering::Less => true,
        std::cmp::Ordering::Greater => false,
        std::cmp::Ordering::Equal => a.cost() < b.cost(),
    }
}

impl<O> CoverOptimizer for BoundedCover<O>
where
    O: CoverOptimizer,
{
    fn name(&self) -> &str {
        "BoundedCover"
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

        let class = problem.cost_class();
        if class.is_uniform() {
            return self.inner.optimize(problem, known);
        }

        if class.is_linear() {
            let surcharge = largest_marginal_cost(&problem.empty_family());
            return self.solve_capped(problem, surcharge, known);
        }

        let surcharge = match known {
            Some(known) => largest_marginal_cost(known),
            None => largest_marginal_cost(&problem.empty_family()),
        };
        let Some(first) = self.solve_capped(problem, surcharge, known)? else {
            return Ok(None);
        };
        if first.len() <= self.max_subsets {
            return Ok(Some(first));
        }

        let surcharge = largest_marginal_cost(&first);
        let second =
            self.solve_capped(problem, surcharge, Some(&first).filter(|f| f.is_complete()))?;
        Ok(match second {
            Some(second) if is_smaller(&second, &first) => Some(second),
            _ => Some(first),
        })
    }

    fn statistics(&self) -> String {
        format!(
            "{}\n{}",
            processed_report(self.name(), self.processed),
            self.inner.statistics()
        )
    }
}
