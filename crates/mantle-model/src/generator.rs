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

//! Random covering instances.
//!
//! `ProblemGenerator` draws subsets whose density (the fraction of the
//! universe they contain) and cost are uniform within configured intervals.
//! With `ensure_coverable` every element no subset drew is afterwards added
//! to a random subset, so the instance always admits a complete cover.

use crate::{error::ModelError, problem::Problem, subset::Subset};
use rand::Rng;

#[derive(Debug, Clone, PartialEq)]
pub struct ProblemGenerator {
    universe: usize,
    subsets: usize,
    min_density: f64,
    max_density: f64,
    min_cost: f64,
    max_cost: f64,
    integral_costs: bool,
    ensure_coverable: bool,
}

impl ProblemGenerator {
    /// Creates a generator for `subsets` subsets over a universe of `universe`
    /// elements, with densities in `[0.05, 0.2]` and unit costs.
    pub fn new(universe: usize, subsets: usize) -> Self {
        Self {
            universe,
            subsets,
            min_density: 0.05,
            max_density: 0.2,
            min_cost: 1.0,
            max_cost: 1.0,
            integral_costs: false,
            ensure_coverable: true,
        }
    }

    /// Sets the density interval.
    ///
    /// # Panics
    ///
    /// Panics if the interval is empty or leaves `[0, 1]`.
    pub fn density(mut self, min: f64, max: f64) -> Self {
        assert!(
            (0.0..=1.0).contains(&min) && (0.0..=1.0).contains(&max) && min <= max,
            "called `ProblemGenerator::density()` with invalid interval [{}, {}]",
            min,
            max
        );
        self.min_density = min;
        self.max_density = max;
        self
    }

    /// Sets the cost interval.
    ///
    /// # Panics
    ///
    /// Panics if the interval is empty or negative.
    pub fn cost(mut self, min: f64, max: f64) -> Self {
        assert!(
            min >= 0.0 && min <= max,
            "called `ProblemGenerator::cost()` with invalid interval [{}, {}]",
            min,
            max
        );
        self.min_cost = min;
        self.max_cost = max;
        self
    }

    /// Rounds every drawn cost to the nearest integer.
    #[inline]
    pub fn integral_costs(mut self, yes: bool) -> Self {
        self.integral_costs = yes;
        self
    }

    /// Adds every element left uncovered to a random subset.
    #[inline]
    pub fn ensure_coverable(mut self, yes: bool) -> Self {
        self.ensure_coverable = yes;
        self
    }

    /// Draws a problem.
    ///
    /// # Errors
    ///
    /// Only fails if the configured costs are invalid, which the setters rule out.
    pub fn generate<R: Rng>(&self, rng: &mut R) -> Result<Problem, ModelError> {
        let mut subsets = Vec::with_capacity(self.subsets);
        for _ in 0..self.subsets {
            let density = rng.random_range(self.min_density..=self.max_density);
            let mut cost = rng.random_range(self.min_cost..=self.max_cost);
            if self.integral_costs {
                cost = cost.round();
            }
            let mut subset = Subset::new(self.universe, cost)?;
            for e in 0..self.universe {
                if rng.random_bool(density) {
                    subset.insert(e)?;
                }
            }
            subsets.push(subset);
        }

        if self.ensure_coverable && !subsets.is_empty() {
            for e in 0..self.universe {
                if !subsets.iter().any(|s| s.contains(e)) {
                    let s = rng.random_range(0..subsets.len());
                    subsets[s].insert(e)?;
                }
            }
        }

        Problem::new(self.universe, subsets)
    }
}
