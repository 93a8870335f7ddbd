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

//! Covering problems: a universe, an arena of candidate subsets and a cost model.
//!
//! The `Problem` owns every candidate `Subset` by value. Partial covers
//! (`Family`) borrow the problem and refer to subsets by `SubsetIndex`, so the
//! problem never changes after it has been built.
//!
//! Besides the subsets themselves the problem carries the family cost model.
//! Costs are additive unless a family size cap is configured: with a cap of
//! `max_subsets > 0`, every family larger than the cap is charged
//! `len * excess_cost` on top of the subset costs. The resulting
//! classification into uniform, linear and non-linear cost models steers the
//! choice of strategies in the heuristics.

use crate::{
    error::{validate_cost, ModelError},
    family::Family,
    index::SubsetIndex,
    subset::Subset,
};
use fixedbitset::FixedBitSet;

/// The structure of the family cost function of a problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CostClass {
    /// No size cap and every subset has the same cost.
    Uniform,
    /// No size cap, but costs differ. The family cost is the plain sum.
    Linear,
    /// A size cap makes the family cost depend on the family size.
    NonLinear,
}

impl CostClass {
    /// Returns `true` for uniform costs.
    #[inline]
    pub fn is_uniform(self) -> bool {
        matches!(self, CostClass::Uniform)
    }

    /// Returns `true` if the family cost is the sum of the subset costs.
    /// Uniform problems are linear too.
    #[inline]
    pub fn is_linear(self) -> bool {
        !matches!(self, CostClass::NonLinear)
    }
}

impl std::fmt::Display for CostClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CostClass::Uniform => write!(f, "uniform"),
            CostClass::Linear => write!(f, "linear"),
            CostClass::NonLinear => write!(f, "non-linear"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    universe: usize,
    subsets: Vec<Subset>,
    max_subsets: usize,
    excess_cost: f64,
    coverable: FixedBitSet,
    total_cost: f64,
    cost_class: CostClass,
}

impl Problem {
    /// Creates an uncapped problem from `subsets`.
    ///
    /// # Errors
    ///
    /// Returns an error if a subset was built against a different universe.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use mantle_model::{problem::{Problem, CostClass}, subset::Subset};
    /// let problem = Problem::new(3, vec![
    ///     Subset::from_elements(3, [0, 1], 1.0).unwrap(),
    ///     Subset::from_elements(3, [2], 1.0).unwrap(),
    /// ]).unwrap();
    /// assert_eq!(problem.len(), 2);
    /// assert_eq!(problem.cost_class(), CostClass::Uniform);
    /// assert_eq!(problem.uncoverable_count(), 0);
    /// ```
    #[inline]
    pub fn new(universe: usize, subsets: Vec<Subset>) -> Result<Self, ModelError> {
        Self::with_cap(universe, subsets, 0, 0.0)
    }

    /// Creates a problem whose families should hold at most `max_subsets`
    /// subsets (`0` means unbounded). Every subset of a family exceeding the
    /// cap is charged an extra `excess_cost`.
    ///
    /// # Errors
    ///
    /// Returns an error if a subset was built against a different universe or
    /// `excess_cost` is negative or not finite.
    pub fn with_cap(
        universe: usize,
        subsets: Vec<Subset>,
        max_subsets: usize,
        excess_cost: f64,
    ) -> Result<Self, ModelError> {
        validate_cost(excess_cost)
            .map_err(|_| ModelError::InvalidExcessCost { cost: excess_cost })?;

        let mut coverable = FixedBitSet::with_capacity(universe);
        let mut total_cost = 0.0;
        for subset in &subsets {
            if subset.universe() != universe {
                return Err(ModelError::UniverseMismatch {
                    expected: universe,
                    found: subset.universe(),
                });
            }
            coverable.union_with(subset.bits());
            total_cost += subset.cost();
        }

        let cost_class = if max_subsets > 0 && !subsets.is_empty() {
            CostClass::NonLinear
        } else if subsets.windows(2).all(|w| w[0].cost() == w[1].cost()) {
            CostClass::Uniform
        } else {
            CostClass::Linear
        };

        Ok(Self {
            universe,
            subsets,
            max_subsets,
            excess_cost,
            coverable,
            total_cost,
            cost_class,
        })
    }

    /// Returns the number of elements to cover.
    #[inline]
    pub fn universe(&self) -> usize {
        self.universe
    }

    /// Returns the number of candidate subsets.
    #[inline]
    pub fn len(&self) -> usize {
        self.subsets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.subsets.is_empty()
    }

    /// Returns the subset at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn subset(&self, index: SubsetIndex) -> &Subset {
        debug_assert!(
            index.get() < self.subsets.len(),
            "called `Problem::subset()` with index {} out of bounds for {} subsets",
            index.get(),
            self.subsets.len()
        );
        &self.subsets[index.get()]
    }

    /// Returns the subset at `index`, or `None` if out of bounds.
    #[inline]
    pub fn get(&self, index: SubsetIndex) -> Option<&Subset> {
        self.subsets.get(index.get())
    }

    #[inline]
    pub fn subsets(&self) -> &[Subset] {
        &self.subsets
    }

    /// Iterates over all subset indices in ascending order.
    #[inline]
    pub fn indices(&self) -> impl DoubleEndedIterator<Item = SubsetIndex> + ExactSizeIterator {
        SubsetIndex::range(self.subsets.len())
    }

    /// Returns the family size cap, `0` meaning unbounded.
    #[inline]
    pub fn max_subsets(&self) -> usize {
        self.max_subsets
    }

    /// Returns the per-subset surcharge once the size cap is exceeded.
    #[inline]
    pub fn excess_cost(&self) -> f64 {
        self.excess_cost
    }

    #[inline]
    pub fn is_capped(&self) -> bool {
        self.max_subsets > 0
    }

    #[inline]
    pub fn cost_class(&self) -> CostClass {
        self.cost_class
    }

    /// Returns the sum of all subset costs.
    #[inline]
    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    /// Returns the set of elements covered by at least one subset.
    #[inline]
    pub fn coverable(&self) -> &FixedBitSet {
        &self.coverable
    }

    /// Returns the number of elements no subset covers.
    #[inline]
    pub fn uncoverable_count(&self) -> usize {
        self.universe - self.coverable.count_ones(..)
    }

    /// Returns `true` if the union of all subsets is the whole universe.
    #[inline]
    pub fn is_coverable(&self) -> bool {
        self.uncoverable_count() == 0
    }

    /// Returns an empty partial cover of this problem.
    #[inline]
    pub fn empty_family(&self) -> Family<'_> {
        Family::new(self)
    }

    /// Returns the family containing every subset of the problem.
    pub fn full_family(&self) -> Family<'_> {
        let mut family = Family::new(self);
        for index in self.indices() {
            family.insert(index);
        }
        family
    }

    /// Returns a problem over the same subsets with a different size cap.
    ///
    /// # Errors
    ///
    /// Returns an error if `excess_cost` is negative or not finite.
    pub fn recapped(&self, max_subsets: usize, excess_cost: f64) -> Result<Problem, ModelError> {
        Problem::with_cap(self.universe, self.subsets.clone(), max_subsets, excess_cost)
    }
}

/// Incremental builder for `Problem`.
///
/// # Examples
///
/// ```rust
/// # use mantle_model::problem::ProblemBuilder;
/// let mut builder = ProblemBuilder::new(4);
/// let a = builder.add_subset([0, 1], 1.0).unwrap();
/// let b = builder.add_subset([2, 3], 1.0).unwrap();
/// let problem = builder.build().unwrap();
/// assert_eq!(problem.subset(a).len(), 2);
/// assert!(problem.subset(b).contains(3));
/// ```
#[derive(Debug, Clone)]
pub struct ProblemBuilder {
    universe: usize,
    subsets: Vec<Subset>,
    max_subsets: usize,
    excess_cost: f64,
}

impl ProblemBuilder {
    #[inline]
    pub fn new(universe: usize) -> Self {
        Self {
            universe,
            subsets: Vec::new(),
            max_subsets: 0,
            excess_cost: 0.0,
        }
    }

    /// Adds a subset built from `elements` and returns its index.
    ///
    /// # Errors
    ///
    /// Returns an error if `cost` is invalid or an element is out of range.
    pub fn add_subset<I>(&mut self, elements: I, cost: f64) -> Result<SubsetIndex, ModelError>
    where
        I: IntoIterator<Item = usize>,
    {
        let subset = Subset::from_elements(self.universe, elements, cost)?;
        let index = SubsetIndex::new(self.subsets.len());
        self.subsets.push(subset);
        Ok(index)
    }

    /// Adds an already built subset and returns its index.
    ///
    /// # Errors
    ///
    /// Returns an error if the subset belongs to a different universe.
    pub fn push(&mut self, subset: Subset) -> Result<SubsetIndex, ModelError> {
        if subset.universe() != self.universe {
            return Err(ModelError::UniverseMismatch {
                expected: self.universe,
                found: subset.universe(),
            });
        }
        let index = SubsetIndex::new(self.subsets.len());
        self.subsets.push(subset);
        Ok(index)
    }

    /// Caps the family size, see `Problem::with_cap`.
    #[inline]
    pub fn max_subsets(mut self, max_subsets: usize, excess_cost: f64) -> Self {
        self.max_subsets = max_subsets;
        self.excess_cost = excess_cost;
        self
    }

    /// Builds the problem.
    ///
    /// # Errors
    ///
    /// Returns an error if the size cap surcharge is invalid.
    #[inline]
    pub fn build(self) -> Result<Problem, ModelError> {
        Problem::with_cap(self.universe, self.subsets, self.max_subsets, self.excess_cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subset(universe: usize, elements: &[usize], cost: f64) -> Subset {
        Subset::from_elements(universe, elements.iter().copied(), cost).unwrap()
    }

    #[test]
    fn test_cost_classification() {
        let uniform = Problem::new(2, vec![subset(2, &[0], 2.0), subset(2, &[1], 2.0)]).unwrap();
        assert_eq!(uniform.cost_class(), CostClass::Uniform);

        let linear = Problem::new(2, vec![subset(2, &[0], 1.0), subset(2, &[1], 2.0)]).unwrap();
        assert_eq!(linear.cost_class(), CostClass::Linear);
        assert!(linear.cost_class().is_linear());

        let capped = uniform.recapped(1, 5.0).unwrap();
        assert_eq!(capped.cost_class(), CostClass::NonLinear);
        assert!(!capped.cost_class().is_linear());

        let empty = Problem::with_cap(2, Vec::new(), 3, 1.0).unwrap();
        assert_eq!(empty.cost_class(), CostClass::Uniform);
    }

    #[test]
    fn test_universe_mismatch() {
        let res = Problem::new(3, vec![subset(4, &[0], 1.0)]);
        assert_eq!(
            res,
            Err(ModelError::UniverseMismatch {
                expected: 3,
                found: 4
            })
        );
    }

    #[test]
    fn test_invalid_excess_cost() {
        assert!(matches!(
            Problem::with_cap(2, Vec::new(), 1, -1.0),
            Err(ModelError::InvalidExcessCost { .. })
        ));
    }

    #[test]
    fn test_coverable_and_totals() {
        let p = Problem::new(4, vec![subset(4, &[0, 1], 1.0), subset(4, &[1], 2.5)]).unwrap();
        assert_eq!(p.uncoverable_count(), 2);
        assert!(!p.is_coverable());
        assert_eq!(p.total_cost(), 3.5);
        assert_eq!(p.full_family().len(), 2);
        assert!(p.empty_family().is_empty());
    }

    #[test]
    fn test_builder() {
        let mut b = ProblemBuilder::new(3);
        let i = b.add_subset([0, 2], 1.0).unwrap();
        assert_eq!(i, SubsetIndex::new(0));
        assert!(b.add_subset([3], 1.0).is_err());
        assert!(b.push(subset(5, &[0], 1.0)).is_err());
        let p = b.max_subsets(2, 0.5).build().unwrap();
        assert_eq!(p.len(), 1);
        assert_eq!(p.max_subsets(), 2);
        assert_eq!(p.excess_cost(), 0.5);
    }
}
