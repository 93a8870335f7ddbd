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

//! Bounded accumulation of essential subsets.

use crate::reduction::utility::ReductionUtility;
use mantle_model::{family::Family, index::SubsetIndex, problem::Problem};
use rustc_hash::{FxHashMap, FxHasher};
use smallvec::SmallVec;
use std::hash::{Hash, Hasher};

/// A selection of subsets that keeps the coverage of everything offered to
/// it while staying close to a minimum size.
///
/// Candidates are offered one at a time. Below the minimum size every
/// candidate is admitted. Beyond it a candidate is admitted if it is free,
/// covers an element the selection does not cover yet, or covers an element
/// below the frequency floor. Any other candidate replaces the removable
/// member with the lowest utility per cost if the utility per cost of the
/// whole selection improves. A candidate with the same elements as a member
/// only replaces that member if it is cheaper.
///
/// The minimum size is at least `round(necessary × margin)`, so a
/// supplementary margin of unnecessary members is kept next to the
/// necessary ones.
#[derive(Debug, Clone)]
pub struct EssentialSelection<'p, U> {
    selection: Family<'p>,
    utility: U,
    min_size: usize,
    margin: f64,
    min_frequency: u32,
    by_elements: FxHashMap<u64, SmallVec<[SubsetIndex; 2]>>,
}

impl<'p, U> EssentialSelection<'p, U>
where
    U: ReductionUtility,
{
    /// Creates an empty selection over the subsets of `problem`.
    ///
    /// # Panics
    ///
    /// Panics if `margin` is negative or not finite.
    pub fn new(
        problem: &'p Problem,
        utility: U,
        min_size: usize,
        margin: f64,
        min_frequency: u32,
    ) -> Self {
        assert!(
            margin.is_finite() && margin >= 0.0,
            "called `EssentialSelection::new()` with invalid margin {}",
            margin
        );
        Self {
            selection: problem.empty_family(),
            utility,
            min_size,
            margin,
            min_frequency,
            by_elements: FxHashMap::default(),
        }
    }

    #[inline]
    pub fn selection(&self) -> &Family<'p> {
        &self.selection
    }

    #[inline]
    pub fn into_family(self) -> Family<'p> {
        self.selection
    }

    #[inline]
    pub fn utility(&self) -> &U {
        &self.utility
    }

    #[inline]
    pub fn min_size(&self) -> usize {
        self.min_size
    }

    /// Returns the size below which no member is dropped.
    #[inline]
    pub fn effective_min_size(&self) -> usize {
        let supplementary =
            (self.selection.necessary_count() as f64 * self.margin).round() as usize;
        self.min_size.max(supplementary)
    }

    /// Offers `subset` to the selection and returns whether it was admitted.
    ///
    /// # Panics
    ///
    /// Panics if `subset` is out of range for the problem.
    pub fn offer(&mut self, subset: SubsetIndex) -> bool {
        let problem = self.selection.problem();
        assert!(
            subset.get() < problem.len(),
            "called `EssentialSelection::offer()` with subset {} out of range for {} subsets",
            subset,
            problem.len()
        );
        if self.selection.contains(subset) {
            return false;
        }

        let candidate = problem.subset(subset);
        let twin = self.by_elements.get(&element_key(problem, subset)).and_then(|twins| {
            twins
                .iter()
                .copied()
                .find(|&t| problem.subset(t).bits() == candidate.bits())
        });
        if let Some(twin) = twin {
            if problem.subset(twin).cost() <= candidate.cost() {
                return false;
            }
            self.remove_member(twin);
            self.insert_member(subset);
            return true;
        }

        if self.selection.len() < self.effective_min_size() || self.is_essential(subset) {
            self.insert_member(subset);
            return true;
        }

        let Some(worst) = self.worst_removable() else {
            return false;
        };
        let utility_before = self.utility.family_utility(&self.selection);
        let cost_before = self.selection.cost();
        self.selection.insert(subset);
        self.selection.remove(worst);
        let utility_after = self.utility.family_utility(&self.selection);
        let cost_after = self.selection.cost();

        if is_better_ratio(utility_after, cost_after, utility_before, cost_before) {
            self.index_removed(worst);
            self.index_inserted(subset);
            true
        } else {
            self.selection.insert(worst);
            self.selection.remove(subset);
            false
        }
    }

    /// Offers every subset of `subsets` and returns how many were admitted.
    pub fn offer_all<I>(&mut self, subsets: I) -> usize
    where
        I: IntoIterator<Item = SubsetIndex>,
    {
        subsets.into_iter().filter(|&s| self.offer(s)).count()
    }

    /// Sets the minimum size and drops members down to it.
    pub fn set_min_size(&mut self, min_size: usize) {
        self.min_size = min_size;
        self.reduce();
    }

    /// Drops removable members, lowest utility per cost first, until the
    /// selection reaches its minimum size or nothing can be dropped.
    pub fn reduce(&mut self) {
        while self.selection.len() > self.effective_min_size() && self.selection.cost() > 0.0 {
            let Some(worst) = self.worst_removable() else {
                break;
            };
            self.remove_member(worst);
        }
    }

    /// Returns `true` if `member` can be dropped without uncovering an
    /// element or pushing one below the frequency floor.
    pub fn is_removable(&self, member: SubsetIndex) -> bool {
        if !self.selection.contains(member) {
            return false;
        }
        let floor = self.min_frequency.max(1);
        let frequencies = self.selection.frequencies();
        self.selection
            .problem()
            .subset(member)
            .elements()
            .all(|e| frequencies[e] > floor)
    }

    fn is_essential(&self, candidate: SubsetIndex) -> bool {
        if self.selection.add_cost(candidate) == 0.0
            || self.selection.alone_covered(candidate) > 0
        {
            return true;
        }
        let frequencies = self.selection.frequencies();
        self.selection
            .problem()
            .subset(candidate)
            .elements()
            .any(|e| frequencies[e] < self.min_frequency)
    }

    /// Returns the removable member with the smallest utility loss per saved
    /// cost. Members whose removal saves nothing are never chosen.
    fn worst_removable(&self) -> Option<SubsetIndex> {
        self.selection
            .members()
            .filter(|&m| self.is_removable(m))
            .filter_map(|m| {
                let saved = self.selection.remove_cost(m);
                (saved > 0.0).then(|| (m, -self.utility.remove_utility(&self.selection, m) / saved))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(m, _)| m)
    }

    fn insert_member(&mut self, subset: SubsetIndex) {
        self.selection.insert(subset);
        self.index_inserted(subset);
    }

    fn remove_member(&mut self, subset: SubsetIndex) {
        self.selection.remove(subset);
        self.index_removed(subset);
    }

    fn index_inserted(&mut self, subset: SubsetIndex) {
        let key = element_key(self.selection.problem(), subset);
        self.by_elements.entry(key).or_default().push(subset);
    }

    fn index_removed(&mut self, subset: SubsetIndex) {
        let key = element_key(self.selection.problem(), subset);
        if let Some(twins) = self.by_elements.get_mut(&key) {
            twins.retain(|t| *t != subset);
            if twins.is_empty() {
                self.by_elements.remove(&key);
            }
        }
    }
}

#[inline]
fn element_key(problem: &Problem, subset: SubsetIndex) -> u64 {
    let mut hasher = FxHasher::default();
    problem.subset(subset).bits().hash(&mut hasher);
    hasher.finish()
}

/// Compares `u1 / c1 > u0 / c0` for non-negative costs, treating a zero
/// cost as an infinite ratio.
#[inline]
fn is_better_ratio(u1: f64, c1: f64, u0: f64, c0: f64) -> bool {
    u1 * c0 > u0 * c1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reduction::utility::FrequencyUtility;
    use mantle_model::problem::ProblemBuilder;

    fn idx(i: usize) -> SubsetIndex {
        SubsetIndex::new(i)
    }

    fn selection(problem: &Problem, min_size: usize) -> EssentialSelection<'_, FrequencyUtility> {
        EssentialSelection::new(problem, FrequencyUtility::default(), min_size, 0.0, 0)
    }

    #[test]
    fn test_admits_below_min_size() {
        let mut builder = ProblemBuilder::new(2);
        builder.add_subset([0], 1.0).unwrap();
        builder.add_subset([0], 2.0).unwrap();
        builder.add_subset([0, 1], 3.0).unwrap();
        let problem = builder.build().unwrap();

        let mut selection = selection(&problem, 3);
        assert!(selection.offer(idx(0)));
        assert!(!selection.offer(idx(0)));
        // Same elements as a cheaper member.
        assert!(!selection.offer(idx(1)));
        assert!(selection.offer(idx(2)));
        assert_eq!(selection.selection().len(), 2);
    }

    #[test]
    fn test_cheaper_twin_replaces_member() {
        let mut builder = ProblemBuilder::new(2);
        builder.add_subset([0, 1], 2.0).unwrap();
        builder.add_subset([0, 1], 1.0).unwrap();
        let problem = builder.build().unwrap();

        let mut selection = selection(&problem, 5);
        selection.offer(idx(0));
        assert!(selection.offer(idx(1)));
        assert_eq!(selection.selection().members().collect::<Vec<_>>(), vec![idx(1)]);
    }

    #[test]
    fn test_admits_subsets_covering_new_elements() {
        let mut builder = ProblemBuilder::new(3);
        builder.add_subset([0, 1], 1.0).unwrap();
        builder.add_subset([0], 1.0).unwrap();
        builder.add_subset([2], 1.0).unwrap();
        builder.add_subset([1], 0.0).unwrap();
        let problem = builder.build().unwrap();

        let mut selection = selection(&problem, 0);
        assert!(selection.offer(idx(0)));
        // Covers nothing new and lowers the utility per cost.
        assert!(!selection.offer(idx(1)));
        assert!(selection.offer(idx(2)));
        // Free.
        assert!(selection.offer(idx(3)));
        assert!(selection.selection().is_complete());
    }

    #[test]
    fn test_swaps_for_better_ratio() {
        let mut builder = ProblemBuilder::new(3);
        builder.add_subset([0, 1], 1.0).unwrap();
        builder.add_subset([1, 2], 5.0).unwrap();
        builder.add_subset([2], 1.0).unwrap();
        builder.add_subset([0, 1, 2], 1.0).unwrap();
        let problem = builder.build().unwrap();

        let mut selection = selection(&problem, 3);
        assert_eq!(selection.offer_all([idx(0), idx(1), idx(2)]), 3);
        // Takes the place of the expensive member.
        assert!(selection.offer(idx(3)));
        assert!(!selection.selection().contains(idx(1)));
        assert!(selection.selection().contains(idx(3)));
        assert_eq!(selection.selection().len(), 3);
        assert!(selection.selection().is_complete());
    }

    #[test]
    fn test_reduction_keeps_coverage() {
        let mut builder = ProblemBuilder::new(4);
        builder.add_subset([0, 1], 1.0).unwrap();
        builder.add_subset([2, 3], 1.0).unwrap();
        builder.add_subset([0, 1, 2, 3], 3.0).unwrap();
        builder.add_subset([1, 2], 1.0).unwrap();
        let problem = builder.build().unwrap();

        let mut selection = selection(&problem, problem.len());
        assert_eq!(selection.offer_all(problem.indices()), 4);
        for min_size in (1..problem.len()).rev() {
            selection.set_min_size(min_size);
            assert!(selection.selection().is_complete());
        }
        let family = selection.into_family();
        assert_eq!(family.unnecessary_count(), 0);
        assert_eq!(family.cost(), 2.0);
    }

    #[test]
    fn test_margin_keeps_unnecessary_members() {
        let mut builder = ProblemBuilder::new(2);
        builder.add_subset([0], 1.0).unwrap();
        builder.add_subset([1], 1.0).unwrap();
        builder.add_subset([0, 1], 1.0).unwrap();
        builder.add_subset([0, 1], 2.0).unwrap();
        builder.add_subset([1], 3.0).unwrap();
        let problem = builder.build().unwrap();

        let mut selection =
            EssentialSelection::new(&problem, FrequencyUtility::default(), problem.len(), 2.0, 0);
        assert_eq!(selection.offer_all(problem.indices()), 3);
        selection.set_min_size(1);

        let family = selection.selection();
        assert!(family.is_complete());
        assert_eq!(family.necessary_count(), 1);
        assert_eq!(family.unnecessary_count(), 1);
        assert_eq!(selection.effective_min_size(), 2);
    }

    #[test]
    fn test_identical_subsets_are_admitted_once() {
        let mut builder = ProblemBuilder::new(1);
        builder.add_subset([0], 1.0).unwrap();
        builder.add_subset([0], 2.0).unwrap();
        builder.add_subset([0], 3.0).unwrap();
        let problem = builder.build().unwrap();

        let mut selection =
            EssentialSelection::new(&problem, FrequencyUtility::default(), 0, 0.0, 2);
        assert_eq!(selection.offer_all(problem.indices()), 1);
    }

    #[test]
    fn test_frequency_floor() {
        let mut builder = ProblemBuilder::new(2);
        builder.add_subset([0], 1.0).unwrap();
        builder.add_subset([0, 1], 2.0).unwrap();
        builder.add_subset([1], 1.0).unwrap();
        let problem = builder.build().unwrap();

        let mut selection =
            EssentialSelection::new(&problem, FrequencyUtility::default(), 0, 0.0, 2);
        assert_eq!(selection.offer_all(problem.indices()), 3);
        selection.set_min_size(0);
        assert_eq!(selection.selection().len(), 3);
        assert!(!selection.is_removable(idx(0)));
    }

    #[test]
    fn test_better_ratio() {
        assert!(is_better_ratio(2.0, 1.0, 1.0, 1.0));
        assert!(!is_better_ratio(1.0, 1.0, 1.0, 1.0));
        assert!(is_better_ratio(1.0, 0.0, 1.0, 1.0));
        assert!(!is_better_ratio(0.0, 0.0, 1.0, 1.0));
    }
}
