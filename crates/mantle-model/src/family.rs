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

//! Partial covers with incrementally maintained coverage bookkeeping.
//!
//! A `Family` is a set of member subsets of one `Problem`. Heuristics add
//! and remove members millions of times per run, so every query they rely on
//! is answered from counters that `insert` and `remove` update in
//! `O(|subset|)`:
//!
//! - the coverage frequency of every element,
//! - the number of uncovered, singly covered and multiply covered elements,
//! - for every member, the number of elements it covers alone,
//! - the number of necessary members (those covering at least one element alone),
//! - the sum of the member costs.
//!
//! To find the single owner of an element whose frequency drops to one, the
//! family also keeps the sum of the indices of all members covering each
//! element. When exactly one member is left, that sum is its index.
//!
//! The family cost follows the cost model of the problem: with a size cap,
//! a family larger than the cap pays `len * excess_cost` on top of its
//! subset costs, and the marginal costs reported by `add_cost` and
//! `remove_cost` include the jump when the cap is crossed.

use crate::{
    error::ModelError,
    index::{ElementIndex, SubsetIndex},
    problem::Problem,
};
use fixedbitset::FixedBitSet;
use std::fmt::Write;

#[derive(Debug, Clone)]
pub struct Family<'p> {
    problem: &'p Problem,
    members: FixedBitSet,
    len: usize,
    frequency: Vec<u32>,
    owner_sum: Vec<usize>,
    alone: Vec<u32>,
    uncovered: usize,
    single: usize,
    multiple: usize,
    necessary: usize,
    frequency_sum: usize,
    subset_cost: f64,
}

impl<'p> Family<'p> {
    /// Creates an empty family over `problem`.
    pub fn new(problem: &'p Problem) -> Self {
        Self {
            problem,
            members: FixedBitSet::with_capacity(problem.len()),
            len: 0,
            frequency: vec![0; problem.universe()],
            owner_sum: vec![0; problem.universe()],
            alone: vec![0; problem.len()],
            uncovered: problem.universe(),
            single: 0,
            multiple: 0,
            necessary: 0,
            frequency_sum: 0,
            subset_cost: 0.0,
        }
    }

    /// Creates a family holding the given subsets.
    ///
    /// # Errors
    ///
    /// Returns an error if an index is outside the problem.
    pub fn from_indices<I>(problem: &'p Problem, indices: I) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = SubsetIndex>,
    {
        let mut family = Self::new(problem);
        for index in indices {
            if index.get() >= problem.len() {
                return Err(ModelError::SubsetOutOfRange {
                    index: index.get(),
                    len: problem.len(),
                });
            }
            family.insert(index);
        }
        Ok(family)
    }

    /// Returns an empty family over the same problem.
    #[inline]
    pub fn empty_like(&self) -> Self {
        Self::new(self.problem)
    }

    /// Returns the problem the family draws its subsets from.
    #[inline]
    pub fn problem(&self) -> &'p Problem {
        self.problem
    }

    /// Returns `true` if the family belongs to exactly this problem instance.
    #[inline]
    pub fn belongs_to(&self, problem: &Problem) -> bool {
        std::ptr::eq(self.problem, problem)
    }

    /// Returns the number of elements of the universe.
    #[inline]
    pub fn universe(&self) -> usize {
        self.frequency.len()
    }

    /// Returns the number of members.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn contains(&self, subset: SubsetIndex) -> bool {
        self.members.contains(subset.get())
    }

    /// Iterates over the members in ascending index order.
    #[inline]
    pub fn members(&self) -> impl Iterator<Item = SubsetIndex> + '_ {
        self.members.ones().map(SubsetIndex::new)
    }

    /// Iterates over the subsets of the problem that are not members.
    #[inline]
    pub fn non_members(&self) -> impl Iterator<Item = SubsetIndex> + '_ {
        self.members.zeroes().map(SubsetIndex::new)
    }

    /// Returns the number of members covering `element`.
    #[inline]
    pub fn frequency(&self, element: ElementIndex) -> u32 {
        self.frequency[element.get()]
    }

    /// Returns the coverage frequency of every element.
    #[inline]
    pub fn frequencies(&self) -> &[u32] {
        &self.frequency
    }

    #[inline]
    pub fn uncovered_count(&self) -> usize {
        self.uncovered
    }

    /// Returns the number of elements covered by exactly one member.
    #[inline]
    pub fn single_count(&self) -> usize {
        self.single
    }

    /// Returns the number of elements covered by more than one member.
    #[inline]
    pub fn multiple_count(&self) -> usize {
        self.multiple
    }

    /// Returns `true` if every element is covered.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.uncovered == 0
    }

    /// Iterates over the uncovered elements in ascending order.
    #[inline]
    pub fn uncovered_elements(&self) -> impl Iterator<Item = ElementIndex> + '_ {
        self.frequency
            .iter()
            .enumerate()
            .filter(|&(_, &f)| f == 0)
            .map(|(e, _)| ElementIndex::new(e))
    }

    /// Returns the sum of the member costs without any size surcharge.
    #[inline]
    pub fn subset_cost(&self) -> f64 {
        self.subset_cost
    }

    /// Returns the family cost under the cost model of the problem.
    #[inline]
    pub fn cost(&self) -> f64 {
        let cap = self.problem.max_subsets();
        if cap > 0 && self.len > cap {
            self.subset_cost + self.len as f64 * self.problem.excess_cost()
        } else {
            self.subset_cost
        }
    }

    /// Returns by how much `cost()` would grow if `subset` were inserted, or
    /// `0.0` if it is already a member.
    pub fn add_cost(&self, subset: SubsetIndex) -> f64 {
        if self.contains(subset) {
            return 0.0;
        }
        let cost = self.problem.subset(subset).cost();
        let cap = self.problem.max_subsets();
        let excess = self.problem.excess_cost();
        if cap == 0 || self.len < cap {
            cost
        } else if self.len == cap {
            cost + (self.len + 1) as f64 * excess
        } else {
            cost + excess
        }
    }

    /// Returns by how much `cost()` would shrink if `subset` were removed, or
    /// `0.0` if it is not a member.
    pub fn remove_cost(&self, subset: SubsetIndex) -> f64 {
        if !self.contains(subset) {
            return 0.0;
        }
        let cost = self.problem.subset(subset).cost();
        let cap = self.problem.max_subsets();
        let excess = self.problem.excess_cost();
        if cap == 0 || self.len <= cap {
            cost
        } else if self.len - 1 == cap {
            cost + self.len as f64 * excess
        } else {
            cost + excess
        }
    }

    /// Returns the number of elements only `subset` covers.
    ///
    /// For a member these are the elements no other member covers. For a
    /// non-member these are its elements that are currently uncovered, i.e.
    /// the elements it would cover alone once inserted.
    #[inline]
    pub fn alone_covered(&self, subset: SubsetIndex) -> usize {
        if self.contains(subset) {
            self.alone[subset.get()] as usize
        } else {
            self.problem
                .subset(subset)
                .elements()
                .filter(|&e| self.frequency[e] == 0)
                .count()
        }
    }

    /// Returns `true` if `subset` covers at least one element alone.
    #[inline]
    pub fn is_necessary(&self, subset: SubsetIndex) -> bool {
        if self.contains(subset) {
            self.alone[subset.get()] > 0
        } else {
            self.problem
                .subset(subset)
                .elements()
                .any(|e| self.frequency[e] == 0)
        }
    }

    /// Returns the number of necessary members.
    #[inline]
    pub fn necessary_count(&self) -> usize {
        self.necessary
    }

    /// Returns the number of members whose elements are all covered by others.
    #[inline]
    pub fn unnecessary_count(&self) -> usize {
        self.len - self.necessary
    }

    /// Returns the necessary members in ascending index order.
    pub fn necessary_subsets(&self) -> Vec<SubsetIndex> {
        self.members()
            .filter(|s| self.alone[s.get()] > 0)
            .collect()
    }

    /// Returns the unnecessary members in ascending index order.
    pub fn unnecessary_subsets(&self) -> Vec<SubsetIndex> {
        if self.necessary == self.len {
            return Vec::new();
        }
        self.members()
            .filter(|s| self.alone[s.get()] == 0)
            .collect()
    }

    /// Returns the members that are necessary now but would become
    /// unnecessary if `subset` were inserted. Empty if `subset` is a member.
    pub fn newly_unnecessary(&self, subset: SubsetIndex) -> Vec<SubsetIndex> {
        if self.single == 0 || self.contains(subset) {
            return Vec::new();
        }
        let mut owners: Vec<usize> = self
            .problem
            .subset(subset)
            .elements()
            .filter(|&e| self.frequency[e] == 1)
            .map(|e| self.owner_sum[e])
            .collect();
        owners.sort_unstable();

        let mut result = Vec::new();
        let mut i = 0;
        while i < owners.len() {
            let owner = owners[i];
            let mut j = i;
            while j < owners.len() && owners[j] == owner {
                j += 1;
            }
            if (j - i) as u32 == self.alone[owner] {
                result.push(SubsetIndex::new(owner));
            }
            i = j;
        }
        result
    }

    /// Inserts `subset`. Returns `false` if it was already a member.
    pub fn insert(&mut self, subset: SubsetIndex) -> bool {
        let s = subset.get();
        if self.members.put(s) {
            return false;
        }
        let problem = self.problem;
        let elements = problem.subset(subset);
        let mut alone = 0u32;
        for e in elements.elements() {
            match self.frequency[e] {
                0 => {
                    self.uncovered -= 1;
                    self.single += 1;
                    alone += 1;
                }
                1 => {
                    let owner = self.owner_sum[e];
                    self.alone[owner] -= 1;
                    if self.alone[owner] == 0 {
                        self.necessary -= 1;
                    }
                    self.single -= 1;
                    self.multiple += 1;
                }
                _ => {}
            }
            self.frequency[e] += 1;
            self.owner_sum[e] += s;
        }
        self.alone[s] = alone;
        if alone > 0 {
            self.necessary += 1;
        }
        self.len += 1;
        self.frequency_sum += elements.len();
        self.subset_cost += elements.cost();
        true
    }

    /// Removes `subset`. Returns `false` if it was not a member.
    pub fn remove(&mut self, subset: SubsetIndex) -> bool {
        let s = subset.get();
        if !self.members.contains(s) {
            return false;
        }
        self.members.set(s, false);
        if self.alone[s] > 0 {
            self.necessary -= 1;
        }
        let problem = self.problem;
        let elements = problem.subset(subset);
        for e in elements.elements() {
            self.frequency[e] -= 1;
            self.owner_sum[e] -= s;
            match self.frequency[e] {
                0 => {
                    self.uncovered += 1;
                    self.single -= 1;
                }
                1 => {
                    let owner = self.owner_sum[e];
                    if self.alone[owner] == 0 {
                        self.necessary += 1;
                    }
                    self.alone[owner] += 1;
                    self.multiple -= 1;
                    self.single += 1;
                }
                _ => {}
            }
        }
        self.alone[s] = 0;
        self.len -= 1;
        self.frequency_sum -= elements.len();
        self.subset_cost -= elements.cost();
        if self.len == 0 {
            self.subset_cost = 0.0;
        }
        true
    }

    /// Inserts `subset`, evaluates `f` on the enlarged family and removes the
    /// subset again. The family is left exactly as it was, including its cost.
    ///
    /// # Panics
    ///
    /// Panics if `subset` is already a member.
    pub fn with_inserted<R, F>(&mut self, subset: SubsetIndex, f: F) -> R
    where
        F: FnOnce(&Self) -> R,
    {
        let cost = self.subset_cost;
        assert!(
            self.insert(subset),
            "called `Family::with_inserted()` with subset {} that is already a member",
            subset
        );
        let result = f(self);
        self.remove(subset);
        self.subset_cost = cost;
        result
    }

    /// Removes `subset`, evaluates `f` on the reduced family and inserts the
    /// subset again. The family is left exactly as it was, including its cost.
    ///
    /// # Panics
    ///
    /// Panics if `subset` is not a member.
    pub fn with_removed<R, F>(&mut self, subset: SubsetIndex, f: F) -> R
    where
        F: FnOnce(&Self) -> R,
    {
        let cost = self.subset_cost;
        assert!(
            self.remove(subset),
            "called `Family::with_removed()` with subset {} that is not a member",
            subset
        );
        let result = f(self);
        self.insert(subset);
        self.subset_cost = cost;
        result
    }

    /// Removes every member.
    pub fn clear(&mut self) {
        self.members.clear();
        self.len = 0;
        self.frequency.fill(0);
        self.owner_sum.fill(0);
        self.alone.fill(0);
        self.uncovered = self.frequency.len();
        self.single = 0;
        self.multiple = 0;
        self.necessary = 0;
        self.frequency_sum = 0;
        self.subset_cost = 0.0;
    }

    /// Returns `true` if this family is better than `other`: fewer uncovered
    /// elements first, lower cost second.
    #[inline]
    pub fn is_better_than(&self, other: &Family<'_>) -> bool {
        match self.uncovered.cmp(&other.uncovered) {
            std::cmp::Ordering::Less => true,
            std::cmp::Ordering::Greater => false,
            std::cmp::Ordering::Equal => self.cost() < other.cost(),
        }
    }

    /// Returns the mean coverage frequency over the universe.
    #[inline]
    pub fn mean_frequency(&self) -> f64 {
        if self.universe() == 0 {
            0.0
        } else {
            self.frequency_sum as f64 / self.universe() as f64
        }
    }

    /// Returns the mean number of elements per member.
    #[inline]
    pub fn mean_subset_len(&self) -> f64 {
        if self.len == 0 {
            0.0
        } else {
            self.frequency_sum as f64 / self.len as f64
        }
    }

    /// Returns the mean fraction of the universe a member covers.
    #[inline]
    pub fn mean_density(&self) -> f64 {
        if self.universe() == 0 {
            0.0
        } else {
            self.mean_subset_len() / self.universe() as f64
        }
    }

    /// Renders a human readable report, every line indented by `indent` levels.
    pub fn statistics(&self, indent: usize) -> String {
        let pad = " ".repeat(indent * 4);
        let mut out = String::new();
        let cap = self.problem.max_subsets();
        // Writing into a `String` cannot fail.
        let _ = if cap == 0 {
            writeln!(out, "{pad}The family may hold any number of subsets")
        } else {
            writeln!(
                out,
                "{pad}The family should hold at most {} subsets, excess cost {}",
                cap,
                self.problem.excess_cost()
            )
        };
        let _ = writeln!(
            out,
            "{pad}The family holds {} subsets with a total cost of {}",
            self.len,
            self.cost()
        );
        let _ = match self.necessary {
            0 => writeln!(out, "{pad}None of them is necessary."),
            n if n == self.len => writeln!(out, "{pad}All of them are necessary."),
            n => writeln!(
                out,
                "{pad}{} of them are necessary and {} are not.",
                n,
                self.len - n
            ),
        };
        let _ = writeln!(out);
        let _ = writeln!(out, "{pad}Of the {} elements to cover", self.universe());
        let _ = writeln!(out, "{pad}{} are uncovered,", self.uncovered);
        let _ = writeln!(out, "{pad}{} are covered once and", self.single);
        let _ = writeln!(out, "{pad}{} are covered more than once.", self.multiple);
        let _ = writeln!(
            out,
            "{pad}Each element is covered {:.1} times on average.",
            self.mean_frequency()
        );
        let _ = writeln!(
            out,
            "{pad}Each subset holds {:.1} elements on average.",
            self.mean_subset_len()
        );
        let _ = writeln!(
            out,
            "{pad}The mean density is {:.2} percent.",
            self.mean_density() * 100.0
        );
        out
    }
}

impl PartialEq for Family<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.problem, other.problem) && self.members == other.members
    }
}

impl std::fmt::Display for Family<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Family [")?;
        for (i, s) in self.members().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", s.get())?;
        }
        write!(
            f,
            "] (cost {}, uncovered {})",
            self.cost(),
            self.uncovered
        )
    }
}
