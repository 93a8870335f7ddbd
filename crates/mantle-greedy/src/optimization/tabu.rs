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

//! Tabu search on unicost covers.
//!
//! On unicost problems a cheaper cover is a smaller one, so the search
//! walks through complete and incomplete covers by single insertions and
//! removals, scoring every move by the resulting size plus the number of
//! uncovered elements. Recently moved subsets are tabu for a tenure drawn
//! per round from `1 ..= round(len * tabu_factor)`.
//!
//! # Mechanisms
//!
//! 1.  **Restricted insertions:** Insertions are only considered while the
//!     walk is at least two subsets below the best size, and only among
//!     subsets covering an uncovered element (of the last removed subset,
//!     if the last move was a removal).
//! 2.  **Aspiration:** An insertion that covers every uncovered element is
//!     allowed even when tabu.
//! 3.  **Stagnation:** A round ends after `round(change_factor / density)`
//!     moves without finding a cheaper complete cover.

use crate::optimization::{Optimization, support::RepairContext};
use fixedbitset::FixedBitSet;
use mantle_model::{family::Family, index::SubsetIndex, problem::Problem};
use rand::Rng;
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

/// A FIFO set of recently moved subsets.
#[derive(Debug, Clone)]
struct TabuList {
    tenure: usize,
    queue: VecDeque<SubsetIndex>,
    set: FxHashSet<SubsetIndex>,
}

impl TabuList {
    fn new(tenure: usize) -> Self {
        Self {
            tenure,
            queue: VecDeque::with_capacity(tenure),
            set: FxHashSet::default(),
        }
    }

    #[inline]
    fn contains(&self, subset: SubsetIndex) -> bool {
        self.set.contains(&subset)
    }

    /// Records a move, expiring the oldest entry once the tenure is reached.
    #[inline]
    fn make_tabu(&mut self, subset: SubsetIndex) {
        if self.queue.len() >= self.tenure
            && let Some(oldest) = self.queue.pop_front()
        {
            self.set.remove(&oldest);
        }

        if self.set.insert(subset) {
            self.queue.push_back(subset);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TabuOptimization {
    tabu_factor: f64,
    rounds: usize,
    change_factor: f64,
}

impl Default for TabuOptimization {
    fn default() -> Self {
        Self::new(0.2, 5, 10.0)
    }
}

impl TabuOptimization {
    /// Creates the search.
    ///
    /// # Panics
    ///
    /// Panics if `tabu_factor` leaves `[0, 1]` or `change_factor` is not positive.
    pub fn new(tabu_factor: f64, rounds: usize, change_factor: f64) -> Self {
        assert!(
            (0.0..=1.0).contains(&tabu_factor),
            "called `TabuOptimization::new()` with invalid tabu factor {}",
            tabu_factor
        );
        assert!(
            change_factor > 0.0,
            "called `TabuOptimization::new()` with non-positive change factor {}",
            change_factor
        );
        Self {
            tabu_factor,
            rounds,
            change_factor,
        }
    }

    /// Returns the subsets containing each element.
    fn containing(problem: &Problem) -> Vec<Vec<SubsetIndex>> {
        let mut containing = vec![Vec::new(); problem.universe()];
        for s in problem.indices() {
            for e in problem.subset(s).elements() {
                containing[e].push(s);
            }
        }
        containing
    }

    /// Returns the mean share of the universe a problem subset holds.
    fn mean_density(problem: &Problem) -> f64 {
        if problem.is_empty() || problem.universe() == 0 {
            return 0.0;
        }
        let total: usize = problem.subsets().iter().map(|s| s.len()).sum();
        total as f64 / (problem.len() as f64 * problem.universe() as f64)
    }
}

impl Optimization for TabuOptimization {
    fn name(&self) -> &str {
        "TabuOptimization"
    }

    fn optimize<'p, R>(
        &self,
        cover: &Family<'p>,
        _best: Option<&Family<'p>>,
        _ctx: &RepairContext<'_>,
        rng: &mut R,
    ) -> Option<Family<'p>>
    where
        R: Rng + ?Sized,
    {
        let problem = cover.problem();
        let density = Self::mean_density(problem);
        if !problem.cost_class().is_uniform() || cover.is_empty() || density == 0.0 {
            return None;
        }

        let max_moves = (self.change_factor / density).round() as usize;
        let containing = Self::containing(problem);
        let mut relevant = FixedBitSet::with_capacity(problem.len());
        let mut adds: Vec<SubsetIndex> = Vec::new();
        let mut removes: Vec<SubsetIndex> = Vec::new();

        let mut optimized = cover.clone();
        let mut improved = false;
        let mut best_len = cover.len();
        let mut last_removed: Option<SubsetIndex> = None;

        for _ in 0..self.rounds {
            let mut next = optimized.clone();
            let span = ((next.len() as f64 * self.tabu_factor).round() as usize).max(1);
            let mut tabu = TabuList::new(1 + rng.random_range(0..span));

            let mut moves = 0;
            while moves < max_moves {
                moves += 1;
                let len = next.len();
                let uncovered = next.uncovered_count();
                let mut best_score = usize::MAX;

                adds.clear();
                if len + 1 < best_len {
                    relevant.clear();
                    match last_removed {
                        None => {
                            for e in next.uncovered_elements() {
                                for s in &containing[e.get()] {
                                    relevant.insert(s.get());
                                }
                            }
                        }
                        Some(removed) => {
                            for e in problem.subset(removed).elements() {
                                if next.frequencies()[e] == 0 {
                                    for s in &containing[e] {
                                        relevant.insert(s.get());
                                    }
                                }
                            }
                        }
                    }

                    for s in relevant.ones().map(SubsetIndex::new) {
                        if next.contains(s) {
                            continue;
                        }
                        let alone = next.alone_covered(s);
                        let touches_removed = last_removed.is_none_or(|r| {
                            !problem.subset(s).bits().is_disjoint(problem.subset(r).bits())
                        });
                        if alone == uncovered || (touches_removed && !tabu.contains(s)) {
                            let score = len + 1 + uncovered - alone;
                            if score <= best_score {
                                if score < best_score {
                                    adds.clear();
                                    best_score = score;
                                }
                                adds.push(s);
                            }
                        }
                    }
                }

                removes.clear();
                for s in next.members() {
                    if tabu.contains(s) {
                        continue;
                    }
                    let score = len - 1 + uncovered + next.alone_covered(s);
                    if score <= best_score {
                        if score < best_score {
                            adds.clear();
                            removes.clear();
                            best_score = score;
                        }
                        removes.push(s);
                    }
                }

                let total = adds.len() + removes.len();
                if total == 0 {
                    break;
                }
                let pick = rng.random_range(0..total);
                let moved = if pick < adds.len() {
                    let s = adds[pick];
                    next.insert(s);
                    last_removed = None;
                    s
                } else {
                    let s = removes[pick - adds.len()];
                    next.remove(s);
                    last_removed = Some(s);
                    s
                };
                tabu.make_tabu(moved);

                if next.is_complete() && next.cost() < optimized.cost() {
                    optimized = next.clone();
                    improved = true;
                    moves = 0;
                    best_len = best_len.min(next.len());
                }
            }
        }

        improved.then_some(optimized)
    }
}
