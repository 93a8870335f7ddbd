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

//! Candidate creation.
//!
//! A creation strategy narrows the subsets the selection has to rate. For
//! additions it filters a pool of problem subsets against the partial cover
//! (and the best known cover); for removals it names the members worth
//! dropping. An empty result means the strategy has nothing to propose and
//! the caller decides how to continue.

use crate::rating::Rating;
use mantle_model::{family::Family, index::SubsetIndex, problem::Problem};

/// Proposes subsets to add to or remove from a partial cover.
pub trait CandidateCreation {
    /// Returns the name of the strategy.
    fn name(&self) -> &str;

    /// Returns the subsets of `pool` worth adding to `cover`.
    fn add_candidates(
        &self,
        pool: &[SubsetIndex],
        cover: &Family<'_>,
        best: Option<&Family<'_>>,
    ) -> Vec<SubsetIndex>;

    /// Returns the members of `cover` worth removing.
    fn remove_candidates(&self, cover: &Family<'_>, best: Option<&Family<'_>>)
    -> Vec<SubsetIndex>;
}

impl std::fmt::Debug for dyn CandidateCreation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CandidateCreation {{ name: {} }}", self.name())
    }
}

impl std::fmt::Display for dyn CandidateCreation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CandidateCreation: {}", self.name())
    }
}

/// Proposes the subsets that cover the most uncovered elements, and removes
/// the members covering the fewest elements alone.
///
/// Intended for unicost problems, where the number of newly covered
/// elements is the whole story.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FewestCandidates;

impl FewestCandidates {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl CandidateCreation for FewestCandidates {
    fn name(&self) -> &str {
        "FewestCandidates"
    }

    fn add_candidates(
        &self,
        pool: &[SubsetIndex],
        cover: &Family<'_>,
        _best: Option<&Family<'_>>,
    ) -> Vec<SubsetIndex> {
        let mut best_alone = 1;
        let mut candidates = Vec::new();
        for &subset in pool {
            if cover.contains(subset) {
                continue;
            }
            let alone = cover.alone_covered(subset);
            if alone > best_alone {
                best_alone = alone;
                candidates.clear();
            }
            if alone == best_alone {
                candidates.push(subset);
            }
        }
        candidates
    }

    fn remove_candidates(
        &self,
        cover: &Family<'_>,
        _best: Option<&Family<'_>>,
    ) -> Vec<SubsetIndex> {
        let mut least_alone = usize::MAX;
        let mut candidates = Vec::new();
        for subset in cover.members() {
            let alone = cover.alone_covered(subset);
            if alone < least_alone {
                least_alone = alone;
                candidates.clear();
            }
            if alone == least_alone {
                candidates.push(subset);
            }
        }
        candidates
    }
}

/// Proposes every subset covering enough uncovered elements, and removes
/// every unnecessary member.
///
/// Without a size cap a single new element is enough. With a cap the
/// threshold is the number of uncovered elements spread over the subsets
/// still allowed, so that the cap can be met. Candidates whose add cost
/// alone exceeds the cost of the best known cover are dropped. When
/// nothing survives the filters, the strategy falls back to
/// `FewestCandidates`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MostCandidates;

impl MostCandidates {
    #[inline]
    pub fn new() -> Self {
        Self
    }

    /// Returns the least number of uncovered elements a candidate has to
    /// cover, or `None` if the size cap is already exhausted.
    #[inline]
    fn min_alone(cover: &Family<'_>) -> Option<usize> {
        let cap = cover.problem().max_subsets();
        if cap == 0 {
            return Some(1);
        }
        if cover.len() >= cap {
            return None;
        }
        let budget = cap - cover.len();
        Some(cover.uncovered_count().div_ceil(budget).max(1))
    }
}

impl CandidateCreation for MostCandidates {
    fn name(&self) -> &str {
        "MostCandidates"
    }

    fn add_candidates(
        &self,
        pool: &[SubsetIndex],
        cover: &Family<'_>,
        best: Option<&Family<'_>>,
    ) -> Vec<SubsetIndex> {
        let Some(min_alone) = Self::min_alone(cover) else {
            return FewestCandidates.add_candidates(pool, cover, best);
        };

        let candidates: Vec<SubsetIndex> = pool
            .iter()
            .copied()
            .filter(|&subset| !cover.contains(subset))
            .filter(|&subset| cover.alone_covered(subset) >= min_alone)
            .filter(|&subset| match best {
                Some(best) => cover.add_cost(subset) <= best.cost(),
                None => true,
            })
            .collect();

        if candidates.is_empty() {
            FewestCandidates.add_candidates(pool, cover, best)
        } else {
            candidates
        }
    }

    fn remove_candidates(
        &self,
        cover: &Family<'_>,
        _best: Option<&Family<'_>>,
    ) -> Vec<SubsetIndex> {
        cover.unnecessary_subsets()
    }
}

/// The creation strategy matching a problem's cost structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Creation {
    Fewest(FewestCandidates),
    Most(MostCandidates),
}

impl Creation {
    /// Returns `Fewest` for unicost problems and `Most` otherwise.
    #[inline]
    pub fn for_problem(problem: &Problem) -> Self {
        if problem.cost_class().is_uniform() {
            Creation::Fewest(FewestCandidates)
        } else {
            Creation::Most(MostCandidates)
        }
    }

    /// Returns the strategy to grow with `rating`: `Most` whenever the
    /// rating weighs candidates jointly, `for_problem` otherwise.
    #[inline]
    pub fn for_rating(problem: &Problem, rating: &Rating) -> Self {
        if rating.is_probability() {
            Creation::Most(MostCandidates)
        } else {
            Self::for_problem(problem)
        }
    }
}

impl CandidateCreation for Creation {
    fn name(&self) -> &str {
        match self {
            Creation::Fewest(c) => c.name(),
            Creation::Most(c) => c.name(),
        }
    }

    #[inline]
    fn add_candidates(
        &self,
        pool: &[SubsetIndex],
        cover: &Family<'_>,
        best: Option<&Family<'_>>,
    ) -> Vec<SubsetIndex> {
        match self {
            Creation::Fewest(c) => c.add_candidates(pool, cover, best),
            Creation::Most(c) => c.add_candidates(pool, cover, best),
        }
    }

    #[inline]
    fn remove_candidates(
        &self,
        cover: &Family<'_>,
        best: Option<&Family<'_>>,
    ) -> Vec<SubsetIndex> {
        match self {
            Creation::Fewest(c) => c.remove_candidates(cover, best),
            Creation::Most(c) => c.remove_candidates(cover, best),
        }
    }
}
