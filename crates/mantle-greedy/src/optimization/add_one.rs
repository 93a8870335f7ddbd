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

//! Single-addition improvement.
//!
//! Tries every outside subset, measures how cheap the cover gets when the
//! members it makes redundant are removed, applies the best such exchange
//! and repeats while the cost keeps falling.

use crate::optimization::{
    Optimization,
    support::{RepairContext, best_reduced_family, min_cost_without_redundant, strip_unnecessary},
};
use mantle_model::{family::Family, index::SubsetIndex};
use rand::Rng;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddOneOptimization;

impl AddOneOptimization {
    #[inline]
    pub fn new() -> Self {
        Self
    }

    fn improve_once<'p, R>(
        &self,
        cover: &Family<'p>,
        ctx: &RepairContext<'_>,
        rng: &mut R,
    ) -> Option<Family<'p>>
    where
        R: Rng + ?Sized,
    {
        let mut work = cover.clone();
        let mut min_cost = cover.cost();
        let mut best_addition = None;

        let outside: Vec<SubsetIndex> = work.non_members().collect();
        for added in outside {
            work.insert(added);
            if work.unnecessary_count() > 1 {
                let redundant = redundant_without(&work, &[added]);
                let cost = min_cost_without_redundant(&mut work, &redundant, ctx, rng);
                if cost < min_cost {
                    min_cost = cost;
                    best_addition = Some(added);
                }
            }
            work.remove(added);
        }

        let added = best_addition?;
        let mut next = cover.clone();
        next.insert(added);
        let redundant = redundant_without(&next, &[added]);
        best_reduced_family(&mut next, &redundant, ctx, rng);
        strip_unnecessary(&mut next);
        Some(next)
    }
}

/// Returns the unnecessary members of `cover` except `added`.
pub(crate) fn redundant_without(cover: &Family<'_>, added: &[SubsetIndex]) -> Vec<SubsetIndex> {
    cover
        .unnecessary_subsets()
        .into_iter()
        .filter(|s| !added.contains(s))
        .collect()
}

impl Optimization for AddOneOptimization {
    fn name(&self) -> &str {
        "AddOneOptimization"
    }

    fn optimize<'p, R>(
        &self,
        cover: &Family<'p>,
        _best: Option<&Family<'p>>,
        ctx: &RepairContext<'_>,
        rng: &mut R,
    ) -> Option<Family<'p>>
    where
        R: Rng + ?Sized,
    {
        assert!(
            cover.unnecessary_count() == 0,
            "called `AddOneOptimization::optimize()` with {} unnecessary members",
            cover.unnecessary_count()
        );
        let mut current: Option<Family<'p>> = None;
        loop {
            let base = current.as_ref().unwrap_or(cover);
            match self.improve_once(base, ctx, rng) {
                Some(next) if next.is_complete() && next.cost() < base.cost() => {
                    current = Some(next);
                }
                _ => return current,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        creation::Creation,
        rating::{ChvatalRating, Rating},
        selection::BestRatingSelection,
    };
    use mantle_model::problem::ProblemBuilder;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn idx(i: usize) -> SubsetIndex {
        SubsetIndex::new(i)
    }

    #[test]
    fn test_exchanges_two_members_for_one() {
        let mut builder = ProblemBuilder::new(6);
        builder.add_subset([0, 1, 2], 2.0).unwrap(); // 0
        builder.add_subset([3, 4], 2.0).unwrap(); // 1
        builder.add_subset([5], 1.0).unwrap(); // 2
        builder.add_subset([2, 3, 4, 5], 2.5).unwrap(); // 3
        builder.add_subset([0, 1], 1.0).unwrap(); // 4
        let problem = builder.build().unwrap();
        let creation = Creation::for_problem(&problem);
        let rating = Rating::Chvatal(ChvatalRating);
        let selection = BestRatingSelection::default().greedy();
        let ctx = RepairContext::new(&creation, &rating, &selection, 8);
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let cover = Family::from_indices(&problem, [idx(0), idx(1), idx(2)]).unwrap();
        assert_eq!(cover.cost(), 5.0);
        let improved = AddOneOptimization
            .optimize(&cover, None, &ctx, &mut rng)
            .unwrap();
        assert!(improved.is_complete());
        assert_eq!(improved.unnecessary_count(), 0);
        // Subset 3 replaces 1 and 2, then subset 4 replaces 0.
        assert_eq!(improved.members().collect::<Vec<_>>(), vec![idx(3), idx(4)]);
        assert_eq!(improved.cost(), 3.5);
    }

    #[test]
    fn test_no_improvement() {
        let mut builder = ProblemBuilder::new(2);
        builder.add_subset([0], 1.0).unwrap();
        builder.add_subset([1], 1.0).unwrap();
        builder.add_subset([0, 1], 5.0).unwrap();
        let problem = builder.build().unwrap();
        let creation = Creation::for_problem(&problem);
        let rating = Rating::Chvatal(ChvatalRating);
        let selection = BestRatingSelection::default().greedy();
        let ctx = RepairContext::new(&creation, &rating, &selection, 8);
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let cover = Family::from_indices(&problem, [idx(0), idx(1)]).unwrap();
        assert!(
            AddOneOptimization
                .optimize(&cover, None, &ctx, &mut rng)
                .is_none()
        );
    }
}
