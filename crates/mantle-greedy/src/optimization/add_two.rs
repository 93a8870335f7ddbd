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

//! Pair-addition improvement.
//!
//! Like the single-addition pass, but inserts two outside subsets at once,
//! which finds exchanges where neither subset alone makes enough members
//! redundant. Quadratic in the number of outside subsets.

use crate::optimization::{
    Optimization,
    add_one::redundant_without,
    support::{RepairContext, best_reduced_family, min_cost_without_redundant, strip_unnecessary},
};
use mantle_model::{family::Family, index::SubsetIndex};
use rand::Rng;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddTwoOptimization;

impl AddTwoOptimization {
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
        let mut best_pair = None;

        let outside: Vec<SubsetIndex> = work.non_members().collect();
        for (i, &first) in outside.iter().enumerate() {
            work.insert(first);
            for &second in &outside[i + 1..] {
                work.insert(second);
                if work.unnecessary_count() > 2 {
                    let redundant = redundant_without(&work, &[first, second]);
                    let cost = min_cost_without_redundant(&mut work, &redundant, ctx, rng);
                    if cost < min_cost {
                        min_cost = cost;
                        best_pair = Some((first, second));
                    }
                }
                work.remove(second);
            }
            work.remove(first);
        }

        let (first, second) = best_pair?;
        let mut next = cover.clone();
        next.insert(first);
        next.insert(second);
        let redundant = redundant_without(&next, &[first, second]);
        best_reduced_family(&mut next, &redundant, ctx, rng);
        strip_unnecessary(&mut next);
        Some(next)
    }
}

impl Optimization for AddTwoOptimization {
    fn name(&self) -> &str {
        "AddTwoOptimization"
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
            "called `AddTwoOptimization::optimize()` with {} unnecessary members",
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
