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

//! Pruning of inferior members.
//!
//! For every outside subset the pass checks which members its insertion
//! makes redundant. If removing some of them would make the cover cheaper,
//! all of them are marked inferior. The inferior members are then torn out
//! together and the cover is regrown, avoiding the inferior subsets in the
//! first step.

use crate::optimization::{
    Optimization,
    support::{RepairContext, complete_family, min_cost_without_redundant},
};
use fixedbitset::FixedBitSet;
use mantle_model::{family::Family, index::SubsetIndex};
use rand::Rng;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InferiorOptimization;

impl InferiorOptimization {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Optimization for InferiorOptimization {
    fn name(&self) -> &str {
        "InferiorOptimization"
    }

    fn optimize<'p, R>(
        &self,
        cover: &Family<'p>,
        best: Option<&Family<'p>>,
        ctx: &RepairContext<'_>,
        rng: &mut R,
    ) -> Option<Family<'p>>
    where
        R: Rng + ?Sized,
    {
        assert!(
            cover.unnecessary_count() == 0,
            "called `InferiorOptimization::optimize()` with {} unnecessary members",
            cover.unnecessary_count()
        );
        let original = cover.cost();
        let mut work = cover.clone();
        let mut inferior = FixedBitSet::with_capacity(cover.problem().len());

        let outside: Vec<SubsetIndex> = work.non_members().collect();
        for added in outside {
            work.insert(added);
            if work.unnecessary_count() > 1 {
                let redundant: Vec<SubsetIndex> = work
                    .unnecessary_subsets()
                    .into_iter()
                    .filter(|&s| s != added)
                    .collect();
                let cost = min_cost_without_redundant(&mut work, &redundant, ctx, rng);
                if cost < original {
                    for s in &redundant {
                        inferior.insert(s.get());
                    }
                }
            }
            work.remove(added);
        }

        if inferior.is_clear() {
            return None;
        }

        let inferior: Vec<SubsetIndex> = inferior.ones().map(SubsetIndex::new).collect();
        let mut next = cover.clone();
        for &s in &inferior {
            next.remove(s);
        }
        let complete = complete_family(&mut next, best, &inferior, ctx, rng);
        (complete && next.cost() < original).then_some(next)
    }
}
