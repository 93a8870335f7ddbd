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

//! The greedy growth phase.
//!
//! Growth extends a partial cover until it is complete. Each step asks the
//! creation strategy for add candidates out of a shrinking pool, lets the
//! selection pick one and inserts it. After an insertion, members are
//! removed again while the cover holds unnecessary members, and with a small
//! probability even when it does not; every removal resets the pool to all
//! problem subsets. Growth stops early when no subset can cover any of the
//! remaining elements.

use crate::{
    creation::{CandidateCreation, FewestCandidates},
    rating::CandidateRating,
    selection::BestRatingSelection,
};
use mantle_core::num::saturating::SaturatingAddVal;
use mantle_model::{family::Family, index::SubsetIndex};
use rand::Rng;

/// Counts the moves of one growth phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct GrowthSummary {
    pub additions: u64,
    pub removals: u64,
}

/// Grows partial covers with the greedy add/remove scheme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GreedyGrowth {
    remove_probability: f64,
}

impl Default for GreedyGrowth {
    fn default() -> Self {
        Self::new(0.1)
    }
}

impl GreedyGrowth {
    /// Creates the growth phase.
    ///
    /// # Panics
    ///
    /// Panics if `remove_probability` leaves `[0, 1)`.
    pub fn new(remove_probability: f64) -> Self {
        assert!(
            (0.0..1.0).contains(&remove_probability),
            "called `GreedyGrowth::new()` with invalid remove probability {}",
            remove_probability
        );
        Self { remove_probability }
    }

    #[inline]
    pub fn remove_probability(&self) -> f64 {
        self.remove_probability
    }

    /// Grows `cover` until it is complete or nothing covers the rest.
    pub fn grow<C, Q, R>(
        &self,
        cover: &mut Family<'_>,
        best: Option<&Family<'_>>,
        creation: &C,
        rating: &Q,
        selection: &BestRatingSelection,
        rng: &mut R,
    ) -> GrowthSummary
    where
        C: CandidateCreation + ?Sized,
        Q: CandidateRating + ?Sized,
        R: Rng + ?Sized,
    {
        let mut summary = GrowthSummary::default();
        let all: Vec<SubsetIndex> = cover.problem().indices().collect();
        let mut pool = all.clone();

        while cover.uncovered_count() > 0 {
            let mut candidates = if pool.is_empty() {
                Vec::new()
            } else {
                creation.add_candidates(&pool, cover, best)
            };
            if candidates.is_empty() {
                candidates = FewestCandidates.add_candidates(&all, cover, best);
            }
            if candidates.is_empty() {
                break;
            }
            pool = candidates;

            let Some(added) = selection.select_add(&pool, cover, rating, rng) else {
                break;
            };
            if cover.alone_covered(added) > 0 {
                cover.insert(added);
                summary.additions = summary.additions.saturating_add_val(1);
            }
            pool.retain(|&s| s != added);

            while self.should_remove(cover, rng) {
                let mut removable = creation.remove_candidates(cover, best);
                if removable.is_empty() {
                    removable = cover.members().collect();
                }
                if let Some(removed) = selection.select_remove(&removable, cover, rating, rng) {
                    cover.remove(removed);
                    summary.removals = summary.removals.saturating_add_val(1);
                }
                pool.clone_from(&all);
            }
        }

        summary
    }

    #[inline]
    fn should_remove<R>(&self, cover: &Family<'_>, rng: &mut R) -> bool
    where
        R: Rng + ?Sized,
    {
        !cover.is_empty()
            && (cover.unnecessary_count() > 0 || rng.random::<f64>() < self.remove_probability)
    }
}
