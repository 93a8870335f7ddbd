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

//! Candidate selection with tunable exploration.
//!
//! `BestRatingSelection` picks one candidate out of a list. With the
//! configured exploration probability, or when there is only one candidate,
//! it ignores the ratings and draws uniformly. Otherwise it rates every
//! candidate, keeps the ones whose rating lies within a relative tolerance
//! of the maximum ("favorites") and draws one of those uniformly. The
//! tolerance keeps floating-point noise from deciding between candidates
//! that are equally good.

use crate::rating::CandidateRating;
use mantle_model::{family::Family, index::SubsetIndex};
use rand::Rng;
use smallvec::SmallVec;

/// Selects the best rated candidate, breaking near-ties uniformly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestRatingSelection {
    add_random: f64,
    remove_random: f64,
    epsilon: f64,
}

impl Default for BestRatingSelection {
    fn default() -> Self {
        Self::new(0.05, 0.05, 0.001)
    }
}

impl BestRatingSelection {
    /// Creates a selection.
    ///
    /// # Panics
    ///
    /// Panics if a probability leaves `[0, 1]` or `epsilon` is negative.
    pub fn new(add_random: f64, remove_random: f64, epsilon: f64) -> Self {
        assert!(
            (0.0..=1.0).contains(&add_random) && (0.0..=1.0).contains(&remove_random),
            "called `BestRatingSelection::new()` with invalid exploration probabilities {} and {}",
            add_random,
            remove_random
        );
        assert!(
            epsilon >= 0.0,
            "called `BestRatingSelection::new()` with negative epsilon {}",
            epsilon
        );
        Self {
            add_random,
            remove_random,
            epsilon,
        }
    }

    /// Returns a copy that never explores.
    #[inline]
    pub fn greedy(self) -> Self {
        Self {
            add_random: 0.0,
            remove_random: 0.0,
            ..self
        }
    }

    #[inline]
    pub fn add_random(&self) -> f64 {
        self.add_random
    }

    #[inline]
    pub fn remove_random(&self) -> f64 {
        self.remove_random
    }

    #[inline]
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Selects a subset to add to `cover`. Returns `None` if there is no candidate.
    pub fn select_add<Q, R>(
        &self,
        candidates: &[SubsetIndex],
        cover: &mut Family<'_>,
        rating: &Q,
        rng: &mut R,
    ) -> Option<SubsetIndex>
    where
        Q: CandidateRating + ?Sized,
        R: Rng + ?Sized,
    {
        self.select(candidates, self.add_random, rng, |c| {
            rating.add_values(cover, c)
        })
    }

    /// Selects a member to remove from `cover`. Returns `None` if there is no candidate.
    pub fn select_remove<Q, R>(
        &self,
        candidates: &[SubsetIndex],
        cover: &mut Family<'_>,
        rating: &Q,
        rng: &mut R,
    ) -> Option<SubsetIndex>
    where
        Q: CandidateRating + ?Sized,
        R: Rng + ?Sized,
    {
        self.select(candidates, self.remove_random, rng, |c| {
            rating.remove_values(cover, c)
        })
    }

    fn select<R, F>(
        &self,
        candidates: &[SubsetIndex],
        explore: f64,
        rng: &mut R,
        rate: F,
    ) -> Option<SubsetIndex>
    where
        R: Rng + ?Sized,
        F: FnOnce(&[SubsetIndex]) -> Vec<f64>,
    {
        if candidates.is_empty() {
            return None;
        }
        if rng.random::<f64>() < explore || candidates.len() == 1 {
            return Some(candidates[rng.random_range(0..candidates.len())]);
        }

        let ratings = rate(candidates);
        pick_favorite(&ratings, self.epsilon, rng).map(|i| candidates[i])
    }
}

/// Returns the lowest rating that still counts as a tie with `max`.
#[inline]
pub fn tie_threshold(max: f64, epsilon: f64) -> f64 {
    if max > 0.0 {
        max / (1.0 + epsilon)
    } else {
        max * (1.0 + epsilon)
    }
}

/// Draws the position of one favorite among `ratings`.
///
/// Favorites are the ratings not below `tie_threshold` of the maximum. If
/// no rating compares (all `NaN`), every position is a favorite.
pub fn pick_favorite<R>(ratings: &[f64], epsilon: f64, rng: &mut R) -> Option<usize>
where
    R: Rng + ?Sized,
{
    if ratings.is_empty() {
        return None;
    }
    let max = ratings.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let threshold = tie_threshold(max, epsilon);

    let favorites: SmallVec<[usize; 16]> = ratings
        .iter()
        .enumerate()
        .filter(|&(_, &r)| r >= threshold)
        .map(|(i, _)| i)
        .collect();

    if favorites.is_empty() {
        Some(rng.random_range(0..ratings.len()))
    } else {
        Some(favorites[rng.random_range(0..favorites.len())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::{ChvatalRating, ProbabilityRating};
    use mantle_model::problem::ProblemBuilder;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn idx(i: usize) -> SubsetIndex {
        SubsetIndex::new(i)
    }

    #[test]
    fn test_threshold_sign_handling() {
        assert!((tie_threshold(10.0, 0.1) - 10.0 / 1.1).abs() < 1e-12);
        assert!((tie_threshold(-10.0, 0.1) + 11.0).abs() < 1e-12);
        assert_eq!(tie_threshold(0.0, 0.1), 0.0);
    }

    #[test]
    fn test_pick_favorite_keeps_near_ties() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let ratings = [1.0, 5.0, 4.9999, 2.0];
        for _ in 0..100 {
            let i = pick_favorite(&ratings, 0.001, &mut rng).unwrap();
            assert!(i == 1 || i == 2);
        }
        assert_eq!(pick_favorite(&[], 0.001, &mut rng), None);
    }

    #[test]
    fn test_pick_favorite_all_nan() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let i = pick_favorite(&[f64::NAN, f64::NAN], 0.001, &mut rng).unwrap();
        assert!(i < 2);
    }

    #[test]
    fn test_select_add_prefers_best_rating() {
        let mut builder = ProblemBuilder::new(4);
        builder.add_subset([0], 1.0).unwrap();
        builder.add_subset([0, 1, 2], 1.0).unwrap();
        builder.add_subset([3], 1.0).unwrap();
        let problem = builder.build().unwrap();
        let mut cover = problem.empty_family();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let selection = BestRatingSelection::default().greedy();
        let candidates = [idx(0), idx(1), idx(2)];
        for _ in 0..20 {
            let picked = selection
                .select_add(&candidates, &mut cover, &ChvatalRating, &mut rng)
                .unwrap();
            assert_eq!(picked, idx(1));
        }
        assert!(cover.is_empty());
    }

    #[test]
    fn test_select_add_rates_candidates_jointly() {
        let mut builder = ProblemBuilder::new(3);
        builder.add_subset([0, 1], 1.0).unwrap();
        builder.add_subset([1, 2], 1.0).unwrap();
        builder.add_subset([2], 1.0).unwrap();
        let problem = builder.build().unwrap();
        let mut cover = problem.empty_family();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let selection = BestRatingSelection::default().greedy();
        let rating = ProbabilityRating::new(10, 0.0, 1.0);
        // Subset 0 is the only one covering element 0.
        let picked = selection
            .select_add(&[idx(0), idx(1), idx(2)], &mut cover, &rating, &mut rng)
            .unwrap();
        assert_eq!(picked, idx(0));
    }

    #[test]
    fn test_select_remove_and_empty() {
        let mut builder = ProblemBuilder::new(2);
        builder.add_subset([0, 1], 1.0).unwrap();
        builder.add_subset([0], 3.0).unwrap();
        let problem = builder.build().unwrap();
        let mut cover = problem.full_family();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let selection = BestRatingSelection::default().greedy();
        let picked = selection
            .select_remove(&[idx(0), idx(1)], &mut cover, &ChvatalRating, &mut rng)
            .unwrap();
        // Subset 1 is redundant and costly.
        assert_eq!(picked, idx(1));
        assert_eq!(
            selection.select_remove(&[], &mut cover, &ChvatalRating, &mut rng),
            None
        );
    }

    #[test]
    fn test_single_candidate_is_returned() {
        let mut builder = ProblemBuilder::new(1);
        builder.add_subset([0], 1.0).unwrap();
        let problem = builder.build().unwrap();
        let mut cover = problem.empty_family();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        assert_eq!(
            BestRatingSelection::default().select_add(
                &[idx(0)],
                &mut cover,
                &ChvatalRating,
                &mut rng
            ),
            Some(idx(0))
        );
    }

    #[test]
    #[should_panic(expected = "invalid exploration probabilities")]
    fn test_invalid_probability_panics() {
        let _ = BestRatingSelection::new(1.5, 0.0, 0.001);
    }

    proptest! {
        #[test]
        fn prop_favorite_within_tolerance(
            ratings in proptest::collection::vec(-1.0e6f64..1.0e6, 1..40),
            epsilon in 0.0f64..0.1,
            seed in any::<u64>(),
        ) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let max = ratings.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let i = pick_favorite(&ratings, epsilon, &mut rng).unwrap();
            prop_assert!(ratings[i] >= tie_threshold(max, epsilon));
            prop_assert!(ratings[i] <= max);
        }
    }
}
