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

//! Candidate ratings.
//!
//! A rating assigns a scalar desirability to adding a non-member to, or
//! removing a member from, a partial cover. Larger is better in both
//! directions. Ratings may try out a change on the cover (insert or remove
//! the candidate temporarily) and therefore take it mutably, but always
//! leave it exactly as they found it.
//!
//! Three families of ratings exist:
//!
//! - `MarchSteenRating` combines one of two formulas per direction with the
//!   marginal cost of the move. Formula one weighs the candidate's elements
//!   by their inverse squared coverage frequency, formula two measures how
//!   expensive it is to keep every member of the resulting cover.
//! - `ChvatalRating` compares the marginal cost with the cost of the members
//!   the addition makes redundant, scaled by the number of newly covered
//!   elements.
//! - `ProbabilityRating` rates all candidates of one step together by the
//!   estimated probability that each belongs to a cheap cover.

use crate::config::GreedyConfig;
use mantle_model::{family::Family, index::SubsetIndex, problem::CostClass};

/// Rates candidates for addition to and removal from a partial cover.
pub trait CandidateRating {
    /// Returns the name of the rating.
    fn name(&self) -> &str;

    /// Rates adding `subset` to `cover`.
    ///
    /// # Panics
    ///
    /// Panics if `subset` is already a member.
    fn add_value(&self, cover: &mut Family<'_>, subset: SubsetIndex) -> f64;

    /// Rates removing `subset` from `cover`.
    ///
    /// # Panics
    ///
    /// Panics if `subset` is not a member.
    fn remove_value(&self, cover: &mut Family<'_>, subset: SubsetIndex) -> f64;

    /// Rates adding each of `candidates` to `cover`.
    ///
    /// The default rates every candidate on its own.
    fn add_values(&self, cover: &mut Family<'_>, candidates: &[SubsetIndex]) -> Vec<f64> {
        candidates
            .iter()
            .map(|&c| self.add_value(cover, c))
            .collect()
    }

    /// Rates removing each of `candidates` from `cover`.
    ///
    /// The default rates every candidate on its own.
    fn remove_values(&self, cover: &mut Family<'_>, candidates: &[SubsetIndex]) -> Vec<f64> {
        candidates
            .iter()
            .map(|&c| self.remove_value(cover, c))
            .collect()
    }
}

impl std::fmt::Debug for dyn CandidateRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CandidateRating {{ name: {} }}", self.name())
    }
}

impl std::fmt::Display for dyn CandidateRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CandidateRating: {}", self.name())
    }
}

/// One of the two formulas of `MarchSteenRating`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RatingFormula {
    /// Sum of `1 / freq²` over the candidate's elements.
    InverseFrequency,

    /// Sum of `remove_cost / (alone + constant)` over the members of the
    /// cover after the move.
    MemberUtility,
}

impl std::fmt::Display for RatingFormula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RatingFormula::InverseFrequency => write!(f, "1"),
            RatingFormula::MemberUtility => write!(f, "2"),
        }
    }
}

/// The rating of Marchiori and Steenbeek.
///
/// The add-value is the formula's weight divided by the marginal add cost,
/// the remove-value the negated weight divided by the marginal remove cost.
/// A free addition rates `f64::MAX`, a free removal `-f64::MAX`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarchSteenRating {
    add_formula: RatingFormula,
    remove_formula: RatingFormula,
    constant: f64,
}

impl MarchSteenRating {
    /// Creates the rating.
    ///
    /// # Panics
    ///
    /// Panics if `constant` is not positive.
    pub fn new(add_formula: RatingFormula, remove_formula: RatingFormula, constant: f64) -> Self {
        assert!(
            constant > 0.0,
            "called `MarchSteenRating::new()` with non-positive constant {}",
            constant
        );
        Self {
            add_formula,
            remove_formula,
            constant,
        }
    }

    #[inline]
    pub fn add_formula(&self) -> RatingFormula {
        self.add_formula
    }

    #[inline]
    pub fn remove_formula(&self) -> RatingFormula {
        self.remove_formula
    }

    #[inline]
    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// Sum of `remove_cost / (alone + constant)` over every member.
    #[inline]
    fn member_utility(&self, cover: &Family<'_>) -> f64 {
        cover
            .members()
            .map(|m| cover.remove_cost(m) / (cover.alone_covered(m) as f64 + self.constant))
            .sum()
    }
}

impl CandidateRating for MarchSteenRating {
    fn name(&self) -> &str {
        "MarchSteenRating"
    }

    fn add_value(&self, cover: &mut Family<'_>, subset: SubsetIndex) -> f64 {
        assert!(
            !cover.contains(subset),
            "called `MarchSteenRating::add_value()` with subset {} that is already a member",
            subset
        );
        let weight = match self.add_formula {
            RatingFormula::InverseFrequency => {
                let frequencies = cover.frequencies();
                cover
                    .problem()
                    .subset(subset)
                    .elements()
                    .map(|e| {
                        let f = (frequencies[e] + 1) as f64;
                        1.0 / (f * f)
                    })
                    .sum()
            }
            RatingFormula::MemberUtility => {
                cover.with_inserted(subset, |enlarged| self.member_utility(enlarged))
            }
        };

        let cost = cover.add_cost(subset);
        if cost == 0.0 {
            f64::MAX
        } else {
            weight / cost
        }
    }

    fn remove_value(&self, cover: &mut Family<'_>, subset: SubsetIndex) -> f64 {
        assert!(
            cover.contains(subset),
            "called `MarchSteenRating::remove_value()` with subset {} that is not a member",
            subset
        );
        let weight = match self.remove_formula {
            RatingFormula::InverseFrequency => {
                let frequencies = cover.frequencies();
                -cover
                    .problem()
                    .subset(subset)
                    .elements()
                    .map(|e| {
                        let f = frequencies[e] as f64;
                        1.0 / (f * f)
                    })
                    .sum::<f64>()
            }
            RatingFormula::MemberUtility => {
                -cover.with_removed(subset, |reduced| self.member_utility(reduced))
            }
        };

        let cost = cover.remove_cost(subset);
        if cost == 0.0 {
            -f64::MAX
        } else {
            weight / cost
        }
    }
}

/// The greedy rating of Chvátal, extended by the cost of the members an
/// addition makes redundant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChvatalRating;

impl ChvatalRating {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl CandidateRating for ChvatalRating {
    fn name(&self) -> &str {
        "ChvatalRating"
    }

    fn add_value(&self, cover: &mut Family<'_>, subset: SubsetIndex) -> f64 {
        assert!(
            !cover.contains(subset),
            "called `ChvatalRating::add_value()` with subset {} that is already a member",
            subset
        );
        let gain = cover.alone_covered(subset) as f64;
        let released = cover
            .newly_unnecessary(subset)
            .into_iter()
            .map(|m| cover.remove_cost(m))
            .fold(0.0, f64::max);
        let balance = released - cover.add_cost(subset);

        if balance < 0.0 {
            balance / gain
        } else if balance == 0.0 {
            gain / cover.universe().max(1) as f64
        } else {
            balance * gain
        }
    }

    fn remove_value(&self, cover: &mut Family<'_>, subset: SubsetIndex) -> f64 {
        assert!(
            cover.contains(subset),
            "called `ChvatalRating::remove_value()` with subset {} that is not a member",
            subset
        );
        let alone = cover.alone_covered(subset);
        let cost = cover.remove_cost(subset);
        if alone == 0 {
            cost * f64::MAX.sqrt()
        } else {
            cost / alone as f64
        }
    }
}

/// Rates the candidates of one step by their estimated probability of
/// belonging to a cheap cover.
///
/// Every candidate starts with inclusion probability `1 / n`. A refinement
/// round weighs each candidate by `(p / c)^exponent`, where `c` is its add
/// cost relative to the most expensive candidate, and shares every element
/// among the candidates containing it in proportion to these weights. The
/// new probability of a candidate is the chance that it covers at least one
/// of its uncovered elements, mixed with the old one by `damping`. Rounds
/// end early once some candidate is certain. Free candidates cover their
/// elements for certain.
///
/// Removals are all rated alike, `-1 / n` for `n` candidates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbabilityRating {
    rounds: usize,
    damping: f64,
    exponent: f64,
}

impl ProbabilityRating {
    /// Creates the rating.
    ///
    /// # Panics
    ///
    /// Panics if `damping` leaves `[0, 1]` or `exponent` is not positive
    /// and finite.
    pub fn new(rounds: usize, damping: f64, exponent: f64) -> Self {
        assert!(
            (0.0..=1.0).contains(&damping),
            "called `ProbabilityRating::new()` with invalid damping {}",
            damping
        );
        assert!(
            exponent.is_finite() && exponent > 0.0,
            "called `ProbabilityRating::new()` with invalid exponent {}",
            exponent
        );
        Self {
            rounds,
            damping,
            exponent,
        }
    }

    /// Builds the rating configured for problems of `class`.
    #[inline]
    pub fn from_config(config: &GreedyConfig, class: CostClass) -> Self {
        Self::new(
            config.probability_rounds,
            config.probability_damping,
            config.probability_exponent(class),
        )
    }

    #[inline]
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    #[inline]
    pub fn damping(&self) -> f64 {
        self.damping
    }

    #[inline]
    pub fn exponent(&self) -> f64 {
        self.exponent
    }

    /// Returns the add cost of every candidate divided by the largest finite one.
    fn relative_costs(cover: &Family<'_>, candidates: &[SubsetIndex]) -> Vec<f64> {
        let mut costs: Vec<f64> = candidates.iter().map(|&c| cover.add_cost(c)).collect();
        let max = costs
            .iter()
            .copied()
            .filter(|c| c.is_finite())
            .fold(0.0, f64::max);
        if max > 0.0 {
            for cost in &mut costs {
                *cost /= max;
            }
        }
        costs
    }

    #[inline]
    fn weight(&self, probability: f64, cost: f64, candidates: usize) -> f64 {
        if cost == 0.0 {
            f64::MAX / candidates as f64
        } else {
            (probability / cost).powf(self.exponent)
        }
    }
}

impl CandidateRating for ProbabilityRating {
    fn name(&self) -> &str {
        "ProbabilityRating"
    }

    fn add_value(&self, cover: &mut Family<'_>, subset: SubsetIndex) -> f64 {
        self.add_values(cover, std::slice::from_ref(&subset))[0]
    }

    fn remove_value(&self, cover: &mut Family<'_>, subset: SubsetIndex) -> f64 {
        assert!(
            cover.contains(subset),
            "called `ProbabilityRating::remove_value()` with subset {} that is not a member",
            subset
        );
        -1.0
    }

    fn add_values(&self, cover: &mut Family<'_>, candidates: &[SubsetIndex]) -> Vec<f64> {
        for &c in candidates {
            assert!(
                !cover.contains(c),
                "called `ProbabilityRating::add_values()` with subset {} that is already a member",
                c
            );
        }
        if candidates.is_empty() {
            return Vec::new();
        }

        let problem = cover.problem();
        let frequencies = cover.frequencies();
        let n = candidates.len();
        let costs = Self::relative_costs(cover, candidates);
        let mut probabilities = vec![1.0 / n as f64; n];
        let mut shares = vec![0.0; cover.universe()];

        for _ in 0..self.rounds {
            if probabilities.iter().any(|&p| p >= 1.0) {
                break;
            }

            let weights: Vec<f64> = probabilities
                .iter()
                .zip(&costs)
                .map(|(&p, &c)| self.weight(p, c, n))
                .collect();
            shares.fill(0.0);
            for (&s, &w) in candidates.iter().zip(&weights) {
                for e in problem.subset(s).elements() {
                    shares[e] += w;
                }
            }
            for share in shares.iter_mut().filter(|share| **share == 0.0) {
                *share = f64::MIN_POSITIVE;
            }

            for (t, &s) in candidates.iter().enumerate() {
                let missed: f64 = problem
                    .subset(s)
                    .elements()
                    .filter(|&e| frequencies[e] == 0)
                    .map(|e| {
                        if costs[t] == 0.0 {
                            0.0
                        } else {
                            1.0 - weights[t] / shares[e]
                        }
                    })
                    .product();
                probabilities[t] =
                    self.damping * probabilities[t] + (1.0 - self.damping) * (1.0 - missed);
            }
        }

        probabilities
    }

    fn remove_values(&self, cover: &mut Family<'_>, candidates: &[SubsetIndex]) -> Vec<f64> {
        for &c in candidates {
            assert!(
                cover.contains(c),
                "called `ProbabilityRating::remove_values()` with subset {} that is not a member",
                c
            );
        }
        vec![-1.0 / candidates.len() as f64; candidates.len()]
    }
}

/// The rating chosen for one iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rating {
    Chvatal(ChvatalRating),
    MarchSteen(MarchSteenRating),
    Probability(ProbabilityRating),
}

impl Rating {
    /// Returns `true` if candidates are rated jointly by inclusion probability.
    #[inline]
    pub fn is_probability(&self) -> bool {
        matches!(self, Rating::Probability(_))
    }
}

impl CandidateRating for Rating {
    fn name(&self) -> &str {
        match self {
            Rating::Chvatal(r) => r.name(),
            Rating::MarchSteen(r) => r.name(),
            Rating::Probability(r) => r.name(),
        }
    }

    #[inline]
    fn add_value(&self, cover: &mut Family<'_>, subset: SubsetIndex) -> f64 {
        match self {
            Rating::Chvatal(r) => r.add_value(cover, subset),
            Rating::MarchSteen(r) => r.add_value(cover, subset),
            Rating::Probability(r) => r.add_value(cover, subset),
        }
    }

    #[inline]
    fn remove_value(&self, cover: &mut Family<'_>, subset: SubsetIndex) -> f64 {
        match self {
            Rating::Chvatal(r) => r.remove_value(cover, subset),
            Rating::MarchSteen(r) => r.remove_value(cover, subset),
            Rating::Probability(r) => r.remove_value(cover, subset),
        }
    }

    #[inline]
    fn add_values(&self, cover: &mut Family<'_>, candidates: &[SubsetIndex]) -> Vec<f64> {
        match self {
            Rating::Chvatal(r) => r.add_values(cover, candidates),
            Rating::MarchSteen(r) => r.add_values(cover, candidates),
            Rating::Probability(r) => r.add_values(cover, candidates),
        }
    }

    #[inline]
    fn remove_values(&self, cover: &mut Family<'_>, candidates: &[SubsetIndex]) -> Vec<f64> {
        match self {
            Rating::Chvatal(r) => r.remove_values(cover, candidates),
            Rating::MarchSteen(r) => r.remove_values(cover, candidates),
            Rating::Probability(r) => r.remove_values(cover, candidates),
        }
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rating::Chvatal(_) => write!(f, "Chvatal"),
            Rating::MarchSteen(r) => {
                write!(f, "MarchSteen({}, {})", r.add_formula, r.remove_formula)
            }
            Rating::Probability(_) => write!(f, "Probability"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mantle_model::problem::{Problem, ProblemBuilder};

    fn idx(i: usize) -> SubsetIndex {
        SubsetIndex::new(i)
    }

    fn sample() -> Problem {
        let mut builder = ProblemBuilder::new(4);
        builder.add_subset([0, 1], 2.0).unwrap(); // 0
        builder.add_subset([1, 2], 1.0).unwrap(); // 1
        builder.add_subset([0, 1, 2, 3], 4.0).unwrap(); // 2
        builder.add_subset([3], 0.0).unwrap(); // 3
        builder.build().unwrap()
    }

    #[test]
    fn test_inverse_frequency_values() {
        let problem = sample();
        let mut cover = Family::from_indices(&problem, [idx(0)]).unwrap();
        let rating = MarchSteenRating::new(
            RatingFormula::InverseFrequency,
            RatingFormula::InverseFrequency,
            1.0,
        );
        // Element 1 would be covered twice, element 2 once: (1/4 + 1) / 1.
        assert!((rating.add_value(&mut cover, idx(1)) - 1.25).abs() < 1e-12);
        // Both elements of subset 0 are covered once: -(1 + 1) / 2.
        assert!((rating.remove_value(&mut cover, idx(0)) + 1.0).abs() < 1e-12);
        // Free additions are rated highest.
        assert_eq!(rating.add_value(&mut cover, idx(3)), f64::MAX);
    }

    #[test]
    fn test_member_utility_values() {
        let problem = sample();
        let mut cover = Family::from_indices(&problem, [idx(0)]).unwrap();
        let rating =
            MarchSteenRating::new(RatingFormula::MemberUtility, RatingFormula::MemberUtility, 1.0);
        // After inserting 1: member 0 covers {0} alone, member 1 covers {2}.
        // (2 / 2 + 1 / 2) / 1 = 1.5
        let before = cover.clone();
        assert!((rating.add_value(&mut cover, idx(1)) - 1.5).abs() < 1e-12);
        assert_eq!(cover, before);
        // Removing the only member leaves nothing to weigh.
        assert_eq!(rating.remove_value(&mut cover, idx(0)), 0.0);
    }

    #[test]
    fn test_chvatal_values() {
        let problem = sample();
        let mut cover = Family::from_indices(&problem, [idx(0), idx(1)]).unwrap();
        let rating = ChvatalRating;
        // Inserting 2 makes 0 and 1 redundant; it costs 4 and releases at
        // most 2, covering one new element: (2 - 4) / 1.
        assert_eq!(rating.add_value(&mut cover, idx(2)), -2.0);
        // Removal: cost over alone-covered elements.
        assert_eq!(rating.remove_value(&mut cover, idx(0)), 2.0);
        assert_eq!(rating.remove_value(&mut cover, idx(1)), 1.0);

        cover.insert(idx(2));
        assert_eq!(rating.remove_value(&mut cover, idx(1)), f64::MAX.sqrt());
    }

    #[test]
    fn test_chvatal_balanced_addition() {
        let mut builder = ProblemBuilder::new(2);
        builder.add_subset([0], 1.0).unwrap();
        builder.add_subset([0, 1], 1.0).unwrap();
        let problem = builder.build().unwrap();
        let mut cover = Family::from_indices(&problem, [idx(0)]).unwrap();
        // Inserting 1 costs 1 and releases 1: one new element over two.
        assert_eq!(ChvatalRating.add_value(&mut cover, idx(1)), 0.5);
    }

    #[test]
    fn test_probability_values() {
        let mut builder = ProblemBuilder::new(3);
        builder.add_subset([0, 1], 1.0).unwrap();
        builder.add_subset([1, 2], 1.0).unwrap();
        builder.add_subset([2], 1.0).unwrap();
        let problem = builder.build().unwrap();
        let mut cover = problem.empty_family();
        let candidates = [idx(0), idx(1), idx(2)];

        // Subset 0 alone covers element 0 and becomes certain in the first
        // round, which ends the refinement.
        let values = ProbabilityRating::new(10, 0.0, 1.0).add_values(&mut cover, &candidates);
        let expected = [1.0, 0.75, 0.5];
        for (value, expected) in values.iter().zip(expected) {
            assert!((value - expected).abs() < 1e-12);
        }

        // Half of the start value 1/3 survives a damped round.
        let damped = ProbabilityRating::new(1, 0.5, 1.0).add_values(&mut cover, &candidates);
        assert!((damped[0] - 2.0 / 3.0).abs() < 1e-12);
        assert!((damped[2] - (0.5 / 3.0 + 0.25)).abs() < 1e-12);

        assert!(cover.is_empty());
    }

    #[test]
    fn test_probability_covered_elements_and_removals() {
        let problem = sample();
        let mut cover = Family::from_indices(&problem, [idx(0)]).unwrap();
        let rating = ProbabilityRating::new(10, 0.0, 2.0);
        // Only elements 2 and 3 are uncovered. Subset 3 is free and
        // certain; element 2 is shared by subsets 1 and 2 in the ratio of
        // their squared probability over relative cost, 16/9 to 1/9.
        let values = rating.add_values(&mut cover, &[idx(1), idx(2), idx(3)]);
        assert!((values[0] - 16.0 / 17.0).abs() < 1e-9);
        assert!((values[1] - 1.0 / 17.0).abs() < 1e-9);
        assert_eq!(values[2], 1.0);
        assert_eq!(rating.add_value(&mut cover, idx(3)), 1.0);

        assert_eq!(rating.remove_values(&mut cover, &[idx(0)]), vec![-1.0]);
        let config = GreedyConfig::default();
        assert_eq!(
            ProbabilityRating::from_config(&config, CostClass::Uniform).exponent(),
            1.0
        );
        assert_eq!(
            ProbabilityRating::from_config(&config, CostClass::Linear).rounds(),
            10
        );
    }

    #[test]
    #[should_panic(expected = "already a member")]
    fn test_add_value_of_member_panics() {
        let problem = sample();
        let mut cover = Family::from_indices(&problem, [idx(0)]).unwrap();
        ChvatalRating.add_value(&mut cover, idx(0));
    }

    #[test]
    #[should_panic(expected = "not a member")]
    fn test_remove_value_of_non_member_panics() {
        let problem = sample();
        let mut cover = problem.empty_family();
        let rating = MarchSteenRating::new(
            RatingFormula::InverseFrequency,
            RatingFormula::MemberUtility,
            1.0,
        );
        rating.remove_value(&mut cover, idx(1));
    }

    #[test]
    fn test_rating_display() {
        let rating = Rating::MarchSteen(MarchSteenRating::new(
            RatingFormula::InverseFrequency,
            RatingFormula::MemberUtility,
            0.01,
        ));
        assert_eq!(rating.to_string(), "MarchSteen(1, 2)");
        assert_eq!(Rating::Chvatal(ChvatalRating).to_string(), "Chvatal");
        assert_eq!(rating.name(), "MarchSteenRating");
        let rating = Rating::Probability(ProbabilityRating::new(10, 0.0, 1.0));
        assert_eq!(rating.to_string(), "Probability");
        assert!(rating.is_probability());
    }
}
