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

//! Per-iteration choice of the rating.
//!
//! Every iteration the engine asks a `MixingPolicy` which rating to grow
//! the next cover with and reports back whether that cover improved on the
//! best one. `FixedMixing` draws from constant proportions, `AdaptiveMixing`
//! shifts the proportions towards the rating that last produced an
//! improvement.
//!
//! Non-linear problems are always rated by Chvátal. On linear problems the
//! first iteration uses the probability rating.

use crate::{
    config::{GreedyConfig, MixingKind},
    rating::{ChvatalRating, MarchSteenRating, ProbabilityRating, Rating, RatingFormula},
};
use mantle_model::problem::{CostClass, Problem};
use rand::Rng;

/// Chooses the rating of each iteration.
pub trait MixingPolicy {
    /// Returns the name of the policy.
    fn name(&self) -> &str;

    /// Returns the rating for iteration `iteration` (zero-based).
    fn choose_rating<R>(&mut self, iteration: u64, rng: &mut R) -> Rating
    where
        R: Rng + ?Sized;

    /// Reports whether the cover grown with the last chosen rating improved
    /// on the best one.
    fn reward(&mut self, success: bool);
}

/// The kind of rating drawn last, as far as rewards are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    Probability,
    Chvatal,
    One,
    Two,
}

impl Choice {
    /// Position of the choice in `[probability, chvatal, march_steen]`.
    #[inline]
    fn slot(self) -> usize {
        match self {
            Choice::Probability => 0,
            Choice::Chvatal => 1,
            Choice::One | Choice::Two => 2,
        }
    }
}

/// Proportions shared by both policies.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Portions {
    class: CostClass,
    probability: f64,
    chvatal: f64,
    one: f64,
    constant: f64,
    probability_rating: ProbabilityRating,
}

impl Portions {
    fn for_problem(config: &GreedyConfig, problem: &Problem) -> Self {
        let class = problem.cost_class();
        Self {
            class,
            probability: config.probability_portion(class),
            chvatal: config.chvatal_portion(class),
            one: config.strategy_one_portion,
            constant: config.add_constant(class),
            probability_rating: ProbabilityRating::from_config(config, class),
        }
    }

    /// Returns the rating iteration `iteration` has to use regardless of
    /// the proportions, if any.
    #[inline]
    fn forced(&self, iteration: u64) -> Option<(Rating, Option<Choice>)> {
        if !self.class.is_linear() {
            Some((Rating::Chvatal(ChvatalRating), None))
        } else if iteration == 0 {
            Some((Rating::Probability(self.probability_rating), None))
        } else {
            None
        }
    }

    /// Draws between the probability rating, Chvátal and the
    /// Marchiori-Steenbeek ratings. `None` stands for the latter.
    #[inline]
    fn draw<R>(&self, rng: &mut R) -> Option<(Rating, Choice)>
    where
        R: Rng + ?Sized,
    {
        let draw = rng.random::<f64>();
        if draw < self.probability {
            Some((Rating::Probability(self.probability_rating), Choice::Probability))
        } else if draw < self.probability + self.chvatal {
            Some((Rating::Chvatal(ChvatalRating), Choice::Chvatal))
        } else {
            None
        }
    }

    #[inline]
    fn march_steen(&self, add: RatingFormula, remove: RatingFormula) -> Rating {
        Rating::MarchSteen(MarchSteenRating::new(add, remove, self.constant))
    }
}

#[inline]
fn formula(one: bool) -> RatingFormula {
    if one {
        RatingFormula::InverseFrequency
    } else {
        RatingFormula::MemberUtility
    }
}

/// Draws the rating from constant proportions.
///
/// One draw picks the probability rating with probability `probability`,
/// the Chvátal rating with probability `chvatal` and a Marchiori-Steenbeek
/// rating otherwise. Its formulas are drawn independently for addition and
/// removal, choosing formula one with probability `one`. Weighted problems
/// always add with formula one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedMixing {
    portions: Portions,
}

impl FixedMixing {
    #[inline]
    pub fn for_problem(config: &GreedyConfig, problem: &Problem) -> Self {
        Self {
            portions: Portions::for_problem(config, problem),
        }
    }
}

impl MixingPolicy for FixedMixing {
    fn name(&self) -> &str {
        "FixedMixing"
    }

    fn choose_rating<R>(&mut self, iteration: u64, rng: &mut R) -> Rating
    where
        R: Rng + ?Sized,
    {
        let p = &self.portions;
        if let Some((rating, _)) = p.forced(iteration) {
            return rating;
        }
        if let Some((rating, _)) = p.draw(rng) {
            return rating;
        }
        let add = !p.class.is_uniform() || rng.random::<f64>() < p.one;
        let remove = rng.random::<f64>() < p.one;
        p.march_steen(formula(add), formula(remove))
    }

    #[inline]
    fn reward(&mut self, _success: bool) {}
}

/// Draws the rating from proportions adapted by rewards.
///
/// Ratings come in four flavours: the probability rating, Chvátal, formula
/// one for both moves, and formula two for removal (and for addition on
/// unicost problems). A reward multiplies the weight of the drawn flavour
/// among probability, Chvátal and Marchiori-Steenbeek by `portion_change`
/// on success and divides it on failure. Formula one versus two is a single
/// probability that is moved by taking its square root or its square.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptiveMixing {
    portions: Portions,
    change: f64,
    last: Option<Choice>,
}

impl AdaptiveMixing {
    /// Proportions are kept inside `[MIN_PORTION, 1 - MIN_PORTION]`.
    pub const MIN_PORTION: f64 = 0.01;

    #[inline]
    pub fn for_problem(config: &GreedyConfig, problem: &Problem) -> Self {
        Self {
            portions: Portions::for_problem(config, problem),
            change: config.portion_change,
            last: None,
        }
    }

    /// Returns the current probability of the probability rating.
    #[inline]
    pub fn probability_portion(&self) -> f64 {
        self.portions.probability
    }

    /// Returns the current probability of the Chvátal rating.
    #[inline]
    pub fn chvatal_portion(&self) -> f64 {
        self.portions.chvatal
    }

    /// Returns the current probability of formula one among the
    /// Marchiori-Steenbeek ratings.
    #[inline]
    pub fn one_portion(&self) -> f64 {
        self.portions.one
    }

    #[inline]
    fn clamp(value: f64) -> f64 {
        value.clamp(Self::MIN_PORTION, 1.0 - Self::MIN_PORTION)
    }

    /// Lifts every share to at least `MIN_PORTION` at the expense of the
    /// largest one.
    fn floor_shares(mut shares: [f64; 3]) -> [f64; 3] {
        let mut deficit = 0.0;
        for share in &mut shares {
            if *share < Self::MIN_PORTION {
                deficit += Self::MIN_PORTION - *share;
                *share = Self::MIN_PORTION;
            }
        }
        if let Some(largest) = shares.iter_mut().max_by(|a, b| a.total_cmp(b)) {
            *largest -= deficit;
        }
        shares
    }
}

impl MixingPolicy for AdaptiveMixing {
    fn name(&self) -> &str {
        "AdaptiveMixing"
    }

    fn choose_rating<R>(&mut self, iteration: u64, rng: &mut R) -> Rating
    where
        R: Rng + ?Sized,
    {
        let p = self.portions;
        if let Some((rating, choice)) = p.forced(iteration) {
            self.last = choice;
            return rating;
        }
        if let Some((rating, choice)) = p.draw(rng) {
            self.last = Some(choice);
            return rating;
        }
        if rng.random::<f64>() < p.one {
            self.last = Some(Choice::One);
            p.march_steen(RatingFormula::InverseFrequency, RatingFormula::InverseFrequency)
        } else {
            self.last = Some(Choice::Two);
            p.march_steen(formula(!p.class.is_uniform()), RatingFormula::MemberUtility)
        }
    }

    fn reward(&mut self, success: bool) {
        let Some(choice) = self.last.take() else {
            return;
        };

        let factor = if success { self.change } else { 1.0 / self.change };
        let probability = self.portions.probability;
        let chvatal = self.portions.chvatal;
        let mut weights = [
            probability,
            chvatal,
            (1.0 - probability - chvatal).max(0.0),
        ];
        weights[choice.slot()] *= factor;
        let total: f64 = weights.iter().sum();
        if total > 0.0 {
            let shares = Self::floor_shares(weights.map(|w| w / total));
            self.portions.probability = shares[0];
            self.portions.chvatal = shares[1];
        }

        let one = self.portions.one;
        let one = match (choice, success) {
            (Choice::Probability | Choice::Chvatal, _) => one,
            (Choice::One, true) | (Choice::Two, false) => one.sqrt(),
            (Choice::One, false) | (Choice::Two, true) => one * one,
        };
        self.portions.one = Self::clamp(one);
    }
}

/// The mixing policy configured for a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mixing {
    Fixed(FixedMixing),
    Adaptive(AdaptiveMixing),
}

impl Mixing {
    /// Builds the policy `config.mixing` names for `problem`.
    pub fn for_problem(config: &GreedyConfig, problem: &Problem) -> Self {
        match config.mixing {
            MixingKind::Fixed => Mixing::Fixed(FixedMixing::for_problem(config, problem)),
            MixingKind::Adaptive => {
                Mixing::Adaptive(AdaptiveMixing::for_problem(config, problem))
            }
        }
    }
}

impl MixingPolicy for Mixing {
    fn name(&self) -> &str {
        match self {
            Mixing::Fixed(m) => m.name(),
            Mixing::Adaptive(m) => m.name(),
        }
    }

    #[inline]
    fn choose_rating<R>(&mut self, iteration: u64, rng: &mut R) -> Rating
    where
        R: Rng + ?Sized,
    {
        match self {
            Mixing::Fixed(m) => m.choose_rating(iteration, rng),
            Mixing::Adaptive(m) => m.choose_rating(iteration, rng),
        }
    }

    #[inline]
    fn reward(&mut self, success: bool) {
        match self {
            Mixing::Fixed(m) => m.reward(success),
            Mixing::Adaptive(m) => m.reward(success),
        }
    }
}
