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

//! Tunables of the iterated greedy heuristic.
//!
//! Every constant the heuristic consults lives in one `GreedyConfig` value
//! that is passed by reference into the engine and the strategy
//! constructors. `Default` yields the reference parameters; the `with_*`
//! setters adjust single fields. Nothing is checked until `validate` runs,
//! which the engine does before the first iteration.

use mantle_model::problem::CostClass;
use thiserror::Error;

/// The error type for invalid heuristic parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A probability lies outside `[0, 1]`.
    #[error("{name} must be a probability in [0, 1], got {value}")]
    InvalidProbability { name: &'static str, value: f64 },

    /// A factor or constant is not positive and finite.
    #[error("{name} must be positive and finite, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    /// A factor that must exceed one does not.
    #[error("{name} must be greater than one, got {value}")]
    NotAboveOne { name: &'static str, value: f64 },

    /// An interval is empty or leaves its admissible range.
    #[error("interval [{low}, {high}] of {name} is invalid")]
    InvalidInterval {
        name: &'static str,
        low: f64,
        high: f64,
    },

    /// The rating portions of a cost class add up to more than one.
    #[error("rating portions of {class} problems add up to {sum}, more than one")]
    PortionsExceedOne { class: &'static str, sum: f64 },

    /// The iteration count is zero.
    #[error("the number of iterations must be positive")]
    ZeroIterations,
}

/// How a complete cover is perturbed between iterations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShrinkingKind {
    /// Every non-fixed member is dropped with the same probability.
    #[default]
    Uniform,

    /// Members are dropped with a probability proportional to their
    /// Chvátal remove rating.
    Proportional,
}

impl std::fmt::Display for ShrinkingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShrinkingKind::Uniform => write!(f, "Uniform"),
            ShrinkingKind::Proportional => write!(f, "Proportional"),
        }
    }
}

/// How the rating used by an iteration is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MixingKind {
    /// The configured portions never change.
    Fixed,

    /// Portions are rewarded or punished after every iteration.
    #[default]
    Adaptive,
}

impl std::fmt::Display for MixingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MixingKind::Fixed => write!(f, "Fixed"),
            MixingKind::Adaptive => write!(f, "Adaptive"),
        }
    }
}

/// Parameters of the iterated greedy heuristic.
///
/// # Examples
///
/// ```rust
/// # use mantle_greedy::config::{GreedyConfig, ShrinkingKind};
/// let config = GreedyConfig::default()
///     .with_iterations(25)
///     .with_seed(7)
///     .with_shrinking(ShrinkingKind::Proportional);
/// assert!(config.validate().is_ok());
/// assert!(config.with_tie_epsilon(-1.0).validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GreedyConfig {
    /// Number of grow/repair/shrink rounds.
    pub iterations: u64,
    /// Seed of the random generator, `0` draws one from the clock.
    pub seed: u64,
    /// Probability of picking an add candidate uniformly instead of by rating.
    pub add_random: f64,
    /// Probability of picking a remove candidate uniformly instead of by rating.
    pub remove_random: f64,
    /// Relative tolerance under which two ratings count as equal.
    pub tie_epsilon: f64,
    /// Probability of a removal step during growth although every member is necessary.
    pub remove_probability: f64,
    /// Portion of iterations rated by inclusion probabilities on unicost problems.
    pub uniform_probability_portion: f64,
    /// Portion of iterations rated by inclusion probabilities on all other problems.
    pub multi_probability_portion: f64,
    /// Portion of iterations rated by Chvátal on unicost problems.
    pub uniform_chvatal_portion: f64,
    /// Portion of iterations rated by Chvátal on all other problems.
    pub multi_chvatal_portion: f64,
    /// Probability of rating formula one in the Marchiori-Steenbeek rating.
    pub strategy_one_portion: f64,
    /// Multiplicative reward of the adaptive mixing policy.
    pub portion_change: f64,
    /// Constant of rating formula two on unicost problems.
    pub uniform_add_constant: f64,
    /// Constant of rating formula two on all other problems.
    pub multi_add_constant: f64,
    /// Refinement rounds of the inclusion probabilities.
    pub probability_rounds: usize,
    /// Share of the previous inclusion probability kept by each refinement round.
    pub probability_damping: f64,
    /// Exponent applied to probability over cost on unicost problems.
    pub uniform_probability_exponent: f64,
    /// Exponent applied to probability over cost on all other problems.
    pub multi_probability_exponent: f64,
    /// Lower bound of the restore fraction drawn by the shrinking.
    pub restore_low: f64,
    /// Upper bound of the restore fraction drawn by the shrinking.
    pub restore_high: f64,
    /// Probability of dropping every non-fixed member on unicost problems.
    pub uniform_zero_restore: f64,
    /// Probability of dropping every non-fixed member on linear problems.
    pub linear_zero_restore: f64,
    /// Probability of dropping every non-fixed member on non-linear problems.
    pub nonlinear_zero_restore: f64,
    /// Expected share of members dropped by the proportional shrinking.
    pub proportional_remove_portion: f64,
    pub shrinking: ShrinkingKind,
    pub mixing: MixingKind,
    pub use_inferior_opt: bool,
    pub use_add_one_opt: bool,
    pub use_add_two_opt: bool,
    /// Enables the tabu search repair on unicost problems.
    pub use_tabu_opt: bool,
    /// Largest redundant set that is searched exhaustively by the repairs.
    pub full_opt_border: usize,
    /// Tenure of the tabu search as a share of the cover size.
    pub tabu_factor: f64,
    /// Number of tabu tenures tried per repair.
    pub tabu_rounds: usize,
    /// Moves without improvement, scaled by the inverse mean density.
    pub tabu_change_factor: f64,
    /// Cost inflation of the partitioning conversion.
    pub partition_inflation: f64,
    /// Size of the supplementary margin of the reduction, relative to a minimal selection.
    pub reduction_margin: f64,
    /// Coverage frequency every element keeps in a reduced selection.
    pub reduction_min_frequency: u32,
}

impl Default for GreedyConfig {
    fn default() -> Self {
        Self {
            iterations: 10,
            seed: 1,
            add_random: 0.05,
            remove_random: 0.05,
            tie_epsilon: 0.001,
            remove_probability: 0.1,
            uniform_probability_portion: 0.2,
            multi_probability_portion: 0.25,
            uniform_chvatal_portion: 0.4,
            multi_chvatal_portion: 0.75,
            strategy_one_portion: 0.5,
            portion_change: 1.5,
            uniform_add_constant: 0.01,
            multi_add_constant: 1.0,
            probability_rounds: 10,
            probability_damping: 0.0,
            uniform_probability_exponent: 1.0,
            multi_probability_exponent: 2.0,
            restore_low: 0.6,
            restore_high: 0.8,
            uniform_zero_restore: 0.2,
            linear_zero_restore: 0.0,
            nonlinear_zero_restore: 0.0,
            proportional_remove_portion: 0.3,
            shrinking: ShrinkingKind::Uniform,
            mixing: MixingKind::Adaptive,
            use_inferior_opt: true,
            use_add_one_opt: true,
            use_add_two_opt: false,
            use_tabu_opt: true,
            full_opt_border: 8,
            tabu_factor: 0.2,
            tabu_rounds: 5,
            tabu_change_factor: 10.0,
            partition_inflation: 1.1,
            reduction_margin: 5.0,
            reduction_min_frequency: 0,
        }
    }
}

impl GreedyConfig {
    #[inline]
    pub fn with_iterations(mut self, iterations: u64) -> Self {
        self.iterations = iterations;
        self
    }

    #[inline]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[inline]
    pub fn with_random_selection(mut self, add: f64, remove: f64) -> Self {
        self.add_random = add;
        self.remove_random = remove;
        self
    }

    #[inline]
    pub fn with_tie_epsilon(mut self, epsilon: f64) -> Self {
        self.tie_epsilon = epsilon;
        self
    }

    #[inline]
    pub fn with_remove_probability(mut self, probability: f64) -> Self {
        self.remove_probability = probability;
        self
    }

    #[inline]
    pub fn with_chvatal_portions(mut self, uniform: f64, multi: f64) -> Self {
        self.uniform_chvatal_portion = uniform;
        self.multi_chvatal_portion = multi;
        self
    }

    #[inline]
    pub fn with_probability_portions(mut self, uniform: f64, multi: f64) -> Self {
        self.uniform_probability_portion = uniform;
        self.multi_probability_portion = multi;
        self
    }

    #[inline]
    pub fn with_probability_refinement(mut self, rounds: usize, damping: f64) -> Self {
        self.probability_rounds = rounds;
        self.probability_damping = damping;
        self
    }

    #[inline]
    pub fn with_restore_interval(mut self, low: f64, high: f64) -> Self {
        self.restore_low = low;
        self.restore_high = high;
        self
    }

    #[inline]
    pub fn with_zero_restore(mut self, uniform: f64, linear: f64, nonlinear: f64) -> Self {
        self.uniform_zero_restore = uniform;
        self.linear_zero_restore = linear;
        self.nonlinear_zero_restore = nonlinear;
        self
    }

    #[inline]
    pub fn with_shrinking(mut self, shrinking: ShrinkingKind) -> Self {
        self.shrinking = shrinking;
        self
    }

    #[inline]
    pub fn with_mixing(mut self, mixing: MixingKind) -> Self {
        self.mixing = mixing;
        self
    }

    /// Enables or disables the repair passes in their fixed order:
    /// inferior pruning, single additions, pair additions, tabu search.
    #[inline]
    pub fn with_optimizations(
        mut self,
        inferior: bool,
        add_one: bool,
        add_two: bool,
        tabu: bool,
    ) -> Self {
        self.use_inferior_opt = inferior;
        self.use_add_one_opt = add_one;
        self.use_add_two_opt = add_two;
        self.use_tabu_opt = tabu;
        self
    }

    #[inline]
    pub fn with_full_opt_border(mut self, border: usize) -> Self {
        self.full_opt_border = border;
        self
    }

    #[inline]
    pub fn with_partition_inflation(mut self, inflation: f64) -> Self {
        self.partition_inflation = inflation;
        self
    }

    #[inline]
    pub fn with_reduction(mut self, margin: f64, min_frequency: u32) -> Self {
        self.reduction_margin = margin;
        self.reduction_min_frequency = min_frequency;
        self
    }

    /// Returns the Chvátal portion for problems of `class`.
    #[inline]
    pub fn chvatal_portion(&self, class: CostClass) -> f64 {
        if class.is_uniform() {
            self.uniform_chvatal_portion
        } else {
            self.multi_chvatal_portion
        }
    }

    /// Returns the portion of the probability rating for problems of `class`.
    #[inline]
    pub fn probability_portion(&self, class: CostClass) -> f64 {
        if class.is_uniform() {
            self.uniform_probability_portion
        } else {
            self.multi_probability_portion
        }
    }

    /// Returns the exponent of the probability rating for problems of `class`.
    #[inline]
    pub fn probability_exponent(&self, class: CostClass) -> f64 {
        if class.is_uniform() {
            self.uniform_probability_exponent
        } else {
            self.multi_probability_exponent
        }
    }

    /// Returns the constant of rating formula two for problems of `class`.
    #[inline]
    pub fn add_constant(&self, class: CostClass) -> f64 {
        if class.is_uniform() {
            self.uniform_add_constant
        } else {
            self.multi_add_constant
        }
    }

    /// Returns the probability of dropping every non-fixed member for problems of `class`.
    #[inline]
    pub fn zero_restore(&self, class: CostClass) -> f64 {
        match class {
            CostClass::Uniform => self.uniform_zero_restore,
            CostClass::Linear => self.linear_zero_restore,
            CostClass::NonLinear => self.nonlinear_zero_restore,
        }
    }

    /// Checks every parameter.
    ///
    /// # Errors
    ///
    /// Returns the first parameter found out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }

        let probabilities = [
            ("add_random", self.add_random),
            ("remove_random", self.remove_random),
            ("remove_probability", self.remove_probability),
            ("uniform_probability_portion", self.uniform_probability_portion),
            ("multi_probability_portion", self.multi_probability_portion),
            ("probability_damping", self.probability_damping),
            ("uniform_chvatal_portion", self.uniform_chvatal_portion),
            ("multi_chvatal_portion", self.multi_chvatal_portion),
            ("strategy_one_portion", self.strategy_one_portion),
            ("uniform_zero_restore", self.uniform_zero_restore),
            ("linear_zero_restore", self.linear_zero_restore),
            ("nonlinear_zero_restore", self.nonlinear_zero_restore),
            ("proportional_remove_portion", self.proportional_remove_portion),
            ("tabu_factor", self.tabu_factor),
        ];
        for (name, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidProbability { name, value });
            }
        }

        let positives = [
            ("tie_epsilon", self.tie_epsilon),
            ("uniform_add_constant", self.uniform_add_constant),
            ("multi_add_constant", self.multi_add_constant),
            ("uniform_probability_exponent", self.uniform_probability_exponent),
            ("multi_probability_exponent", self.multi_probability_exponent),
            ("tabu_change_factor", self.tabu_change_factor),
            ("reduction_margin", self.reduction_margin),
        ];
        for (name, value) in positives {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NonPositive { name, value });
            }
        }

        let portions = [
            (
                "unicost",
                self.uniform_probability_portion + self.uniform_chvatal_portion,
            ),
            (
                "multicost",
                self.multi_probability_portion + self.multi_chvatal_portion,
            ),
        ];
        for (class, sum) in portions {
            if sum > 1.0 {
                return Err(ConfigError::PortionsExceedOne { class, sum });
            }
        }

        let above_one = [
            ("portion_change", self.portion_change),
            ("partition_inflation", self.partition_inflation),
        ];
        for (name, value) in above_one {
            if !(value.is_finite() && value > 1.0) {
                return Err(ConfigError::NotAboveOne { name, value });
            }
        }

        // Growth would never finish with certain removals.
        if self.remove_probability >= 1.0 {
            return Err(ConfigError::InvalidInterval {
                name: "remove_probability",
                low: 0.0,
                high: self.remove_probability,
            });
        }

        // A restore fraction of one would never drop a member.
        let restore_valid = 0.0 <= self.restore_low
            && self.restore_low <= self.restore_high
            && self.restore_high < 1.0;
        if !restore_valid {
            return Err(ConfigError::InvalidInterval {
                name: "restore",
                low: self.restore_low,
                high: self.restore_high,
            });
        }

        Ok(())
    }
}

impl std::fmt::Display for GreedyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "GreedyConfig(iterations: {}, seed: {}, shrinking: {}, mixing: {})",
            self.iterations, self.seed, self.shrinking, self.mixing
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = GreedyConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.iterations, 10);
        assert_eq!(config.full_opt_border, 8);
        assert_eq!(config.chvatal_portion(CostClass::Uniform), 0.4);
        assert_eq!(config.chvatal_portion(CostClass::NonLinear), 0.75);
        assert_eq!(config.add_constant(CostClass::Uniform), 0.01);
        assert_eq!(config.probability_portion(CostClass::Uniform), 0.2);
        assert_eq!(config.probability_portion(CostClass::Linear), 0.25);
        assert_eq!(config.probability_exponent(CostClass::NonLinear), 2.0);
        assert_eq!(config.zero_restore(CostClass::Uniform), 0.2);
        assert_eq!(config.zero_restore(CostClass::Linear), 0.0);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert_eq!(
            GreedyConfig::default().with_iterations(0).validate(),
            Err(ConfigError::ZeroIterations)
        );
        assert_eq!(
            GreedyConfig::default()
                .with_random_selection(1.5, 0.0)
                .validate(),
            Err(ConfigError::InvalidProbability {
                name: "add_random",
                value: 1.5
            })
        );
        assert!(matches!(
            GreedyConfig::default()
                .with_partition_inflation(1.0)
                .validate(),
            Err(ConfigError::NotAboveOne {
                name: "partition_inflation",
                ..
            })
        ));
        assert!(matches!(
            GreedyConfig::default()
                .with_restore_interval(0.8, 0.6)
                .validate(),
            Err(ConfigError::InvalidInterval { .. })
        ));
        assert!(
            GreedyConfig::default()
                .with_restore_interval(0.5, 1.0)
                .validate()
                .is_err()
        );
        assert_eq!(
            GreedyConfig::default()
                .with_probability_portions(0.7, 0.25)
                .validate(),
            Err(ConfigError::PortionsExceedOne {
                class: "unicost",
                sum: 0.7 + 0.4
            })
        );
        assert!(matches!(
            GreedyConfig::default()
                .with_probability_refinement(10, 1.5)
                .validate(),
            Err(ConfigError::InvalidProbability {
                name: "probability_damping",
                ..
            })
        ));
        assert!(
            GreedyConfig::default()
                .with_tie_epsilon(f64::NAN)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_display() {
        let text = GreedyConfig::default().to_string();
        assert!(text.contains("iterations: 10"));
        assert!(text.contains("Uniform"));
        assert!(text.contains("Adaptive"));
    }
}
