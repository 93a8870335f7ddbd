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

use mantle_model::{family::Family, index::SubsetIndex};

/// Scores families for the reduction.
///
/// The score must be additive: for a non-member `s`,
/// `family_utility(F) + add_utility(F, s) == family_utility(F ∪ {s})`, and
/// symmetrically for removals.
pub trait ReductionUtility {
    fn name(&self) -> &str;

    /// Returns the utility of `family`.
    fn family_utility(&self, family: &Family<'_>) -> f64;

    /// Returns the utility gained by inserting `subset`.
    ///
    /// # Panics
    ///
    /// Panics if `subset` is already a member.
    fn add_utility(&self, family: &Family<'_>, subset: SubsetIndex) -> f64;

    /// Returns the (non-positive) utility change of removing `subset`.
    ///
    /// # Panics
    ///
    /// Panics if `subset` is not a member.
    fn remove_utility(&self, family: &Family<'_>, subset: SubsetIndex) -> f64;
}

impl std::fmt::Debug for dyn ReductionUtility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReductionUtility({})", self.name())
    }
}

/// Rewards covered elements and, to a lesser degree, repeated coverage.
///
/// `U(F) = covered(F) + Σ_e freq(e)^exponent / N`, where the first term is
/// dropped unless `with_element_count` is set. With an exponent below one the
/// first covering subset of an element earns more than any further one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyUtility {
    with_element_count: bool,
    exponent: f64,
}

impl Default for FrequencyUtility {
    fn default() -> Self {
        Self::new(true, 0.5)
    }
}

impl FrequencyUtility {
    /// # Panics
    ///
    /// Panics if `exponent` is not positive and finite.
    pub fn new(with_element_count: bool, exponent: f64) -> Self {
        assert!(
            exponent.is_finite() && exponent > 0.0,
            "called `FrequencyUtility::new()` with invalid exponent {}",
            exponent
        );
        Self {
            with_element_count,
            exponent,
        }
    }

    #[inline]
    fn power(&self, frequency: u32) -> f64 {
        if frequency == 0 {
            0.0
        } else {
            (frequency as f64).powf(self.exponent)
        }
    }

    #[inline]
    fn scale(family: &Family<'_>) -> f64 {
        family.universe().max(1) as f64
    }
}

impl ReductionUtility for FrequencyUtility {
    fn name(&self) -> &str {
        "FrequencyUtility"
    }

    fn family_utility(&self, family: &Family<'_>) -> f64 {
        let spread: f64 = family.frequencies().iter().map(|&f| self.power(f)).sum();
        let covered = if self.with_element_count {
            (family.universe() - family.uncovered_count()) as f64
        } else {
            0.0
        };
        covered + spread / Self::scale(family)
    }

    fn add_utility(&self, family: &Family<'_>, subset: SubsetIndex) -> f64 {
        assert!(
            !family.contains(subset),
            "called `FrequencyUtility::add_utility()` with member {}",
            subset
        );
        let frequencies = family.frequencies();
        let mut newly = 0usize;
        let mut spread = 0.0;
        for e in family.problem().subset(subset).elements() {
            let f = frequencies[e];
            if f == 0 {
                newly += 1;
            }
            spread += self.power(f + 1) - self.power(f);
        }
        let covered = if self.with_element_count { newly as f64 } else { 0.0 };
        covered + spread / Self::scale(family)
    }

    fn remove_utility(&self, family: &Family<'_>, subset: SubsetIndex) -> f64 {
        assert!(
            family.contains(subset),
            "called `FrequencyUtility::remove_utility()` with non-member {}",
            subset
        );
        let frequencies = family.frequencies();
        let mut lost = 0usize;
        let mut spread = 0.0;
        for e in family.problem().subset(subset).elements() {
            let f = frequencies[e];
            if f == 1 {
                lost += 1;
            }
            spread += self.power(f.saturating_sub(1)) - self.power(f);
        }
        let covered = if self.with_element_count { lost as f64 } else { 0.0 };
        spread / Self::scale(family) - covered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mantle_model::problem::{Problem, ProblemBuilder};

    fn problem() -> Problem {
        let mut builder = ProblemBuilder::new(4);
        builder.add_subset([0, 1], 1.0).unwrap();
        builder.add_subset([1, 2], 2.0).unwrap();
        builder.add_subset([2, 3], 1.0).unwrap();
        builder.build().unwrap()
    }

    fn idx(i: usize) -> SubsetIndex {
        SubsetIndex::new(i)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_family_utility() {
        let problem = problem();
        let utility = FrequencyUtility::default();
        assert_eq!(utility.family_utility(&problem.empty_family()), 0.0);

        let family = Family::from_indices(&problem, [idx(0), idx(1)]).unwrap();
        // Three covered elements, frequencies 1, 2, 1, 0.
        let expected = 3.0 + (2.0 + 2f64.sqrt()) / 4.0;
        assert!(approx(utility.family_utility(&family), expected));
    }

    #[test]
    fn test_marginal_utilities_are_additive() {
        let problem = problem();
        for utility in [FrequencyUtility::default(), FrequencyUtility::new(false, 0.5)] {
            let mut family = Family::from_indices(&problem, [idx(0)]).unwrap();
            for s in [idx(1), idx(2)] {
                let before = utility.family_utility(&family);
                let gain = utility.add_utility(&family, s);
                family.insert(s);
                assert!(approx(before + gain, utility.family_utility(&family)));
            }
            for s in [idx(0), idx(1)] {
                let before = utility.family_utility(&family);
                let loss = utility.remove_utility(&family, s);
                assert!(loss <= 0.0);
                family.remove(s);
                assert!(approx(before + loss, utility.family_utility(&family)));
            }
        }
    }

    #[test]
    #[should_panic(expected = "called `FrequencyUtility::add_utility()` with member")]
    fn test_add_utility_of_member_panics() {
        let problem = problem();
        let family = problem.full_family();
        FrequencyUtility::default().add_utility(&family, idx(0));
    }
}
