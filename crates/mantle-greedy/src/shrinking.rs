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

//! Perturbation of covers between iterations.
//!
//! A shrinking turns a (usually complete) cover into a smaller partial
//! cover that seeds the next growth phase. Members listed as fixed are never
//! removed. Removal passes are repeated until the result is no longer a
//! complete cover; no target size is aimed for, the only goal is to leave
//! work for the growth phase.
//!
//! Two cases end the shrinking early with every non-fixed member removed:
//! when there is nothing to remove, and when even removing everything
//! removable keeps the cover complete (the fixed members alone cover the
//! universe).

use crate::{
    config::{GreedyConfig, ShrinkingKind},
    rating::{CandidateRating, ChvatalRating},
};
use fixedbitset::FixedBitSet;
use mantle_model::{family::Family, index::SubsetIndex, problem::CostClass};
use rand::Rng;

/// Perturbs a cover by dropping members.
pub trait FamilyShrinking {
    /// Returns the name of the shrinking.
    fn name(&self) -> &str;

    /// Returns a partial cover derived from `cover` that keeps every member
    /// listed in `fixed`.
    fn shrink<'p, R>(&self, cover: &Family<'p>, fixed: &[SubsetIndex], rng: &mut R) -> Family<'p>
    where
        R: Rng + ?Sized;
}

/// Probabilities of removing every non-fixed member at once, per cost class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZeroRestore {
    pub uniform: f64,
    pub linear: f64,
    pub nonlinear: f64,
}

impl Default for ZeroRestore {
    fn default() -> Self {
        Self {
            uniform: 0.2,
            linear: 0.0,
            nonlinear: 0.0,
        }
    }
}

impl ZeroRestore {
    #[inline]
    pub fn from_config(config: &GreedyConfig) -> Self {
        Self {
            uniform: config.uniform_zero_restore,
            linear: config.linear_zero_restore,
            nonlinear: config.nonlinear_zero_restore,
        }
    }

    #[inline]
    pub fn for_class(&self, class: CostClass) -> f64 {
        match class {
            CostClass::Uniform => self.uniform,
            CostClass::Linear => self.linear,
            CostClass::NonLinear => self.nonlinear,
        }
    }
}

/// The removable members of `cover`, together with the cover that is left
/// when all of them are gone.
struct Removable<'p> {
    candidates: Vec<SubsetIndex>,
    stripped: Family<'p>,
}

impl<'p> Removable<'p> {
    fn new(cover: &Family<'p>, fixed: &[SubsetIndex]) -> Self {
        let mut keep = FixedBitSet::with_capacity(cover.problem().len());
        for s in fixed {
            keep.insert(s.get());
        }
        let candidates: Vec<SubsetIndex> = cover
            .members()
            .filter(|s| !keep.contains(s.get()))
            .collect();
        let mut stripped = cover.clone();
        for &s in &candidates {
            stripped.remove(s);
        }
        Self {
            candidates,
            stripped,
        }
    }

    /// Returns `true` if shrinking has to remove everything removable.
    #[inline]
    fn is_trivial(&self) -> bool {
        self.candidates.is_empty() || self.stripped.is_complete()
    }
}

/// Removes every non-fixed member with the same probability.
///
/// Each pass draws a restore fraction: zero with the class dependent
/// probability, uniform in `[low, high)` otherwise. Every remaining
/// candidate is then removed unless a uniform draw falls below the fraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformShrinking {
    restore_low: f64,
    restore_high: f64,
    zero_restore: ZeroRestore,
}

impl Default for UniformShrinking {
    fn default() -> Self {
        Self::new(0.6, 0.8, ZeroRestore::default())
    }
}

impl UniformShrinking {
    /// Creates the shrinking.
    ///
    /// # Panics
    ///
    /// Panics unless `0 <= restore_low <= restore_high < 1`.
    pub fn new(restore_low: f64, restore_high: f64, zero_restore: ZeroRestore) -> Self {
        assert!(
            0.0 <= restore_low && restore_low <= restore_high && restore_high < 1.0,
            "called `UniformShrinking::new()` with invalid restore interval [{}, {}]",
            restore_low,
            restore_high
        );
        Self {
            restore_low,
            restore_high,
            zero_restore,
        }
    }
}

impl FamilyShrinking for UniformShrinking {
    fn name(&self) -> &str {
        "UniformShrinking"
    }

    fn shrink<'p, R>(&self, cover: &Family<'p>, fixed: &[SubsetIndex], rng: &mut R) -> Family<'p>
    where
        R: Rng + ?Sized,
    {
        let removable = Removable::new(cover, fixed);
        if removable.is_trivial() {
            return removable.stripped;
        }

        let zero = self.zero_restore.for_class(cover.problem().cost_class());
        let mut shrunk = cover.clone();
        loop {
            let restore = if rng.random::<f64>() < zero {
                0.0
            } else {
                self.restore_low + (self.restore_high - self.restore_low) * rng.random::<f64>()
            };
            for &s in &removable.candidates {
                if shrunk.contains(s) && rng.random::<f64>() >= restore {
                    shrunk.remove(s);
                }
            }
            if !shrunk.is_complete() {
                return shrunk;
            }
        }
    }
}

/// Removes members with a probability proportional to their Chvátal
/// remove rating, aiming at a fixed share of the removable members per pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProportionalShrinking {
    remove_portion: f64,
    zero_restore: ZeroRestore,
}

impl Default for ProportionalShrinking {
    fn default() -> Self {
        Self::new(0.3, ZeroRestore::default())
    }
}

impl ProportionalShrinking {
    /// Creates the shrinking.
    ///
    /// # Panics
    ///
    /// Panics if `remove_portion` leaves `[0, 1]`.
    pub fn new(remove_portion: f64, zero_restore: ZeroRestore) -> Self {
        assert!(
            (0.0..=1.0).contains(&remove_portion),
            "called `ProportionalShrinking::new()` with invalid portion {}",
            remove_portion
        );
        Self {
            remove_portion,
            zero_restore,
        }
    }
}

impl FamilyShrinking for ProportionalShrinking {
    fn name(&self) -> &str {
        "ProportionalShrinking"
    }

    fn shrink<'p, R>(&self, cover: &Family<'p>, fixed: &[SubsetIndex], rng: &mut R) -> Family<'p>
    where
        R: Rng + ?Sized,
    {
        let removable = Removable::new(cover, fixed);
        if removable.is_trivial() {
            return removable.stripped;
        }

        let zero = self.zero_restore.for_class(cover.problem().cost_class());
        if rng.random::<f64>() < zero {
            return removable.stripped;
        }

        let target = (self.remove_portion * removable.candidates.len() as f64).round();
        if target == 0.0 {
            return removable.stripped;
        }

        let mut shrunk = cover.clone();
        let mut rated = Vec::with_capacity(removable.candidates.len());
        loop {
            // Re-rated every pass over the members still present.
            rated.clear();
            for &s in &removable.candidates {
                if shrunk.contains(s) {
                    let rating = ChvatalRating.remove_value(&mut shrunk, s);
                    rated.push((s, rating));
                }
            }
            let sum: f64 = rated.iter().map(|&(_, r)| r).sum();
            // Members rated zero are never drawn; once only they are left,
            // they go all at once.
            if !(sum > 0.0 && sum.is_finite()) {
                return removable.stripped;
            }

            for &(s, r) in &rated {
                if rng.random::<f64>() < target * r / sum {
                    shrunk.remove(s);
                }
            }
            if !shrunk.is_complete() {
                return shrunk;
            }
        }
    }
}

/// The shrinking configured for a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shrinking {
    Uniform(UniformShrinking),
    Proportional(ProportionalShrinking),
}

impl Shrinking {
    /// Builds the shrinking `config.shrinking` names.
    pub fn from_config(config: &GreedyConfig) -> Self {
        let zero_restore = ZeroRestore::from_config(config);
        match config.shrinking {
            ShrinkingKind::Uniform => Shrinking::Uniform(UniformShrinking::new(
                config.restore_low,
                config.restore_high,
                zero_restore,
            )),
            ShrinkingKind::Proportional => Shrinking::Proportional(ProportionalShrinking::new(
                config.proportional_remove_portion,
                zero_restore,
            )),
        }
    }
}

impl FamilyShrinking for Shrinking {
    fn name(&self) -> &str {
        match self {
            Shrinking::Uniform(s) => s.name(),
            Shrinking::Proportional(s) => s.name(),
        }
    }

    #[inline]
    fn shrink<'p, R>(&self, cover: &Family<'p>, fixed: &[SubsetIndex], rng: &mut R) -> Family<'p>
    where
        R: Rng + ?Sized,
    {
        match self {
            Shrinking::Uniform(s) => s.shrink(cover, fixed, rng),
            Shrinking::Proportional(s) => s.shrink(cover, fixed, rng),
        }
    }
}
