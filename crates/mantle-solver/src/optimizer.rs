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

//! The interfaces every covering solver implements.
//!
//! A `CoverOptimizer` searches for a cheap cover of a problem, optionally
//! starting from a known cover. A `CoverDecision` answers whether a cover
//! cheaper than a threshold exists and returns one if so. The adapters in
//! `convert` and `reduction` wrap an optimizer and implement the same
//! interface, so they can be stacked.
//!
//! Returned families always belong to the problem that was passed in, even
//! when an adapter solved a derived problem internally.

use crate::error::SolveError;
use mantle_model::{family::Family, problem::Problem};

/// Searches for a cheap cover.
pub trait CoverOptimizer {
    /// Returns the name of the optimizer.
    fn name(&self) -> &str;

    /// Returns the best family found for `problem`.
    ///
    /// The family is complete whenever the problem can be covered at all;
    /// otherwise it is the best partial cover found. `None` means the
    /// optimizer declined to produce a family, e.g. because a partitioning
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if `known` belongs to another problem or is not a
    /// complete cover, or if the problem does not suit the optimizer.
    fn optimize<'p>(
        &mut self,
        problem: &'p Problem,
        known: Option<&Family<'p>>,
    ) -> Result<Option<Family<'p>>, SolveError>;

    /// Returns a short report including the number of processed problems.
    fn statistics(&self) -> String;
}

/// Decides whether a cover below a cost threshold exists.
pub trait CoverDecision {
    /// Returns the name of the decision procedure.
    fn name(&self) -> &str;

    /// Returns a complete cover of `problem` strictly cheaper than
    /// `threshold`, or `None` if none was found.
    ///
    /// # Errors
    ///
    /// Returns an error under the same conditions as `CoverOptimizer::optimize`.
    fn decide<'p>(
        &mut self,
        problem: &'p Problem,
        threshold: f64,
        known: Option<&Family<'p>>,
    ) -> Result<Option<Family<'p>>, SolveError>;

    /// Returns a short report including the number of processed problems.
    fn statistics(&self) -> String;
}

impl std::fmt::Debug for dyn CoverOptimizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CoverOptimizer({})", self.name())
    }
}

impl std::fmt::Display for dyn CoverOptimizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CoverOptimizer({})", self.name())
    }
}

impl std::fmt::Debug for dyn CoverDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CoverDecision({})", self.name())
    }
}

/// Formats the report shared by all optimizers.
#[inline]
pub(crate) fn processed_report(name: &str, processed: u64) -> String {
    format!("{}: {} problems processed", name, processed)
}

/// Rebuilds `family`, a family over a derived problem whose subsets carry
/// origins, as a family over `original`.
///
/// Subsets without an origin keep their index.
pub(crate) fn map_to_original<'p>(
    original: &'p Problem,
    family: &Family<'_>,
) -> Result<Family<'p>, SolveError> {
    let derived = family.problem();
    let members = family
        .members()
        .map(|s| derived.subset(s).origin().unwrap_or(s));
    Ok(Family::from_indices(original, members)?)
}
