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

//! Outcome of an iterated greedy run.
//!
//! The outcome carries the best complete cover found, if any, the run
//! statistics and the reason the run ended. A run over a problem whose
//! universe cannot be covered ends `Infeasible` and carries the best partial
//! cover instead, so callers can still inspect how far it got.

use crate::stats::GreedyStatistics;
use mantle_model::family::Family;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GreedyTerminationReason {
    /// All configured iterations ran.
    IterationsExhausted,

    /// Some element is covered by no subset of the problem.
    Infeasible,

    /// The subsets that alone cover some element already form a cover.
    NecessarySubsetsSuffice,

    /// A monitor stopped the run. The string holds its reason.
    Aborted(String),
}

impl std::fmt::Display for GreedyTerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GreedyTerminationReason::IterationsExhausted => write!(f, "Iterations Exhausted"),
            GreedyTerminationReason::Infeasible => write!(f, "Infeasible"),
            GreedyTerminationReason::NecessarySubsetsSuffice => {
                write!(f, "Necessary Subsets Suffice")
            }
            GreedyTerminationReason::Aborted(msg) => write!(f, "Aborted: {}", msg),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GreedyOutcome<'p> {
    termination_reason: GreedyTerminationReason,
    family: Option<Family<'p>>,
    statistics: GreedyStatistics,
}

impl<'p> GreedyOutcome<'p> {
    #[inline]
    pub fn exhausted(family: Option<Family<'p>>, statistics: GreedyStatistics) -> Self {
        Self {
            termination_reason: GreedyTerminationReason::IterationsExhausted,
            family,
            statistics,
        }
    }

    /// Creates an outcome for an uncoverable problem, keeping the partial
    /// cover the run ended with.
    #[inline]
    pub fn infeasible(partial: Family<'p>, statistics: GreedyStatistics) -> Self {
        Self {
            termination_reason: GreedyTerminationReason::Infeasible,
            family: Some(partial),
            statistics,
        }
    }

    #[inline]
    pub fn necessary(family: Family<'p>, statistics: GreedyStatistics) -> Self {
        Self {
            termination_reason: GreedyTerminationReason::NecessarySubsetsSuffice,
            family: Some(family),
            statistics,
        }
    }

    #[inline]
    pub fn aborted<R>(family: Option<Family<'p>>, reason: R, statistics: GreedyStatistics) -> Self
    where
        R: Into<String>,
    {
        Self {
            termination_reason: GreedyTerminationReason::Aborted(reason.into()),
            family,
            statistics,
        }
    }

    #[inline]
    pub fn termination_reason(&self) -> &GreedyTerminationReason {
        &self.termination_reason
    }

    /// Returns the final family. Complete unless the run was infeasible.
    #[inline]
    pub fn family(&self) -> Option<&Family<'p>> {
        self.family.as_ref()
    }

    /// Returns the best complete cover, or `None` if no complete cover was found.
    #[inline]
    pub fn cover(&self) -> Option<&Family<'p>> {
        self.family.as_ref().filter(|f| f.is_complete())
    }

    #[inline]
    pub fn into_family(self) -> Option<Family<'p>> {
        self.family
    }

    #[inline]
    pub fn statistics(&self) -> &GreedyStatistics {
        &self.statistics
    }

    #[inline]
    pub fn is_feasible(&self) -> bool {
        self.termination_reason != GreedyTerminationReason::Infeasible
    }
}

impl std::fmt::Display for GreedyOutcome<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.family {
            Some(family) => write!(
                f,
                "GreedyOutcome({}, {} subsets, cost {})",
                self.termination_reason,
                family.len(),
                family.cost()
            ),
            None => write!(f, "GreedyOutcome({}, no cover)", self.termination_reason),
        }
    }
}
