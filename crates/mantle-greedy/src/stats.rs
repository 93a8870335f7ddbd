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

//! Counters of an iterated greedy run.
//!
//! `GreedyStatistics` is updated by the engine once per event and handed to
//! every monitor callback. Counters saturate instead of wrapping.

use mantle_core::num::saturating::SaturatingAddVal;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct GreedyStatistics {
    /// Number of completed iterations.
    pub iterations: u64,

    /// Number of iterations whose cover replaced the best one.
    pub improvements: u64,

    /// Subsets inserted during growth phases.
    pub additions: u64,

    /// Subsets removed during growth phases.
    pub removals: u64,

    /// Number of times the repair passes made a grown cover cheaper.
    pub repair_improvements: u64,

    /// Total time taken by the run.
    pub time_total: Duration,
}

impl GreedyStatistics {
    #[inline]
    pub fn on_iteration(&mut self) {
        self.iterations = self.iterations.saturating_add_val(1);
    }

    #[inline]
    pub fn on_improvement(&mut self) {
        self.improvements = self.improvements.saturating_add_val(1);
    }

    /// Records the moves of one growth phase.
    #[inline]
    pub fn on_growth(&mut self, additions: u64, removals: u64) {
        self.additions = self.additions.saturating_add_val(additions);
        self.removals = self.removals.saturating_add_val(removals);
    }

    #[inline]
    pub fn on_repair_improvement(&mut self) {
        self.repair_improvements = self.repair_improvements.saturating_add_val(1);
    }

    #[inline]
    pub fn set_total_time(&mut self, duration: Duration) {
        self.time_total = duration;
    }
}

impl std::fmt::Display for GreedyStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Mantle-Greedy Statistics:")?;
        writeln!(f, "   Iterations:           {}", self.iterations)?;
        writeln!(f, "   Improvements:         {}", self.improvements)?;
        writeln!(f, "   Additions:            {}", self.additions)?;
        writeln!(f, "   Removals:             {}", self.removals)?;
        writeln!(f, "   Repair Improvements:  {}", self.repair_improvements)?;
        writeln!(f, "   Total Time:           {:?}", self.time_total)?;
        Ok(())
    }
}
