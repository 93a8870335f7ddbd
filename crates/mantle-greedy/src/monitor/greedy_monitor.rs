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

//! Monitoring interface for iterated greedy runs.
//!
//! The engine reports the start of a run, every finished iteration, every
//! improvement of the best cover and the end of the run. Before each
//! iteration it asks for a `SearchCommand`; the first `Terminate` ends the
//! run with the best cover found so far. The default `search_command`
//! continues, so observers that only log need not override it.

use crate::stats::GreedyStatistics;
use mantle_model::{family::Family, problem::Problem};

/// Whether the engine should run another iteration.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub enum SearchCommand {
    #[default]
    Continue,
    Terminate(String),
}

impl std::fmt::Display for SearchCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchCommand::Continue => write!(f, "Continue"),
            SearchCommand::Terminate(reason) => write!(f, "Terminate: {}", reason),
        }
    }
}

/// A monitor for the iterated greedy engine.
pub trait GreedyMonitor {
    /// Returns the name of the monitor.
    fn name(&self) -> &str;

    /// Called once before the first iteration.
    fn on_start(&mut self, problem: &Problem);

    /// Called after each iteration with the cover it produced.
    fn on_iteration(&mut self, cover: &Family<'_>, statistics: &GreedyStatistics);

    /// Called when the best cover is replaced.
    fn on_improvement(&mut self, best: &Family<'_>, statistics: &GreedyStatistics);

    /// Called once after the last iteration.
    fn on_end(&mut self, best: Option<&Family<'_>>, statistics: &GreedyStatistics);

    /// Determines whether the next iteration runs.
    fn search_command(&mut self, _statistics: &GreedyStatistics) -> SearchCommand {
        SearchCommand::Continue
    }
}

impl std::fmt::Debug for dyn GreedyMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GreedyMonitor {{ name: {} }}", self.name())
    }
}

impl std::fmt::Display for dyn GreedyMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GreedyMonitor: {}", self.name())
    }
}

impl<M> GreedyMonitor for &mut M
where
    M: GreedyMonitor + ?Sized,
{
    fn name(&self) -> &str {
        (**self).name()
    }

    fn on_start(&mut self, problem: &Problem) {
        (**self).on_start(problem)
    }

    fn on_iteration(&mut self, cover: &Family<'_>, statistics: &GreedyStatistics) {
        (**self).on_iteration(cover, statistics)
    }

    fn on_improvement(&mut self, best: &Family<'_>, statistics: &GreedyStatistics) {
        (**self).on_improvement(best, statistics)
    }

    fn on_end(&mut self, best: Option<&Family<'_>>, statistics: &GreedyStatistics) {
        (**self).on_end(best, statistics)
    }

    fn search_command(&mut self, statistics: &GreedyStatistics) -> SearchCommand {
        (**self).search_command(statistics)
    }
}
