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

//! Termination after a fixed number of iterations.
//!
//! The engine already stops after `GreedyConfig::iterations`; this monitor
//! imposes a tighter bound on one run without touching the configuration,
//! which is what the adapters use when they call the engine repeatedly.

use crate::{
    monitor::greedy_monitor::{GreedyMonitor, SearchCommand},
    stats::GreedyStatistics,
};
use mantle_model::{family::Family, problem::Problem};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IterationLimitMonitor {
    limit: u64,
}

impl IterationLimitMonitor {
    #[inline]
    pub fn new(limit: u64) -> Self {
        Self { limit }
    }

    #[inline]
    pub fn limit(&self) -> u64 {
        self.limit
    }
}

impl GreedyMonitor for IterationLimitMonitor {
    fn name(&self) -> &str {
        "IterationLimitMonitor"
    }

    fn on_start(&mut self, _problem: &Problem) {}

    fn on_iteration(&mut self, _cover: &Family<'_>, _statistics: &GreedyStatistics) {}

    fn on_improvement(&mut self, _best: &Family<'_>, _statistics: &GreedyStatistics) {}

    fn on_end(&mut self, _best: Option<&Family<'_>>, _statistics: &GreedyStatistics) {}

    fn search_command(&mut self, statistics: &GreedyStatistics) -> SearchCommand {
        if statistics.iterations >= self.limit {
            return SearchCommand::Terminate("iteration limit reached".to_string());
        }
        SearchCommand::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminates_at_limit() {
        let mut monitor = IterationLimitMonitor::new(2);
        let mut stats = GreedyStatistics::default();
        assert_eq!(monitor.search_command(&stats), SearchCommand::Continue);
        stats.on_iteration();
        assert_eq!(monitor.search_command(&stats), SearchCommand::Continue);
        stats.on_iteration();
        assert_eq!(
            monitor.search_command(&stats),
            SearchCommand::Terminate("iteration limit reached".to_string())
        );
    }
}
