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

//! Wall-clock termination of iterated greedy runs.
//!
//! `TimeLimitMonitor` records the start time in `on_start` and terminates
//! the run once the elapsed time reaches the limit. The iteration counter is
//! masked with `clock_check_mask` and the clock is only read when the masked
//! value is zero. Greedy iterations are expensive, so the default mask reads
//! the clock before every iteration; `with_mask` trades responsiveness for
//! fewer clock reads.

use crate::{
    monitor::greedy_monitor::{GreedyMonitor, SearchCommand},
    stats::GreedyStatistics,
};
use mantle_model::{family::Family, problem::Problem};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeLimitMonitor {
    start_time: Instant,
    time_limit: Duration,
    clock_check_mask: u64,
}

impl TimeLimitMonitor {
    const DEFAULT_CLOCK_CHECK_MASK: u64 = 0;

    pub fn new(time_limit: Duration) -> Self {
        Self {
            start_time: Instant::now(),
            time_limit,
            clock_check_mask: Self::DEFAULT_CLOCK_CHECK_MASK,
        }
    }

    /// Creates a monitor that reads the clock only when
    /// `iterations & clock_check_mask == 0`.
    pub fn with_mask(time_limit: Duration, clock_check_mask: u64) -> Self {
        Self {
            start_time: Instant::now(),
            time_limit,
            clock_check_mask,
        }
    }

    #[inline]
    pub fn time_limit(&self) -> Duration {
        self.time_limit
    }
}

impl GreedyMonitor for TimeLimitMonitor {
    fn name(&self) -> &str {
        "TimeLimitMonitor"
    }

    fn on_start(&mut self, _problem: &Problem) {
        self.start_time = Instant::now();
    }

    fn on_iteration(&mut self, _cover: &Family<'_>, _statistics: &GreedyStatistics) {}

    fn on_improvement(&mut self, _best: &Family<'_>, _statistics: &GreedyStatistics) {}

    fn on_end(&mut self, _best: Option<&Family<'_>>, _statistics: &GreedyStatistics) {}

    fn search_command(&mut self, statistics: &GreedyStatistics) -> SearchCommand {
        if (statistics.iterations & self.clock_check_mask) == 0
            && self.start_time.elapsed() >= self.time_limit
        {
            return SearchCommand::Terminate("time limit exceeded".to_string());
        }
        SearchCommand::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mantle_model::problem::ProblemBuilder;

    #[test]
    fn test_zero_limit_terminates() {
        let problem = ProblemBuilder::new(0).build().unwrap();
        let mut monitor = TimeLimitMonitor::new(Duration::ZERO);
        monitor.on_start(&problem);
        assert_eq!(
            monitor.search_command(&GreedyStatistics::default()),
            SearchCommand::Terminate("time limit exceeded".to_string())
        );
    }

    #[test]
    fn test_mask_skips_clock() {
        let mut monitor = TimeLimitMonitor::with_mask(Duration::ZERO, 0b11);
        let stats = GreedyStatistics {
            iterations: 1,
            ..Default::default()
        };
        assert_eq!(monitor.search_command(&stats), SearchCommand::Continue);
    }

    #[test]
    fn test_generous_limit_continues() {
        let mut monitor = TimeLimitMonitor::new(Duration::from_secs(3600));
        assert_eq!(
            monitor.search_command(&GreedyStatistics::default()),
            SearchCommand::Continue
        );
    }
}
