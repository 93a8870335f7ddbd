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

//! Progress reporting through `tracing`.
//!
//! `LogMonitor` emits an `info` event when a run starts, whenever the best
//! cover improves and when the run ends. Per-iteration progress is emitted
//! at `debug` level, at most once per `log_interval`.

use crate::{monitor::greedy_monitor::GreedyMonitor, stats::GreedyStatistics};
use mantle_model::{family::Family, problem::Problem};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct LogMonitor {
    start_time: Instant,
    last_log_time: Instant,
    log_interval: Duration,
    best_cost: Option<f64>,
}

impl LogMonitor {
    pub fn new(log_interval: Duration) -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_log_time: now,
            log_interval,
            best_cost: None,
        }
    }

    /// Returns the cost of the best cover reported so far.
    #[inline]
    pub fn best_cost(&self) -> Option<f64> {
        self.best_cost
    }
}

impl Default for LogMonitor {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl std::fmt::Display for LogMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LogMonitor(log_interval: {:?})", self.log_interval)
    }
}

impl GreedyMonitor for LogMonitor {
    fn name(&self) -> &str {
        "LogMonitor"
    }

    fn on_start(&mut self, problem: &Problem) {
        self.start_time = Instant::now();
        self.last_log_time = self.start_time;
        self.best_cost = None;
        tracing::info!(
            universe = problem.universe(),
            subsets = problem.len(),
            cost_class = %problem.cost_class(),
            "iterated greedy started"
        );
    }

    fn on_iteration(&mut self, cover: &Family<'_>, statistics: &GreedyStatistics) {
        let now = Instant::now();
        if now.duration_since(self.last_log_time) < self.log_interval {
            return;
        }
        self.last_log_time = now;
        tracing::debug!(
            elapsed = ?now.duration_since(self.start_time),
            iteration = statistics.iterations,
            cover_cost = cover.cost(),
            best_cost = ?self.best_cost,
            "iteration finished"
        );
    }

    fn on_improvement(&mut self, best: &Family<'_>, statistics: &GreedyStatistics) {
        self.best_cost = Some(best.cost());
        tracing::info!(
            iteration = statistics.iterations,
            subsets = best.len(),
            cost = best.cost(),
            "new best cover"
        );
    }

    fn on_end(&mut self, best: Option<&Family<'_>>, statistics: &GreedyStatistics) {
        match best {
            Some(best) => tracing::info!(
                iterations = statistics.iterations,
                improvements = statistics.improvements,
                subsets = best.len(),
                cost = best.cost(),
                elapsed = ?statistics.time_total,
                "iterated greedy finished"
            ),
            None => tracing::info!(
                iterations = statistics.iterations,
                elapsed = ?statistics.time_total,
                "iterated greedy finished without a cover"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mantle_model::problem::ProblemBuilder;

    #[test]
    fn test_tracks_best_cost() {
        let mut builder = ProblemBuilder::new(1);
        builder.add_subset([0], 2.5).unwrap();
        let problem = builder.build().unwrap();

        let mut monitor = LogMonitor::default();
        monitor.on_start(&problem);
        assert_eq!(monitor.best_cost(), None);
        monitor.on_improvement(&problem.full_family(), &GreedyStatistics::default());
        assert_eq!(monitor.best_cost(), Some(2.5));
        monitor.on_start(&problem);
        assert_eq!(monitor.best_cost(), None);
    }
}
