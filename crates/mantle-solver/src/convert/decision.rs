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

use crate::{
    error::SolveError,
    optimizer::{CoverDecision, CoverOptimizer, processed_report},
};
use mantle_core::num::saturating::SaturatingAddVal;
use mantle_model::{family::Family, problem::Problem};

/// Decides the cost threshold question with an optimizer.
///
/// The inner optimizer searches for a cheap cover, starting from the known
/// cover if one is given; the result is accepted only if it is complete and
/// strictly cheaper than the threshold.
#[derive(Debug, Clone)]
pub struct DecisionByOptimization<O> {
    inner: O,
    processed: u64,
}

impl<O> DecisionByOptimization<O>
where
    O: CoverOptimizer,
{
    #[inline]
    pub fn new(inner: O) -> Self {
        Self {
            inner,
            processed: 0,
        }
    }

    #[inline]
    pub fn inner(&self) -> &O {
        &self.inner
    }
}

impl<O> CoverDecision for DecisionByOptimization<O>
where
    O: CoverOptimizer,
{
    fn name(&self) -> &str {
        "DecisionByOptimization"
    }

    fn decide<'p>(
        &mut self,
        problem: &'p Problem,
        threshold: f64,
        known: Option<&Family<'p>>,
    ) -> Result<Option<Family<'p>>, SolveError> {
        self.processed = self.processed.saturating_add_val(1);
        let found = self.inner.optimize(problem, known)?;
        let accepted = found.filter(|f| f.is_complete() && f.cost() < threshold);
        tracing::debug!(threshold, accepted = accepted.is_some(), "decided cost threshold");
        Ok(accepted)
    }

    fn statistics(&self) -> String {
        format!(
            "{}\n{}",
            processed_report(self.name(), self.processed),
            self.inner.statistics()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::greedy::IteratedGreedySolver;
    use mantle_greedy::config::GreedyConfig;
    use mantle_model::problem::ProblemBuilder;

    fn problem() -> Problem {
        let mut builder = ProblemBuilder::new(4);
        builder.add_subset([0, 1], 1.0).unwrap();
        builder.add_subset([2, 3], 1.0).unwrap();
        builder.add_subset([0, 1, 2, 3], 3.0).unwrap();
        builder.build().unwrap()
    }

    fn decision() -> DecisionByOptimization<IteratedGreedySolver> {
        let config = GreedyConfig::default().with_iterations(10).with_seed(42);
        DecisionByOptimization::new(IteratedGreedySolver::new(config).unwrap())
    }

    #[test]
    fn test_accepts_cover_below_threshold() {
        let problem = problem();
        let mut decision = decision();
        let found = decision.decide(&problem, 2.5, None).unwrap().unwrap();
        assert!(found.is_complete());
        assert_eq!(found.cost(), 2.0);
    }

    #[test]
    fn test_threshold_is_strict() {
        let problem = problem();
        let mut decision = decision();
        assert!(decision.decide(&problem, 2.0, None).unwrap().is_none());
        assert!(decision.decide(&problem, 1.0, None).unwrap().is_none());
        assert_eq!(decision.inner().processed(), 2);
        assert!(
            decision
                .statistics()
                .starts_with("DecisionByOptimization: 2 problems processed")
        );
    }

    #[test]
    fn test_starts_from_known_cover() {
        let problem = problem();
        let known =
            Family::from_indices(&problem, [mantle_model::index::SubsetIndex::new(2)]).unwrap();
        let mut decision = decision();
        let found = decision.decide(&problem, 3.5, Some(&known)).unwrap().unwrap();
        assert!(found.cost() <= 3.0);
    }

    #[test]
    fn test_incomplete_result_is_rejected() {
        let mut builder = ProblemBuilder::new(2);
        builder.add_subset([0], 1.0).unwrap();
        let problem = builder.build().unwrap();
        let mut decision = decision();
        assert!(decision.decide(&problem, 100.0, None).unwrap().is_none());
    }
}
