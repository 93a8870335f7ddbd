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
    config::GreedyConfig,
    optimization::{
        Optimization, RepairPass,
        add_one::AddOneOptimization,
        add_two::AddTwoOptimization,
        inferior::InferiorOptimization,
        support::{RepairContext, strip_unnecessary},
        tabu::TabuOptimization,
    },
};
use mantle_model::family::Family;
use rand::Rng;

/// Applies a list of repair passes one after another.
///
/// Each pass starts from the cheapest cover found so far, with its
/// unnecessary members stripped first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SequenceOptimization {
    passes: Vec<RepairPass>,
}

impl SequenceOptimization {
    #[inline]
    pub fn new() -> Self {
        Self { passes: Vec::new() }
    }

    /// Builds the sequence the configuration enables, in the order
    /// inferior, add-one, add-two, tabu.
    pub fn from_config(config: &GreedyConfig) -> Self {
        let mut sequence = Self::new();
        if config.use_inferior_opt {
            sequence.add_pass(RepairPass::Inferior(InferiorOptimization));
        }
        if config.use_add_one_opt {
            sequence.add_pass(RepairPass::AddOne(AddOneOptimization));
        }
        if config.use_add_two_opt {
            sequence.add_pass(RepairPass::AddTwo(AddTwoOptimization));
        }
        if config.use_tabu_opt {
            sequence.add_pass(RepairPass::Tabu(TabuOptimization::new(
                config.tabu_factor,
                config.tabu_rounds,
                config.tabu_change_factor,
            )));
        }
        sequence
    }

    #[inline]
    pub fn add_pass(&mut self, pass: RepairPass) {
        self.passes.push(pass);
    }

    #[inline]
    pub fn passes(&self) -> &[RepairPass] {
        &self.passes
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

impl Optimization for SequenceOptimization {
    fn name(&self) -> &str {
        "SequenceOptimization"
    }

    fn optimize<'p, R>(
        &self,
        cover: &Family<'p>,
        best: Option<&Family<'p>>,
        ctx: &RepairContext<'_>,
        rng: &mut R,
    ) -> Option<Family<'p>>
    where
        R: Rng + ?Sized,
    {
        if !cover.is_complete() {
            return None;
        }

        let mut current = cover.clone();
        strip_unnecessary(&mut current);
        for pass in &self.passes {
            strip_unnecessary(&mut current);
            if let Some(next) = pass.optimize(&current, best, ctx, rng) {
                tracing::trace!(
                    pass = pass.name(),
                    from = current.cost(),
                    to = next.cost(),
                    "repair pass improved cover"
                );
                current = next;
            }
        }

        (current.cost() < cover.cost()).then_some(current)
    }
}

impl std::fmt::Display for SequenceOptimization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SequenceOptimization(")?;
        for (i, pass) in self.passes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", pass)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        creation::Creation,
        rating::{ChvatalRating, Rating},
        selection::BestRatingSelection,
    };
    use mantle_model::{index::SubsetIndex, problem::ProblemBuilder};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn idx(i: usize) -> SubsetIndex {
        SubsetIndex::new(i)
    }

    #[test]
    fn test_from_config() {
        let sequence = SequenceOptimization::from_config(&GreedyConfig::default());
        assert_eq!(sequence.passes().len(), 3);
        assert_eq!(
            sequence.to_string(),
            "SequenceOptimization(InferiorOptimization, AddOneOptimization, TabuOptimization)"
        );

        let none = GreedyConfig::default().with_optimizations(false, false, false, false);
        assert!(SequenceOptimization::from_config(&none).is_empty());
    }

    #[test]
    fn test_strips_redundant_members_without_passes() {
        let mut builder = ProblemBuilder::new(2);
        builder.add_subset([0, 1], 1.0).unwrap();
        builder.add_subset([0], 1.0).unwrap();
        let problem = builder.build().unwrap();
        let creation = Creation::for_problem(&problem);
        let rating = Rating::Chvatal(ChvatalRating);
        let selection = BestRatingSelection::default();
        let ctx = RepairContext::new(&creation, &rating, &selection, 8);
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let improved = SequenceOptimization::new()
            .optimize(&problem.full_family(), None, &ctx, &mut rng)
            .unwrap();
        assert_eq!(improved.members().collect::<Vec<_>>(), vec![idx(0)]);
    }

    #[test]
    fn test_chains_passes() {
        let mut builder = ProblemBuilder::new(4);
        builder.add_subset([0, 1], 2.0).unwrap();
        builder.add_subset([2, 3], 2.0).unwrap();
        builder.add_subset([0, 1, 2, 3], 3.0).unwrap();
        let problem = builder.build().unwrap();
        let creation = Creation::for_problem(&problem);
        let rating = Rating::Chvatal(ChvatalRating);
        let selection = BestRatingSelection::default().greedy();
        let ctx = RepairContext::new(&creation, &rating, &selection, 8);
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let sequence = SequenceOptimization::from_config(&GreedyConfig::default());
        let cover = Family::from_indices(&problem, [idx(0), idx(1)]).unwrap();
        let improved = sequence.optimize(&cover, None, &ctx, &mut rng).unwrap();
        assert!(improved.is_complete());
        assert_eq!(improved.cost(), 3.0);

        let optimal = Family::from_indices(&problem, [idx(2)]).unwrap();
        assert!(sequence.optimize(&optimal, None, &ctx, &mut rng).is_none());
    }
}
