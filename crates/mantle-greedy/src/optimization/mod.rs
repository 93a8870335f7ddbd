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

//! Local-search repair passes applied to complete covers.
//!
//! A pass receives a complete cover without unnecessary members and returns
//! a strictly cheaper complete cover, or `None` when it finds no improving
//! move. `SequenceOptimization` chains the configured passes and strips
//! unnecessary members before each of them.

pub mod add_one;
pub mod add_two;
pub mod inferior;
pub mod sequence;
pub mod support;
pub mod tabu;

use crate::optimization::{
    add_one::AddOneOptimization, add_two::AddTwoOptimization, inferior::InferiorOptimization,
    support::RepairContext, tabu::TabuOptimization,
};
use mantle_model::family::Family;
use rand::Rng;

/// A repair pass.
pub trait Optimization {
    /// Returns the name of the pass.
    fn name(&self) -> &str;

    /// Returns a cheaper complete cover derived from `cover`, or `None`.
    fn optimize<'p, R>(
        &self,
        cover: &Family<'p>,
        best: Option<&Family<'p>>,
        ctx: &RepairContext<'_>,
        rng: &mut R,
    ) -> Option<Family<'p>>
    where
        R: Rng + ?Sized;
}

/// One of the available repair passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RepairPass {
    Inferior(InferiorOptimization),
    AddOne(AddOneOptimization),
    AddTwo(AddTwoOptimization),
    Tabu(TabuOptimization),
}

impl Optimization for RepairPass {
    fn name(&self) -> &str {
        match self {
            RepairPass::Inferior(o) => o.name(),
            RepairPass::AddOne(o) => o.name(),
            RepairPass::AddTwo(o) => o.name(),
            RepairPass::Tabu(o) => o.name(),
        }
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
        match self {
            RepairPass::Inferior(o) => o.optimize(cover, best, ctx, rng),
            RepairPass::AddOne(o) => o.optimize(cover, best, ctx, rng),
            RepairPass::AddTwo(o) => o.optimize(cover, best, ctx, rng),
            RepairPass::Tabu(o) => o.optimize(cover, best, ctx, rng),
        }
    }
}

impl std::fmt::Display for RepairPass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
