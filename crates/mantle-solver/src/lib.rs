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

//! # Mantle Solver
//!
//! Ready-to-use solvers for set covering and its variants. Every solver
//! implements `CoverOptimizer` (or `CoverDecision` for the threshold
//! question), so adapters can be stacked on top of each other and on top of
//! the iterated greedy heuristic.
//!
//! ## Modules
//!
//! - `optimizer`: The `CoverOptimizer` and `CoverDecision` traits.
//! - `greedy`: `IteratedGreedySolver`, the iterated greedy engine with a
//!   seeded generator and optional time limit.
//! - `convert`: Adapters for uncoverable problems, set partitioning, bounded
//!   family sizes and cost thresholds.
//! - `reduction`: Reduction of large candidate sets to essential subsets.
//! - `error`: Solver and conversion errors.
//!
//! ## Example
//!
//! ```rust
//! use mantle_greedy::config::GreedyConfig;
//! use mantle_model::problem::ProblemBuilder;
//! use mantle_solver::{
//!     convert::partition::PartitionCover, greedy::IteratedGreedySolver,
//!     optimizer::CoverOptimizer,
//! };
//!
//! let mut builder = ProblemBuilder::new(3);
//! builder.add_subset([0, 1], 1.0).unwrap();
//! builder.add_subset([2], 1.0).unwrap();
//! builder.add_subset([1, 2], 0.5).unwrap();
//! let problem = builder.build().unwrap();
//!
//! let config = GreedyConfig::default().with_seed(7);
//! let mut solver = PartitionCover::new(IteratedGreedySolver::new(config).unwrap());
//! let partition = solver.optimize(&problem, None).unwrap().unwrap();
//! assert_eq!(partition.multiple_count(), 0);
//! ```

pub mod convert;
pub mod error;
pub mod greedy;
pub mod optimizer;
pub mod reduction;
