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

//! # Mantle Greedy
//!
//! **Iterated randomized greedy heuristic for weighted set covering.**
//!
//! The heuristic grows a partial cover one subset at a time, repairs the
//! complete cover with local-search passes, keeps the best cover found and
//! perturbs it into the starting point of the next iteration.
//!
//! ## Architecture
//!
//! * **`creation`**: Which subsets are candidates for the next insertion or removal.
//! * **`rating`**: How desirable a candidate move is (Marchiori-Steenbeek and Chvátal).
//! * **`selection`**: Picks the best rated candidate within a tie tolerance, with
//!   occasional uniformly random picks.
//! * **`grow`**: The growth phase that completes a partial cover.
//! * **`shrinking`**: The perturbation between iterations.
//! * **`optimization`**: Repair passes for complete covers.
//! * **`policy`**: Per-iteration choice of the rating, fixed or reward-adaptive.
//! * **`engine`**: `IteratedGreedyEngine`, the main loop.
//! * **`monitor`**: Observation and early termination of runs.
//! * **`config`**, **`stats`**, **`result`**, **`error`**: Parameters, counters,
//!   outcome and error type of a run.
//!
//! ## Determinism
//!
//! Every randomized component draws from the generator passed into
//! `IteratedGreedyEngine::run`. A seeded generator reproduces a run exactly.

pub mod config;
pub mod creation;
pub mod engine;
pub mod error;
pub mod grow;
pub mod monitor;
pub mod optimization;
pub mod policy;
pub mod rating;
pub mod result;
pub mod selection;
pub mod shrinking;
pub mod stats;
