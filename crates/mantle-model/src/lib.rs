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

//! # Mantle Model
//!
//! **The covering model shared by every Mantle heuristic and solver.**
//!
//! A covering problem consists of a universe of `N` elements, addressed by
//! `0..N`, and an arena of cost-bearing candidate subsets. Heuristics work on
//! partial covers that borrow the problem and track, per element, how many
//! chosen subsets cover it.
//!
//! ## Architecture
//!
//! * **`index`**: Strongly typed `SubsetIndex` and `ElementIndex`.
//! * **`subset`**: `Subset`, a bitset of elements over a fixed universe with a cost
//!   and an optional back-reference to the subset it was derived from.
//! * **`problem`**: `Problem` (immutable arena of subsets plus the cost model) and
//!   `ProblemBuilder`.
//! * **`family`**: `Family`, a partial cover whose coverage counters are maintained
//!   incrementally on every insertion and removal.
//! * **`loading`**: Reader for OR-Library style set covering instances.
//! * **`generator`**: Seeded random instance generator for tests and benchmarks.
//! * **`error`**: `ModelError`, the error type of all fallible constructors.
//!
//! ## Design Philosophy
//!
//! 1.  **Arena ownership**: subsets live by value inside the `Problem`. A `Family`
//!     only records which indices are members, so subsets can never be mutated
//!     behind the back of the coverage counters.
//! 2.  **Incremental bookkeeping**: uncovered, singly and multiply covered element
//!     counts as well as the number of necessary members are available in O(1).
//! 3.  **Fail-Fast**: negative costs, out-of-range elements and mismatching
//!     universes are rejected when the data is built.

pub mod error;
pub mod family;
pub mod generator;
pub mod index;
pub mod loading;
pub mod problem;
pub mod subset;
