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

//! Problem instance loader for set covering benchmarks.
//!
//! This module turns whitespace-delimited text streams in the OR-Library set
//! covering layout into a validated `Problem`. The layout lists the
//! dimensions, then one cost per column, then for every row the number of
//! columns covering it followed by their 1-based indices. Rows become the
//! elements of the universe and columns become the candidate subsets.
//!
//! The parser accepts any `BufRead`, file path, raw reader, or string slice.
//! Lines may contain comments introduced by `#`, which are ignored during
//! tokenization.

use crate::{error::ModelError, problem::Problem, subset::Subset};
use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
    str::FromStr,
};
use thiserror::Error;

/// The error type for the problem loading process.
#[derive(Debug, Error)]
pub enum ProblemLoaderError {
    /// An I/O error occurred while reading the input stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The input stream ended before all tokens were read.
    #[error("unexpected end of file while parsing instance")]
    UnexpectedEof,

    /// A token could not be parsed into the expected numeric type.
    #[error("could not parse token '{token}' as type {type_name}")]
    Parse {
        token: String,
        type_name: &'static str,
    },

    /// The number of rows or columns is zero.
    #[error("problem dimensions (rows and columns) must be positive integers")]
    InvalidDimensions,

    /// A row referenced a column outside `1..=columns`.
    #[error("row {row} references column {column}, but there are only {columns} columns")]
    ColumnOutOfRange {
        row: usize,
        column: usize,
        columns: usize,
    },

    /// The parsed data violates a model invariant (e.g. a negative cost).
    #[error("invalid model: {0}")]
    Model(#[from] ModelError),
}

/// Loader for set covering instances in the OR-Library layout.
///
/// ```raw
/// m n                  // number of rows (elements), number of columns (subsets)
/// c_1 ... c_n          // cost of every column
/// k_1 j_1 ... j_k1     // row 1: number of covering columns, then their 1-based indices
/// ...
/// k_m j_1 ... j_km     // row m
/// ```
///
/// # Configuration
/// * `unit_costs`: Ignore the listed column costs and give every subset cost `1`,
///   which turns any instance into its unicost variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProblemLoader {
    unit_costs: bool,
}

impl ProblemLoader {
    /// Creates a new `ProblemLoader` with default settings.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every column cost with `1`.
    #[inline]
    pub fn unit_costs(mut self, yes: bool) -> Self {
        self.unit_costs = yes;
        self
    }

    /// Loads a problem from a type implementing `BufRead`.
    pub fn from_bufread<R: BufRead>(&self, rdr: R) -> Result<Problem, ProblemLoaderError> {
        let mut sc = Scanner::new(rdr);

        let rows: usize = sc.next()?;
        let columns: usize = sc.next()?;
        if rows == 0 || columns == 0 {
            return Err(ProblemLoaderError::InvalidDimensions);
        }

        let mut subsets = Vec::with_capacity(columns);
        for _ in 0..columns {
            let cost: f64 = sc.next()?;
            let cost = if self.unit_costs { 1.0 } else { cost };
            subsets.push(Subset::new(rows, cost)?);
        }

        for row in 0..rows {
            let count: usize = sc.next()?;
            for _ in 0..count {
                let column: usize = sc.next()?;
                if column == 0 || column > columns {
                    return Err(ProblemLoaderError::ColumnOutOfRange {
                        row: row + 1,
                        column,
                        columns,
                    });
                }
                subsets[column - 1].insert(row)?;
            }
        }

        Ok(Problem::new(rows, subsets)?)
    }

    /// Loads a problem from a file path.
    #[inline]
    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<Problem, ProblemLoaderError> {
        let file = File::open(path)?;
        self.from_bufread(BufReader::new(file))
    }

    /// Loads a problem from a generic reader.
    #[inline]
    pub fn from_reader<R: Read>(&self, r: R) -> Result<Problem, ProblemLoaderError> {
        self.from_bufread(BufReader::new(r))
    }

    /// Loads a problem from a string slice.
    #[inline]
    pub fn from_str(&self, s: &str) -> Result<Problem, ProblemLoaderError> {
        self.from_reader(s.as_bytes())
    }
}

/// Reads whitespace-delimited tokens, skipping `#` comments.
struct Scanner<R> {
    rdr: R,
    buf: String,
    pos: usize,
}

impl<R: BufRead> Scanner<R> {
    #[inline]
    fn new(rdr: R) -> Self {
        Self {
            rdr,
            buf: String::new(),
            pos: 0,
        }
    }

    /// Refills the line buffer with everything before the first `#`.
    /// Returns `Ok(false)` on EOF.
    fn fill_line(&mut self) -> Result<bool, ProblemLoaderError> {
        self.buf.clear();
        self.pos = 0;
        let n = self.rdr.read_line(&mut self.buf)?;
        if let Some(comment) = self.buf.find('#') {
            self.buf.truncate(comment);
        }
        Ok(n > 0)
    }

    fn next<T>(&mut self) -> Result<T, ProblemLoaderError>
    where
        T: FromStr,
    {
        loop {
            let rest = &self.buf[self.pos..];
            let start = rest.len() - rest.trim_start().len();
            let token_len = rest[start..]
                .find(char::is_whitespace)
                .unwrap_or(rest.len() - start);

            if token_len == 0 {
                if !self.fill_line()? {
                    return Err(ProblemLoaderError::UnexpectedEof);
                }
                continue;
            }

            let token = &rest[start..start + token_len];
            self.pos += start + token_len;
            return token.parse::<T>().map_err(|_| ProblemLoaderError::Parse {
                token: token.to_owned(),
                type_name: std::any::type_name::<T>(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::SubsetIndex;

    const SMALL_INSTANCE: &str = r#"
        4 3         # 4 rows, 3 columns
        1 1 3       # costs
        1 1         # row 1 covered by column 1
        2 1 3
        2 2 3
        1 2
    "#;

    #[test]
    fn test_loads_and_maps_correctly() {
        let problem = ProblemLoader::new()
            .from_str(SMALL_INSTANCE)
            .expect("Failed to load");

        assert_eq!(problem.universe(), 4);
        assert_eq!(problem.len(), 3);
        let a = problem.subset(SubsetIndex::new(0));
        assert_eq!(a.elements().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(a.cost(), 1.0);
        let c = problem.subset(SubsetIndex::new(2));
        assert_eq!(c.elements().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(c.cost(), 3.0);
        assert!(problem.is_coverable());
    }

    #[test]
    fn test_unit_costs() {
        let problem = ProblemLoader::new()
            .unit_costs(true)
            .from_str(SMALL_INSTANCE)
            .unwrap();
        assert!(problem.cost_class().is_uniform());
    }

    #[test]
    fn test_column_out_of_range() {
        let data = "1 1  5  1 2";
        match ProblemLoader::new().from_str(data) {
            Err(ProblemLoaderError::ColumnOutOfRange {
                row: 1,
                column: 2,
                columns: 1,
            }) => {}
            other => panic!("Expected ColumnOutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_error_structure() {
        match ProblemLoader::new().from_str("2 2 garbage") {
            Err(ProblemLoaderError::Parse { token, type_name }) => {
                assert_eq!(token, "garbage");
                assert!(type_name.contains("f64"));
            }
            other => panic!("Expected Parse error with context, got {:?}", other),
        }
    }

    #[test]
    fn test_eof_and_dimensions() {
        assert!(matches!(
            ProblemLoader::new().from_str("3 2 1.0"),
            Err(ProblemLoaderError::UnexpectedEof)
        ));
        assert!(matches!(
            ProblemLoader::new().from_str("0 2"),
            Err(ProblemLoaderError::InvalidDimensions)
        ));
        assert!(matches!(
            ProblemLoader::new().from_str("1 1 -2 1 1"),
            Err(ProblemLoaderError::Model(ModelError::NegativeCost { .. }))
        ));
    }
}
