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

//! Errors raised while building covering data.

use thiserror::Error;

/// The error type for constructing subsets, problems and families.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// A subset cost was below zero.
    #[error("subset cost must be non-negative, got {cost}")]
    NegativeCost { cost: f64 },

    /// A subset cost was NaN or infinite.
    #[error("subset cost must be finite, got {cost}")]
    NonFiniteCost { cost: f64 },

    /// An element index was outside the universe.
    #[error("element {element} is outside the universe of size {universe}")]
    ElementOutOfRange { element: usize, universe: usize },

    /// Two pieces of data were built against different universe sizes.
    #[error("universe size mismatch: expected {expected}, found {found}")]
    UniverseMismatch { expected: usize, found: usize },

    /// A subset index was outside the problem arena.
    #[error("subset index {index} is outside the problem with {len} subsets")]
    SubsetOutOfRange { index: usize, len: usize },

    /// The surcharge for exceeding the family size cap was negative or not finite.
    #[error("excess cost must be finite and non-negative, got {cost}")]
    InvalidExcessCost { cost: f64 },

    /// A family was built over a different problem than the one it was used with.
    #[error("the family belongs to a different problem")]
    ForeignFamily,
}

/// Checks that `cost` is a valid subset or surcharge cost.
#[inline]
pub(crate) fn validate_cost(cost: f64) -> Result<(), ModelError> {
    if !cost.is_finite() {
        return Err(ModelError::NonFiniteCost { cost });
    }
    if cost < 0.0 {
        return Err(ModelError::NegativeCost { cost });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_cost() {
        assert!(validate_cost(0.0).is_ok());
        assert!(validate_cost(3.5).is_ok());
        assert_eq!(
            validate_cost(-1.0),
            Err(ModelError::NegativeCost { cost: -1.0 })
        );
        assert!(matches!(
            validate_cost(f64::INFINITY),
            Err(ModelError::NonFiniteCost { .. })
        ));
    }

    #[test]
    fn test_messages() {
        let e = ModelError::ElementOutOfRange {
            element: 7,
            universe: 4,
        };
        assert_eq!(
            e.to_string(),
            "element 7 is outside the universe of size 4"
        );
    }
}
