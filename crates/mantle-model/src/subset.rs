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

//! Cost-bearing subsets of a fixed universe.
//!
//! A `Subset` stores its elements as a `FixedBitSet` sized to the universe
//! it was built for. The universe size never changes after construction;
//! membership can be edited through `insert` and `remove`, which is what the
//! conversion adapters do when they derive augmented copies of a problem.
//! Once a subset has been handed to a `Problem` it is immutable.
//!
//! Every subset may remember an `origin`, the index of the subset in another
//! problem it was derived from. Solutions of a derived problem are mapped
//! back to the caller's subsets through this reference.

use crate::{error::validate_cost, error::ModelError, index::SubsetIndex};
use fixedbitset::FixedBitSet;

#[derive(Debug, Clone, PartialEq)]
pub struct Subset {
    elements: FixedBitSet,
    cost: f64,
    origin: Option<SubsetIndex>,
}

impl Subset {
    /// Creates an empty subset over a universe of `universe` elements.
    ///
    /// # Errors
    ///
    /// Returns an error if `cost` is negative or not finite.
    #[inline]
    pub fn new(universe: usize, cost: f64) -> Result<Self, ModelError> {
        validate_cost(cost)?;
        Ok(Self {
            elements: FixedBitSet::with_capacity(universe),
            cost,
            origin: None,
        })
    }

    /// Creates a subset containing `elements`.
    ///
    /// # Errors
    ///
    /// Returns an error if `cost` is invalid or an element is outside the universe.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use mantle_model::subset::Subset;
    /// let s = Subset::from_elements(4, [0, 2], 1.5).unwrap();
    /// assert_eq!(s.len(), 2);
    /// assert!(s.contains(2));
    /// assert!(Subset::from_elements(4, [4], 1.0).is_err());
    /// ```
    pub fn from_elements<I>(universe: usize, elements: I, cost: f64) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = usize>,
    {
        let mut subset = Self::new(universe, cost)?;
        for element in elements {
            subset.insert(element)?;
        }
        Ok(subset)
    }

    /// Sets the subset this one was derived from.
    #[inline]
    pub fn with_origin(mut self, origin: SubsetIndex) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Returns the size of the universe the subset was built against.
    #[inline]
    pub fn universe(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Returns the index of the subset this one was derived from, if any.
    #[inline]
    pub fn origin(&self) -> Option<SubsetIndex> {
        self.origin
    }

    /// Returns the number of elements in the subset.
    #[inline]
    pub fn len(&self) -> usize {
        self.elements.count_ones(..)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_clear()
    }

    /// Returns `true` if `element` belongs to the subset. Out-of-range
    /// elements are never contained.
    #[inline]
    pub fn contains(&self, element: usize) -> bool {
        self.elements.contains(element)
    }

    /// Iterates over the elements in ascending order.
    #[inline]
    pub fn elements(&self) -> fixedbitset::Ones<'_> {
        self.elements.ones()
    }

    /// Returns the underlying bitset.
    #[inline]
    pub fn bits(&self) -> &FixedBitSet {
        &self.elements
    }

    /// Adds `element`. Returns `true` if it was not present before.
    ///
    /// # Errors
    ///
    /// Returns an error if `element` is outside the universe.
    #[inline]
    pub fn insert(&mut self, element: usize) -> Result<bool, ModelError> {
        self.check_element(element)?;
        Ok(!self.elements.put(element))
    }

    /// Removes `element`. Returns `true` if it was present before.
    ///
    /// # Errors
    ///
    /// Returns an error if `element` is outside the universe.
    #[inline]
    pub fn remove(&mut self, element: usize) -> Result<bool, ModelError> {
        self.check_element(element)?;
        let was_present = self.elements.contains(element);
        self.elements.set(element, false);
        Ok(was_present)
    }

    /// Replaces the cost.
    ///
    /// # Errors
    ///
    /// Returns an error if `cost` is negative or not finite.
    #[inline]
    pub fn set_cost(&mut self, cost: f64) -> Result<(), ModelError> {
        validate_cost(cost)?;
        self.cost = cost;
        Ok(())
    }

    /// Adds every element of `other`.
    ///
    /// # Errors
    ///
    /// Returns an error if the universes differ.
    pub fn union_with(&mut self, other: &FixedBitSet) -> Result<(), ModelError> {
        self.check_universe(other.len())?;
        self.elements.union_with(other);
        Ok(())
    }

    /// Removes every element of `other`.
    ///
    /// # Errors
    ///
    /// Returns an error if the universes differ.
    pub fn difference_with(&mut self, other: &FixedBitSet) -> Result<(), ModelError> {
        self.check_universe(other.len())?;
        self.elements.difference_with(other);
        Ok(())
    }

    /// Returns `true` if the two subsets share no element.
    ///
    /// # Errors
    ///
    /// Returns an error if the universes differ.
    pub fn is_disjoint(&self, other: &Subset) -> Result<bool, ModelError> {
        self.check_universe(other.universe())?;
        Ok(self.elements.is_disjoint(&other.elements))
    }

    /// Returns `true` if this subset is at most as expensive as `other`
    /// and contains all of its elements, so `other` can always be replaced
    /// by this one.
    ///
    /// # Errors
    ///
    /// Returns an error if the universes differ.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use mantle_model::subset::Subset;
    /// let big = Subset::from_elements(4, [0, 1, 2], 1.0).unwrap();
    /// let small = Subset::from_elements(4, [0, 1], 2.0).unwrap();
    /// assert!(big.is_equal_or_better(&small).unwrap());
    /// assert!(!small.is_equal_or_better(&big).unwrap());
    /// ```
    pub fn is_equal_or_better(&self, other: &Subset) -> Result<bool, ModelError> {
        self.check_universe(other.universe())?;
        Ok(self.cost <= other.cost && other.elements.is_subset(&self.elements))
    }

    #[inline]
    fn check_element(&self, element: usize) -> Result<(), ModelError> {
        if element >= self.universe() {
            return Err(ModelError::ElementOutOfRange {
                element,
                universe: self.universe(),
            });
        }
        Ok(())
    }

    #[inline]
    fn check_universe(&self, found: usize) -> Result<(), ModelError> {
        if found != self.universe() {
            return Err(ModelError::UniverseMismatch {
                expected: self.universe(),
                found,
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for Subset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, e) in self.elements.ones().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", e)?;
        }
        write!(f, "}} (cost {})", self.cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_negative_cost() {
        assert_eq!(
            Subset::new(3, -0.5),
            Err(ModelError::NegativeCost { cost: -0.5 })
        );
        assert!(Subset::new(3, f64::NAN).is_err());
    }

    #[test]
    fn test_insert_remove() {
        let mut s = Subset::new(5, 1.0).unwrap();
        assert!(s.is_empty());
        assert!(s.insert(3).unwrap());
        assert!(!s.insert(3).unwrap());
        assert_eq!(s.len(), 1);
        assert!(s.remove(3).unwrap());
        assert!(!s.remove(3).unwrap());
        assert!(matches!(
            s.insert(5),
            Err(ModelError::ElementOutOfRange {
                element: 5,
                universe: 5
            })
        ));
    }

    #[test]
    fn test_universe_mismatch_is_signaled() {
        let a = Subset::from_elements(3, [0], 1.0).unwrap();
        let b = Subset::from_elements(4, [0], 1.0).unwrap();
        assert_eq!(
            a.is_disjoint(&b),
            Err(ModelError::UniverseMismatch {
                expected: 3,
                found: 4
            })
        );
        assert!(a.is_equal_or_better(&b).is_err());
    }

    #[test]
    fn test_disjoint_and_union() {
        let mut a = Subset::from_elements(6, [0, 1], 1.0).unwrap();
        let b = Subset::from_elements(6, [2, 3], 1.0).unwrap();
        assert!(a.is_disjoint(&b).unwrap());
        a.union_with(b.bits()).unwrap();
        assert_eq!(a.elements().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
        a.difference_with(b.bits()).unwrap();
        assert_eq!(a.elements().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_origin_and_display() {
        let s = Subset::from_elements(4, [1, 3], 2.0)
            .unwrap()
            .with_origin(SubsetIndex::new(9));
        assert_eq!(s.origin(), Some(SubsetIndex::new(9)));
        assert_eq!(s.to_string(), "{1, 3} (cost 2)");
    }
}
