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

//! Saturating counter arithmetic.
//!
//! Statistics counters in the greedy engine and in the solvers are bumped
//! once per event inside tight loops. Clamping at the numeric bound keeps a
//! very long run from wrapping a counter back to zero, and the by-value
//! trait lets generic counter code avoid the reference-based `num` APIs.

use core::ops::Add;

macro_rules! impl_saturating_val {
    ($trait_name:ident, $method:ident, $src_method:ident, $($t:ty),+) => {
        $(
            impl $trait_name for $t {
                #[inline(always)]
                fn $method(self, v: Self) -> Self {
                    <$t>::$src_method(self, v)
                }
            }
        )+
    };
}

/// Saturating addition by value.
///
/// # Examples
///
/// ```rust
/// # use mantle_core::num::saturating::SaturatingAddVal;
///
/// let a: u8 = 250;
/// assert_eq!(a.saturating_add_val(10), 255);
///
/// let counter: u64 = u64::MAX - 1;
/// assert_eq!(counter.saturating_add_val(5), u64::MAX);
/// ```
pub trait SaturatingAddVal: Sized + Add<Self, Output = Self> {
    /// Adds `v`, clamping at the upper or lower bound of the type.
    fn saturating_add_val(self, v: Self) -> Self;
}

impl_saturating_val!(
    SaturatingAddVal,
    saturating_add_val,
    saturating_add,
    u8,
    u16,
    u32,
    u64,
    usize,
    i32,
    i64
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_clamps_at_max() {
        assert_eq!(u64::MAX.saturating_add_val(1), u64::MAX);
        assert_eq!(200u8.saturating_add_val(100), u8::MAX);
        assert_eq!(i32::MAX.saturating_add_val(1), i32::MAX);
    }

    #[test]
    fn test_add_without_overflow() {
        assert_eq!(40u64.saturating_add_val(2), 42);
        assert_eq!((-3i64).saturating_add_val(5), 2);
    }
}
