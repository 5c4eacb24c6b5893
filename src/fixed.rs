/* embcordic | fixed.rs
 * Copyright (c) 2025 L. Sartory
 * SPDX-License-Identifier: MIT
 */

/* Fixed-width two's complement words and modulo phase values */

/******************************************************************************/

/// Widest register the models can hold
pub const MAX_WIDTH: u32 = 63;

/// Keeps the `width` least significant bits of `value`
#[inline]
pub const fn mask(value: i64, width: u32) -> i64 {
    if width >= 64 {
        value
    } else {
        value & ((1i64 << width) - 1)
    }
}

/// Interprets the `width` least significant bits of `value` as a signed number
///
/// Example: `sign_extend(0b1110, 4) == -2`
#[inline]
pub const fn sign_extend(value: i64, width: u32) -> i64 {
    if width >= 64 {
        return value;
    }
    let shift = 64 - width;
    (value << shift) >> shift
}

/// Checks whether `value` is representable as a signed `width`-bit number
#[inline]
pub const fn fits(value: i64, width: u32) -> bool {
    sign_extend(value, width) == value
}

/// Number of bits needed to count `n` distinct values
#[inline]
pub const fn ceil_log2(n: u64) -> u32 {
    if n <= 1 {
        0
    } else {
        64 - (n - 1).leading_zeros()
    }
}

/******************************************************************************/

/// Signed register of a fixed bit width
///
/// Every operation wraps modulo `2^width`, the way a hardware register of that width would.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SWord {
    value: i64,
    width: u32
}

impl SWord {
    /// Builds a word, discarding any bit above `width`
    pub const fn new(value: i64, width: u32) -> Self {
        assert!(width >= 1 && width <= MAX_WIDTH);
        Self { value: sign_extend(value, width), width }
    }

    pub const fn zero(width: u32) -> Self {
        Self::new(0, width)
    }

    #[inline]
    pub const fn value(self) -> i64 {
        self.value
    }

    /// Sign extends to `width` bits, then shifts left by `shift`
    pub const fn widen(self, width: u32, shift: u32) -> Self {
        Self::new(self.value << shift, width)
    }

    /// Arithmetic shift right
    #[inline]
    pub const fn shr(self, n: u32) -> Self {
        let n = if n > 63 { 63 } else { n };
        Self { value: self.value >> n, width: self.width }
    }

    #[inline]
    pub const fn wrapping_add(self, rhs: Self) -> Self {
        Self::new(self.value + rhs.value, self.width)
    }

    #[inline]
    pub const fn wrapping_sub(self, rhs: Self) -> Self {
        Self::new(self.value - rhs.value, self.width)
    }

    #[inline]
    pub const fn wrapping_neg(self) -> Self {
        Self::new(-self.value, self.width)
    }
}

/******************************************************************************/

/// Angle as an unsigned fraction of a full turn
///
/// One unit is `2π / 2^width` radians. Additions and subtractions wrap around the circle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Phase {
    value: u64,
    width: u32
}

impl Phase {
    pub const fn new(value: u64, width: u32) -> Self {
        assert!(width >= 1 && width <= MAX_WIDTH);
        Self { value: value & Self::modulus_mask(width), width }
    }

    #[inline]
    const fn modulus_mask(width: u32) -> u64 {
        (1u64 << width) - 1
    }

    #[inline]
    pub const fn value(self) -> u64 {
        self.value
    }

    #[inline]
    pub const fn width(self) -> u32 {
        self.width
    }

    /// Phase interpreted as a signed offset in `[-2^(width-1), 2^(width-1))`
    #[inline]
    pub const fn as_signed(self) -> i64 {
        sign_extend(self.value as i64, self.width)
    }

    #[inline]
    pub const fn wrapping_add(self, rhs: u64) -> Self {
        Self::new(self.value.wrapping_add(rhs), self.width)
    }

    #[inline]
    pub const fn wrapping_sub(self, rhs: u64) -> Self {
        Self::new(self.value.wrapping_sub(rhs), self.width)
    }

    /// Sign bit of the signed interpretation
    #[inline]
    pub const fn msb(self) -> bool {
        (self.value >> (self.width - 1)) & 1 == 1
    }

    /// The `n` most significant bits, e.g. the octant for `n = 3`
    #[inline]
    pub const fn top_bits(self, n: u32) -> u64 {
        self.value >> (self.width - n)
    }
}

/******************************************************************************/

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_extend() {
        assert_eq!(sign_extend(0b1110, 4), -2);
        assert_eq!(sign_extend(0b0110, 4), 6);
        assert_eq!(sign_extend(0x1_0000_0005, 32), 5);
        assert_eq!(mask(-1, 12), 0xfff);
        assert!(fits(2047, 12));
        assert!(!fits(2048, 12));
        assert!(fits(-2048, 12));
    }

    #[test]
    fn test_ceil_log2() {
        assert_eq!(ceil_log2(1), 0);
        assert_eq!(ceil_log2(2), 1);
        assert_eq!(ceil_log2(15), 4);
        assert_eq!(ceil_log2(16), 4);
        assert_eq!(ceil_log2(17), 5);
    }

    #[test]
    fn test_word_wraps() {
        let a = SWord::new(2047, 12);
        assert_eq!(a.wrapping_add(SWord::new(1, 12)).value(), -2048);
        assert_eq!(SWord::new(-2048, 12).wrapping_neg().value(), -2048);
        assert_eq!(SWord::new(-5, 12).shr(1).value(), -3);
        assert_eq!(SWord::new(-3, 4).widen(8, 2).value(), -12);
    }

    #[test]
    fn test_phase_wraps() {
        let p = Phase::new(0xffff, 16);
        assert_eq!(p.wrapping_add(2).value(), 1);
        assert_eq!(Phase::new(1, 16).wrapping_sub(2).value(), 0xffff);
        assert_eq!(p.as_signed(), -1);
        assert!(p.msb());
        assert_eq!(Phase::new(0xa000, 16).top_bits(3), 5);
    }
}
