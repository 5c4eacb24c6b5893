/* embcordic | round.rs
 * Copyright (c) 2025 L. Sartory
 * SPDX-License-Identifier: MIT
 */

/* Output rounding and gain metadata */

/******************************************************************************/

use crate::angle;
use crate::fixed::{sign_extend, SWord};

/// Drops `drop` low bits of `value` with round-half-to-even, wrapping to `out_width` bits
///
/// The correction added before truncation is the bit that becomes the output LSB, followed by
/// its complement in every lower dropped position: exact halves round up when that bit is odd
/// and down when it is even.
pub const fn round_convergent(value: SWord, drop: u32, out_width: u32) -> i64 {
    let v = value.value();
    if drop == 0 {
        return sign_extend(v, out_width);
    }
    let half = 1i64 << (drop - 1);
    let correction = if (v >> drop) & 1 == 1 { half } else { half - 1 };
    sign_extend((v + correction) >> drop, out_width)
}

/******************************************************************************/

/// Processing gain of an engine
///
/// The engine never compensates it. Callers needing unit magnitude divide by [`Gain::value()`]
/// and the output scale of the engine, or apply the engine's [`GainCorrection`] themselves.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gain {
    stages: usize
}

impl Gain {
    pub fn new(stages: usize) -> Self {
        Self { stages }
    }

    /// Multiplicative magnitude growth, ~1.1644
    pub fn value(&self) -> f64 {
        angle::gain(self.stages)
    }
}

/// Multiply-and-shift undoing a known gain
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GainCorrection {
    pub factor: i64,
    pub shift: u32
}

impl GainCorrection {
    pub fn new(gain: f64, shift: u32) -> Self {
        assert!(shift >= 1 && shift <= 32);
        Self { factor: ((1u64 << shift) as f64 / gain).round() as i64, shift }
    }

    /// Returns `round(value / gain)`
    #[inline]
    pub fn apply(&self, value: i64) -> i64 {
        (value * self.factor + (1i64 << (self.shift - 1))) >> self.shift
    }
}

/******************************************************************************/

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn round(v: i64, drop: u32) -> i64 {
        round_convergent(SWord::new(v, 20), drop, 16)
    }

    #[test]
    fn test_ties_to_even() {
        // 2.5 -> 2, 3.5 -> 4, -2.5 -> -2, -3.5 -> -4
        assert_eq!(round(0b10_10, 2), 2);
        assert_eq!(round(0b11_10, 2), 4);
        assert_eq!(round(-0b10_10, 2), -2);
        assert_eq!(round(-0b11_10, 2), -4);
    }

    #[test]
    fn test_nearest() {
        assert_eq!(round(0b10_01, 2), 2);
        assert_eq!(round(0b10_11, 2), 3);
        assert_eq!(round(-0b10_11, 2), -3);
        assert_eq!(round(1000 << 6, 6), 1000);
        assert_eq!(round(-7, 0), -7);
    }

    #[test]
    fn test_wraps_to_output() {
        assert_eq!(round_convergent(SWord::new(0x8000 << 2, 24), 2, 16), -0x8000);
    }

    #[test]
    fn test_gain_correction() {
        let gain = Gain::new(15);
        assert_relative_eq!(gain.value(), 1.16443, epsilon = 1e-5);
        let c = GainCorrection::new(gain.value(), 16);
        assert_eq!(c.apply(1164), 1000);
        assert_eq!(c.apply(-1164), -1000);
        assert_eq!(c.apply(0), 0);
    }
}
