/* embcordic | prerotate.rs
 * Copyright (c) 2025 L. Sartory
 * SPDX-License-Identifier: MIT
 */

/* Octant folding ahead of the micro-rotations */

/******************************************************************************/

use crate::fixed::{Phase, SWord};

/// Vector and residual phase after folding
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Folded {
    pub x: SWord,
    pub y: SWord,
    /// Signed residual, within ±45°
    pub phase: Phase
}

/// Rotates the vector by a multiple of 90° so that the remaining phase lies within ±45°
///
/// The top three phase bits give the octant. Octants 0 and 7 are already close to zero, the
/// others are brought back by rotating the vector by 90°, 180° or 270° and subtracting the
/// same angle from the phase.
pub fn prerotate(x: SWord, y: SWord, phase: Phase) -> Folded {
    let quarter = 1u64 << (phase.width() - 2);
    let (x, y, turns) = match phase.top_bits(3) {
        0 | 7 => (x, y, 0),
        1 | 2 => (y.wrapping_neg(), x, 1),
        3 | 4 => (x.wrapping_neg(), y.wrapping_neg(), 2),
        _ => (y, x.wrapping_neg(), 3)
    };
    Folded { x, y, phase: phase.wrapping_sub(turns * quarter) }
}

/******************************************************************************/
