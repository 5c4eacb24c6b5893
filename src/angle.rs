/* embcordic | angle.rs
 * Copyright (c) 2025 L. Sartory
 * SPDX-License-Identifier: MIT
 */

/* Arctangent constants and processing gain of the micro-rotations */

/******************************************************************************/

use core::f64::consts::TAU;
use pxfm::f_atan;

include!(concat!(env!("OUT_DIR"), "/gain_table.rs"));

/// Most stages any table may hold
pub const MAX_STAGES: usize = 62;

/// Converts an angle in radians to phase units of a `phase_width`-bit accumulator
fn phase_units(radians: f64, phase_width: u32) -> u64 {
    (radians * (1u64 << phase_width) as f64 / TAU).round() as u64
}

/// Micro-rotation angle of stage `k`, i.e. `atan(2^-(k+1))`
fn stage_angle(k: usize) -> f64 {
    f_atan(f64::powi(0.5, k as i32 + 1))
}

/******************************************************************************/

/// Phase-scaled arctangent constants, one per stage
///
/// Stage `k` rotates by `atan(2^-(k+1))`: the ±45° residual left by the pre-rotation never
/// needs the `atan(1)` step. Entries are strictly decreasing as long as they are non-zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AngleTable {
    angles: Vec<u64>,
    phase_width: u32
}

impl AngleTable {
    /// Computes the table once, for `stages` stages and a `phase_width`-bit phase
    ///
    /// Panics when a stage angle would round to zero, see [`AngleTable::useful_stages()`].
    pub fn new(stages: usize, phase_width: u32) -> Self {
        assert!(stages <= Self::useful_stages(phase_width), "{stages} stages exceed the non-zero angles");
        let angles = (0..stages)
            .map(|k| phase_units(stage_angle(k), phase_width))
            .collect();
        Self { angles, phase_width }
    }

    /// Number of leading stages whose angle does not round to zero
    pub fn useful_stages(phase_width: u32) -> usize {
        (0..MAX_STAGES)
            .take_while(|&k| phase_units(stage_angle(k), phase_width) > 0)
            .count()
    }

    #[inline]
    pub fn angle(&self, stage: usize) -> u64 {
        self.angles[stage]
    }

    pub fn len(&self) -> usize {
        self.angles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.angles.is_empty()
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.angles
    }

    /// Worst residual phase left after the last stage, in phase units
    pub fn residual_bound(&self) -> u64 {
        self.angles.last().copied().unwrap_or(1u64 << (self.phase_width - 3))
    }

    /// Worst angle between the requested and the performed rotation, in phase units
    ///
    /// The vector turns by exact arctangents while the phase register steps by their rounded
    /// values: each stage may add up to one unit on top of the residual.
    pub fn rotation_error_bound(&self) -> f64 {
        (self.residual_bound() + self.len() as u64) as f64
    }
}

/******************************************************************************/

/// Magnitude growth after `stages` micro-rotations
///
/// Tends to ~1.1644 as the stage count grows.
pub fn gain(stages: usize) -> f64 {
    GAIN_TABLE[stages.min(GAIN_TABLE.len() - 1)]
}

/******************************************************************************/
