/* embcordic | sideband.rs
 * Copyright (c) 2025 L. Sartory
 * SPDX-License-Identifier: MIT
 */

/******************************************************************************/

/// Longest latency the side channel can match
pub const MAX_AUX_DEPTH: u32 = 128;

/// One-bit shift register running in lockstep with a datapath
///
/// A bit pushed on some tick reaches the output `depth - 1` ticks later, i.e. on the very tick
/// a datapath of latency `depth` registers the matching result.
#[derive(Clone, Copy, Debug)]
pub struct AuxPipeline {
    bits: u128,
    depth: u32,
    enabled: bool
}

impl AuxPipeline {
    pub fn new(depth: u32, enabled: bool) -> Self {
        assert!(depth >= 1 && depth <= MAX_AUX_DEPTH, "aux depth must be 1..={MAX_AUX_DEPTH}");
        Self { bits: 0, depth, enabled }
    }

    #[inline]
    fn mask(&self) -> u128 {
        if self.depth == 128 {
            u128::MAX
        } else {
            (1u128 << self.depth) - 1
        }
    }

    /// Shifts `input` in
    #[inline]
    pub fn tick(&mut self, input: bool) -> bool {
        let input = input && self.enabled;
        self.bits = ((self.bits << 1) | input as u128) & self.mask();
        self.output()
    }

    /// Bit leaving the pipeline, always `false` when the channel is disabled
    #[inline]
    pub fn output(&self) -> bool {
        (self.bits >> (self.depth - 1)) & 1 == 1
    }

    pub fn clear(&mut self) {
        self.bits = 0;
    }
}

/******************************************************************************/
