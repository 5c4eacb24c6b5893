/* embcordic | config.rs
 * Copyright (c) 2025 L. Sartory
 * SPDX-License-Identifier: MIT
 */

/******************************************************************************/

use crate::angle::{AngleTable, MAX_STAGES};
use crate::error::{check_width, GenError};
use crate::fixed::ceil_log2;

/// Widest input or output port
pub const MAX_PORT_WIDTH: u32 = 32;
/// Widest phase port
pub const MAX_PHASE_WIDTH: u32 = 48;

/******************************************************************************/

/// Reset flavour of a generated component
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResetStyle {
    /// No reset input: registers only change on clock edges
    #[default]
    None,
    /// Level-sensitive reset, sampled on the next tick
    Sync,
    /// Edge-sensitive reset, effective immediately
    Async
}

impl ResetStyle {
    pub fn from_flags(with_reset: bool, async_reset: bool) -> Self {
        match (with_reset, async_reset) {
            (false, _) => ResetStyle::None,
            (true, false) => ResetStyle::Sync,
            (true, true) => ResetStyle::Async
        }
    }
}

/******************************************************************************/

/// Parameters of a CORDIC rotation engine
///
/// `stages` and `guard_bits` are derived from the widths when left unset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CordicConfig {
    pub input_width: u32,
    pub output_width: u32,
    pub phase_width: u32,
    pub stages: Option<usize>,
    pub guard_bits: Option<u32>,
    pub reset: ResetStyle,
    pub aux: bool
}

impl Default for CordicConfig {
    fn default() -> Self {
        Self {
            input_width: 12,
            output_width: 12,
            phase_width: 19,
            stages: None,
            guard_bits: None,
            reset: ResetStyle::None,
            aux: false
        }
    }
}

impl CordicConfig {
    pub fn with_widths(mut self, input_width: u32, output_width: u32, phase_width: u32) -> Self {
        self.input_width = input_width;
        self.output_width = output_width;
        self.phase_width = phase_width;
        self
    }

    pub fn with_stages(mut self, stages: usize) -> Self {
        self.stages = Some(stages);
        self
    }

    pub fn with_guard_bits(mut self, guard_bits: u32) -> Self {
        self.guard_bits = Some(guard_bits);
        self
    }

    pub fn with_reset(mut self, reset: ResetStyle) -> Self {
        self.reset = reset;
        self
    }

    pub fn with_aux(mut self, aux: bool) -> Self {
        self.aux = aux;
        self
    }

    /// Validates the configuration and derives the internal bit budget
    pub fn precision(&self) -> Result<Precision, GenError> {
        check_width("input width", self.input_width, 2, MAX_PORT_WIDTH)?;
        check_width("output width", self.output_width, 2, MAX_PORT_WIDTH)?;
        check_width("phase width", self.phase_width, 3, MAX_PHASE_WIDTH)?;
        if let Some(guard_bits) = self.guard_bits {
            check_width("guard bits", guard_bits, 0, 24)?;
        }

        let useful = AngleTable::useful_stages(self.phase_width);
        let requested = self.stages.unwrap_or(useful);
        let guard_bits = self.guard_bits.unwrap_or_else(|| (ceil_log2(requested as u64) + 1).max(2));
        // One extra top bit absorbs the processing gain
        let working_width = self.input_width.max(self.output_width) + guard_bits + 1;

        // Past the useful angles a stage rotates the vector without moving the phase, and
        // shifting by the full working width adds nothing but a sign
        let max = useful.min(working_width as usize - 1).min(MAX_STAGES);
        let stages = match self.stages {
            Some(stages) if stages == 0 || stages > max => {
                log::error!("{stages} stages rejected, expected 1..={max}");
                return Err(GenError::InvalidStages { requested: stages, max });
            }
            Some(stages) => stages,
            None => max
        };

        Ok(Precision {
            input_width: self.input_width,
            output_width: self.output_width,
            phase_width: self.phase_width,
            guard_bits,
            working_width,
            stages
        })
    }
}

/******************************************************************************/

/// Bit budget of a configured engine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Precision {
    pub input_width: u32,
    pub output_width: u32,
    pub phase_width: u32,
    /// Fractional bits kept below the output LSB
    pub guard_bits: u32,
    /// Width of the internal X/Y registers
    pub working_width: u32,
    pub stages: usize
}

impl Precision {
    /// Left shift aligning an input sample to the working registers
    #[inline]
    pub fn input_shift(&self) -> u32 {
        self.working_width - 1 - self.input_width
    }

    /// Bits dropped when rounding the working registers to the output
    ///
    /// The output keeps the headroom bit, so a full-scale input rotated with gain still fits.
    #[inline]
    pub fn output_shift(&self) -> u32 {
        self.working_width - self.output_width
    }

    /// Output LSBs per input LSB, before the processing gain: `2^(OW - IW - 1)`
    pub fn output_scale(&self) -> f64 {
        f64::powi(2.0, self.output_width as i32 - self.input_width as i32 - 1)
    }
}

/******************************************************************************/

/// Parameters of a table-based sine generator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableConfig {
    /// Base 2 logarithm of the number of phase steps in one full turn
    pub lg_table: u32,
    pub output_width: u32,
    pub reset: ResetStyle,
    pub aux: bool
}

impl Default for TableConfig {
    fn default() -> Self {
        Self { lg_table: 8, output_width: 12, reset: ResetStyle::None, aux: false }
    }
}

impl TableConfig {
    pub fn new(lg_table: u32, output_width: u32) -> Self {
        Self { lg_table, output_width, ..Self::default() }
    }

    pub fn with_reset(mut self, reset: ResetStyle) -> Self {
        self.reset = reset;
        self
    }

    pub fn with_aux(mut self, aux: bool) -> Self {
        self.aux = aux;
        self
    }
}

/******************************************************************************/

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_precision() {
        let p = CordicConfig::default().precision().unwrap();
        assert_eq!(p.stages, 17);
        assert_eq!(p.guard_bits, 6);
        assert_eq!(p.working_width, 19);
        assert_eq!(p.input_shift(), 6);
        assert_eq!(p.output_shift(), 7);
        assert_eq!(p.output_scale(), 0.5);
    }

    #[test]
    fn test_explicit_stages() {
        let p = CordicConfig::default().with_stages(15).precision().unwrap();
        assert_eq!(p.stages, 15);
        assert_eq!(p.guard_bits, 5);
        assert_eq!(p.working_width, 18);

        let err = CordicConfig::default().with_stages(0).precision().unwrap_err();
        assert!(matches!(err, GenError::InvalidStages { requested: 0, .. }));
        let err = CordicConfig::default().with_stages(40).precision().unwrap_err();
        assert!(matches!(err, GenError::InvalidStages { requested: 40, max: 17 }));
    }

    #[test]
    fn test_widths_rejected() {
        let err = CordicConfig::default().with_widths(12, 40, 19).precision().unwrap_err();
        assert!(matches!(err, GenError::InvalidWidth { what: "output width", bits: 40, .. }));
        let err = CordicConfig::default().with_widths(12, 12, 2).precision().unwrap_err();
        assert!(matches!(err, GenError::InvalidWidth { what: "phase width", .. }));
    }

    #[test]
    fn test_mixed_widths() {
        let p = CordicConfig::default().with_widths(8, 16, 20).precision().unwrap();
        assert_eq!(p.input_shift(), p.guard_bits + 8);
        assert_eq!(p.output_shift(), p.guard_bits + 1);
        assert_eq!(p.output_scale(), 4.0);
    }

    #[test]
    fn test_stages_capped_at_useful_angles() {
        // angle 16 is the last one not rounding to zero with a 19 bit phase
        let p = CordicConfig::default().with_stages(17).precision().unwrap();
        assert_eq!(p.stages, 17);
        let err = CordicConfig::default().with_stages(18).precision().unwrap_err();
        assert!(matches!(err, GenError::InvalidStages { requested: 18, max: 17 }));

        // a narrow phase runs out of angles before the registers run out of bits
        let p = CordicConfig::default().with_widths(16, 16, 8).precision().unwrap();
        assert_eq!(p.stages, AngleTable::useful_stages(8));
        let err = CordicConfig::default().with_widths(16, 16, 8).with_stages(p.stages + 1).precision().unwrap_err();
        assert!(matches!(err, GenError::InvalidStages { .. }));
    }

    #[test]
    fn test_reset_flags() {
        assert_eq!(ResetStyle::from_flags(false, true), ResetStyle::None);
        assert_eq!(ResetStyle::from_flags(true, false), ResetStyle::Sync);
        assert_eq!(ResetStyle::from_flags(true, true), ResetStyle::Async);
    }
}
