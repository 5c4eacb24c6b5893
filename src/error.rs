/* embcordic | error.rs
 * Copyright (c) 2025 L. Sartory
 * SPDX-License-Identifier: MIT
 */

/******************************************************************************/

use thiserror::Error;

/// Generation-time failures
///
/// All of them are detected before any artifact is written. The rotation and table models
/// themselves have no runtime error: a strobe while busy is simply ignored.
#[derive(Debug, Error)]
pub enum GenError {
    /// Table address width above the supported bound
    #[error(
        "requested table size 2^{requested} reaches the 2^{limit} entry limit; \
         this bound is a conservative guess at available block RAM and can be raised \
         (up to about 30 bits) by someone who understands the memory implications"
    )]
    TableTooLarge { requested: u32, limit: u32 },

    /// Not enough address bits to decode a quadrant and still index a table
    #[error("quarter-wave table needs at least {minimum} address bits, got {requested}")]
    TooFewAddressBits { requested: u32, minimum: u32 },

    #[error("{what} of {bits} bits is out of range {min}..={max}")]
    InvalidWidth { what: &'static str, bits: u32, min: u32, max: u32 },

    #[error("{requested} CORDIC stages requested, at most {max} are meaningful here")]
    InvalidStages { requested: usize, max: usize },

    #[error("invalid module name {0:?}")]
    InvalidName(String),

    #[error(transparent)]
    Io(#[from] std::io::Error)
}

impl GenError {
    /// Assertion-class failures, as opposed to configuration errors
    pub fn is_precondition(&self) -> bool {
        matches!(self, GenError::TooFewAddressBits { .. })
    }
}

/// Checks `bits` against an inclusive range, logging the rejection
pub(crate) fn check_width(what: &'static str, bits: u32, min: u32, max: u32) -> Result<(), GenError> {
    if bits < min || bits > max {
        log::error!("{what} {bits} rejected, expected {min}..={max}");
        return Err(GenError::InvalidWidth { what, bits, min, max });
    }
    Ok(())
}
