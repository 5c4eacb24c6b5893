/* embcordic | lib.rs
 * Copyright (c) 2025 L. Sartory
 * SPDX-License-Identifier: MIT
 */

/* Cycle-level fixed-point sine / rotation generators */

/******************************************************************************/

#![doc = include_str!("../README.md")]
#![warn(missing_debug_implementations)]

/******************************************************************************/

mod angle;
mod clock;
mod config;
mod cordic;
mod emit;
mod error;
mod fixed;
mod hex;
mod pipeline;
mod prerotate;
mod round;
mod sideband;
mod table;

/******************************************************************************/

pub use angle::{gain, AngleTable, MAX_STAGES};
pub use clock::Clocked;
pub use config::{CordicConfig, Precision, ResetStyle, TableConfig, MAX_PHASE_WIDTH, MAX_PORT_WIDTH};
pub use cordic::{Output, Request, RotationState, SeqCordic};
pub use emit::{generate, module_name, Artifacts, GenerateRequest, GeneratorKind, HeaderWriter, PlainHeader};
pub use error::GenError;
pub use fixed::{ceil_log2, fits, mask, sign_extend, Phase, SWord};
pub use hex::HexImage;
pub use pipeline::{PipeCordic, PipeOutput};
pub use prerotate::{prerotate, Folded};
pub use round::{round_convergent, Gain, GainCorrection};
pub use sideband::AuxPipeline;
pub use table::{
    FullTableGen, QuarterWaveGen, SineTable, TableKind, TableOutput, TableRequest, FULL_TABLE_LIMIT,
    QUARTER_TABLE_LIMIT, QUARTER_TABLE_MIN
};
