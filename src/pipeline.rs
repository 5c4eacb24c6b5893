/* embcordic | pipeline.rs
 * Copyright (c) 2025 L. Sartory
 * SPDX-License-Identifier: MIT
 */

/* Fully unrolled CORDIC: one register stage per micro-rotation */

/******************************************************************************/

use crate::angle::AngleTable;
use crate::clock::{Clocked, ResetAction, ResetLine};
use crate::config::{CordicConfig, Precision};
use crate::cordic::{load, micro_rotate, Request};
use crate::error::GenError;
use crate::fixed::{Phase, SWord};
use crate::prerotate::prerotate;
use crate::round::{round_convergent, Gain, GainCorrection};
use crate::sideband::AuxPipeline;

/// Registered outputs of the pipelined engine
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipeOutput {
    pub x: i64,
    pub y: i64,
    pub aux: bool,
    /// Low until the first request has gone all the way through
    pub valid: bool
}

#[derive(Clone, Copy, Debug)]
struct Slot {
    x: SWord,
    y: SWord,
    phase: Phase
}

/// Pipelined CORDIC rotation engine
///
/// Every enabled tick takes a new request and moves all in-flight ones one stage forward.
/// Results come out in order, `stages + 2` enabled ticks later. A `None` input is a low clock
/// enable: nothing moves.
#[derive(Debug)]
pub struct PipeCordic {
    precision: Precision,
    angles: AngleTable,
    reset: ResetLine,
    aux: AuxPipeline,
    valid: AuxPipeline,
    // slots[0] holds the pre-rotated request, slots[k + 1] the output of stage k
    slots: Vec<Slot>,
    out: (i64, i64)
}

impl PipeCordic {
    pub fn new(config: CordicConfig) -> Result<Self, GenError> {
        let precision = config.precision()?;
        let angles = AngleTable::new(precision.stages, precision.phase_width);
        log::debug!(
            "pipelined cordic: {} stages, {} bit registers, latency {}",
            precision.stages,
            precision.working_width,
            precision.stages + 2
        );
        Ok(Self {
            precision,
            angles,
            reset: ResetLine::new(config.reset),
            aux: AuxPipeline::new(precision.stages as u32 + 2, config.aux),
            valid: AuxPipeline::new(precision.stages as u32 + 2, true),
            slots: vec![Self::empty_slot(&precision); precision.stages + 1],
            out: (0, 0)
        })
    }

    fn empty_slot(precision: &Precision) -> Slot {
        Slot {
            x: SWord::zero(precision.working_width),
            y: SWord::zero(precision.working_width),
            phase: Phase::new(0, precision.phase_width)
        }
    }

    pub fn precision(&self) -> &Precision {
        &self.precision
    }

    pub fn gain(&self) -> Gain {
        Gain::new(self.precision.stages)
    }

    /// Multiply-and-shift bringing an output back to the scale of the input
    pub fn correction(&self, shift: u32) -> GainCorrection {
        GainCorrection::new(self.gain().value() * self.precision.output_scale(), shift)
    }

    /// Enabled ticks from a request to its result
    pub fn latency(&self) -> usize {
        self.precision.stages + 2
    }

    fn clear(&mut self) {
        let empty = Self::empty_slot(&self.precision);
        self.slots.iter_mut().for_each(|s| *s = empty);
        self.out = (0, 0);
        self.aux.clear();
        self.valid.clear();
    }
}

impl Clocked for PipeCordic {
    type Input = Option<Request>;
    type Output = PipeOutput;

    fn tick(&mut self, input: Option<Request>) -> PipeOutput {
        if self.reset.take() {
            self.clear();
            return self.output();
        }
        let Some(request) = input else {
            return self.output();
        };

        // Walk backwards so every stage reads its predecessor's previous value
        let last = self.slots[self.precision.stages];
        let drop = self.precision.output_shift();
        let ow = self.precision.output_width;
        self.out = (round_convergent(last.x, drop, ow), round_convergent(last.y, drop, ow));
        for k in (0..self.precision.stages).rev() {
            let prev = self.slots[k];
            let (x, y, phase) = micro_rotate(prev.x, prev.y, prev.phase, self.angles.angle(k), k);
            self.slots[k + 1] = Slot { x, y, phase };
        }
        let (x, y, phase) = load(&self.precision, &request);
        let folded = prerotate(x, y, phase);
        self.slots[0] = Slot { x: folded.x, y: folded.y, phase: folded.phase };

        self.aux.tick(request.aux);
        self.valid.tick(true);
        self.output()
    }

    fn output(&self) -> PipeOutput {
        PipeOutput { x: self.out.0, y: self.out.1, aux: self.aux.output(), valid: self.valid.output() }
    }

    fn reset(&mut self) {
        if self.reset.raise() == ResetAction::ClearNow {
            self.clear();
        }
    }
}

/******************************************************************************/
