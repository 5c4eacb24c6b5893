/* embcordic | cordic.rs
 * Copyright (c) 2025 L. Sartory
 * SPDX-License-Identifier: MIT
 */

/* Sequential CORDIC: one micro-rotation per clock */

/******************************************************************************/

use crate::angle::AngleTable;
use crate::clock::{Clocked, ResetAction, ResetLine};
use crate::config::{CordicConfig, Precision};
use crate::error::GenError;
use crate::fixed::{Phase, SWord};
use crate::prerotate::prerotate;
use crate::round::{round_convergent, Gain, GainCorrection};
use crate::sideband::AuxPipeline;

/******************************************************************************/

/// Rotation request: rotate `(x, y)` by `phase`
///
/// Values are truncated to their port widths, the way wires would be.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Request {
    pub phase: u64,
    pub x: i64,
    pub y: i64,
    pub aux: bool
}

impl Request {
    pub fn new(phase: u64, x: i64, y: i64) -> Self {
        Self { phase, x, y, aux: false }
    }

    pub fn with_aux(mut self, aux: bool) -> Self {
        self.aux = aux;
        self
    }
}

/// Registered outputs of the sequential engine
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Output {
    pub x: i64,
    pub y: i64,
    pub aux: bool,
    /// High for the single tick on which a new result registers
    pub done: bool,
    pub busy: bool
}

/// Engine state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RotationState {
    Idle,
    Rotating(usize)
}

/******************************************************************************/

/// Applies micro-rotation `stage`, steering the residual phase toward zero
#[inline]
pub(crate) fn micro_rotate(x: SWord, y: SWord, phase: Phase, angle: u64, stage: usize) -> (SWord, SWord, Phase) {
    let shift = stage as u32 + 1;
    if phase.msb() {
        (x.wrapping_add(y.shr(shift)), y.wrapping_sub(x.shr(shift)), phase.wrapping_add(angle))
    } else {
        (x.wrapping_sub(y.shr(shift)), y.wrapping_add(x.shr(shift)), phase.wrapping_sub(angle))
    }
}

/// Sign extends a request's ports and aligns them to the working registers
pub(crate) fn load(precision: &Precision, request: &Request) -> (SWord, SWord, Phase) {
    let iw = precision.input_width;
    let ww = precision.working_width;
    let shift = precision.input_shift();
    (
        SWord::new(request.x, iw).widen(ww, shift),
        SWord::new(request.y, iw).widen(ww, shift),
        Phase::new(request.phase, precision.phase_width)
    )
}

/******************************************************************************/

#[derive(Clone, Copy, Debug)]
struct Registers {
    state: RotationState,
    busy: bool,
    x: SWord,
    y: SWord,
    phase: Phase,
    out_x: i64,
    out_y: i64,
    done: bool
}

impl Registers {
    fn cleared(precision: &Precision) -> Self {
        Self {
            state: RotationState::Idle,
            busy: false,
            x: SWord::zero(precision.working_width),
            y: SWord::zero(precision.working_width),
            phase: Phase::new(0, precision.phase_width),
            out_x: 0,
            out_y: 0,
            done: false
        }
    }
}

/// Sequential CORDIC rotation engine
///
/// Accepts a request only while not busy, then spends one tick per stage. Requests arriving
/// while busy are dropped: there is no queue and no backpressure.
///
/// For example:
/// ```
/// use embcordic::{CordicConfig, Request, SeqCordic};
///
/// let mut cordic = SeqCordic::new(CordicConfig::default()).unwrap();
/// let out = cordic.rotate(Request::new(0x20000, 1000, 0));
/// let c = cordic.correction(16);
/// assert!(c.apply(out.x).abs() <= 2);
/// assert!((c.apply(out.y) - 1000).abs() <= 2);
/// ```
#[derive(Debug)]
pub struct SeqCordic {
    precision: Precision,
    angles: AngleTable,
    reset: ResetLine,
    aux: AuxPipeline,
    regs: Registers
}

impl SeqCordic {
    /// Validates the configuration and builds the angle table
    pub fn new(config: CordicConfig) -> Result<Self, GenError> {
        let precision = config.precision()?;
        let angles = AngleTable::new(precision.stages, precision.phase_width);
        log::debug!(
            "sequential cordic: {} stages, {} bit registers, gain {:.6}, angle error <= {} units",
            precision.stages,
            precision.working_width,
            Gain::new(precision.stages).value(),
            angles.rotation_error_bound()
        );
        Ok(Self {
            precision,
            angles,
            reset: ResetLine::new(config.reset),
            // pre-rotation plus one tick per stage
            aux: AuxPipeline::new(precision.stages as u32 + 1, config.aux),
            regs: Registers::cleared(&precision)
        })
    }

    pub fn precision(&self) -> &Precision {
        &self.precision
    }

    pub fn angles(&self) -> &AngleTable {
        &self.angles
    }

    pub fn gain(&self) -> Gain {
        Gain::new(self.precision.stages)
    }

    /// Multiply-and-shift bringing an output back to the scale of the input
    pub fn correction(&self, shift: u32) -> GainCorrection {
        GainCorrection::new(self.gain().value() * self.precision.output_scale(), shift)
    }

    pub fn state(&self) -> RotationState {
        self.regs.state
    }

    pub fn is_busy(&self) -> bool {
        self.regs.busy
    }

    /// Ticks from an accepted request to its result
    pub fn latency(&self) -> usize {
        self.precision.stages + 1
    }

    /// Residual phase still to be rotated, in phase units
    pub fn residual(&self) -> i64 {
        self.regs.phase.as_signed()
    }

    fn clear(&mut self) {
        self.regs = Registers::cleared(&self.precision);
        self.aux.clear();
    }

    /// Blocking rotation
    ///
    /// Waits for any in-flight rotation, then issues `request` and ticks until its result
    /// registers.
    pub fn rotate(&mut self, request: Request) -> Output {
        while self.regs.busy {
            self.tick(None);
        }
        let mut out = self.tick(Some(request));
        while !out.done {
            out = self.tick(None);
        }
        out
    }
}

impl Clocked for SeqCordic {
    type Input = Option<Request>;
    type Output = Output;

    fn tick(&mut self, strobe: Option<Request>) -> Output {
        if self.reset.take() {
            self.clear();
            return self.output();
        }

        let cur = self.regs;
        let mut next = cur;
        next.done = false;
        let mut accepted = false;

        match cur.state {
            RotationState::Idle => match strobe {
                Some(request) if !cur.busy => {
                    let (x, y, phase) = load(&self.precision, &request);
                    let folded = prerotate(x, y, phase);
                    next.x = folded.x;
                    next.y = folded.y;
                    next.phase = folded.phase;
                    next.state = RotationState::Rotating(0);
                    accepted = true;
                }
                Some(_) => log::trace!("strobe dropped while draining"),
                None => {}
            },
            RotationState::Rotating(k) => {
                if strobe.is_some() {
                    log::trace!("strobe dropped at stage {k}");
                }
                let (x, y, phase) = micro_rotate(cur.x, cur.y, cur.phase, self.angles.angle(k), k);
                next.x = x;
                next.y = y;
                next.phase = phase;
                if k + 1 == self.precision.stages {
                    let drop = self.precision.output_shift();
                    next.out_x = round_convergent(x, drop, self.precision.output_width);
                    next.out_y = round_convergent(y, drop, self.precision.output_width);
                    next.done = true;
                    next.state = RotationState::Idle;
                } else {
                    next.state = RotationState::Rotating(k + 1);
                }
            }
        }
        // Busy stays up through the tick the result registers
        next.busy = accepted || cur.state != RotationState::Idle;

        self.aux.tick(accepted && strobe.is_some_and(|r| r.aux));
        self.regs = next;
        self.output()
    }

    fn output(&self) -> Output {
        Output {
            x: self.regs.out_x,
            y: self.regs.out_y,
            aux: self.aux.output(),
            done: self.regs.done,
            busy: self.regs.busy
        }
    }

    fn reset(&mut self) {
        match self.reset.raise() {
            ResetAction::ClearNow => {
                log::trace!("asynchronous reset, in-flight rotation discarded");
                self.clear();
            }
            ResetAction::ClearOnTick | ResetAction::Ignore => {}
        }
    }
}

/******************************************************************************/
