/* embcordic | table.rs
 * Copyright (c) 2025 L. Sartory
 * SPDX-License-Identifier: MIT
 */

/* Table-based sine generators */

/******************************************************************************/

use crate::clock::{Clocked, ResetAction, ResetLine};
use crate::config::{TableConfig, MAX_PORT_WIDTH};
use crate::error::{check_width, GenError};
use crate::fixed::sign_extend;
use crate::sideband::AuxPipeline;
use pxfm::f_sincospi;

/// First rejected address width of the full table
pub const FULL_TABLE_LIMIT: u32 = 24;
/// First rejected address width of the quarter-wave table, four times the entries of the full one
pub const QUARTER_TABLE_LIMIT: u32 = 26;
/// Two address bits go to the quadrant, one at least must remain
pub const QUARTER_TABLE_MIN: u32 = 3;

/******************************************************************************/

/// Sampled sine wave, `round(maxVal * sin(phase))` with `maxVal = 2^(OW-1) - 1`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SineTable {
    samples: Vec<i64>,
    output_width: u32
}

impl SineTable {
    /// `len` samples of a period split into `2^lg_table` steps
    ///
    /// With `half_step` set, sample `k` sits at `2π(k + 1/2) / 2^lg_table`, which makes the
    /// samples symmetric around a quarter period.
    fn sampled(len: usize, lg_table: u32, output_width: u32, half_step: bool) -> Self {
        let max = ((1i64 << (output_width - 1)) - 1) as f64;
        let steps = (1u64 << lg_table) as f64;
        let samples = (0..len as u64)
            .map(|k| {
                let twice = (2 * k + half_step as u64) as f64;
                let (sin, _) = f_sincospi(twice / steps);
                (max * sin).round() as i64
            })
            .collect();
        Self { samples, output_width }
    }

    /// One full period, one sample per phase step
    pub fn full(lg_table: u32, output_width: u32) -> Self {
        Self::sampled(1 << lg_table, lg_table, output_width, false)
    }

    /// One full period sampled half a step late
    pub fn full_offset(lg_table: u32, output_width: u32) -> Self {
        Self::sampled(1 << lg_table, lg_table, output_width, true)
    }

    /// First quarter period sampled half a step late
    pub fn quarter(lg_table: u32, output_width: u32) -> Self {
        Self::sampled(1 << (lg_table - 2), lg_table, output_width, true)
    }

    #[inline]
    pub fn get(&self, index: usize) -> i64 {
        self.samples[index]
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn output_width(&self) -> u32 {
        self.output_width
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.samples
    }
}

/******************************************************************************/

/// Phase sample fed to a table generator
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TableRequest {
    pub phase: u64,
    pub aux: bool
}

impl TableRequest {
    pub fn new(phase: u64) -> Self {
        Self { phase, aux: false }
    }

    pub fn with_aux(mut self, aux: bool) -> Self {
        self.aux = aux;
        self
    }
}

/// Registered outputs of a table generator
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TableOutput {
    pub value: i64,
    pub aux: bool
}

/// Which table layout a generator uses
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableKind {
    Full,
    QuarterWave
}

impl TableKind {
    /// Checks a configuration against this layout's bounds
    pub fn validate(self, config: &TableConfig) -> Result<(), GenError> {
        let lg = config.lg_table;
        match self {
            TableKind::Full => {
                check_width("table address width", lg, 1, u32::MAX)?;
                if lg >= FULL_TABLE_LIMIT {
                    log::error!("full table of 2^{lg} entries rejected");
                    return Err(GenError::TableTooLarge { requested: lg, limit: FULL_TABLE_LIMIT });
                }
            }
            TableKind::QuarterWave => {
                if lg < QUARTER_TABLE_MIN {
                    log::error!("quarter-wave table with {lg} address bits rejected");
                    return Err(GenError::TooFewAddressBits { requested: lg, minimum: QUARTER_TABLE_MIN });
                }
                if lg >= QUARTER_TABLE_LIMIT {
                    log::error!("quarter-wave table of 2^{lg} phase steps rejected");
                    return Err(GenError::TableTooLarge { requested: lg, limit: QUARTER_TABLE_LIMIT });
                }
            }
        }
        check_width("output width", config.output_width, 2, MAX_PORT_WIDTH)
    }

    /// Ticks from a phase to its sample
    pub fn latency(self) -> u32 {
        match self {
            TableKind::Full => 1,
            TableKind::QuarterWave => 3
        }
    }

    /// Table stored by a generator of this layout
    pub fn table(self, config: &TableConfig) -> SineTable {
        match self {
            TableKind::Full => SineTable::full(config.lg_table, config.output_width),
            TableKind::QuarterWave => SineTable::quarter(config.lg_table, config.output_width)
        }
    }
}

/******************************************************************************/

/// Full-period lookup: one tick from phase to sample
#[derive(Debug)]
pub struct FullTableGen {
    table: SineTable,
    lg_table: u32,
    reset: ResetLine,
    aux: AuxPipeline,
    value: i64
}

impl FullTableGen {
    pub fn new(config: TableConfig) -> Result<Self, GenError> {
        TableKind::Full.validate(&config)?;
        log::debug!("full sine table: 2^{} x {} bits", config.lg_table, config.output_width);
        Ok(Self {
            table: SineTable::full(config.lg_table, config.output_width),
            lg_table: config.lg_table,
            reset: ResetLine::new(config.reset),
            aux: AuxPipeline::new(TableKind::Full.latency(), config.aux),
            value: 0
        })
    }
}

impl Clocked for FullTableGen {
    type Input = Option<TableRequest>;
    type Output = TableOutput;

    fn tick(&mut self, input: Option<TableRequest>) -> TableOutput {
        if self.reset.take() {
            self.value = 0;
            self.aux.clear();
            return self.output();
        }
        if let Some(request) = input {
            let index = request.phase & ((1 << self.lg_table) - 1);
            self.value = self.table.get(index as usize);
            self.aux.tick(request.aux);
        }
        self.output()
    }

    fn output(&self) -> TableOutput {
        TableOutput { value: self.value, aux: self.aux.output() }
    }

    fn reset(&mut self) {
        if self.reset.raise() == ResetAction::ClearNow {
            self.value = 0;
            self.aux.clear();
        }
    }
}

/******************************************************************************/

#[derive(Clone, Copy, Debug, Default)]
struct QuarterRegisters {
    // decode
    negate: [bool; 2],
    index: u64,
    // lookup
    lookup: i64,
    // sign
    value: i64
}

/// Quarter-period lookup with mirror and negate decoding
///
/// Stores a quarter of the samples. The second phase bit mirrors the index within the quarter,
/// the top bit negates the looked-up sample. Three ticks from phase to sample.
#[derive(Debug)]
pub struct QuarterWaveGen {
    table: SineTable,
    lg_table: u32,
    reset: ResetLine,
    aux: AuxPipeline,
    regs: QuarterRegisters
}

impl QuarterWaveGen {
    pub fn new(config: TableConfig) -> Result<Self, GenError> {
        TableKind::QuarterWave.validate(&config)?;
        log::debug!(
            "quarter-wave sine table: 2^{} x {} bits for 2^{} phase steps",
            config.lg_table - 2,
            config.output_width,
            config.lg_table
        );
        Ok(Self {
            table: SineTable::quarter(config.lg_table, config.output_width),
            lg_table: config.lg_table,
            reset: ResetLine::new(config.reset),
            aux: AuxPipeline::new(TableKind::QuarterWave.latency(), config.aux),
            regs: QuarterRegisters::default()
        })
    }

    fn clear(&mut self) {
        self.regs = QuarterRegisters::default();
        self.aux.clear();
    }
}

impl Clocked for QuarterWaveGen {
    type Input = Option<TableRequest>;
    type Output = TableOutput;

    fn tick(&mut self, input: Option<TableRequest>) -> TableOutput {
        if self.reset.take() {
            self.clear();
            return self.output();
        }
        let Some(request) = input else {
            return self.output();
        };

        let cur = self.regs;
        let lg = self.lg_table;
        let index_mask = (1u64 << (lg - 2)) - 1;
        let mut next = cur;

        next.negate[0] = (request.phase >> (lg - 1)) & 1 == 1;
        next.index = if (request.phase >> (lg - 2)) & 1 == 1 {
            !request.phase & index_mask
        } else {
            request.phase & index_mask
        };

        next.lookup = self.table.get(cur.index as usize);
        next.negate[1] = cur.negate[0];

        next.value = if cur.negate[1] {
            sign_extend(-cur.lookup, self.table.output_width())
        } else {
            cur.lookup
        };

        self.regs = next;
        self.aux.tick(request.aux);
        self.output()
    }

    fn output(&self) -> TableOutput {
        TableOutput { value: self.regs.value, aux: self.aux.output() }
    }

    fn reset(&mut self) {
        if self.reset.raise() == ResetAction::ClearNow {
            self.clear();
        }
    }
}

/******************************************************************************/

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResetStyle;
    use crate::hex::HexImage;
    use core::f64::consts::PI;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    /// Feeds every phase once, then flushes, collecting the samples in order
    fn sweep<G: Clocked<Input = Option<TableRequest>, Output = TableOutput>>(gen: &mut G, lg: u32, latency: u32) -> Vec<i64> {
        let n = 1u64 << lg;
        (0..n + latency as u64 - 1)
            .map(|p| gen.tick(Some(TableRequest::new(p % n))).value)
            .skip(latency as usize - 1)
            .collect()
    }

    #[test]
    fn test_full_values() {
        let table = SineTable::full(4, 12);
        assert_eq!(table.len(), 16);
        assert_eq!(table.get(0), 0);
        assert_eq!(table.get(4), 2047);
        assert_eq!(table.get(8), 0);
        assert_eq!(table.get(12), -2047);
        assert_eq!(table.get(2), (2047.0 * (PI / 4.0).sin()).round() as i64);
    }

    #[test]
    fn test_widest_output() {
        let max = (1i64 << 31) - 1;
        let table = SineTable::full(4, 32);
        assert_eq!(table.get(4), max);
        assert_eq!(table.get(12), -max);
        assert_eq!(table.get(2), (max as f64 * (PI / 4.0).sin()).round() as i64);

        let mut gen = FullTableGen::new(TableConfig::new(4, 32)).unwrap();
        assert_eq!(gen.tick(Some(TableRequest::new(12))).value, -max);
        let mut gen = QuarterWaveGen::new(TableConfig::new(6, 32)).unwrap();
        assert_eq!(sweep(&mut gen, 6, 3), SineTable::full_offset(6, 32).as_slice());
        assert_eq!(HexImage::new(32, vec![-max]).to_string(), "80000001\n");
        assert!(TableKind::Full.validate(&TableConfig::new(4, 33)).is_err());
    }

    #[test]
    fn test_quarter_values() {
        let table = SineTable::quarter(5, 12);
        assert_eq!(table.len(), 8);
        assert_eq!(table.get(0), (2047.0 * (PI / 32.0).sin()).round() as i64);
        assert!(table.as_slice().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_full_gen_identity() {
        let mut gen = FullTableGen::new(TableConfig::new(10, 16)).unwrap();
        assert_eq!(gen.tick(Some(TableRequest::new(0))).value, 0);
        assert_eq!(gen.tick(Some(TableRequest::new(256))).value, 32767);
        // wider phases are truncated to the table address
        assert_eq!(gen.tick(Some(TableRequest::new(1024 + 768))).value, -32767);
    }

    #[test]
    fn test_quarter_matches_offset_full_table() {
        for lg in 3..=12 {
            for ow in [4, 12, 18] {
                let mut gen = QuarterWaveGen::new(TableConfig::new(lg, ow)).unwrap();
                let samples = sweep(&mut gen, lg, 3);
                assert_eq!(samples, SineTable::full_offset(lg, ow).as_slice(), "lg {lg} ow {ow}");
            }
        }
    }

    #[test]
    fn test_quarter_close_to_full() {
        for lg in 3..=12 {
            let ow = 16;
            let mut quarter = QuarterWaveGen::new(TableConfig::new(lg, ow)).unwrap();
            let mut full = FullTableGen::new(TableConfig::new(lg, ow)).unwrap();
            let a = sweep(&mut quarter, lg, 3);
            let b = sweep(&mut full, lg, 1);
            // half a phase step of slope, plus rounding
            let bound = (32767.0 * PI / (1u64 << lg) as f64).ceil() as i64 + 1;
            assert!(a.iter().zip(&b).all(|(a, b)| (a - b).abs() <= bound), "lg {lg}");
        }
    }

    #[test]
    fn test_clock_enable() {
        let mut gen = QuarterWaveGen::new(TableConfig::new(6, 12).with_aux(true)).unwrap();
        gen.tick(Some(TableRequest::new(16).with_aux(true)));
        let held = gen.output();
        for _ in 0..10 {
            assert_eq!(gen.tick(None), held);
        }
        gen.tick(Some(TableRequest::new(0)));
        let out = gen.tick(Some(TableRequest::new(0)));
        assert!(out.aux);
        assert_eq!(out.value, SineTable::full_offset(6, 12).get(16));
    }

    #[test]
    fn test_aux_alignment() {
        for kind in [TableKind::Full, TableKind::QuarterWave] {
            let config = TableConfig::new(8, 12).with_aux(true);
            let mut gen: Box<dyn Clocked<Input = Option<TableRequest>, Output = TableOutput>> = match kind {
                TableKind::Full => Box::new(FullTableGen::new(config).unwrap()),
                TableKind::QuarterWave => Box::new(QuarterWaveGen::new(config).unwrap())
            };
            let reference = match kind {
                TableKind::Full => SineTable::full(8, 12),
                TableKind::QuarterWave => SineTable::full_offset(8, 12)
            };
            let mut rng = StdRng::seed_from_u64(11);
            let mut issued = Vec::new();
            for _ in 0..3000 {
                if !rng.random_bool(0.6) {
                    gen.tick(None);
                    continue;
                }
                let request = TableRequest::new(rng.random_range(0..256)).with_aux(rng.random());
                let out = gen.tick(Some(request));
                issued.push(request);
                if issued.len() >= kind.latency() as usize {
                    let expected = issued[issued.len() - kind.latency() as usize];
                    assert_eq!(out.aux, expected.aux);
                    assert_eq!(out.value, reference.get(expected.phase as usize));
                }
            }
        }
    }

    #[test]
    fn test_bounds() {
        let full = |lg| TableKind::Full.validate(&TableConfig::new(lg, 12));
        assert!(matches!(full(24), Err(GenError::TableTooLarge { requested: 24, limit: 24 })));
        assert!(full(23).is_ok());
        assert!(matches!(full(0), Err(GenError::InvalidWidth { .. })));

        let quarter = |lg| TableKind::QuarterWave.validate(&TableConfig::new(lg, 12));
        let err = quarter(2).unwrap_err();
        assert!(err.is_precondition());
        assert!(quarter(3).is_ok());
        assert!(quarter(25).is_ok());
        assert!(matches!(quarter(26), Err(GenError::TableTooLarge { requested: 26, .. })));
        assert!(QuarterWaveGen::new(TableConfig::new(2, 12)).is_err());
    }

    #[test]
    fn test_reset_clears_pipeline() {
        let config = TableConfig::new(6, 12).with_aux(true).with_reset(ResetStyle::Sync);
        let mut gen = QuarterWaveGen::new(config).unwrap();
        for _ in 0..3 {
            gen.tick(Some(TableRequest::new(16).with_aux(true)));
        }
        assert!(gen.output().aux);
        gen.reset();
        assert!(gen.output().aux);
        assert_eq!(gen.tick(Some(TableRequest::new(16))), TableOutput::default());
        assert_eq!(gen.tick(Some(TableRequest::new(16))), TableOutput::default());
    }
}
