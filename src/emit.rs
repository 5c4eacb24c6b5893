/* embcordic | emit.rs
 * Copyright (c) 2025 L. Sartory
 * SPDX-License-Identifier: MIT
 */

/* Generation entrypoint: module description plus memory image */

/******************************************************************************/

use crate::angle::AngleTable;
use crate::config::{CordicConfig, Precision, ResetStyle, TableConfig};
use crate::error::GenError;
use crate::hex::HexImage;
use crate::round::Gain;
use crate::table::{SineTable, TableKind};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/******************************************************************************/

/// Writes the descriptive comment block opening a generated file
pub trait HeaderWriter {
    fn write_header(&self, out: &mut dyn Write, file_name: &str, purpose: &str) -> io::Result<()>;
}

/// Minimal header: file name, project and purpose
#[derive(Clone, Copy, Debug)]
pub struct PlainHeader {
    pub project: &'static str
}

impl Default for PlainHeader {
    fn default() -> Self {
        Self { project: env!("CARGO_PKG_NAME") }
    }
}

impl HeaderWriter for PlainHeader {
    fn write_header(&self, out: &mut dyn Write, file_name: &str, purpose: &str) -> io::Result<()> {
        let rule = "/".repeat(80);
        writeln!(out, "{rule}\n//\n// Filename:\t{file_name}\n//\n// Project:\t{}\n//", self.project)?;
        for (i, line) in purpose.lines().enumerate() {
            if i == 0 {
                writeln!(out, "// Purpose:\t{line}")?;
            } else {
                writeln!(out, "//\t\t{line}")?;
            }
        }
        writeln!(out, "//\n{rule}\n//\n`default_nettype\tnone\n//")
    }
}

/// Derives a module identifier from a file name
///
/// Example: `"out/quarter-wave.v"` gives `"quarter_wave"`
pub fn module_name(base: &str) -> Result<String, GenError> {
    let stem = Path::new(base)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("");
    let mut name: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if name.is_empty() {
        return Err(GenError::InvalidName(base.to_owned()));
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    Ok(name)
}

/******************************************************************************/

/// What to generate
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GeneratorKind {
    FullTable,
    QuarterWave,
    /// Sequential CORDIC; the request size is the stage count
    Cordic { phase_width: u32 }
}

/// Arguments of [`generate()`]
#[derive(Clone, Copy, Debug)]
pub struct GenerateRequest<'a> {
    pub kind: GeneratorKind,
    pub base_name: &'a str,
    /// Table address bits, or stage count for the CORDIC
    pub size: u32,
    pub output_width: u32,
    pub reset: ResetStyle,
    pub aux: bool
}

impl<'a> GenerateRequest<'a> {
    pub fn new(kind: GeneratorKind, base_name: &'a str, size: u32, output_width: u32) -> Self {
        Self { kind, base_name, size, output_width, reset: ResetStyle::None, aux: false }
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

/// What [`generate()`] produced
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifacts {
    pub module_name: String,
    pub hex_path: PathBuf,
    pub rows: usize
}

/// Validated generation plan; building one never writes anything
enum Plan {
    Table(TableKind, TableConfig, SineTable),
    Cordic(Precision, AngleTable)
}

impl Plan {
    fn new(request: &GenerateRequest) -> Result<Self, GenError> {
        let table = |kind: TableKind| -> Result<Plan, GenError> {
            let config = TableConfig::new(request.size, request.output_width)
                .with_reset(request.reset)
                .with_aux(request.aux);
            kind.validate(&config)?;
            Ok(Plan::Table(kind, config, kind.table(&config)))
        };
        match request.kind {
            GeneratorKind::FullTable => table(TableKind::Full),
            GeneratorKind::QuarterWave => table(TableKind::QuarterWave),
            GeneratorKind::Cordic { phase_width } => {
                let precision = CordicConfig::default()
                    .with_widths(request.output_width, request.output_width, phase_width)
                    .with_stages(request.size as usize)
                    .precision()?;
                Ok(Plan::Cordic(precision, AngleTable::new(precision.stages, phase_width)))
            }
        }
    }

    fn image(&self) -> HexImage {
        match self {
            Plan::Table(_, config, table) => HexImage::new(config.output_width, table.as_slice().to_vec()),
            Plan::Cordic(precision, angles) => HexImage::new(
                precision.phase_width,
                angles.as_slice().iter().map(|&a| a as i64).collect()
            )
        }
    }
}

/// Writes a module description to `out` and its memory image to `hex_dir/<name>.hex`
///
/// Every parameter is checked first: on error nothing has been written.
pub fn generate<W: Write>(
    out: &mut W,
    hex_dir: &Path,
    request: &GenerateRequest,
    header: &dyn HeaderWriter
) -> Result<Artifacts, GenError> {
    let name = module_name(request.base_name)?;
    let plan = Plan::new(request)?;
    let file_name = format!("{name}.v");

    match &plan {
        Plan::Table(TableKind::Full, config, _) => {
            header.write_header(out, &file_name, FULL_PURPOSE)?;
            write_full_table(out, &name, config)?;
        }
        Plan::Table(TableKind::QuarterWave, config, _) => {
            header.write_header(out, &file_name, QUARTER_PURPOSE)?;
            write_quarter_wave(out, &name, config)?;
        }
        Plan::Cordic(precision, _) => {
            header.write_header(out, &file_name, CORDIC_PURPOSE)?;
            write_seq_cordic(out, &name, precision, request.reset, request.aux)?;
        }
    }
    out.flush()?;

    let image = plan.image();
    let hex_path = hex_dir.join(format!("{name}.hex"));
    let mut hex = BufWriter::new(File::create(&hex_path)?);
    image.write_to(&mut hex)?;
    hex.flush()?;

    log::info!("{name}: module written, {} rows in {}", image.rows().len(), hex_path.display());
    Ok(Artifacts { module_name: name, hex_path, rows: image.rows().len() })
}

/******************************************************************************/

const FULL_PURPOSE: &str = "Sine wave by direct table lookup, one sample per phase step.\n\
    Lowest latency of all the sine wave generators.";

const QUARTER_PURPOSE: &str = "Sine wave from a quarter period table. The two top phase bits\n\
    select the quadrant: the second one mirrors the table index, the first\n\
    one negates the sample. A quarter of the memory, three clocks of latency.";

const CORDIC_PURPOSE: &str = "Sequential CORDIC rotating (i_xval, i_yval) by i_phase, one\n\
    micro-rotation per clock. Strobes while o_busy is high are ignored.\n\
    The processing gain is not compensated.";

/// Port name and clocked block preamble for a reset style
struct ResetFragments {
    port: &'static str,
    always: &'static str
}

impl ResetFragments {
    fn new(reset: ResetStyle) -> Self {
        match reset {
            ResetStyle::None => Self { port: "", always: "\talways @(posedge i_clk)\n\t" },
            ResetStyle::Sync => Self { port: "i_reset", always: "\talways @(posedge i_clk)\n\tif (i_reset)\n" },
            ResetStyle::Async => Self {
                port: "i_areset_n",
                always: "\talways @(posedge i_clk, negedge i_areset_n)\n\tif (!i_areset_n)\n"
            }
        }
    }

    fn has_reset(&self) -> bool {
        !self.port.is_empty()
    }

    /// `"i_reset, "` or nothing
    fn port_list(&self) -> String {
        if self.has_reset() {
            format!("{}, ", self.port)
        } else {
            String::new()
        }
    }
}

fn write_full_table<W: Write>(out: &mut W, name: &str, config: &TableConfig) -> io::Result<()> {
    let r = ResetFragments::new(config.reset);
    let rl = r.port_list();
    let (aux_in, aux_out) = if config.aux { ("i_aux, ", ", o_aux") } else { ("", "") };

    writeln!(out, "module\t{name}(i_clk, {rl}i_ce, {aux_in}i_phase, o_val{aux_out});")?;
    writeln!(out, "\tparameter\tPW = {}, OW = {};", config.lg_table, config.output_width)?;
    writeln!(out, "\tinput\twire\t\t\ti_clk, {rl}i_ce;")?;
    writeln!(out, "\tinput\twire\t[(PW-1):0]\ti_phase;")?;
    writeln!(out, "\toutput\treg\t[(OW-1):0]\to_val;")?;
    if config.aux {
        writeln!(out, "\tinput\twire\t\t\ti_aux;\n\toutput\treg\t\t\to_aux;")?;
    }
    writeln!(out, "\n\treg\t[(OW-1):0]\ttbl\t[0:((1<<PW)-1)];\n")?;
    writeln!(out, "\tinitial\t$readmemh(\"{name}.hex\", tbl);\n")?;

    write!(out, "{}", r.always)?;
    if r.has_reset() {
        write!(out, "\t\to_val <= 0;\n\telse ")?;
    }
    writeln!(out, "if (i_ce)\n\t\to_val <= tbl[i_phase];\n")?;

    if config.aux {
        write!(out, "{}", r.always)?;
        if r.has_reset() {
            write!(out, "\t\to_aux <= 0;\n\telse ")?;
        }
        writeln!(out, "if (i_ce)\n\t\to_aux <= i_aux;\n")?;
    }
    writeln!(out, "endmodule")
}

fn write_quarter_wave<W: Write>(out: &mut W, name: &str, config: &TableConfig) -> io::Result<()> {
    let r = ResetFragments::new(config.reset);
    let rl = r.port_list();
    let (aux_in, aux_out) = if config.aux { ("i_aux, ", ", o_aux") } else { ("", "") };

    writeln!(out, "module\t{name}(i_clk, {rl}i_ce, {aux_in}i_phase, o_val{aux_out});")?;
    writeln!(out, "\tparameter\tPW = {}, OW = {};", config.lg_table, config.output_width)?;
    writeln!(out, "\tinput\twire\t\t\ti_clk, {rl}i_ce;")?;
    writeln!(out, "\tinput\twire\t[(PW-1):0]\ti_phase;")?;
    writeln!(out, "\toutput\treg\t[(OW-1):0]\to_val;")?;
    if config.aux {
        writeln!(out, "\tinput\twire\t\t\ti_aux;\n\toutput\treg\t\t\to_aux;")?;
    }
    writeln!(out, "\n\treg\t[(OW-1):0]\tquartertable\t[0:((1<<(PW-2))-1)];\n")?;
    writeln!(out, "\tinitial\t$readmemh(\"{name}.hex\", quartertable);\n")?;
    writeln!(out, "\treg\t[1:0]\t\tnegate;\n\treg\t[(PW-3):0]\tindex;\n\treg\t[(OW-1):0]\ttblvalue;\n")?;

    write!(out, "{}", r.always)?;
    if r.has_reset() {
        write!(out, "\tbegin\n\t\tnegate <= 0;\n\t\tindex <= 0;\n\t\ttblvalue <= 0;\n\t\to_val <= 0;\n\tend else ")?;
    }
    writeln!(
        out,
        "if (i_ce)\n\tbegin\n\
         \t\t// Decode\n\
         \t\tnegate[0] <= i_phase[(PW-1)];\n\
         \t\tindex <= (i_phase[(PW-2)]) ? ~i_phase[(PW-3):0] : i_phase[(PW-3):0];\n\
         \t\t// Lookup\n\
         \t\ttblvalue <= quartertable[index];\n\
         \t\tnegate[1] <= negate[0];\n\
         \t\t// Sign\n\
         \t\to_val <= (negate[1]) ? -tblvalue : tblvalue;\n\
         \tend\n"
    )?;

    if config.aux {
        writeln!(out, "\treg\t[1:0]\taux;\n")?;
        write!(out, "{}", r.always)?;
        if r.has_reset() {
            write!(out, "\t\t{{ o_aux, aux }} <= 0;\n\telse ")?;
        }
        writeln!(out, "if (i_ce)\n\t\t{{ o_aux, aux }} <= {{ aux, i_aux }};\n")?;
    }
    writeln!(out, "endmodule")
}

fn write_seq_cordic<W: Write>(
    out: &mut W,
    name: &str,
    p: &Precision,
    reset: ResetStyle,
    aux: bool
) -> io::Result<()> {
    let r = ResetFragments::new(reset);
    let rl = r.port_list();
    let (aux_in, aux_out) = if aux { ("i_aux, ", ", o_aux") } else { ("", "") };
    let pw = p.phase_width;
    let quarter = 1u64 << (pw - 2);
    let stage_bits = crate::fixed::ceil_log2(p.stages as u64).max(1);

    writeln!(
        out,
        "module\t{name}(i_clk, {rl}i_stb, {aux_in}i_xval, i_yval, i_phase,\n\t\to_busy, o_done, o_xval, o_yval{aux_out});"
    )?;
    writeln!(
        out,
        "\tlocalparam\tIW = {}, OW = {}, PW = {pw}, WW = {}, NSTAGES = {};",
        p.input_width, p.output_width, p.working_width, p.stages
    )?;
    writeln!(
        out,
        "\t// Gain: {:.6}, not compensated; outputs carry 2^(OW-IW-1) = {} input LSB",
        Gain::new(p.stages).value(),
        p.output_scale()
    )?;
    writeln!(out, "\tinput\twire\t\t\t\ti_clk, {rl}i_stb;")?;
    writeln!(out, "\tinput\twire\tsigned\t[(IW-1):0]\ti_xval, i_yval;")?;
    writeln!(out, "\tinput\twire\t\t[(PW-1):0]\ti_phase;")?;
    writeln!(out, "\toutput\treg\t\t\t\to_busy, o_done;")?;
    writeln!(out, "\toutput\treg\tsigned\t[(OW-1):0]\to_xval, o_yval;")?;
    if aux {
        writeln!(out, "\tinput\twire\t\t\t\ti_aux;\n\toutput\treg\t\t\t\to_aux;")?;
    }

    writeln!(out, "\n\treg\t[(PW-1):0]\tcordic_angle\t[0:(NSTAGES-1)];\n")?;
    writeln!(out, "\tinitial\t$readmemh(\"{name}.hex\", cordic_angle);\n")?;

    writeln!(out, "\twire\tsigned\t[(WW-1):0]\te_xval, e_yval;")?;
    writeln!(out, "\tassign\te_xval = {{ i_xval[(IW-1)], i_xval, {{(WW-IW-1){{1'b0}}}} }};")?;
    writeln!(out, "\tassign\te_yval = {{ i_yval[(IW-1)], i_yval, {{(WW-IW-1){{1'b0}}}} }};\n")?;

    writeln!(out, "\treg\tsigned\t[(WW-1):0]\tprex, prey;\n\treg\t\t[(PW-1):0]\tpreph;")?;
    writeln!(out, "\talways @(*)\n\tcase(i_phase[(PW-1):(PW-3)])")?;
    writeln!(out, "\t3'b000, 3'b111: begin prex = e_xval; prey = e_yval; preph = i_phase; end")?;
    writeln!(out, "\t3'b001, 3'b010: begin prex = -e_yval; prey = e_xval; preph = i_phase - {pw}'h{quarter:x}; end")?;
    writeln!(
        out,
        "\t3'b011, 3'b100: begin prex = -e_xval; prey = -e_yval; preph = i_phase - {pw}'h{:x}; end",
        2 * quarter
    )?;
    writeln!(
        out,
        "\tdefault: begin prex = e_yval; prey = -e_xval; preph = i_phase - {pw}'h{:x}; end\n\tendcase\n",
        3 * quarter
    )?;

    writeln!(out, "\treg\tsigned\t[(WW-1):0]\txv, yv;\n\treg\t\t[(PW-1):0]\tph;")?;
    writeln!(out, "\treg\t\t[{}:0]\tstate;\n\treg\t\t\trotating{};\n", stage_bits - 1, if aux { ", aux" } else { "" })?;
    writeln!(out, "\twire\tsigned\t[(WW-1):0]\tnxt_x, nxt_y, rnd_x, rnd_y;")?;
    writeln!(out, "\tassign\tnxt_x = (ph[PW-1]) ? xv + (yv >>> (state+1)) : xv - (yv >>> (state+1));")?;
    writeln!(out, "\tassign\tnxt_y = (ph[PW-1]) ? yv - (xv >>> (state+1)) : yv + (xv >>> (state+1));")?;
    for v in ["x", "y"] {
        writeln!(
            out,
            "\tassign\trnd_{v} = nxt_{v} + {{ {{(OW){{1'b0}}}}, nxt_{v}[(WW-OW)], {{(WW-OW-1){{!nxt_{v}[(WW-OW)]}}}} }};"
        )?;
    }
    writeln!(out)?;

    let aux_capture = if aux { "\t\t\t\taux <= i_aux;\n" } else { "" };
    writeln!(out, "\tinitial\t{{ o_busy, o_done, rotating }} = 0;")?;
    write!(out, "{}", r.always)?;
    if r.has_reset() {
        write!(out, "\tbegin\n\t\to_busy <= 0;\n\t\to_done <= 0;\n\t\trotating <= 0;\n\t\tstate <= 0;\n\tend else ")?;
    }
    writeln!(
        out,
        "begin\n\
         \t\to_done <= 1'b0;\n\
         \t\to_busy <= rotating || (i_stb && !o_busy);\n\
         \t\tif (!rotating)\n\
         \t\tbegin\n\
         \t\t\tif (i_stb && !o_busy)\n\
         \t\t\tbegin\n\
         \t\t\t\txv <= prex;\n\
         \t\t\t\tyv <= prey;\n\
         \t\t\t\tph <= preph;\n\
         {aux_capture}\
         \t\t\t\tstate <= 0;\n\
         \t\t\t\trotating <= 1'b1;\n\
         \t\t\tend\n\
         \t\tend else begin\n\
         \t\t\txv <= nxt_x;\n\
         \t\t\tyv <= nxt_y;\n\
         \t\t\tph <= (ph[PW-1]) ? ph + cordic_angle[state] : ph - cordic_angle[state];\n\
         \t\t\tstate <= state + 1;\n\
         \t\t\tif (state == NSTAGES-1)\n\
         \t\t\tbegin\n\
         \t\t\t\trotating <= 1'b0;\n\
         \t\t\t\to_done <= 1'b1;\n\
         \t\t\t\to_xval <= rnd_x[(WW-1):(WW-OW)];\n\
         \t\t\t\to_yval <= rnd_y[(WW-1):(WW-OW)];\n\
         \t\t\tend\n\
         \t\tend\n\
         \tend\n"
    )?;

    if aux {
        write!(out, "{}", r.always)?;
        if r.has_reset() {
            write!(out, "\t\to_aux <= 0;\n\telse\n\t")?;
        }
        writeln!(out, "\to_aux <= (rotating && state == NSTAGES-1) ? aux : 1'b0;\n")?;
    }
    writeln!(out, "endmodule")
}

/******************************************************************************/
