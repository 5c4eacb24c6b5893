/* embcordic | hex.rs
 * Copyright (c) 2025 L. Sartory
 * SPDX-License-Identifier: MIT
 */

/* Memory images in the format read by `$readmemh` */

/******************************************************************************/

use crate::fixed::{mask, sign_extend};
use std::fmt;
use std::io::{self, Write};

/// Table contents as fixed-width two's complement words, one per line
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HexImage {
    width: u32,
    rows: Vec<i64>
}

impl HexImage {
    pub fn new(width: u32, rows: Vec<i64>) -> Self {
        Self { width, rows }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn rows(&self) -> &[i64] {
        &self.rows
    }

    /// Hex digits per line
    pub fn digits(&self) -> usize {
        self.width.div_ceil(4) as usize
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "{self}")
    }

    /// Reads an image back, ignoring blank lines and `//` comments
    pub fn parse(text: &str, width: u32) -> Option<Self> {
        let rows = text
            .lines()
            .map(|line| line.split("//").next().unwrap_or("").trim())
            .filter(|line| !line.is_empty())
            .map(|line| i64::from_str_radix(line, 16).ok().map(|v| sign_extend(v, width)))
            .collect::<Option<Vec<_>>>()?;
        Some(Self { width, rows })
    }
}

impl fmt::Display for HexImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.digits();
        for &row in &self.rows {
            writeln!(f, "{:0digits$x}", mask(row, self.width))?;
        }
        Ok(())
    }
}

/******************************************************************************/
