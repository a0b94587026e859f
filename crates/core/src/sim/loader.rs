//! Trace Loader.
//!
//! This module turns trace text into [`TraceRecord`]s. It performs:
//! 1. **Line parsing:** Each record is `<label> <address>`, where the label is `0` (load),
//!    `1` (store), or `2` (instruction fetch) and the address is hexadecimal, with or
//!    without a `0x` prefix. Fields after the address are ignored.
//! 2. **Filtering:** Blank lines and lines starting with `#` are skipped.
//! 3. **Streaming:** [`TraceReader`] yields records lazily, one line at a time, so traces
//!    larger than memory can be replayed.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::common::data::AccessType;
use crate::common::error::TraceError;

/// One memory access from a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceRecord {
    /// Kind of access.
    pub access: AccessType,
    /// Byte address.
    pub address: u64,
}

impl TraceRecord {
    /// Creates a record.
    pub const fn new(access: AccessType, address: u64) -> Self {
        Self { access, address }
    }

    /// Shorthand for a data load record.
    pub const fn load(address: u64) -> Self {
        Self::new(AccessType::DataLoad, address)
    }

    /// Shorthand for a data store record.
    pub const fn store(address: u64) -> Self {
        Self::new(AccessType::DataStore, address)
    }

    /// Shorthand for an instruction fetch record.
    pub const fn fetch(address: u64) -> Self {
        Self::new(AccessType::InstructionFetch, address)
    }
}

impl FromStr for TraceRecord {
    type Err = String;

    /// Parses a single `<label> <hex-address>` record.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut fields = text.split_whitespace();

        let label_text = fields.next().ok_or("missing access label")?;
        let label: u8 = label_text
            .parse()
            .map_err(|_| format!("invalid access label '{label_text}'"))?;
        let access =
            AccessType::from_label(label).ok_or_else(|| format!("unknown access label {label}"))?;

        let addr_text = fields.next().ok_or("missing address")?;
        let digits = addr_text
            .strip_prefix("0x")
            .or_else(|| addr_text.strip_prefix("0X"))
            .unwrap_or(addr_text);
        let address = u64::from_str_radix(digits, 16)
            .map_err(|_| format!("invalid hexadecimal address '{addr_text}'"))?;

        Ok(Self { access, address })
    }
}

impl fmt::Display for TraceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:x}", self.access.label(), self.address)
    }
}

/// Lazy, line-oriented trace parser over any buffered reader.
///
/// Yields `Err` for I/O failures and malformed lines; iteration may continue
/// past a malformed line.
#[derive(Debug)]
pub struct TraceReader<R> {
    lines: Lines<R>,
    line_no: usize,
}

impl<R: BufRead> TraceReader<R> {
    /// Wraps a buffered reader.
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
        }
    }

    /// One-based number of the last line read.
    pub const fn line_number(&self) -> usize {
        self.line_no
    }
}

impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = Result<TraceRecord, TraceError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(err) => return Some(Err(TraceError::Io(err))),
            };
            self.line_no += 1;

            let text = line.trim();
            if text.is_empty() || text.starts_with('#') {
                continue;
            }
            return Some(text.parse().map_err(|reason| TraceError::Malformed {
                line: self.line_no,
                reason,
            }));
        }
    }
}

/// Opens a trace file for streaming.
///
/// # Errors
///
/// Returns [`TraceError::Io`] if the file cannot be opened.
pub fn open_trace(path: impl AsRef<Path>) -> Result<TraceReader<BufReader<File>>, TraceError> {
    let file = File::open(path)?;
    Ok(TraceReader::new(BufReader::new(file)))
}
