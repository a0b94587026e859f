//! Simulation statistics collection and reporting.
//!
//! This module tracks the counters produced by a simulation run. It provides:
//! 1. **Per-stream counters:** Accesses, misses, and replacements for the instruction
//!    and data streams, kept separately even when both share a unified cache.
//! 2. **Memory traffic:** Demand fetches and copy-backs, in words.
//! 3. **Reporting:** A sectioned text report and a JSON form via `serde`.

use std::fmt;
use std::io::{self, Write};

use serde::Serialize;

use crate::common::data::Stream;

/// Counters for one access stream.
///
/// All counters are monotonically non-decreasing over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StreamStats {
    /// Number of accesses charged to this stream.
    pub accesses: u64,
    /// Number of accesses that missed.
    pub misses: u64,
    /// Number of misses that evicted a resident line.
    pub replacements: u64,
    /// Words fetched from the backing store.
    pub demand_fetches: u64,
    /// Words written to the backing store.
    pub copies_back: u64,
}

impl StreamStats {
    /// Number of accesses that hit.
    pub const fn hits(&self) -> u64 {
        self.accesses.saturating_sub(self.misses)
    }

    /// `misses / accesses`, or 0 when there were no accesses.
    pub fn miss_rate(&self) -> f64 {
        if self.accesses == 0 {
            0.0
        } else {
            self.misses as f64 / self.accesses as f64
        }
    }

    /// `1 - miss_rate`, or 0 when there were no accesses.
    pub fn hit_rate(&self) -> f64 {
        if self.accesses == 0 {
            0.0
        } else {
            1.0 - self.miss_rate()
        }
    }
}

/// Statistics for a complete run: one bucket per stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Instruction fetch stream.
    pub instruction: StreamStats,
    /// Data load/store stream.
    pub data: StreamStats,
}

/// Section names for selective stats output.
///
/// Valid section identifiers: `"instructions"`, `"data"`, `"traffic"`.
/// Pass an empty slice to [`CacheStats::print_sections`] to print all sections.
pub const STATS_SECTIONS: &[&str] = &["instructions", "data", "traffic"];

impl CacheStats {
    /// Counters for `stream`.
    pub const fn stream(&self, stream: Stream) -> &StreamStats {
        match stream {
            Stream::Instruction => &self.instruction,
            Stream::Data => &self.data,
        }
    }

    /// Mutable counters for `stream`.
    pub const fn stream_mut(&mut self, stream: Stream) -> &mut StreamStats {
        match stream {
            Stream::Instruction => &mut self.instruction,
            Stream::Data => &mut self.data,
        }
    }

    /// Total accesses across both streams.
    pub const fn total_accesses(&self) -> u64 {
        self.instruction.accesses + self.data.accesses
    }

    /// Total misses across both streams.
    pub const fn total_misses(&self) -> u64 {
        self.instruction.misses + self.data.misses
    }

    /// Demand-fetch words across both streams.
    pub const fn total_demand_fetches(&self) -> u64 {
        self.instruction.demand_fetches + self.data.demand_fetches
    }

    /// Copy-back words across both streams.
    pub const fn total_copies_back(&self) -> u64 {
        self.instruction.copies_back + self.data.copies_back
    }

    /// Writes the requested report sections.
    ///
    /// Each element of `sections` should be one of [`STATS_SECTIONS`]; unknown
    /// names are ignored. An empty slice selects every section.
    ///
    /// # Errors
    ///
    /// Propagates write failures from `out`.
    pub fn write_sections<W: Write>(&self, out: &mut W, sections: &[String]) -> io::Result<()> {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);

        writeln!(out, "\n*** CACHE STATISTICS ***")?;
        if want("instructions") {
            writeln!(out, " INSTRUCTIONS")?;
            write_stream(out, &self.instruction)?;
        }
        if want("data") {
            writeln!(out, " DATA")?;
            write_stream(out, &self.data)?;
        }
        if want("traffic") {
            writeln!(out, " TRAFFIC (in words)")?;
            writeln!(out, "  demand fetch:  {}", self.total_demand_fetches())?;
            writeln!(out, "  copies back:   {}", self.total_copies_back())?;
        }
        Ok(())
    }

    /// Prints only the requested statistics sections to stdout.
    ///
    /// Pass an empty slice to print all sections (same as [`CacheStats::print`]).
    ///
    /// # Errors
    ///
    /// Returns the error if stdout cannot be written.
    pub fn print_sections(&self, sections: &[String]) -> io::Result<()> {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        self.write_sections(&mut lock, sections)?;
        lock.flush()
    }

    /// Prints every statistics section to stdout.
    ///
    /// # Errors
    ///
    /// Returns the error if stdout cannot be written.
    pub fn print(&self) -> io::Result<()> {
        self.print_sections(&[])
    }

    /// Writes the statistics as pretty-printed JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns serialization and write failures as [`io::Error`].
    pub fn write_json<W: Write>(&self, out: &mut W) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *out, self)?;
        writeln!(out)
    }
}

fn write_stream<W: Write>(out: &mut W, stats: &StreamStats) -> io::Result<()> {
    writeln!(out, "  accesses:  {}", stats.accesses)?;
    writeln!(out, "  misses:    {}", stats.misses)?;
    if stats.accesses == 0 {
        writeln!(out, "  miss rate: 0 (0)")?;
    } else {
        writeln!(
            out,
            "  miss rate: {:.4} (hit rate {:.4})",
            stats.miss_rate(),
            stats.hit_rate()
        )?;
    }
    writeln!(out, "  replace:   {}", stats.replacements)
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = Vec::new();
        self.write_sections(&mut buf, &[]).map_err(|_| fmt::Error)?;
        f.write_str(&String::from_utf8_lossy(&buf))
    }
}
