//! Trace-driven cache simulator CLI.
//!
//! This binary wires the library's collaborators together. It performs:
//! 1. **Configuration:** Starts from defaults or a JSON file, then applies cache flags.
//! 2. **Trace replay:** Streams records from a file (or stdin) through the simulator.
//! 3. **Reporting:** Flushes dirty lines and prints the settings and statistics reports.

use std::io::{self, Write};
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cachesim_core::common::SimError;
use cachesim_core::config::CacheConfig;
use cachesim_core::sim::{Simulator, TraceReader, open_trace};
use cachesim_core::stats::STATS_SECTIONS;

#[derive(Parser, Debug)]
#[command(
    name = "cachesim",
    author,
    version,
    about = "Trace-driven set-associative cache simulator",
    long_about = "Replay a memory trace through a unified or split cache and report hit rates and memory traffic.\n\nTrace records are '<label> <hex-address>' per line: 0 = load, 1 = store, 2 = instruction fetch.\n\nExamples:\n  cachesim traces/spice.trace\n  cachesim --is 8192 --ds 8192 -a 2 --wt --nw traces/cc.trace\n  cachesim --config l1.json --json < traces/tex.trace"
)]
struct Cli {
    /// Trace file to replay; reads stdin when omitted or '-'.
    trace: Option<String>,

    /// JSON configuration file; flags below override it.
    #[arg(long)]
    config: Option<String>,

    /// Block size in bytes.
    #[arg(long = "bs", value_name = "BYTES")]
    block_size: Option<u64>,

    /// Unified cache size in bytes.
    #[arg(long = "us", value_name = "BYTES", conflicts_with_all = ["icache_size", "dcache_size"])]
    unified_size: Option<u64>,

    /// Instruction cache size in bytes (selects split caches).
    #[arg(long = "is", value_name = "BYTES")]
    icache_size: Option<u64>,

    /// Data cache size in bytes (selects split caches).
    #[arg(long = "ds", value_name = "BYTES")]
    dcache_size: Option<u64>,

    /// Associativity (ways per set).
    #[arg(short = 'a', long = "assoc", value_name = "WAYS")]
    associativity: Option<u64>,

    /// Write-back policy.
    #[arg(long = "wb", conflicts_with = "write_through")]
    write_back: bool,

    /// Write-through policy.
    #[arg(long = "wt")]
    write_through: bool,

    /// Write-allocate policy.
    #[arg(long = "wa", conflicts_with = "no_write_allocate")]
    write_allocate: bool,

    /// No-write-allocate policy.
    #[arg(long = "nw")]
    no_write_allocate: bool,

    /// Statistics sections to print (comma-separated): instructions, data, traffic.
    #[arg(long, value_delimiter = ',', value_parser = clap::builder::PossibleValuesParser::new(STATS_SECTIONS.iter().copied()))]
    sections: Vec<String>,

    /// Print statistics as JSON instead of the text report.
    #[arg(long)]
    json: bool,
}

impl Cli {
    /// Cache options requested on the command line, as `(option name, value)`
    /// pairs in application order.
    ///
    /// Names are the long flag names, which are all accepted by
    /// [`CacheParam::parse`](cachesim_core::config::CacheParam::parse).
    fn options(&self) -> Vec<(&'static str, Option<String>)> {
        let sized = [
            ("bs", self.block_size),
            ("us", self.unified_size),
            ("is", self.icache_size),
            ("ds", self.dcache_size),
            ("assoc", self.associativity),
        ];
        let switches = [
            ("wb", self.write_back),
            ("wt", self.write_through),
            ("wa", self.write_allocate),
            ("nw", self.no_write_allocate),
        ];

        sized
            .into_iter()
            .filter_map(|(name, value)| value.map(|v| (name, Some(v.to_string()))))
            .chain(
                switches
                    .into_iter()
                    .filter_map(|(name, on)| on.then_some((name, None))),
            )
            .collect()
    }

    /// Builds the configuration: JSON base (or defaults) plus flag overrides.
    fn build_config(&self) -> Result<CacheConfig, SimError> {
        let mut config = match &self.config {
            Some(path) => CacheConfig::from_json_file(path)?,
            None => CacheConfig::default(),
        };
        let options = self.options();
        config.apply_options(
            options
                .iter()
                .map(|(name, value)| (*name, value.as_deref())),
        )?;
        config.validate()?;
        Ok(config)
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        eprintln!("\n[!] FATAL: {err}");
        process::exit(1);
    }
}

/// Runs one simulation: configure, replay, flush, report.
fn run(cli: &Cli) -> Result<(), SimError> {
    let config = cli.build_config()?;
    let mut sim = Simulator::new(&config)?;

    let records = match cli.trace.as_deref() {
        None | Some("-") => sim.run_trace(TraceReader::new(io::stdin().lock()))?,
        Some(path) => {
            tracing::info!(path, "replaying trace");
            sim.run_trace(open_trace(path)?)?
        }
    };
    let flushed = sim.flush();
    tracing::info!(records, flushed, "simulation finished");

    if cli.json {
        sim.stats().write_json(&mut io::stdout().lock())?;
    } else {
        writeln!(io::stdout().lock(), "{}", sim.config())?;
        sim.stats().print_sections(&cli.sections)?;
    }
    Ok(())
}
