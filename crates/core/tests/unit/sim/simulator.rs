//! Simulator Tests.
//!
//! End-to-end behaviour of the simulation context: stream routing in unified
//! and split mode, the end-of-run flush, trace replay, and the final report.

use cachesim_core::Stream;
use cachesim_core::common::{ConfigError, TraceError};
use cachesim_core::config::CacheParam;
use cachesim_core::sim::{AccessOutcome, Simulator, TraceReader, TraceRecord};
use pretty_assertions::assert_eq;

use crate::common::harness::{TestContext, config_with};

/// Split 8 KiB + 8 KiB caches with default blocks and policies.
const SPLIT: &[CacheParam] = &[CacheParam::InstructionSize(8192), CacheParam::DataSize(8192)];

// ══════════════════════════════════════════════════════════
// 1. Construction
// ══════════════════════════════════════════════════════════

#[test]
fn default_simulator_is_unified() {
    let ctx = TestContext::default();

    assert!(ctx.sim.is_unified());
    assert_eq!(ctx.cache(Stream::Data).geometry().n_sets(), 512);
    assert_eq!(ctx.sim.stats().total_accesses(), 0);
}

#[test]
fn split_config_builds_two_caches() {
    let ctx = TestContext::new(&[
        CacheParam::InstructionSize(4096),
        CacheParam::DataSize(8192),
        CacheParam::Associativity(2),
    ]);

    assert!(!ctx.sim.is_unified());
    assert_eq!(ctx.cache(Stream::Instruction).geometry().n_sets(), 128);
    assert_eq!(ctx.cache(Stream::Data).geometry().n_sets(), 256);
    assert_eq!(ctx.sim.storage().caches().len(), 2);
}

#[test]
fn invalid_geometry_is_fatal_at_construction() {
    let config = config_with(&[CacheParam::DataSize(3000)]);
    let err = Simulator::new(&config).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidCacheSize { size: 3000, .. }), "{err}");
}

// ══════════════════════════════════════════════════════════
// 2. Stream routing
// ══════════════════════════════════════════════════════════

/// In unified mode a fetched block is visible to data loads, but each access
/// is charged to its own stream.
#[test]
fn unified_streams_share_lines_but_not_counters() {
    let mut ctx = TestContext::default();

    assert_eq!(ctx.fetch(0x400), AccessOutcome::Fill);
    assert_eq!(ctx.load(0x400), AccessOutcome::Hit);

    assert_eq!(ctx.inst().accesses, 1);
    assert_eq!(ctx.inst().misses, 1);
    assert_eq!(ctx.data().accesses, 1);
    assert_eq!(ctx.data().misses, 0);
    assert_eq!(ctx.sim.storage().caches().len(), 1);
}

/// In split mode the same address misses once in each cache.
#[test]
fn split_streams_are_independent() {
    let mut ctx = TestContext::new(SPLIT);

    assert_eq!(ctx.fetch(0x400), AccessOutcome::Fill);
    assert_eq!(ctx.load(0x400), AccessOutcome::Fill);

    assert_eq!(ctx.inst().misses, 1);
    assert_eq!(ctx.data().misses, 1);
    assert!(ctx.cache(Stream::Instruction).contains(0x400));
    assert!(ctx.cache(Stream::Data).contains(0x400));
}

#[test]
fn stores_dirty_only_the_data_cache() {
    let mut ctx = TestContext::new(SPLIT);
    let _ = ctx.fetch(0x0);
    let _ = ctx.store(0x0);

    assert_eq!(ctx.cache(Stream::Instruction).dirty_lines(), 0);
    assert_eq!(ctx.cache(Stream::Data).dirty_lines(), 1);
}

/// A fetch that evicts a dirty data line in a unified cache pays for the copy-back.
#[test]
fn unified_eviction_charges_the_evicting_stream() {
    let mut ctx = TestContext::new(&[CacheParam::UnifiedSize(16)]);
    let _ = ctx.store(0x0);

    assert_eq!(
        ctx.fetch(0x100),
        AccessOutcome::Replace {
            victim_tag: 0,
            victim_dirty: true
        }
    );
    assert_eq!(ctx.inst().replacements, 1);
    assert_eq!(ctx.inst().copies_back, 4);
    assert_eq!(ctx.data().copies_back, 0);
    assert_eq!(ctx.sim.stats().total_copies_back(), 4);
}

/// Recency is shared: a fetch refreshes a line the data stream installed.
#[test]
fn unified_recency_spans_streams() {
    let mut ctx = TestContext::new(&[CacheParam::UnifiedSize(64), CacheParam::Associativity(2)]);
    let _ = ctx.load(0x00);
    let _ = ctx.load(0x20);
    let _ = ctx.fetch(0x00);

    assert_eq!(ctx.set_tags(Stream::Data, 0x00), vec![0, 1]);
}

// ══════════════════════════════════════════════════════════
// 3. Flush
// ══════════════════════════════════════════════════════════

#[test]
fn flush_writes_back_every_dirty_line() {
    let mut ctx = TestContext::default();
    let _ = ctx.store(0x00);
    let _ = ctx.store(0x10);
    let _ = ctx.load(0x20);

    assert_eq!(ctx.sim.flush(), 8);
    assert_eq!(ctx.data().copies_back, 8);
    assert_eq!(ctx.cache(Stream::Data).dirty_lines(), 0);
    assert_eq!(ctx.cache(Stream::Data).resident_lines(), 3);
}

#[test]
fn flush_is_idempotent() {
    let mut ctx = TestContext::default();
    let _ = ctx.store(0x00);

    assert_eq!(ctx.sim.flush(), 4);
    assert_eq!(ctx.sim.flush(), 0);
    assert_eq!(ctx.data().copies_back, 4);
}

/// Several dirty lines in one set are all written back, not just the MRU one.
#[test]
fn flush_cleans_every_way_of_a_set() {
    let mut ctx = TestContext::new(&[CacheParam::UnifiedSize(64), CacheParam::Associativity(4)]);
    for addr in [0x00, 0x10, 0x20, 0x30] {
        let _ = ctx.store(addr);
    }
    assert_eq!(ctx.cache(Stream::Data).dirty_lines(), 4);

    assert_eq!(ctx.sim.flush(), 16);
}

#[test]
fn flush_under_write_through_moves_nothing() {
    let mut ctx = TestContext::new(&[CacheParam::WriteThrough]);
    let _ = ctx.store(0x00);
    let _ = ctx.store(0x00);

    assert_eq!(ctx.sim.flush(), 0);
    assert_eq!(ctx.data().copies_back, 2);
}

#[test]
fn flush_uses_each_cache_block_size() {
    let mut ctx = TestContext::new(&[
        CacheParam::InstructionSize(1024),
        CacheParam::DataSize(1024),
        CacheParam::BlockSize(32),
    ]);
    let _ = ctx.fetch(0x0);
    let _ = ctx.store(0x0);

    assert_eq!(ctx.sim.flush(), 8);
}

// ══════════════════════════════════════════════════════════
// 4. Trace replay
// ══════════════════════════════════════════════════════════

#[test]
fn run_counts_records() {
    let mut ctx = TestContext::default();
    let records = [
        TraceRecord::fetch(0x0),
        TraceRecord::load(0x1000),
        TraceRecord::store(0x1000),
    ];

    assert_eq!(ctx.sim.run(records), 3);
    assert_eq!(ctx.sim.stats().total_accesses(), 3);
}

/// Records before a malformed line stay applied; replay stops at the error.
#[test]
fn run_trace_stops_at_first_error() {
    let mut ctx = TestContext::default();
    let trace = "0 0\n0 10\nbogus\n0 20\n";

    let err = ctx
        .sim
        .run_trace(TraceReader::new(trace.as_bytes()))
        .unwrap_err();

    assert!(matches!(err, TraceError::Malformed { line: 3, .. }), "{err}");
    assert_eq!(ctx.data().accesses, 2);
}

#[test]
fn perform_routes_by_record_kind() {
    let mut ctx = TestContext::new(SPLIT);
    let _ = ctx.sim.perform(TraceRecord::fetch(0x40));
    let _ = ctx.sim.perform(TraceRecord::store(0x40));

    assert_eq!(ctx.inst().accesses, 1);
    assert_eq!(ctx.data().accesses, 1);
    assert!(ctx.cache(Stream::Data).line_for(0x40).unwrap().dirty);
}

// ══════════════════════════════════════════════════════════
// 5. Full run
// ══════════════════════════════════════════════════════════

/// Replays a short trace through the default cache and checks the report.
///
/// `0x0` and `0x2000` collide in set 0; `0x1000` lives in set 256.
#[test]
fn short_trace_report() {
    let mut ctx = TestContext::default();
    let trace = "# warm-up\n2 0\n0 1000\n\n1 0x1000\n0 2000\n";

    let records = ctx.sim.run_trace(TraceReader::new(trace.as_bytes())).unwrap();
    assert_eq!(records, 4);
    assert_eq!(ctx.sim.flush(), 4);

    let expected = "
*** CACHE STATISTICS ***
 INSTRUCTIONS
  accesses:  1
  misses:    1
  miss rate: 1.0000 (hit rate 0.0000)
  replace:   0
 DATA
  accesses:  3
  misses:    2
  miss rate: 0.6667 (hit rate 0.3333)
  replace:   1
 TRAFFIC (in words)
  demand fetch:  12
  copies back:   4
";
    assert_eq!(ctx.sim.stats().to_string(), expected);
}
