//! Property tests over random configurations and traces.
//!
//! Geometries are always valid: block sizes 4..=64 bytes, 1..=8 ways, and
//! 1..=64 sets, with every policy combination in unified and split mode.

use cachesim_core::AccessType;
use cachesim_core::cache::Cache;
use cachesim_core::config::{CacheConfig, CacheParam};
use cachesim_core::sim::{AccessOutcome, Simulator, TraceRecord};
use cachesim_core::stats::StreamStats;
use proptest::prelude::*;

fn config_strategy() -> impl Strategy<Value = CacheConfig> {
    (
        0u32..5,
        0u32..4,
        0u32..7,
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(block_shift, way_shift, set_shift, split, wt, nw)| {
            let block_size = 4u64 << block_shift;
            let ways = 1u64 << way_shift;
            let size = block_size * ways * (1u64 << set_shift);

            let mut config = CacheConfig::default();
            config.set_param(CacheParam::BlockSize(block_size));
            config.set_param(CacheParam::Associativity(ways));
            if split {
                config.set_param(CacheParam::InstructionSize(size));
                config.set_param(CacheParam::DataSize(size));
            } else {
                config.set_param(CacheParam::UnifiedSize(size));
            }
            if wt {
                config.set_param(CacheParam::WriteThrough);
            }
            if nw {
                config.set_param(CacheParam::NoWriteAllocate);
            }
            config
        })
}

/// Short traces over a small address range so sets see reuse and conflicts.
fn trace_strategy() -> impl Strategy<Value = Vec<TraceRecord>> {
    prop::collection::vec((0u8..3, 0u64..0x2000), 1..300).prop_map(|raw| {
        raw.into_iter()
            .filter_map(|(label, addr)| {
                AccessType::from_label(label).map(|access| TraceRecord::new(access, addr))
            })
            .collect()
    })
}

fn validate(cache: &Cache) {
    let ways = cache.geometry().associativity() as usize;
    for set in cache.sets() {
        assert!(set.occupancy() <= ways);
        set.debug_validate_invariants();
    }
}

fn counters_grew(before: &StreamStats, after: &StreamStats) -> bool {
    after.accesses == before.accesses + 1
        && after.misses >= before.misses
        && after.replacements >= before.replacements
        && after.demand_fetches >= before.demand_fetches
        && after.copies_back >= before.copies_back
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Structural invariants hold after every access, and a hit happens
    /// exactly when the block was already resident.
    #[test]
    fn every_access_preserves_invariants(config in config_strategy(), trace in trace_strategy()) {
        let mut sim = Simulator::new(&config).unwrap();

        for record in trace {
            let stream = record.access.stream();
            let was_resident = sim.cache(stream).contains(record.address);
            let before = *sim.stats().stream(stream);

            let outcome = sim.perform(record);

            let after = *sim.stats().stream(stream);
            prop_assert_eq!(outcome.is_hit(), was_resident);
            prop_assert!(counters_grew(&before, &after));
            prop_assert!(after.misses <= after.accesses);
            prop_assert!(after.replacements <= after.misses);
            validate(sim.cache(stream));
        }
    }

    /// Unless a store bypassed the cache, the accessed block ends up at the
    /// MRU position of its set.
    #[test]
    fn accessed_block_becomes_mru(config in config_strategy(), trace in trace_strategy()) {
        let mut sim = Simulator::new(&config).unwrap();

        for record in trace {
            let outcome = sim.perform(record);
            let cache = sim.cache(record.access.stream());
            let probe = cache.probe(record.address);
            let set = cache.set(probe.index);
            let mru_tag = set.mru().and_then(|id| set.get(id)).map(|line| line.tag);

            if outcome == AccessOutcome::Bypass {
                prop_assert!(!cache.contains(record.address));
            } else {
                prop_assert_eq!(mru_tag, Some(probe.tag));
            }
        }
    }

    /// Write-through caches never hold dirty lines; flush is idempotent and
    /// leaves nothing dirty under any policy.
    #[test]
    fn flush_drains_dirty_lines(config in config_strategy(), trace in trace_strategy()) {
        let mut sim = Simulator::new(&config).unwrap();
        let _ = sim.run(trace);

        let dirty: usize = sim.storage().caches().iter().map(|cache| cache.dirty_lines()).sum();
        if !config.is_write_back() {
            prop_assert_eq!(dirty, 0);
        }

        let copies_before = sim.stats().total_copies_back();
        let flushed = sim.flush();
        prop_assert_eq!(flushed, dirty as u64 * config.words_per_block());
        prop_assert_eq!(sim.stats().total_copies_back(), copies_before + flushed);
        prop_assert_eq!(sim.flush(), 0);
        for cache in sim.storage().caches() {
            prop_assert_eq!(cache.dirty_lines(), 0);
        }
    }

    /// Every miss that allocates fetches exactly one block.
    #[test]
    fn demand_fetches_are_whole_blocks(config in config_strategy(), trace in trace_strategy()) {
        let mut sim = Simulator::new(&config).unwrap();
        let mut allocating_misses = 0u64;
        for record in trace {
            match sim.perform(record) {
                AccessOutcome::Fill | AccessOutcome::Replace { .. } => allocating_misses += 1,
                AccessOutcome::Hit | AccessOutcome::Bypass => {}
            }
        }

        prop_assert_eq!(
            sim.stats().total_demand_fetches(),
            allocating_misses * config.words_per_block()
        );
    }
}
