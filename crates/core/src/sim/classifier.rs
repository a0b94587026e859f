//! Access Classifier.
//!
//! The state machine at the heart of the simulator. For every access it:
//! 1. **Probes:** Decodes the address and reads the set occupancy.
//! 2. **Searches:** Scans the set for the tag when the set is non-empty; the scan,
//!    not the occupancy, decides hit or miss.
//! 3. **Updates:** Promotes, fills, or replaces lines, maintains dirty bits under the
//!    write and allocation policies, and charges the stream's statistics.
//!
//! Traffic is counted in words: a block transfer moves `block_size / WORD_SIZE`
//! words, a write-through or write-around store moves one.

use crate::cache::{Cache, CacheLine, CacheSet, LineId, Probe};
use crate::common::data::AccessType;
use crate::config::{AllocationPolicy, CacheConfig, WritePolicy};
use crate::stats::StreamStats;

/// Verdict for a single access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessOutcome {
    /// The block was resident.
    Hit,
    /// Miss into a set with a free way; a new line was inserted.
    Fill,
    /// Miss into a full set; the LRU line was evicted to make room.
    Replace {
        /// Tag of the evicted line.
        victim_tag: u64,
        /// Whether the evicted line was dirty.
        victim_dirty: bool,
    },
    /// Store miss under no-write-allocate; the cache was left untouched.
    Bypass,
}

impl AccessOutcome {
    /// Returns `true` for [`AccessOutcome::Hit`].
    pub const fn is_hit(self) -> bool {
        matches!(self, Self::Hit)
    }

    /// Returns `true` for every outcome except [`AccessOutcome::Hit`].
    pub const fn is_miss(self) -> bool {
        !self.is_hit()
    }
}

/// Applies the write and allocation policies to individual accesses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classifier {
    write_policy: WritePolicy,
    allocation_policy: AllocationPolicy,
}

impl Classifier {
    /// Creates a classifier for the policies of `config`.
    pub const fn new(config: &CacheConfig) -> Self {
        Self {
            write_policy: config.write_policy,
            allocation_policy: config.allocation_policy,
        }
    }

    /// Write policy in effect.
    pub const fn write_policy(&self) -> WritePolicy {
        self.write_policy
    }

    /// Allocation policy in effect.
    pub const fn allocation_policy(&self) -> AllocationPolicy {
        self.allocation_policy
    }

    const fn write_back(&self) -> bool {
        matches!(self.write_policy, WritePolicy::WriteBack)
    }

    /// Classifies one access against `cache`, charging `stats`.
    ///
    /// Loads and instruction fetches take the load path; stores take the store
    /// path. `stats.accesses` is incremented exactly once.
    pub fn classify(
        &self,
        cache: &mut Cache,
        stats: &mut StreamStats,
        addr: u64,
        access: AccessType,
    ) -> AccessOutcome {
        let probe = cache.probe(addr);
        let words = cache.geometry().words_per_block();
        let set = cache.set_mut(probe.index);

        let outcome = if access.is_store() {
            self.store(set, probe, words, stats)
        } else {
            self.load(set, probe, words, stats)
        };
        stats.accesses += 1;

        tracing::trace!(
            stream = %access.stream(),
            %access,
            addr,
            tag = probe.tag,
            set = probe.index,
            occupancy = probe.occupancy,
            ?outcome,
            "classified access"
        );
        outcome
    }

    fn load(
        &self,
        set: &mut CacheSet,
        probe: Probe,
        words: u64,
        stats: &mut StreamStats,
    ) -> AccessOutcome {
        if let Some(id) = lookup(set, probe) {
            if probe.occupancy > 1 {
                let _ = set.promote(id);
            }
            return AccessOutcome::Hit;
        }

        let outcome = self.allocate(set, probe, CacheLine::new(probe.tag, false), words, stats);
        stats.demand_fetches += words;
        stats.misses += 1;
        outcome
    }

    fn store(
        &self,
        set: &mut CacheSet,
        probe: Probe,
        words: u64,
        stats: &mut StreamStats,
    ) -> AccessOutcome {
        if let Some(id) = lookup(set, probe) {
            if probe.occupancy > 1 {
                let _ = set.promote(id);
            }
            if self.write_back() {
                if let Some(line) = set.get_mut(id) {
                    line.dirty = true;
                }
            } else {
                stats.copies_back += 1;
            }
            return AccessOutcome::Hit;
        }

        stats.misses += 1;
        match self.allocation_policy {
            AllocationPolicy::NoWriteAllocate => {
                stats.copies_back += 1;
                AccessOutcome::Bypass
            }
            AllocationPolicy::WriteAllocate => {
                let line = CacheLine::new(probe.tag, self.write_back());
                let outcome = self.allocate(set, probe, line, words, stats);
                stats.demand_fetches += words;
                if !self.write_back() {
                    stats.copies_back += 1;
                }
                outcome
            }
        }
    }

    /// Inserts `line` at the MRU end, evicting the LRU line first when the set is full.
    ///
    /// A dirty victim under write-back costs one block of copy-back traffic.
    fn allocate(
        &self,
        set: &mut CacheSet,
        probe: Probe,
        line: CacheLine,
        words: u64,
        stats: &mut StreamStats,
    ) -> AccessOutcome {
        let victim = if probe.occupancy < set.capacity() {
            None
        } else {
            set.evict_lru()
        };
        let _ = set.insert_at_head(line);

        match victim {
            None => AccessOutcome::Fill,
            Some(victim) => {
                if self.write_back() && victim.dirty {
                    stats.copies_back += words;
                }
                stats.replacements += 1;
                AccessOutcome::Replace {
                    victim_tag: victim.tag,
                    victim_dirty: victim.dirty,
                }
            }
        }
    }
}

/// Tag scan, skipped when the occupancy probe shows an empty set.
fn lookup(set: &CacheSet, probe: Probe) -> Option<LineId> {
    if probe.occupancy == 0 {
        None
    } else {
        set.find(probe.tag)
    }
}
