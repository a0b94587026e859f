//! Set-Associative Cache Model.
//!
//! This module implements the storage side of the simulator: a cache is a
//! [`CacheGeometry`] plus `n_sets` [`CacheSet`]s, each holding an LRU-ordered
//! list of [`CacheLine`]s. Hit/miss decisions and statistics live in the
//! access classifier (`sim::classifier`); this module only answers "where does
//! this address go" and "what is resident there".

/// Cache descriptor and address decoder.
pub mod geometry;

/// Per-set LRU line list.
pub mod set;

pub use geometry::{CacheGeometry, DecodedAddress};
pub use set::{CacheLine, CacheSet, LineId};

/// Result of decoding an address against a cache: where the block belongs and
/// how many lines currently live there.
///
/// `occupancy` is a presence hint only; the tag scan decides hit or miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    /// Block tag.
    pub tag: u64,
    /// Set index.
    pub index: usize,
    /// Lines currently resident in the set.
    pub occupancy: usize,
}

/// A single cache instance (instruction, data, or unified).
#[derive(Debug, Clone)]
pub struct Cache {
    geometry: CacheGeometry,
    sets: Vec<CacheSet>,
}

impl Cache {
    /// Creates an empty cache with the given geometry.
    pub fn new(geometry: CacheGeometry) -> Self {
        let ways = geometry.associativity() as usize;
        let sets = (0..geometry.n_sets())
            .map(|_| CacheSet::with_capacity(ways))
            .collect();
        Self { geometry, sets }
    }

    /// Geometry this cache was built with.
    pub const fn geometry(&self) -> &CacheGeometry {
        &self.geometry
    }

    /// Decodes `addr` and reads the occupancy of its set.
    #[inline]
    pub fn probe(&self, addr: u64) -> Probe {
        let DecodedAddress { tag, index } = self.geometry.decode(addr);
        Probe {
            tag,
            index,
            occupancy: self.sets[index].occupancy(),
        }
    }

    /// Returns `true` if the block holding `addr` is resident.
    pub fn contains(&self, addr: u64) -> bool {
        let probe = self.probe(addr);
        self.sets[probe.index].find(probe.tag).is_some()
    }

    /// Returns the resident line holding `addr`, if any.
    pub fn line_for(&self, addr: u64) -> Option<&CacheLine> {
        let probe = self.probe(addr);
        let set = &self.sets[probe.index];
        set.find(probe.tag).and_then(|id| set.get(id))
    }

    /// Set at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= n_sets`. Indices from [`Cache::probe`] are always in range.
    pub fn set(&self, index: usize) -> &CacheSet {
        &self.sets[index]
    }

    /// Mutable set at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= n_sets`. Indices from [`Cache::probe`] are always in range.
    pub fn set_mut(&mut self, index: usize) -> &mut CacheSet {
        &mut self.sets[index]
    }

    /// All sets in index order.
    pub fn sets(&self) -> &[CacheSet] {
        &self.sets
    }

    /// Total number of resident lines.
    pub fn resident_lines(&self) -> usize {
        self.sets.iter().map(CacheSet::occupancy).sum()
    }

    /// Number of resident dirty lines.
    pub fn dirty_lines(&self) -> usize {
        self.sets
            .iter()
            .flat_map(|set| set.iter())
            .filter(|line| line.dirty)
            .count()
    }

    /// Clears every dirty bit and returns how many lines were dirty.
    pub fn clean_all(&mut self) -> u64 {
        let mut cleaned = 0;
        for line in self.sets.iter_mut().flat_map(|set| set.lines_mut()) {
            if line.dirty {
                line.dirty = false;
                cleaned += 1;
            }
        }
        cleaned
    }
}
