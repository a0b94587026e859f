//! Simulator: owns the caches and the statistics side-by-side.
//!
//! All simulation state lives in one explicit [`Simulator`] value, so several
//! independent simulations can run in the same process. In unified mode the
//! instruction and data streams reach the same [`Cache`] through
//! [`CacheStorage`] while keeping separate statistics buckets.

use crate::cache::Cache;
use crate::common::data::{AccessType, Stream};
use crate::common::error::{ConfigError, TraceError};
use crate::config::CacheConfig;
use crate::stats::CacheStats;

use super::classifier::{AccessOutcome, Classifier};
use super::loader::TraceRecord;

/// Physical cache storage: one shared cache or two independent ones.
#[derive(Debug, Clone)]
pub enum CacheStorage {
    /// One cache serving both streams.
    Unified(Cache),
    /// Separate instruction and data caches.
    Split {
        /// Instruction cache.
        instruction: Cache,
        /// Data cache.
        data: Cache,
    },
}

impl CacheStorage {
    /// Builds the storage described by `config`.
    ///
    /// # Errors
    ///
    /// Returns the first geometry violation found.
    pub fn new(config: &CacheConfig) -> Result<Self, ConfigError> {
        let instruction = Cache::new(config.instruction_geometry()?);
        if config.split {
            let data = Cache::new(config.data_geometry()?);
            Ok(Self::Split { instruction, data })
        } else {
            Ok(Self::Unified(instruction))
        }
    }

    /// Cache serving `stream`.
    pub const fn get(&self, stream: Stream) -> &Cache {
        match self {
            Self::Unified(cache) => cache,
            Self::Split { instruction, data } => match stream {
                Stream::Instruction => instruction,
                Stream::Data => data,
            },
        }
    }

    /// Mutable cache serving `stream`.
    pub const fn get_mut(&mut self, stream: Stream) -> &mut Cache {
        match self {
            Self::Unified(cache) => cache,
            Self::Split { instruction, data } => match stream {
                Stream::Instruction => instruction,
                Stream::Data => data,
            },
        }
    }

    /// Every distinct cache instance; the unified cache appears once.
    pub fn caches(&self) -> Vec<&Cache> {
        match self {
            Self::Unified(cache) => vec![cache],
            Self::Split { instruction, data } => vec![instruction, data],
        }
    }

    fn caches_mut(&mut self) -> Vec<&mut Cache> {
        match self {
            Self::Unified(cache) => vec![cache],
            Self::Split { instruction, data } => vec![instruction, data],
        }
    }
}

/// Top-level simulation context: configuration, caches, classifier, statistics.
#[derive(Debug, Clone)]
pub struct Simulator {
    config: CacheConfig,
    storage: CacheStorage,
    classifier: Classifier,
    stats: CacheStats,
}

impl Simulator {
    /// Initializes empty caches for `config`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any cache geometry is invalid.
    pub fn new(config: &CacheConfig) -> Result<Self, ConfigError> {
        let storage = CacheStorage::new(config)?;
        for stream in [Stream::Instruction, Stream::Data] {
            let geometry = storage.get(stream).geometry();
            tracing::debug!(
                %stream,
                unified = !config.split,
                size = geometry.size(),
                block_size = geometry.block_size(),
                associativity = geometry.associativity(),
                sets = geometry.n_sets(),
                offset_bits = geometry.offset_bits(),
                index_mask = geometry.index_mask(),
                "initialized cache"
            );
        }

        Ok(Self {
            config: config.clone(),
            storage,
            classifier: Classifier::new(config),
            stats: CacheStats::default(),
        })
    }

    /// Processes one access against the cache serving its stream.
    pub fn perform_access(&mut self, addr: u64, access: AccessType) -> AccessOutcome {
        let stream = access.stream();
        let cache = self.storage.get_mut(stream);
        let stats = self.stats.stream_mut(stream);
        self.classifier.classify(cache, stats, addr, access)
    }

    /// Processes one trace record.
    pub fn perform(&mut self, record: TraceRecord) -> AccessOutcome {
        self.perform_access(record.address, record.access)
    }

    /// Processes records in order and returns how many were simulated.
    pub fn run<I>(&mut self, records: I) -> u64
    where
        I: IntoIterator<Item = TraceRecord>,
    {
        let mut count = 0;
        for record in records {
            let _ = self.perform(record);
            count += 1;
        }
        count
    }

    /// Processes records from a fallible source until it ends or fails.
    ///
    /// Records before a failure remain applied.
    ///
    /// # Errors
    ///
    /// Returns the first [`TraceError`] produced by `records`.
    pub fn run_trace<I>(&mut self, records: I) -> Result<u64, TraceError>
    where
        I: IntoIterator<Item = Result<TraceRecord, TraceError>>,
    {
        let mut count = 0;
        for record in records {
            let _ = self.perform(record?);
            count += 1;
        }
        tracing::debug!(records = count, "trace replay complete");
        Ok(count)
    }

    /// Writes back every dirty line and returns the words written.
    ///
    /// Traffic is charged to the data stream. Dirty bits are cleared, so a
    /// second flush without intervening accesses writes nothing.
    pub fn flush(&mut self) -> u64 {
        let mut lines = 0;
        let mut words = 0;
        for cache in self.storage.caches_mut() {
            let cleaned = cache.clean_all();
            lines += cleaned;
            words += cleaned * cache.geometry().words_per_block();
        }
        self.stats.data.copies_back += words;
        tracing::debug!(lines, words, "flushed dirty lines");
        words
    }

    /// Configuration the simulator was built from.
    pub const fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Statistics accumulated so far.
    pub const fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Returns `true` when both streams share one cache.
    pub const fn is_unified(&self) -> bool {
        matches!(self.storage, CacheStorage::Unified(_))
    }

    /// Cache serving `stream`.
    pub const fn cache(&self, stream: Stream) -> &Cache {
        self.storage.get(stream)
    }

    /// Underlying cache storage.
    pub const fn storage(&self) -> &CacheStorage {
        &self.storage
    }
}
