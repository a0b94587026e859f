//! Trace-driven cache simulator library.
//!
//! This crate models one or two set-associative caches driven by a stream of memory
//! accesses and reports aggregate statistics:
//! 1. **Cache:** Geometry and address decoding, per-set LRU line lists, dirty bits.
//! 2. **Classifier:** Hit/miss/replacement decisions under write-back or write-through
//!    and write-allocate or no-write-allocate policies.
//! 3. **Simulation:** A context object owning unified or split caches, trace loading,
//!    and the end-of-run flush.
//! 4. **Reporting:** Configuration dump and per-stream statistics with memory traffic.
//!
//! # Example
//!
//! ```
//! use cachesim_core::{AccessType, CacheConfig, Simulator};
//!
//! let mut sim = Simulator::new(&CacheConfig::default()).unwrap();
//! let _ = sim.perform_access(0x1000, AccessType::DataStore);
//! let _ = sim.perform_access(0x1000, AccessType::DataLoad);
//! let _ = sim.flush();
//!
//! assert_eq!(sim.stats().data.accesses, 2);
//! assert_eq!(sim.stats().data.misses, 1);
//! assert_eq!(sim.stats().total_copies_back(), 4);
//! ```

/// Set-associative cache storage (geometry, sets, lines).
pub mod cache;
/// Common types and constants (access types, word size, errors).
pub mod common;
/// Simulator configuration (defaults, policies, discrete options).
pub mod config;
/// Access classification, simulation context, and trace loading.
pub mod sim;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Access kind carried by each trace record.
pub use crate::common::{AccessType, Stream};
/// Root configuration type; use `CacheConfig::default()` or deserialize from JSON.
pub use crate::config::CacheConfig;
/// Simulation context; construct with `Simulator::new`.
pub use crate::sim::Simulator;
/// Per-stream statistics.
pub use crate::stats::CacheStats;
