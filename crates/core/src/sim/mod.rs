//! Simulation engine and trace loading.
//!
//! Provides the access classifier, the simulator context that owns the caches and
//! statistics, and the loader that turns trace text into records.

/// Hit/miss/replacement state machine.
pub mod classifier;

/// Trace file parsing.
pub mod loader;

/// Simulation context: caches, statistics, and flush.
pub mod simulator;

pub use classifier::{AccessOutcome, Classifier};
pub use loader::{TraceReader, TraceRecord, open_trace};
pub use simulator::{CacheStorage, Simulator};
