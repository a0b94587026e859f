//! Common types and constants shared across the simulator.
//!
//! This module provides the building blocks used by every other component:
//! 1. **Constants:** Word size and simulator-wide defaults.
//! 2. **Access Types:** Classification of trace records (load, store, fetch) and the
//!    statistics stream each one is charged to.
//! 3. **Error Handling:** Configuration, trace, and driver error types.

/// Common constants used throughout the simulator.
pub mod constants;

/// Memory access type definitions.
pub mod data;

/// Error types for configuration, trace loading, and simulation.
pub mod error;

pub use constants::WORD_SIZE;
pub use data::{AccessType, Stream};
pub use error::{ConfigError, SimError, TraceError};
