//! Error definitions.
//!
//! This module defines the error types of the simulator. It provides:
//! 1. **Configuration Errors:** Unrecognized options and geometry violations, all fatal
//!    before the first access is simulated.
//! 2. **Trace Errors:** I/O failures and malformed records from the trace loader.
//! 3. **Driver Errors:** A single type the command-line driver propagates with `?`, including
//!    failures to write the final report.
//!
//! Address decoding and access classification never fail, so no error type exists for them.

use thiserror::Error;

/// Errors raised while building or validating a cache configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The option name is not one of the recognized cache parameters.
    #[error("unrecognized cache option '{0}'")]
    UnknownOption(String),

    /// A sizing option was given without a value.
    #[error("cache option '{0}' requires a value")]
    MissingValue(String),

    /// A sizing option carried a value that is not an unsigned integer.
    #[error("cache option '{option}' expects an unsigned integer, got '{value}'")]
    InvalidValue {
        /// Name of the option.
        option: String,
        /// The rejected value text.
        value: String,
    },

    /// Associativity of zero leaves no room for any line.
    #[error("associativity must be at least 1")]
    ZeroAssociativity,

    /// Block size must be a power of two for the offset mask to be valid.
    #[error("block size {0} is not a power of two")]
    BlockSizeNotPowerOfTwo(u64),

    /// Block size must hold at least one word.
    #[error("block size {0} is smaller than one word")]
    BlockSmallerThanWord(u64),

    /// Cache size must be a non-zero multiple of `block_size * associativity`.
    #[error(
        "cache size {size} is not a non-zero multiple of block size {block_size} x associativity {associativity}"
    )]
    InvalidCacheSize {
        /// Requested cache size in bytes.
        size: u64,
        /// Block size in bytes.
        block_size: u64,
        /// Number of ways per set.
        associativity: u64,
    },

    /// Set count must be a power of two for the index mask to be valid.
    #[error("set count {0} is not a power of two")]
    SetCountNotPowerOfTwo(u64),

    /// A JSON configuration document could not be parsed.
    #[error("invalid configuration document: {0}")]
    Json(#[from] serde_json::Error),

    /// A configuration file could not be read.
    #[error("could not read configuration file: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while reading a trace.
#[derive(Debug, Error)]
pub enum TraceError {
    /// The underlying reader failed.
    #[error("could not read trace: {0}")]
    Io(#[from] std::io::Error),

    /// A record does not follow the `<label> <hex-address>` format.
    #[error("malformed trace record at line {line}: {reason}")]
    Malformed {
        /// One-based line number of the offending record.
        line: usize,
        /// Description of what is wrong with the record.
        reason: String,
    },
}

/// Top-level error for a complete simulation run.
#[derive(Debug, Error)]
pub enum SimError {
    /// Configuration was rejected before simulation started.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The trace could not be read to completion.
    #[error(transparent)]
    Trace(#[from] TraceError),

    /// The settings or statistics report could not be written.
    #[error("could not write report: {0}")]
    Report(#[from] std::io::Error),
}
