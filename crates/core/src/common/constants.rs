//! Global Simulator Constants.
//!
//! Memory traffic is accounted in words, so every block transfer is expressed as
//! `block_size / WORD_SIZE` words.

/// Size of a memory word in bytes.
///
/// Demand fetches and copy-backs are reported in units of this size.
pub const WORD_SIZE: u64 = 4;

/// Trace label for a data load.
pub const TRACE_LABEL_LOAD: u8 = 0;

/// Trace label for a data store.
pub const TRACE_LABEL_STORE: u8 = 1;

/// Trace label for an instruction fetch.
pub const TRACE_LABEL_FETCH: u8 = 2;
