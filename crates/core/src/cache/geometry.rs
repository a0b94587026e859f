//! Cache Descriptor and Address Decoder.
//!
//! A [`CacheGeometry`] is derived once at initialization from size, block size,
//! and associativity. It fixes the address layout used by every lookup:
//!
//! ```text
//!   63                    idx_plus_offset_bits   offset_bits        0
//!   ┌────────────────────────────┬──────────────────┬────────────────┐
//!   │            tag             │    set index     │  block offset  │
//!   └────────────────────────────┴──────────────────┴────────────────┘
//! ```
//!
//! Decoding is pure arithmetic on unsigned values and never fails.

use serde::Serialize;

use crate::common::constants::WORD_SIZE;
use crate::common::error::ConfigError;

/// Immutable descriptor of one cache's organization and address layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheGeometry {
    size: u64,
    block_size: u64,
    associativity: u64,
    n_sets: u64,
    offset_bits: u32,
    index_bits: u32,
    index_mask: u64,
}

/// Tag and set index of an address under a given geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedAddress {
    /// High-order bits identifying the block within its set.
    pub tag: u64,
    /// Set the block maps to.
    pub index: usize,
}

/// `ceil(log2(n))` for `n >= 1`.
const fn ceil_log2(n: u64) -> u32 {
    if n <= 1 {
        0
    } else {
        u64::BITS - (n - 1).leading_zeros()
    }
}

impl CacheGeometry {
    /// Derives and validates a cache geometry.
    ///
    /// # Arguments
    ///
    /// * `size` - Total capacity in bytes.
    /// * `block_size` - Line size in bytes; a power of two of at least one word.
    /// * `associativity` - Ways per set; at least 1.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `size` is not a non-zero multiple of
    /// `block_size * associativity`, or if the block size or resulting set
    /// count is not a power of two.
    pub fn new(size: u64, block_size: u64, associativity: u64) -> Result<Self, ConfigError> {
        if associativity == 0 {
            return Err(ConfigError::ZeroAssociativity);
        }
        if !block_size.is_power_of_two() {
            return Err(ConfigError::BlockSizeNotPowerOfTwo(block_size));
        }
        if block_size < WORD_SIZE {
            return Err(ConfigError::BlockSmallerThanWord(block_size));
        }

        let set_bytes = block_size.checked_mul(associativity);
        let n_sets = match set_bytes {
            Some(bytes) if size != 0 && size % bytes == 0 => size / bytes,
            _ => {
                return Err(ConfigError::InvalidCacheSize {
                    size,
                    block_size,
                    associativity,
                });
            }
        };
        if !n_sets.is_power_of_two() {
            return Err(ConfigError::SetCountNotPowerOfTwo(n_sets));
        }

        let offset_bits = block_size.trailing_zeros();
        let index_bits = ceil_log2(n_sets);
        let idx_plus_offset_bits = index_bits + offset_bits;
        let low_mask = 1u64
            .checked_shl(idx_plus_offset_bits)
            .map_or(u64::MAX, |bit| bit - 1);
        let index_mask = low_mask & !(block_size - 1);

        Ok(Self {
            size,
            block_size,
            associativity,
            n_sets,
            offset_bits,
            index_bits,
            index_mask,
        })
    }

    /// Total capacity in bytes.
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Line size in bytes.
    pub const fn block_size(&self) -> u64 {
        self.block_size
    }

    /// Ways per set.
    pub const fn associativity(&self) -> u64 {
        self.associativity
    }

    /// Number of sets.
    pub const fn n_sets(&self) -> u64 {
        self.n_sets
    }

    /// Width of the block-offset field.
    pub const fn offset_bits(&self) -> u32 {
        self.offset_bits
    }

    /// Width of the set-index field, `ceil(log2(n_sets))`.
    pub const fn index_bits(&self) -> u32 {
        self.index_bits
    }

    /// Mask selecting exactly the index-field bits above the block offset.
    pub const fn index_mask(&self) -> u64 {
        self.index_mask
    }

    /// Words moved by one block transfer.
    pub const fn words_per_block(&self) -> u64 {
        self.block_size / WORD_SIZE
    }

    /// Splits an address into tag and set index.
    #[inline]
    pub fn decode(&self, addr: u64) -> DecodedAddress {
        let tag = addr
            .checked_shr(self.index_bits + self.offset_bits)
            .unwrap_or(0);
        let index = ((addr & self.index_mask) >> self.offset_bits) % self.n_sets;
        DecodedAddress {
            tag,
            index: index as usize,
        }
    }
}
