//! Configuration system for the cache simulator.
//!
//! This module defines all configuration structures and enums used to parameterize
//! the simulator. It provides:
//! 1. **Defaults:** Baseline cache organization (8 KiB unified, 16-byte blocks, direct-mapped).
//! 2. **Policies:** Write policy (write-back / write-through) and allocation policy
//!    (write-allocate / no-write-allocate).
//! 3. **Discrete options:** [`CacheParam`] models the individual configuration operations a
//!    loader applies before initialization; unrecognized option names are fatal.
//! 4. **Settings report:** `Display` on [`CacheConfig`] prints the configuration dump.
//!
//! Configuration is supplied as JSON, as a list of named options, or built with
//! `CacheConfig::default()` and [`CacheConfig::set_param`].

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cache::CacheGeometry;
use crate::common::constants::WORD_SIZE;
use crate::common::error::ConfigError;

/// Default configuration constants for the simulator.
///
/// These values define the baseline cache when not explicitly overridden.
mod defaults {
    /// Default cache size in bytes (8 KiB), used for the unified cache and both split halves.
    pub const CACHE_SIZE: u64 = 8 * 1024;

    /// Default block (line) size in bytes.
    pub const BLOCK_SIZE: u64 = 16;

    /// Default associativity (1 way = direct-mapped).
    pub const ASSOCIATIVITY: u64 = 1;
}

/// Policy applied when a store hits or allocates a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WritePolicy {
    /// Stores mark the line dirty; the block is copied back on eviction or flush.
    #[default]
    #[serde(alias = "WriteBack")]
    WriteBack,
    /// Every store writes one word through to the backing store; lines stay clean.
    #[serde(alias = "WriteThrough")]
    WriteThrough,
}

impl fmt::Display for WritePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WriteBack => write!(f, "WRITE BACK"),
            Self::WriteThrough => write!(f, "WRITE THROUGH"),
        }
    }
}

/// Policy applied when a store misses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationPolicy {
    /// A store miss fetches the block into the cache.
    #[default]
    #[serde(alias = "WriteAllocate")]
    WriteAllocate,
    /// A store miss bypasses the cache and writes one word to the backing store.
    #[serde(alias = "NoWriteAllocate")]
    NoWriteAllocate,
}

impl fmt::Display for AllocationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WriteAllocate => write!(f, "WRITE ALLOCATE"),
            Self::NoWriteAllocate => write!(f, "WRITE NO ALLOCATE"),
        }
    }
}

/// A single discrete configuration operation.
///
/// Sizing parameters carry their value in bytes (or ways, for associativity).
/// Setting a unified size selects unified mode; setting either split size
/// selects split mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheParam {
    /// Block size in bytes.
    BlockSize(u64),
    /// Unified cache size in bytes.
    UnifiedSize(u64),
    /// Instruction cache size in bytes (split mode).
    InstructionSize(u64),
    /// Data cache size in bytes (split mode).
    DataSize(u64),
    /// Number of ways per set.
    Associativity(u64),
    /// Select the write-back policy.
    WriteBack,
    /// Select the write-through policy.
    WriteThrough,
    /// Select the write-allocate policy.
    WriteAllocate,
    /// Select the no-write-allocate policy.
    NoWriteAllocate,
}

impl CacheParam {
    /// Option names accepted by [`CacheParam::parse`], short form first.
    pub const OPTION_NAMES: &'static [(&'static str, &'static str)] = &[
        ("bs", "block-size"),
        ("us", "unified-size"),
        ("is", "icache-size"),
        ("ds", "dcache-size"),
        ("a", "assoc"),
        ("wb", "write-back"),
        ("wt", "write-through"),
        ("wa", "write-allocate"),
        ("nw", "no-write-allocate"),
    ];

    /// Parses a named option into a parameter.
    ///
    /// Leading dashes on `name` are ignored, so `-bs`, `--bs`, and `bs` are
    /// equivalent. Sizing options require a decimal `value`; policy switches
    /// ignore it.
    ///
    /// # Errors
    ///
    /// * [`ConfigError::UnknownOption`] if the name is not recognized.
    /// * [`ConfigError::MissingValue`] if a sizing option has no value.
    /// * [`ConfigError::InvalidValue`] if the value is not an unsigned integer.
    pub fn parse(name: &str, value: Option<&str>) -> Result<Self, ConfigError> {
        let key = name.trim_start_matches('-');
        let sized = |ctor: fn(u64) -> Self| -> Result<Self, ConfigError> {
            let text = value.ok_or_else(|| ConfigError::MissingValue(key.to_string()))?;
            text.trim()
                .parse::<u64>()
                .map(ctor)
                .map_err(|_| ConfigError::InvalidValue {
                    option: key.to_string(),
                    value: text.to_string(),
                })
        };

        match key {
            "bs" | "block-size" => sized(Self::BlockSize),
            "us" | "unified-size" => sized(Self::UnifiedSize),
            "is" | "icache-size" => sized(Self::InstructionSize),
            "ds" | "dcache-size" => sized(Self::DataSize),
            "a" | "assoc" => sized(Self::Associativity),
            "wb" | "write-back" => Ok(Self::WriteBack),
            "wt" | "write-through" => Ok(Self::WriteThrough),
            "wa" | "write-allocate" => Ok(Self::WriteAllocate),
            "nw" | "no-write-allocate" => Ok(Self::NoWriteAllocate),
            _ => Err(ConfigError::UnknownOption(name.to_string())),
        }
    }
}

/// Root configuration structure for a simulation run.
///
/// # Examples
///
/// Building a split, 2-way, write-through configuration from discrete options:
///
/// ```
/// use cachesim_core::config::{CacheConfig, CacheParam, WritePolicy};
///
/// let mut config = CacheConfig::default();
/// config.set_param(CacheParam::InstructionSize(4096));
/// config.set_param(CacheParam::DataSize(8192));
/// config.set_param(CacheParam::Associativity(2));
/// config.set_param(CacheParam::WriteThrough);
///
/// assert!(config.split);
/// assert_eq!(config.write_policy, WritePolicy::WriteThrough);
/// ```
///
/// Deserializing from JSON; unknown keys are rejected:
///
/// ```
/// use cachesim_core::config::{AllocationPolicy, CacheConfig};
///
/// let config = CacheConfig::from_json(r#"{
///     "unified_size": 1024,
///     "block_size": 32,
///     "associativity": 4,
///     "allocation_policy": "no_write_allocate"
/// }"#).unwrap();
/// assert_eq!(config.words_per_block(), 8);
/// assert_eq!(config.allocation_policy, AllocationPolicy::NoWriteAllocate);
///
/// assert!(CacheConfig::from_json(r#"{ "prefetcher": "stride" }"#).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Separate instruction and data caches when true; one unified cache otherwise.
    #[serde(default)]
    pub split: bool,

    /// Unified cache size in bytes
    #[serde(default = "CacheConfig::default_size")]
    pub unified_size: u64,

    /// Instruction cache size in bytes (split mode only)
    #[serde(default = "CacheConfig::default_size")]
    pub icache_size: u64,

    /// Data cache size in bytes (split mode only)
    #[serde(default = "CacheConfig::default_size")]
    pub dcache_size: u64,

    /// Block size in bytes
    #[serde(default = "CacheConfig::default_block_size")]
    pub block_size: u64,

    /// Number of ways per set
    #[serde(default = "CacheConfig::default_associativity")]
    pub associativity: u64,

    /// Write-back or write-through
    #[serde(default)]
    pub write_policy: WritePolicy,

    /// Write-allocate or no-write-allocate
    #[serde(default)]
    pub allocation_policy: AllocationPolicy,
}

impl CacheConfig {
    /// Returns the default cache size in bytes.
    fn default_size() -> u64 {
        defaults::CACHE_SIZE
    }

    /// Returns the default block size in bytes.
    fn default_block_size() -> u64 {
        defaults::BLOCK_SIZE
    }

    /// Returns the default associativity.
    fn default_associativity() -> u64 {
        defaults::ASSOCIATIVITY
    }

    /// Applies one discrete configuration operation.
    pub fn set_param(&mut self, param: CacheParam) {
        match param {
            CacheParam::BlockSize(bytes) => self.block_size = bytes,
            CacheParam::UnifiedSize(bytes) => {
                self.split = false;
                self.unified_size = bytes;
            }
            CacheParam::InstructionSize(bytes) => {
                self.split = true;
                self.icache_size = bytes;
            }
            CacheParam::DataSize(bytes) => {
                self.split = true;
                self.dcache_size = bytes;
            }
            CacheParam::Associativity(ways) => self.associativity = ways,
            CacheParam::WriteBack => self.write_policy = WritePolicy::WriteBack,
            CacheParam::WriteThrough => self.write_policy = WritePolicy::WriteThrough,
            CacheParam::WriteAllocate => self.allocation_policy = AllocationPolicy::WriteAllocate,
            CacheParam::NoWriteAllocate => {
                self.allocation_policy = AllocationPolicy::NoWriteAllocate;
            }
        }
    }

    /// Parses and applies a sequence of named options, in order.
    ///
    /// # Errors
    ///
    /// Stops at the first option [`CacheParam::parse`] rejects.
    pub fn apply_options<'a, I>(&mut self, options: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
    {
        for (name, value) in options {
            self.set_param(CacheParam::parse(name, value)?);
        }
        Ok(())
    }

    /// Deserializes a configuration from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] on malformed JSON or unknown keys.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and deserializes a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Json`] if it does not parse.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Number of words moved by one block transfer.
    pub const fn words_per_block(&self) -> u64 {
        self.block_size / WORD_SIZE
    }

    /// Returns `true` under the write-back policy.
    pub fn is_write_back(&self) -> bool {
        self.write_policy == WritePolicy::WriteBack
    }

    /// Returns `true` under the write-allocate policy.
    pub fn is_write_allocate(&self) -> bool {
        self.allocation_policy == AllocationPolicy::WriteAllocate
    }

    /// Derives the geometry of the instruction (or unified) cache.
    ///
    /// # Errors
    ///
    /// Propagates the geometry validation of [`CacheGeometry::new`].
    pub fn instruction_geometry(&self) -> Result<CacheGeometry, ConfigError> {
        let size = if self.split {
            self.icache_size
        } else {
            self.unified_size
        };
        CacheGeometry::new(size, self.block_size, self.associativity)
    }

    /// Derives the geometry of the data cache.
    ///
    /// In unified mode this coincides with [`CacheConfig::instruction_geometry`].
    ///
    /// # Errors
    ///
    /// Propagates the geometry validation of [`CacheGeometry::new`].
    pub fn data_geometry(&self) -> Result<CacheGeometry, ConfigError> {
        let size = if self.split {
            self.dcache_size
        } else {
            self.unified_size
        };
        CacheGeometry::new(size, self.block_size, self.associativity)
    }

    /// Checks that every cache this configuration describes has a valid geometry.
    ///
    /// # Errors
    ///
    /// Returns the first geometry violation found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let _ = self.instruction_geometry()?;
        let _ = self.data_geometry()?;
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            split: false,
            unified_size: defaults::CACHE_SIZE,
            icache_size: defaults::CACHE_SIZE,
            dcache_size: defaults::CACHE_SIZE,
            block_size: defaults::BLOCK_SIZE,
            associativity: defaults::ASSOCIATIVITY,
            write_policy: WritePolicy::default(),
            allocation_policy: AllocationPolicy::default(),
        }
    }
}

impl fmt::Display for CacheConfig {
    /// Formats the configuration dump.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "*** CACHE SETTINGS ***")?;
        if self.split {
            writeln!(f, "  Split I- D-cache")?;
            writeln!(f, "  I-cache size: \t{}", self.icache_size)?;
            writeln!(f, "  D-cache size: \t{}", self.dcache_size)?;
        } else {
            writeln!(f, "  Unified I- D-cache")?;
            writeln!(f, "  Size: \t{}", self.unified_size)?;
        }
        writeln!(f, "  Associativity: \t{}", self.associativity)?;
        writeln!(f, "  Block size: \t{}", self.block_size)?;
        writeln!(f, "  Write policy: \t{}", self.write_policy)?;
        write!(f, "  Allocation policy: \t{}", self.allocation_policy)
    }
}
