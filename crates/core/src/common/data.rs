//! Memory Access Types.
//!
//! This module defines the classification of trace records used throughout the simulator.
//! These types are used for the following:
//! 1. **Classification:** Selecting the load or store path of the access classifier.
//! 2. **Cache Selection:** Routing an access to the instruction or data cache.
//! 3. **Statistics Tracking:** Charging each access to the instruction or data stream.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::constants::{TRACE_LABEL_FETCH, TRACE_LABEL_LOAD, TRACE_LABEL_STORE};

/// Type of memory access carried by a trace record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessType {
    /// Data read access (trace label `0`).
    ///
    /// Takes the load path of the data cache.
    DataLoad,

    /// Data write access (trace label `1`).
    ///
    /// Takes the store path of the data cache and is subject to the write and
    /// allocation policies.
    DataStore,

    /// Instruction fetch access (trace label `2`).
    ///
    /// Takes the load path of the instruction (or unified) cache.
    InstructionFetch,
}

impl AccessType {
    /// Every access type, in trace-label order.
    pub const ALL: [Self; 3] = [Self::DataLoad, Self::DataStore, Self::InstructionFetch];

    /// Decodes a numeric trace label.
    ///
    /// Returns `None` for labels other than `0`, `1`, and `2`.
    pub const fn from_label(label: u8) -> Option<Self> {
        match label {
            TRACE_LABEL_LOAD => Some(Self::DataLoad),
            TRACE_LABEL_STORE => Some(Self::DataStore),
            TRACE_LABEL_FETCH => Some(Self::InstructionFetch),
            _ => None,
        }
    }

    /// Returns the numeric trace label of this access type.
    pub const fn label(self) -> u8 {
        match self {
            Self::DataLoad => TRACE_LABEL_LOAD,
            Self::DataStore => TRACE_LABEL_STORE,
            Self::InstructionFetch => TRACE_LABEL_FETCH,
        }
    }

    /// Returns the statistics stream this access is charged to.
    pub const fn stream(self) -> Stream {
        match self {
            Self::DataLoad | Self::DataStore => Stream::Data,
            Self::InstructionFetch => Stream::Instruction,
        }
    }

    /// Returns `true` for data stores.
    pub const fn is_store(self) -> bool {
        matches!(self, Self::DataStore)
    }
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DataLoad => write!(f, "load"),
            Self::DataStore => write!(f, "store"),
            Self::InstructionFetch => write!(f, "fetch"),
        }
    }
}

/// Access stream used to select a cache and a statistics bucket.
///
/// In unified mode both streams reach the same cache but keep separate
/// statistics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stream {
    /// Instruction fetches.
    Instruction,
    /// Data loads and stores.
    Data,
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instruction => write!(f, "instruction"),
            Self::Data => write!(f, "data"),
        }
    }
}
