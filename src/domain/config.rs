//! Generator configuration types.
//!
//! [`GeneratorConfig`] is the immutable description of one generator instance:
//! which instance id it stamps into every id, how the 64 bits are split
//! between the four fields, and how the sequencers treat the wall clock.

use serde::{Deserialize, Serialize};

/// Configuration for the domain-partitioned ID generator.
///
/// IDs are 64-bit integers composed of (high to low bits):
/// - Timestamp (seconds since `epoch_start_second`)
/// - Counter (per-second sequence within one domain)
/// - Instance ID (identifies this process in the fleet)
/// - Domain (caller-chosen partition key)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Externally assigned instance identifier. Required.
    pub instance_id: u64,

    /// Number of bits allocated for the timestamp.
    #[serde(default = "default_timestamp_bits")]
    pub timestamp_bits: u8,

    /// Number of bits allocated for the domain.
    #[serde(default = "default_domain_bits")]
    pub domain_bits: u8,

    /// Number of bits allocated for the per-second counter.
    #[serde(default = "default_counter_bits")]
    pub counter_bits: u8,

    /// Number of bits allocated for the instance id.
    #[serde(default = "default_instance_id_bits")]
    pub instance_id_bits: u8,

    /// Custom epoch in unix seconds.
    /// Default is 2023-01-01 00:00:00 UTC (1672531200).
    #[serde(default = "default_epoch_start_second")]
    pub epoch_start_second: i64,

    /// How far (in seconds) a sequencer's reserved timestamp may trail the
    /// wall clock before it is pulled forward.
    #[serde(default = "default_reserved_seconds_count")]
    pub reserved_seconds_count: u64,

    /// Shift applied to the wall clock when sequencers are first seeded.
    #[serde(default)]
    pub startup_second_offset: i64,

    /// Depth of each sequencer's inbound request queue.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

const fn default_timestamp_bits() -> u8 {
    35
}
const fn default_domain_bits() -> u8 {
    8
}
const fn default_counter_bits() -> u8 {
    14
}
const fn default_instance_id_bits() -> u8 {
    6
}
const fn default_epoch_start_second() -> i64 {
    1_672_531_200 // 2023-01-01 00:00:00 UTC
}
const fn default_reserved_seconds_count() -> u64 {
    60
}
const fn default_queue_capacity() -> usize {
    1024
}

impl GeneratorConfig {
    /// Create a configuration with default widths for the given instance.
    #[must_use]
    pub fn with_instance_id(instance_id: u64) -> Self {
        Self {
            instance_id,
            ..Self::default()
        }
    }

    /// The bit layout consumed by the codec.
    #[must_use]
    pub const fn layout(&self) -> BitLayout {
        BitLayout {
            timestamp_bits: self.timestamp_bits,
            counter_bits: self.counter_bits,
            instance_id_bits: self.instance_id_bits,
            domain_bits: self.domain_bits,
            epoch_start_second: self.epoch_start_second,
        }
    }

    /// Sum of all four field widths.
    #[must_use]
    pub fn total_bits(&self) -> u32 {
        u32::from(self.timestamp_bits)
            + u32::from(self.counter_bits)
            + u32::from(self.instance_id_bits)
            + u32::from(self.domain_bits)
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            instance_id: 0,
            timestamp_bits: default_timestamp_bits(),
            domain_bits: default_domain_bits(),
            counter_bits: default_counter_bits(),
            instance_id_bits: default_instance_id_bits(),
            epoch_start_second: default_epoch_start_second(),
            reserved_seconds_count: default_reserved_seconds_count(),
            startup_second_offset: 0,
            queue_capacity: default_queue_capacity(),
        }
    }
}

/// Field widths and epoch used to pack and unpack IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitLayout {
    /// Width of the timestamp field (highest bits).
    pub timestamp_bits: u8,
    /// Width of the counter field.
    pub counter_bits: u8,
    /// Width of the instance id field.
    pub instance_id_bits: u8,
    /// Width of the domain field (lowest bits).
    pub domain_bits: u8,
    /// Reference zero point subtracted from timestamps.
    pub epoch_start_second: i64,
}
