//! Logical view of a single id before encoding.

use serde::{Deserialize, Serialize};

/// The four fields packed into one id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdComponents {
    /// Unix timestamp in seconds.
    pub timestamp: i64,
    /// Per-second sequence number within the domain.
    pub counter: u64,
    /// Instance that issued the id.
    pub instance_id: u64,
    /// Partition key.
    pub domain: u64,
}

impl IdComponents {
    /// Create id components.
    #[must_use]
    pub const fn new(timestamp: i64, counter: u64, instance_id: u64, domain: u64) -> Self {
        Self {
            timestamp,
            counter,
            instance_id,
            domain,
        }
    }
}
