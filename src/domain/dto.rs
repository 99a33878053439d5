//! Data Transfer Objects for API requests and responses.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat};
use serde::{Deserialize, Serialize};

use super::IdComponents;

/// Standard API response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Response code (0 = success, non-zero = error).
    pub code: i32,

    /// Human-readable message.
    pub message: String,

    /// Response data (null on error).
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create a success response.
    pub fn success(data: T) -> Self {
        Self {
            code: 0,
            message: "success".to_string(),
            data: Some(data),
        }
    }

    /// Create an error response.
    pub fn error(code: i32, message: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            code,
            message: message.into(),
            data: None,
        }
    }
}

/// IDs issued for one domain, in issuance order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainIds {
    /// Domain the ids belong to.
    pub domain: u64,

    /// Generated ids.
    pub ids: Vec<u64>,
}

/// Response for `/generate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateIdsResponse {
    /// Generated ids grouped by domain, ordered by domain.
    pub ids_by_domain: Vec<DomainIds>,
}

impl From<BTreeMap<u64, Vec<u64>>> for GenerateIdsResponse {
    fn from(ids: BTreeMap<u64, Vec<u64>>) -> Self {
        Self {
            ids_by_domain: ids
                .into_iter()
                .map(|(domain, ids)| DomainIds { domain, ids })
                .collect(),
        }
    }
}

/// Response for `/parse`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedIdResponse {
    /// Timestamp in RFC 3339 format (UTC).
    pub timestamp: String,

    /// Timestamp as unix seconds.
    pub unix_timestamp: i64,

    /// Per-second counter.
    pub counter: u64,

    /// Issuing instance.
    pub instance_id: u64,

    /// Domain.
    pub domain: u64,
}

impl From<IdComponents> for ParsedIdResponse {
    fn from(components: IdComponents) -> Self {
        // Out of chrono's range only for absurd epochs; fall back to the raw seconds.
        let timestamp = DateTime::from_timestamp(components.timestamp, 0).map_or_else(
            || components.timestamp.to_string(),
            |dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true),
        );

        Self {
            timestamp,
            unix_timestamp: components.timestamp,
            counter: components.counter,
            instance_id: components.instance_id,
            domain: components.domain,
        }
    }
}
