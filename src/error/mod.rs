//! Error handling module.
//!
//! This module provides unified error handling with proper HTTP status code mapping
//! and standardized API error responses.

pub mod codes;

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::domain::ApiResponse;

pub use codes::{ErrorCategory, ErrorCode};

/// Application-level error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Required parameter was not provided.
    #[error("Missing required parameter: {0}")]
    MissingParam(String),

    /// Parameter could not be parsed or is out of its allowed range.
    #[error("Invalid parameter: {0}")]
    InvalidParam(String),

    /// Requested domain exceeds the configured maximum.
    #[error("Domain {domain} exceeds maximum value {max}")]
    DomainOutOfRange {
        /// Requested domain.
        domain: u64,
        /// Largest configured domain.
        max: u64,
    },

    /// Generator is shutting down.
    #[error("Service unavailable")]
    Unavailable,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the error code for this error.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidConfig(_) => ErrorCode::INVALID_CONFIG,
            Self::BadRequest(_) => ErrorCode::BAD_REQUEST,
            Self::MissingParam(_) => ErrorCode::MISSING_PARAM,
            Self::InvalidParam(_) => ErrorCode::INVALID_PARAM,
            Self::DomainOutOfRange { .. } => ErrorCode::DOMAIN_OUT_OF_RANGE,
            Self::Unavailable => ErrorCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => ErrorCode::INTERNAL_ERROR,
        }
    }

    /// Get the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_)
            | Self::MissingParam(_)
            | Self::InvalidParam(_)
            | Self::DomainOutOfRange { .. } => StatusCode::BAD_REQUEST,
            Self::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::InvalidConfig(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();
        let category = code.category();
        let message = self.to_string();

        match category {
            ErrorCategory::Validation => tracing::debug!(
                error_code = code.as_i32(),
                category = %category,
                status = %status,
                message = %message,
                "Request rejected"
            ),
            _ => tracing::error!(
                error_code = code.as_i32(),
                category = %category,
                status = %status,
                message = %message,
                "Request failed"
            ),
        }

        let body = ApiResponse::<()>::error(code.as_i32(), message);
        (status, Json(body)).into_response()
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Errors produced by the ID generator core.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeneratorError {
    /// Field widths do not fit in a 64-bit id.
    #[error("bit widths sum to {total_bits}, exceeding 64")]
    WidthOverflow {
        /// Sum of all four widths.
        total_bits: u32,
    },

    /// Domain count cannot be used as an allocation size on this platform.
    #[error("domain count ({max_domain} + 1) cannot be allocated on this platform")]
    DomainCountUnrepresentable {
        /// Largest domain implied by `domain_bits`.
        max_domain: u64,
    },

    /// Configured instance id does not fit its field.
    #[error("instance id {instance_id} exceeds maximum value {max}")]
    InstanceIdOutOfRange {
        /// Configured instance id.
        instance_id: u64,
        /// Largest instance id implied by `instance_id_bits`.
        max: u64,
    },

    /// Reserved window is too large for signed second arithmetic.
    #[error("reserved_seconds_count {value} exceeds {max}", max = i64::MAX)]
    ReservedSecondsOutOfRange {
        /// Configured window.
        value: u64,
    },

    /// Requested domain exceeds the configured maximum.
    #[error("domain {domain} exceeds maximum value {max}")]
    DomainOutOfRange {
        /// Requested domain.
        domain: u64,
        /// Largest configured domain.
        max: u64,
    },

    /// Requested a batch of zero ids.
    #[error("count must be at least 1")]
    InvalidCount,

    /// Generator has been shut down.
    #[error("generator has been shut down")]
    ShutDown,

    /// Sequencer task stopped before answering.
    #[error("sequencer for domain {domain} is unavailable")]
    SequencerUnavailable {
        /// Domain whose sequencer failed.
        domain: u64,
    },
}

impl GeneratorError {
    /// Whether this error stems from an inconsistent configuration.
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::WidthOverflow { .. }
                | Self::DomainCountUnrepresentable { .. }
                | Self::InstanceIdOutOfRange { .. }
                | Self::ReservedSecondsOutOfRange { .. }
        )
    }
}

impl From<GeneratorError> for AppError {
    fn from(err: GeneratorError) -> Self {
        match err {
            GeneratorError::DomainOutOfRange { domain, max } => {
                Self::DomainOutOfRange { domain, max }
            }
            GeneratorError::InvalidCount => Self::InvalidParam(err.to_string()),
            GeneratorError::ShutDown => Self::Unavailable,
            GeneratorError::SequencerUnavailable { .. } => Self::Internal(err.to_string()),
            GeneratorError::WidthOverflow { .. }
            | GeneratorError::DomainCountUnrepresentable { .. }
            | GeneratorError::InstanceIdOutOfRange { .. }
            | GeneratorError::ReservedSecondsOutOfRange { .. } => {
                Self::InvalidConfig(err.to_string())
            }
        }
    }
}

/// Result type alias using `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
