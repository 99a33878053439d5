//! Domain models for the ID generator.
//!
//! This module contains the generator configuration, the bounds derived from
//! it, the logical view of an id, and the API contracts.

pub mod bounds;
pub mod components;
pub mod config;
pub mod dto;

pub use bounds::Bounds;
pub use components::IdComponents;
pub use config::{BitLayout, GeneratorConfig};
pub use dto::{ApiResponse, DomainIds, GenerateIdsResponse, ParsedIdResponse};
