//! Request and Response models for the administrative API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing cache administration requests and responses.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::StatusQuery;
pub use responses::{CacheStatusResponse, EntryStatus, FlushResponse, HealthResponse};
