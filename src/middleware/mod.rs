//! Middleware Module
//!
//! The response cache layer and the envelope rules it judges responses by.

pub mod envelope;
mod response_cache;

pub use envelope::SuccessPolicy;
pub use response_cache::{response_cache_layer, wants_bypass, BYPASS_HEADER, CACHE_STATUS_HEADER};
