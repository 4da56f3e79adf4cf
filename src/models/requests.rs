//! Request DTOs for the administrative API
//!
//! Defines the structure of incoming query parameters.

use serde::Deserialize;

use crate::routing::RouteFamily;

/// Query string for `GET /cache-status`
///
/// # Fields
/// - `family`: Optional route family to restrict the entry listing to
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusQuery {
    #[serde(default)]
    pub family: Option<RouteFamily>,
}
