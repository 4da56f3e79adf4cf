//! Cache Key Module
//!
//! Canonical identity of a cacheable read.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::routing::RouteFamily;

// == Cache Key ==
/// Identity of a cached GET: the dot-segment-resolved path and the raw query string,
/// plus the family the classifier placed it in.
///
/// Query parameters are not normalized, so `?a=1&b=2` and `?b=2&a=1` are distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    family: RouteFamily,
    path_and_query: String,
}

impl CacheKey {
    pub fn new(family: RouteFamily, path_and_query: impl Into<String>) -> Self {
        Self {
            family,
            path_and_query: path_and_query.into(),
        }
    }

    pub fn family(&self) -> RouteFamily {
        self.family
    }

    pub fn path_and_query(&self) -> &str {
        &self.path_and_query
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GET {}", self.path_and_query)
    }
}

impl Serialize for CacheKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_method_and_query() {
        let key = CacheKey::new(RouteFamily::Portfolio, "/portfolio/overview?range=1y");
        assert_eq!(key.to_string(), "GET /portfolio/overview?range=1y");
    }

    #[test]
    fn test_parameter_order_is_significant() {
        let a = CacheKey::new(RouteFamily::Transaction, "/transaction/list?a=1&b=2");
        let b = CacheKey::new(RouteFamily::Transaction, "/transaction/list?b=2&a=1");
        assert_ne!(a, b);
    }

    #[test]
    fn test_serializes_as_string() {
        let key = CacheKey::new(RouteFamily::Profile, "/profile");
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"GET /profile\"");
    }
}
