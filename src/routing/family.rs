//! Route Family Module
//!
//! The fixed set of read route families the proxy caches. A family doubles as the
//! invalidation tag for every key classified into it.

use std::borrow::Cow;
use std::fmt;

use axum::http::Uri;
use serde::{Deserialize, Serialize};

// == Route Family ==
/// A cached route family, identified by its path prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteFamily {
    /// Portfolio overview, holdings and valuation
    Portfolio,
    /// Investor profile and KYC state
    Profile,
    /// Transaction listings and history
    Transaction,
}

/// Invalidation tag. Tags are route families; they are never stored on their own.
pub type Tag = RouteFamily;

impl RouteFamily {
    /// Every family, in matching order.
    pub const ALL: [RouteFamily; 3] = [
        RouteFamily::Portfolio,
        RouteFamily::Profile,
        RouteFamily::Transaction,
    ];

    /// Path prefix owning this family, relative to the API base path.
    pub fn prefix(self) -> &'static str {
        match self {
            RouteFamily::Portfolio => "/portfolio",
            RouteFamily::Profile => "/profile",
            RouteFamily::Transaction => "/transaction",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RouteFamily::Portfolio => "portfolio",
            RouteFamily::Profile => "profile",
            RouteFamily::Transaction => "transaction",
        }
    }

    /// Finds the family owning a (base-relative) path.
    pub fn from_path(path: &str) -> Option<RouteFamily> {
        Self::ALL
            .into_iter()
            .find(|family| has_segment_prefix(path, family.prefix()))
    }
}

impl fmt::Display for RouteFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Segment Prefix ==
/// Returns true when `prefix` matches `path` on whole segments.
///
/// `/portfolio` matches `/portfolio` and `/portfolio/overview`, never `/portfolios`.
pub fn has_segment_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/') || prefix.ends_with('/'),
        None => false,
    }
}

// == Path Normalization ==
/// Resolves `.` and `..` segments (percent-encoded forms included) the way the
/// upstream URL parser does, so a path is classified as the route it will reach.
///
/// Backslashes count as separators. `..` never climbs above the root. Paths without
/// dot-segments are returned unchanged.
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    let relative = path.strip_prefix('/').unwrap_or(path);
    let segments: Vec<&str> = relative.split(|c| c == '/' || c == '\\').collect();

    let needs_rewrite =
        path.contains('\\') || segments.iter().any(|s| is_single_dot(s) || is_double_dot(s));
    if !needs_rewrite {
        return Cow::Borrowed(path);
    }

    let last = segments.len() - 1;
    let mut resolved: Vec<&str> = Vec::with_capacity(segments.len());
    for (i, segment) in segments.into_iter().enumerate() {
        if is_double_dot(segment) {
            resolved.pop();
            if i == last {
                resolved.push("");
            }
        } else if is_single_dot(segment) {
            if i == last {
                resolved.push("");
            }
        } else {
            resolved.push(segment);
        }
    }

    Cow::Owned(format!("/{}", resolved.join("/")))
}

/// Normalized path followed by the untouched query string.
pub fn normalized_path_and_query(uri: &Uri) -> String {
    let path = normalize_path(uri.path());
    match uri.query() {
        Some(query) => format!("{}?{}", path, query),
        None => path.into_owned(),
    }
}

fn is_single_dot(segment: &str) -> bool {
    segment == "." || segment.eq_ignore_ascii_case("%2e")
}

fn is_double_dot(segment: &str) -> bool {
    matches!(
        segment.to_ascii_lowercase().as_str(),
        ".." | ".%2e" | "%2e." | "%2e%2e"
    )
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path_matches_family_routes() {
        assert_eq!(
            RouteFamily::from_path("/portfolio/overview"),
            Some(RouteFamily::Portfolio)
        );
        assert_eq!(RouteFamily::from_path("/profile"), Some(RouteFamily::Profile));
        assert_eq!(
            RouteFamily::from_path("/transaction/list"),
            Some(RouteFamily::Transaction)
        );
    }

    #[test]
    fn test_from_path_rejects_lookalike_prefixes() {
        assert_eq!(RouteFamily::from_path("/portfolios"), None);
        assert_eq!(RouteFamily::from_path("/profile-picture"), None);
        assert_eq!(RouteFamily::from_path("/transactions/list"), None);
        assert_eq!(RouteFamily::from_path("/bank/list"), None);
        assert_eq!(RouteFamily::from_path("/"), None);
    }

    #[test]
    fn test_segment_prefix_with_trailing_slash() {
        assert!(has_segment_prefix("/api/portfolio", "/api/"));
        assert!(has_segment_prefix("/api", "/api"));
        assert!(!has_segment_prefix("/apix", "/api"));
    }

    #[test]
    fn test_normalize_path_resolves_dot_segments() {
        assert_eq!(
            normalize_path("/profile/../portfolio/overview"),
            "/portfolio/overview"
        );
        assert_eq!(normalize_path("/profile/./kyc"), "/profile/kyc");
        assert_eq!(normalize_path("/profile/.."), "/");
        assert_eq!(normalize_path("/../../portfolio"), "/portfolio");
        assert_eq!(normalize_path("/portfolio/."), "/portfolio/");
    }

    #[test]
    fn test_normalize_path_decodes_encoded_dots() {
        assert_eq!(
            normalize_path("/profile/%2e%2e/portfolio/overview"),
            "/portfolio/overview"
        );
        assert_eq!(
            normalize_path("/profile/.%2E/portfolio/overview"),
            "/portfolio/overview"
        );
        assert_eq!(normalize_path("/profile/%2E/x"), "/profile/x");
        assert_eq!(normalize_path("/profile\\..\\portfolio"), "/portfolio");
    }

    #[test]
    fn test_normalize_path_leaves_plain_paths_alone() {
        assert!(matches!(
            normalize_path("/portfolio/overview"),
            Cow::Borrowed("/portfolio/overview")
        ));
        assert_eq!(normalize_path("/portfolio/..hidden"), "/portfolio/..hidden");
        assert_eq!(normalize_path("/"), "/");
    }

    #[test]
    fn test_normalized_path_and_query_keeps_query() {
        let uri: Uri = "/profile/../portfolio/overview?range=1y&x=/../".parse().unwrap();
        assert_eq!(
            normalized_path_and_query(&uri),
            "/portfolio/overview?range=1y&x=/../"
        );
    }

    #[test]
    fn test_family_serializes_lowercase() {
        let json = serde_json::to_string(&RouteFamily::Transaction).unwrap();
        assert_eq!(json, "\"transaction\"");

        let family: RouteFamily = serde_json::from_str("\"portfolio\"").unwrap();
        assert_eq!(family, RouteFamily::Portfolio);
    }
}
