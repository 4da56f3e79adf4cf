//! Request Classifier Module
//!
//! Decides, from method and URI alone, whether a request is a cacheable read, a
//! mutation that invalidates cached reads, or neither.

use axum::http::{Method, Uri};

use crate::cache::CacheKey;
use crate::routing::{
    has_segment_prefix, normalize_path, normalized_path_and_query, RouteFamily, Tag,
};

// == Classification ==
/// Outcome of classifying one inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Safe read on a whitelisted family
    Cacheable { key: CacheKey },
    /// Mutation that purges the given tags once its handler succeeds
    Mutation { tags: Vec<Tag> },
    /// Neither cached nor invalidating
    Uncached,
}

// == Mutation Rule ==
/// Maps a mutating route (segment prefix) to the tags it invalidates.
#[derive(Debug, Clone)]
pub struct MutationRule {
    path: String,
    tags: Vec<Tag>,
}

impl MutationRule {
    pub fn new(path: impl Into<String>, tags: &[Tag]) -> Self {
        Self {
            path: path.into(),
            tags: tags.to_vec(),
        }
    }

    fn matches(&self, path: &str) -> bool {
        has_segment_prefix(path, &self.path)
    }
}

/// Built-in mutation rules.
///
/// Buying, selling or switching units changes the portfolio valuation as well as the
/// transaction history, so those routes carry both tags.
pub fn default_mutation_rules() -> Vec<MutationRule> {
    use RouteFamily::{Portfolio, Profile, Transaction};

    vec![
        MutationRule::new("/transaction/buy", &[Transaction, Portfolio]),
        MutationRule::new("/transaction/sell", &[Transaction, Portfolio]),
        MutationRule::new("/transaction/switch", &[Transaction, Portfolio]),
        MutationRule::new("/portfolio/refresh", &[Portfolio]),
        MutationRule::new("/portfolio/clear-cache", &[Portfolio]),
        MutationRule::new("/kyc", &[Profile]),
    ]
}

// == Request Classifier ==
#[derive(Debug, Clone)]
pub struct RequestClassifier {
    /// Prefix stripped before matching, empty when routes are mounted at the root
    base_path: String,
    mutation_rules: Vec<MutationRule>,
}

impl RequestClassifier {
    /// Creates a classifier with the built-in mutation rules.
    pub fn new(base_path: impl Into<String>) -> Self {
        Self::with_rules(base_path, default_mutation_rules())
    }

    /// Creates a classifier with an explicit rule set.
    pub fn with_rules(base_path: impl Into<String>, mutation_rules: Vec<MutationRule>) -> Self {
        let base_path = base_path.into().trim_end_matches('/').to_string();
        Self {
            base_path,
            mutation_rules,
        }
    }

    /// Strips the base path; `None` when the path lies outside it.
    fn relative<'a>(&self, path: &'a str) -> Option<&'a str> {
        if self.base_path.is_empty() {
            return Some(path);
        }
        if !has_segment_prefix(path, &self.base_path) {
            return None;
        }
        match &path[self.base_path.len()..] {
            "" => Some("/"),
            rest => Some(rest),
        }
    }

    /// Returns the cached family a path belongs to, if any.
    pub fn family_of(&self, path: &str) -> Option<RouteFamily> {
        self.relative(path).and_then(RouteFamily::from_path)
    }

    /// Tags a successful mutation on `path` must invalidate.
    ///
    /// An explicit rule wins; otherwise a mutation inside a cached family invalidates
    /// that family. Paths outside every family yield no tags.
    pub fn invalidation_tags(&self, path: &str) -> Vec<Tag> {
        let Some(relative) = self.relative(path) else {
            return Vec::new();
        };

        if let Some(rule) = self.mutation_rules.iter().find(|r| r.matches(relative)) {
            return rule.tags.clone();
        }

        RouteFamily::from_path(relative).into_iter().collect()
    }

    // == Classify ==
    /// Classifies on the dot-segment-resolved path, which is the route the backend
    /// actually serves.
    pub fn classify(&self, method: &Method, uri: &Uri) -> Classification {
        let normalized = normalize_path(uri.path());
        let path: &str = &normalized;

        if *method == Method::GET {
            return match self.family_of(path) {
                Some(family) => Classification::Cacheable {
                    key: CacheKey::new(family, normalized_path_and_query(uri)),
                },
                None => Classification::Uncached,
            };
        }

        if method.is_safe() {
            return Classification::Uncached;
        }

        let tags = self.invalidation_tags(path);
        if tags.is_empty() {
            Classification::Uncached
        } else {
            Classification::Mutation { tags }
        }
    }
}

impl Default for RequestClassifier {
    fn default() -> Self {
        Self::new("")
    }
}
