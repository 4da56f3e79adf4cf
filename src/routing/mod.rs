//! Routing Module
//!
//! Route families and request classification for the response cache.

mod classifier;
mod family;

pub use classifier::{default_mutation_rules, Classification, MutationRule, RequestClassifier};
pub use family::{
    has_segment_prefix, normalize_path, normalized_path_and_query, RouteFamily, Tag,
};
