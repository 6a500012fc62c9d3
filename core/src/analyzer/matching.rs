//! Path comparison primitives used by the endpoint matcher.
//!
//! Paths are compared segment by segment. A segment wrapped in braces is a
//! placeholder; placeholders line up with each other regardless of name.

use crate::models::EndpointKey;
use serde::Serialize;
use std::fmt;

/// Thresholds and weights of the matcher.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatcherConfig {
    /// Confidence given to paths that differ only in placeholder names.
    pub parameter_mismatch_confidence: f64,
    /// Multiplier applied to the segment overlap of non-aligned paths.
    pub partial_match_weight: f64,
    /// Lowest confidence accepted as a match.
    pub min_confidence: f64,
    /// Lowest similarity for a path to be suggested as "similar".
    pub similar_path_threshold: f64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            parameter_mismatch_confidence: 0.9,
            partial_match_weight: 0.7,
            min_confidence: 0.8,
            similar_path_threshold: 0.3,
        }
    }
}

/// How a schema operation relates to its documentation candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// Identical method and path.
    Exact,
    /// Same method, paths differ only in placeholder names.
    ParameterMismatch,
    /// No candidate reached the confidence floor.
    NoMatch,
}

impl MatchType {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Exact => "exact",
            MatchType::ParameterMismatch => "parameter_mismatch",
            MatchType::NoMatch => "no_match",
        }
    }

    /// Preference among equally confident candidates (higher wins).
    pub(crate) fn rank(&self) -> u8 {
        match self {
            MatchType::Exact => 2,
            MatchType::ParameterMismatch => 1,
            MatchType::NoMatch => 0,
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Drops a trailing slash, keeping the root path intact.
pub fn normalize_path(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

/// Non-empty `/`-separated segments of `path`.
pub fn segments(path: &str) -> Vec<&str> {
    normalize_path(path)
        .split('/')
        .filter(|s| !s.is_empty())
        .collect()
}

/// Whether `segment` is a `{name}` placeholder.
pub fn is_placeholder(segment: &str) -> bool {
    segment.len() > 2 && segment.starts_with('{') && segment.ends_with('}')
}

/// True when both paths have the same segment count, equal literals and
/// placeholders in the same positions.
pub fn shapes_align(a: &str, b: &str) -> bool {
    let (sa, sb) = (segments(a), segments(b));
    sa.len() == sb.len()
        && sa.iter().zip(&sb).all(|(x, y)| match (is_placeholder(x), is_placeholder(y)) {
            (true, true) => true,
            (false, false) => x == y,
            _ => false,
        })
}

/// Fraction of positions (over the longer path) holding equal literals or
/// two placeholders.
pub fn overlap_ratio(a: &str, b: &str) -> f64 {
    let (sa, sb) = (segments(a), segments(b));
    let longest = sa.len().max(sb.len());
    if longest == 0 {
        return 1.0;
    }
    let shared = sa
        .iter()
        .zip(&sb)
        .filter(|(x, y)| {
            let (px, py) = (is_placeholder(x), is_placeholder(y));
            (px && py) || (!px && !py && x == y)
        })
        .count();
    shared as f64 / longest as f64
}

/// Method-agnostic path similarity in `[0, 1]`.
pub fn path_similarity(a: &str, b: &str, config: &MatcherConfig) -> f64 {
    if normalize_path(a) == normalize_path(b) {
        1.0
    } else if shapes_align(a, b) {
        config.parameter_mismatch_confidence
    } else {
        config.partial_match_weight * overlap_ratio(a, b)
    }
}

/// Scores documentation key `doc` as a candidate for schema key `schema`.
///
/// A method mismatch always yields `(0.0, NoMatch)`.
pub fn match_confidence(
    schema: &EndpointKey,
    doc: &EndpointKey,
    config: &MatcherConfig,
) -> (f64, MatchType) {
    if schema.method != doc.method {
        return (0.0, MatchType::NoMatch);
    }
    if normalize_path(&schema.path) == normalize_path(&doc.path) {
        (1.0, MatchType::Exact)
    } else if shapes_align(&schema.path, &doc.path) {
        (config.parameter_mismatch_confidence, MatchType::ParameterMismatch)
    } else {
        (
            config.partial_match_weight * overlap_ratio(&schema.path, &doc.path),
            MatchType::NoMatch,
        )
    }
}
