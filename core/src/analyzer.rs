#![deny(missing_docs)]

//! # Unified Endpoint Analyzer
//!
//! Reconciles schema operations with documentation records.
//!
//! - **matching**: Path shape comparison and confidence scoring.
//! - **scoring**: Completeness scoring of a single record.
//!
//! For every schema key the analyzer picks at most one documentation record.
//! Among equally confident candidates it prefers an exact match, then the
//! record with more populated fields, then the earliest record, so results
//! depend only on input order.

pub mod matching;
pub mod scoring;

use crate::error::AppResult;
use crate::models::{CodeLanguage, CodeSample, EndpointDocumentation, EndpointKey, HttpMethod};
use crate::samples::CodeSampleGenerator;
use crate::schema::SchemaView;
use matching::{match_confidence, normalize_path, path_similarity, MatchType, MatcherConfig};
use scoring::{score_endpoint, CompletenessWeights, EndpointAnalysis};
use serde::Serialize;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Matcher and scoring settings.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnalyzerConfig {
    /// Matching thresholds.
    pub matcher: MatcherConfig,
    /// Completeness weights.
    pub weights: CompletenessWeights,
}

/// The best documentation candidate for one schema operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointMatch<'d> {
    /// Schema method.
    pub openapi_method: HttpMethod,
    /// Schema path.
    pub openapi_path: String,
    /// Chosen record, absent for [`MatchType::NoMatch`].
    pub endpoint_doc: Option<&'d EndpointDocumentation>,
    /// Confidence in `[0, 1]`. For a non-match, the best raw similarity seen.
    pub match_confidence: f64,
    /// Kind of match.
    pub match_type: MatchType,
}

impl EndpointMatch<'_> {
    /// The schema key this match is for.
    pub fn key(&self) -> EndpointKey {
        EndpointKey::new(self.openapi_method, self.openapi_path.clone())
    }

    /// Whether a record was chosen.
    pub fn is_matched(&self) -> bool {
        self.endpoint_doc.is_some()
    }
}

/// Schema keys of `schema`, skipping those `exclude` rejects.
///
/// Fails when `schema` is not a mapping with a `paths` mapping.
pub fn extract_openapi_endpoints<F>(schema: &Value, exclude: F) -> AppResult<BTreeSet<EndpointKey>>
where
    F: Fn(&EndpointKey) -> bool,
{
    let view = SchemaView::from_value(schema.clone())?;
    Ok(UnifiedEndpointAnalyzer::new(&view).extract_openapi_endpoints(exclude))
}

/// Matches documentation records against one schema.
#[derive(Debug, Clone)]
pub struct UnifiedEndpointAnalyzer<'s> {
    schema: &'s SchemaView,
    config: AnalyzerConfig,
}

impl<'s> UnifiedEndpointAnalyzer<'s> {
    /// Analyzer with default settings.
    pub fn new(schema: &'s SchemaView) -> Self {
        Self::with_config(schema, AnalyzerConfig::default())
    }

    /// Analyzer with explicit settings.
    pub fn with_config(schema: &'s SchemaView, config: AnalyzerConfig) -> Self {
        Self { schema, config }
    }

    /// Active settings.
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Every `(method, path)` declared by the schema that `exclude` keeps.
    pub fn extract_openapi_endpoints<F>(&self, exclude: F) -> BTreeSet<EndpointKey>
    where
        F: Fn(&EndpointKey) -> bool,
    {
        self.schema
            .operations()
            .iter()
            .map(|op| op.key())
            .filter(|key| !exclude(key))
            .collect()
    }

    /// Distinct keys of `docs`.
    pub fn extract_documentation_endpoints(
        &self,
        docs: &[EndpointDocumentation],
    ) -> BTreeSet<EndpointKey> {
        docs.iter().map(EndpointDocumentation::key).collect()
    }

    /// One match per schema key, in key order.
    pub fn match_endpoints<'d>(
        &self,
        schema_keys: &BTreeSet<EndpointKey>,
        docs: &'d [EndpointDocumentation],
    ) -> Vec<EndpointMatch<'d>> {
        schema_keys
            .iter()
            .map(|key| self.best_match(key, docs))
            .collect()
    }

    /// Best candidate in `docs` for `key`.
    pub fn best_match<'d>(
        &self,
        key: &EndpointKey,
        docs: &'d [EndpointDocumentation],
    ) -> EndpointMatch<'d> {
        let matcher = &self.config.matcher;
        let mut best: Option<(f64, MatchType, &'d EndpointDocumentation)> = None;
        let mut best_raw = 0.0f64;

        for doc in docs {
            let (confidence, kind) = match_confidence(key, &doc.key(), matcher);
            best_raw = best_raw.max(confidence);
            if kind == MatchType::NoMatch || confidence < matcher.min_confidence {
                continue;
            }
            let replace = match &best {
                None => true,
                Some((c, k, d)) => {
                    confidence
                        .total_cmp(c)
                        .then_with(|| kind.rank().cmp(&k.rank()))
                        .then_with(|| doc.populated_fields().cmp(&d.populated_fields()))
                        == Ordering::Greater
                }
            };
            if replace {
                best = Some((confidence, kind, doc));
            }
        }

        match best {
            Some((confidence, kind, doc)) => EndpointMatch {
                openapi_method: key.method,
                openapi_path: key.path.clone(),
                endpoint_doc: Some(doc),
                match_confidence: confidence,
                match_type: kind,
            },
            None => EndpointMatch {
                openapi_method: key.method,
                openapi_path: key.path.clone(),
                endpoint_doc: None,
                match_confidence: best_raw,
                match_type: MatchType::NoMatch,
            },
        }
    }

    /// Scores `doc`, using `operation` to detect undocumented parameters.
    pub fn analyze_endpoint(
        &self,
        doc: &EndpointDocumentation,
        operation: Option<&Map<String, Value>>,
    ) -> EndpointAnalysis {
        score_endpoint(doc, operation, &self.config.weights)
    }

    /// Scores the record of a match against its schema operation.
    pub fn analyze_match(&self, found: &EndpointMatch<'_>) -> Option<EndpointAnalysis> {
        let doc = found.endpoint_doc?;
        let operation = self.get_openapi_operation(found.openapi_method, &found.openapi_path);
        Some(self.analyze_endpoint(doc, operation))
    }

    /// The schema operation at `method` and `path`, tolerating a trailing slash.
    pub fn get_openapi_operation(
        &self,
        method: HttpMethod,
        path: &str,
    ) -> Option<&'s Map<String, Value>> {
        self.schema.operation(method, path).or_else(|| {
            let wanted = normalize_path(path);
            self.schema
                .operations()
                .into_iter()
                .find(|op| op.method == method && normalize_path(op.path) == wanted)
                .map(|op| op.operation)
        })
    }

    /// Up to `limit` distinct candidates most similar to `target`, best first.
    pub fn find_similar_paths<'p, I>(&self, target: &str, candidates: I, limit: usize) -> Vec<String>
    where
        I: IntoIterator<Item = &'p str>,
    {
        let matcher = &self.config.matcher;
        let unique: BTreeSet<&str> = candidates.into_iter().collect();
        let mut scored: Vec<(f64, &str)> = unique
            .into_iter()
            .map(|path| (path_similarity(target, path, matcher), path))
            .filter(|(score, _)| *score >= matcher.similar_path_threshold)
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        scored
            .into_iter()
            .take(limit)
            .map(|(_, path)| path.to_string())
            .collect()
    }

    /// Generates a sample per language, logging and skipping failures.
    pub fn generate_code_samples(
        &self,
        doc: &EndpointDocumentation,
        languages: &[CodeLanguage],
        generator: &dyn CodeSampleGenerator,
    ) -> Vec<CodeSample> {
        languages
            .iter()
            .filter_map(|&language| match generator.generate(doc, language) {
                Ok(sample) => Some(sample),
                Err(e) => {
                    log::warn!(
                        "Skipping {} sample for {}: {}",
                        language,
                        doc.key(),
                        e
                    );
                    None
                }
            })
            .collect()
    }
}
