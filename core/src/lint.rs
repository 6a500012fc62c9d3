#![deny(missing_docs)]

//! # Documentation Linter
//!
//! Checks a documentation directory against a schema and produces a
//! [`LintReport`].
//!
//! - **config**: The YAML configuration file and endpoint exclusions.
//! - **report**: Report structure.
//! - **recommendations**: Summary tier and prioritized action items.
//! - **todo**: TODO marker inventory.
//!
//! Data-quality problems are findings, never errors. Linting fails only when
//! the schema is malformed or the documentation cannot be read.

pub mod config;
pub mod recommendations;
pub mod report;
pub mod todo;

use crate::analyzer::matching::{normalize_path, shapes_align, MatchType};
use crate::analyzer::scoring::{EndpointAnalysis, MissingElement};
use crate::analyzer::{AnalyzerConfig, EndpointMatch, UnifiedEndpointAnalyzer};
use crate::enhancer::{EnhancementConfig, OpenApiEnhancer, SchemaEnhancer};
use crate::error::AppResult;
use crate::loader::{LoaderConfig, MarkdownDocumentationLoader};
use crate::models::{DocumentationData, EndpointDocumentation, EndpointKey};
use crate::schema::SchemaView;
use config::{ExclusionSet, LinterConfig};
use indexmap::IndexMap;
use recommendations::{build_recommendations, build_summary, round1, FindingCounts};
use report::*;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Number of similar paths attached to a missing entry.
pub const SIMILAR_PATHS_LIMIT: usize = 3;

/// Lint settings.
#[derive(Debug, Clone)]
pub struct LintOptions {
    /// Descend into subdirectories.
    pub recursive: bool,
    /// Scores below this mark an endpoint incomplete.
    pub completeness_threshold: u32,
    /// Base URL for samples generated by the enhancer check.
    pub base_url: String,
    /// Endpoints left out of every check.
    pub exclusions: ExclusionSet,
    /// Matcher and scoring settings.
    pub analyzer: AnalyzerConfig,
    /// Name of the general documentation file.
    pub general_docs_file: String,
}

impl Default for LintOptions {
    fn default() -> Self {
        Self::from(&LinterConfig::default())
    }
}

impl From<&LinterConfig> for LintOptions {
    fn from(config: &LinterConfig) -> Self {
        Self {
            recursive: config.recursive,
            completeness_threshold: config.completeness_threshold,
            base_url: config.base_url.clone(),
            exclusions: config.exclusions.clone(),
            analyzer: AnalyzerConfig::default(),
            general_docs_file: LoaderConfig::default().general_docs_file,
        }
    }
}

/// Lints one documentation directory against one schema.
pub struct DocumentationLinter {
    schema: SchemaView,
    docs_directory: PathBuf,
    options: LintOptions,
    loader: MarkdownDocumentationLoader,
    enhancer: Box<dyn SchemaEnhancer + Send + Sync>,
}

impl DocumentationLinter {
    /// Creates a linter. Fails if the documentation directory does not exist.
    pub fn new(
        schema: SchemaView,
        docs_directory: impl Into<PathBuf>,
        options: LintOptions,
    ) -> AppResult<Self> {
        let docs_directory = docs_directory.into();
        let loader = MarkdownDocumentationLoader::new(LoaderConfig {
            recursive: options.recursive,
            general_docs_file: options.general_docs_file.clone(),
            ..LoaderConfig::new(docs_directory.clone())
        })?;
        let enhancer = OpenApiEnhancer::new(EnhancementConfig {
            base_url: options.base_url.clone(),
            ..EnhancementConfig::default()
        })
        .with_matcher(options.analyzer.matcher);
        Ok(Self {
            schema,
            docs_directory,
            options,
            loader,
            enhancer: Box::new(enhancer),
        })
    }

    /// Replaces the enhancer used by the enhancement check.
    pub fn with_enhancer(mut self, enhancer: Box<dyn SchemaEnhancer + Send + Sync>) -> Self {
        self.enhancer = enhancer;
        self
    }

    /// The documentation loader (and its cache).
    pub fn loader(&self) -> &MarkdownDocumentationLoader {
        &self.loader
    }

    /// Runs every check.
    pub fn lint(&self) -> AppResult<LintReport> {
        let analyzer = UnifiedEndpointAnalyzer::with_config(&self.schema, self.options.analyzer);
        let exclusions = &self.options.exclusions;
        let schema_keys =
            analyzer.extract_openapi_endpoints(|k| exclusions.should_exclude_endpoint(k));

        let data = self.loader.load_documentation()?;
        let docs: Vec<EndpointDocumentation> = data
            .endpoints
            .iter()
            .filter(|d| !exclusions.should_exclude_endpoint(&d.key()))
            .cloned()
            .collect();
        let doc_keys = analyzer.extract_documentation_endpoints(&docs);
        let matches = analyzer.match_endpoints(&schema_keys, &docs);

        let mut common_mistakes = Vec::new();
        let missing_documentation =
            self.missing_documentation(&analyzer, &matches, &doc_keys, &mut common_mistakes);
        let incomplete_documentation = self.incomplete_documentation(&analyzer, &matches);
        common_mistakes.extend(parameter_mismatches(&matches));
        let orphaned_documentation =
            classify_unmatched_docs(&schema_keys, &doc_keys, &matches, &mut common_mistakes);
        common_mistakes.extend(duplicates(&docs));
        let enhancement_failures = self.enhancement_failures(&analyzer, &matches, &data);
        let todo_entries = self.todo_entries()?;

        let matched = matches.iter().filter(|m| m.is_matched()).count();
        let coverage = if schema_keys.is_empty() {
            100.0
        } else {
            matched as f64 / schema_keys.len() as f64 * 100.0
        };
        let average_completeness = if incomplete_documentation.is_empty() {
            100.0
        } else {
            incomplete_documentation
                .iter()
                .map(|e| f64::from(e.completeness_score))
                .sum::<f64>()
                / incomplete_documentation.len() as f64
        };

        let counts = FindingCounts {
            missing: missing_documentation.len(),
            incomplete: incomplete_documentation.len(),
            mistakes: common_mistakes.len(),
            orphaned: orphaned_documentation.len(),
            enhancement_failures: enhancement_failures.len(),
            todos: todo_entries.len(),
        };
        let issues: IndexMap<String, usize> = [
            ("total_issues", counts.total_issues()),
            ("missing_documentation", counts.missing),
            ("incomplete_documentation", counts.incomplete),
            ("common_mistakes", counts.mistakes),
            ("orphaned_documentation", counts.orphaned),
            ("enhancement_failures", counts.enhancement_failures),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let statistics = LintStatistics {
            total_openapi_endpoints: schema_keys.len(),
            total_documented_endpoints: doc_keys.len(),
            documentation_coverage_percentage: round1(coverage),
            average_completeness_score: round1(average_completeness),
            issues,
        };
        let summary = build_summary(&counts, &statistics);
        let recommendations = build_recommendations(&counts, &statistics, &enhancement_failures);

        log::info!(
            "Linted {}: {} issue(s), {} coverage",
            self.docs_directory.display(),
            summary.total_issues,
            summary.coverage
        );

        Ok(LintReport {
            summary,
            statistics,
            missing_documentation,
            incomplete_documentation,
            common_mistakes,
            orphaned_documentation,
            enhancement_failures,
            todo_entries,
            recommendations,
        })
    }

    fn missing_documentation(
        &self,
        analyzer: &UnifiedEndpointAnalyzer<'_>,
        matches: &[EndpointMatch<'_>],
        doc_keys: &BTreeSet<EndpointKey>,
        mistakes: &mut Vec<CommonMistake>,
    ) -> Vec<MissingDocumentation> {
        let mut missing = Vec::new();
        for found in matches.iter().filter(|m| !m.is_matched()) {
            let sibling = doc_keys.iter().find(|k| {
                k.method != found.openapi_method && shapes_align(&k.path, &found.openapi_path)
            });
            if let Some(sibling) = sibling {
                mistakes.push(CommonMistake {
                    kind: MistakeKind::MissingMethodDocumentation,
                    severity: Severity::Error,
                    method: found.openapi_method,
                    path: found.openapi_path.clone(),
                    documented_path: (sibling.path != found.openapi_path)
                        .then(|| sibling.path.clone()),
                    message: format!(
                        "{} is in the schema but only other methods of this path are documented",
                        found.key()
                    ),
                    suggestion: format!(
                        "Add a '## {} {}' section next to the existing '{}' documentation",
                        found.openapi_method, found.openapi_path, sibling
                    ),
                });
                continue;
            }

            let operation = analyzer.get_openapi_operation(found.openapi_method, &found.openapi_path);
            let text = |field: &str| {
                operation
                    .and_then(|op| op.get(field))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            };
            missing.push(MissingDocumentation {
                method: found.openapi_method,
                path: found.openapi_path.clone(),
                summary: text("summary"),
                operation_id: text("operationId"),
                similar_documented_paths: analyzer.find_similar_paths(
                    &found.openapi_path,
                    doc_keys.iter().map(|k| k.path.as_str()),
                    SIMILAR_PATHS_LIMIT,
                ),
            });
        }
        missing
    }

    fn incomplete_documentation(
        &self,
        analyzer: &UnifiedEndpointAnalyzer<'_>,
        matches: &[EndpointMatch<'_>],
    ) -> Vec<IncompleteDocumentation> {
        matches
            .iter()
            .filter_map(|found| {
                let doc = found.endpoint_doc?;
                let analysis = analyzer.analyze_match(found)?;
                let incomplete = !analysis.quality_issues.is_empty()
                    || analysis.completeness_score < self.options.completeness_threshold;
                incomplete.then(|| IncompleteDocumentation {
                    method: found.openapi_method,
                    path: found.openapi_path.clone(),
                    suggestions: suggestions(doc, &analysis, analyzer.config()),
                    issues: analysis.quality_issues,
                    missing_elements: analysis.missing_elements,
                    completeness_score: analysis.completeness_score,
                })
            })
            .collect()
    }

    fn enhancement_failures(
        &self,
        analyzer: &UnifiedEndpointAnalyzer<'_>,
        matches: &[EndpointMatch<'_>],
        data: &DocumentationData,
    ) -> Vec<EnhancementFailure> {
        let enhanced = match self.enhancer.enhance(self.schema.as_value(), data) {
            Ok(enhanced) => enhanced,
            Err(e) => {
                return vec![EnhancementFailure {
                    kind: "enhancement_process_error".to_string(),
                    severity: Severity::Critical,
                    method: None,
                    path: None,
                    message: format!("Enhancement process failed: {}", e),
                }]
            }
        };

        matches
            .iter()
            .filter_map(|found| {
                let documented = found
                    .endpoint_doc?
                    .description
                    .as_deref()
                    .filter(|d| !d.trim().is_empty())?;
                let original = analyzer
                    .get_openapi_operation(found.openapi_method, &found.openapi_path)
                    .and_then(|op| op.get("description"))
                    .and_then(Value::as_str);
                let after = enhanced
                    .get("paths")
                    .and_then(|p| p.get(&found.openapi_path))
                    .and_then(|item| item.get(found.openapi_method.schema_key()))
                    .and_then(|op| op.get("description"))
                    .and_then(Value::as_str);
                let unchanged = original.map(str::trim) != Some(documented.trim())
                    && after.map(str::trim) == original.map(str::trim);
                unchanged.then(|| EnhancementFailure {
                    kind: "description_not_enhanced".to_string(),
                    severity: Severity::Error,
                    method: Some(found.openapi_method),
                    path: Some(found.openapi_path.clone()),
                    message: format!(
                        "Documented description of {} was not applied by the enhancer",
                        found.key()
                    ),
                })
            })
            .collect()
    }

    fn todo_entries(&self) -> AppResult<Vec<TodoEntry>> {
        let mut entries = Vec::new();
        for file in self.loader.markdown_files()? {
            let text = self.loader.read_file(&file)?;
            let label = relative_label(&self.docs_directory, &file);
            entries.extend(todo::scan_todos(&text, &label));
        }
        Ok(entries)
    }
}

/// Lints `doc_directory` against `schema`.
pub fn lint(schema: &Value, doc_directory: &Path, options: LintOptions) -> AppResult<LintReport> {
    let schema = SchemaView::from_value(schema.clone())?;
    DocumentationLinter::new(schema, doc_directory, options)?.lint()
}

fn relative_label(root: &Path, file: &Path) -> String {
    file.strip_prefix(root)
        .unwrap_or(file)
        .to_string_lossy()
        .replace('\\', "/")
}

fn suggestions(
    doc: &EndpointDocumentation,
    analysis: &EndpointAnalysis,
    config: &AnalyzerConfig,
) -> Vec<String> {
    let weights = &config.weights;
    let mut out: Vec<String> = analysis
        .missing_elements
        .iter()
        .map(|element| match element {
            MissingElement::Summary => {
                "Add a one-line summary as the first paragraph under the endpoint heading".to_string()
            }
            MissingElement::Description => format!(
                "Add a description of at least {} characters explaining what the endpoint does",
                weights.min_description_length
            ),
            MissingElement::CodeSamples => {
                "Add a '### Code Examples' section with fenced samples (e.g. ```bash)".to_string()
            }
            MissingElement::ResponseExamples => {
                "Add a '### Response Examples' section with at least one fenced response body"
                    .to_string()
            }
            MissingElement::Parameters => {
                "Document the path parameters in a '### Parameters' section: - `id` (string, required): ..."
                    .to_string()
            }
        })
        .collect();

    let short = |text: &Option<String>, min: usize| {
        text.as_deref()
            .map(|t| t.trim().chars().count())
            .is_some_and(|n| n > 0 && n < min)
    };
    if short(&doc.summary, weights.min_summary_length) {
        out.push(format!(
            "Expand the summary to at least {} characters",
            weights.min_summary_length
        ));
    }
    if short(&doc.description, weights.min_description_length) {
        out.push(format!(
            "Expand the description to at least {} characters",
            weights.min_description_length
        ));
    }
    if doc.response_examples.len() == 1 {
        out.push("Add response examples for error cases (e.g. 400, 404)".to_string());
    }
    out
}

fn parameter_mismatches(matches: &[EndpointMatch<'_>]) -> Vec<CommonMistake> {
    matches
        .iter()
        .filter(|m| m.match_type == MatchType::ParameterMismatch)
        .filter_map(|m| {
            let doc = m.endpoint_doc?;
            Some(CommonMistake {
                kind: MistakeKind::PathParameterMismatch,
                severity: Severity::Warning,
                method: m.openapi_method,
                path: m.openapi_path.clone(),
                documented_path: Some(doc.path().to_string()),
                message: format!(
                    "Path parameters differ: documented as '{}', schema uses '{}'",
                    doc.path(),
                    m.openapi_path
                ),
                suggestion: format!(
                    "Rename the heading to '{} {}'",
                    m.openapi_method, m.openapi_path
                ),
            })
        })
        .collect()
}

/// Sorts documented keys no schema operation chose into extra-method
/// mistakes, shadowed variants, and orphans.
fn classify_unmatched_docs(
    schema_keys: &BTreeSet<EndpointKey>,
    doc_keys: &BTreeSet<EndpointKey>,
    matches: &[EndpointMatch<'_>],
    mistakes: &mut Vec<CommonMistake>,
) -> Vec<OrphanedDocumentation> {
    let used: BTreeSet<EndpointKey> = matches
        .iter()
        .filter_map(|m| m.endpoint_doc.map(EndpointDocumentation::key))
        .collect();
    let aligned = |key: &EndpointKey| {
        schema_keys
            .iter()
            .filter(|s| {
                normalize_path(&s.path) == normalize_path(&key.path)
                    || shapes_align(&s.path, &key.path)
            })
            .cloned()
            .collect::<Vec<_>>()
    };

    let mut orphaned = Vec::new();
    for key in doc_keys.difference(&used) {
        let candidates = aligned(key);
        if let Some(winner) = candidates.iter().find(|s| s.method == key.method) {
            mistakes.push(CommonMistake {
                kind: MistakeKind::DuplicateDocumentation,
                severity: Severity::Warning,
                method: key.method,
                path: winner.path.clone(),
                documented_path: Some(key.path.clone()),
                message: format!(
                    "{} is documented again under a different parameter spelling",
                    winner
                ),
                suggestion: format!("Merge the '{}' section into '{}'", key, winner),
            });
        } else if let Some(schema_key) = candidates.first() {
            mistakes.push(CommonMistake {
                kind: MistakeKind::ExtraMethodDocumentation,
                severity: Severity::Warning,
                method: key.method,
                path: key.path.clone(),
                documented_path: None,
                message: format!(
                    "{} is documented but the schema has no {} operation for '{}'",
                    key, key.method, schema_key.path
                ),
                suggestion: format!(
                    "Remove the section or add {} {} to the schema",
                    key.method, schema_key.path
                ),
            });
        } else {
            orphaned.push(OrphanedDocumentation {
                method: key.method,
                path: key.path.clone(),
                message: format!("{} is documented but does not exist in the schema", key),
                suggestion: "Remove the section or add the endpoint to the schema".to_string(),
            });
        }
    }
    orphaned
}

fn duplicates(docs: &[EndpointDocumentation]) -> Vec<CommonMistake> {
    let mut counts: BTreeMap<EndpointKey, usize> = BTreeMap::new();
    for doc in docs {
        *counts.entry(doc.key()).or_default() += 1;
    }
    counts
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(key, n)| CommonMistake {
            kind: MistakeKind::DuplicateDocumentation,
            severity: Severity::Warning,
            method: key.method,
            path: key.path.clone(),
            documented_path: None,
            message: format!("{} is documented {} times", key, n),
            suggestion: "Keep a single section per endpoint; the most complete one is used"
                .to_string(),
        })
        .collect()
}
