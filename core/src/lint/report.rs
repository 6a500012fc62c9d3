//! Lint report structure.
//!
//! Field names are serialized verbatim; the text and JSON renderers key off
//! them.

use crate::analyzer::scoring::MissingElement;
use crate::models::HttpMethod;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// Overall documentation health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryStatus {
    /// At most a handful of issues.
    Good,
    /// Moderate number of issues.
    NeedsImprovement,
    /// Many issues.
    Poor,
}

impl SummaryStatus {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryStatus::Good => "good",
            SummaryStatus::NeedsImprovement => "needs_improvement",
            SummaryStatus::Poor => "poor",
        }
    }
}

/// Severity of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks the documentation pipeline.
    Critical,
    /// Documentation is wrong.
    Error,
    /// Documentation is likely wrong.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Critical => "critical",
            Severity::Error => "error",
            Severity::Warning => "warning",
        })
    }
}

/// Recommendation priority. Declaration order is the sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Fix first.
    Critical,
    /// Fix soon.
    High,
    /// Worth fixing.
    Medium,
    /// Nice to have.
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        })
    }
}

/// Report headline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LintSummary {
    /// Health tier.
    pub status: SummaryStatus,
    /// One-line verdict.
    pub message: String,
    /// Findings excluding TODO markers.
    pub total_issues: usize,
    /// TODO markers found.
    pub todo_count: usize,
    /// Coverage, e.g. `"87.5%"`.
    pub coverage: String,
    /// Average completeness, e.g. `"92.0%"`.
    pub completeness: String,
}

/// Counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LintStatistics {
    /// Schema operations after exclusions.
    pub total_openapi_endpoints: usize,
    /// Distinct documented keys after exclusions.
    pub total_documented_endpoints: usize,
    /// Matched schema operations, as a percentage.
    pub documentation_coverage_percentage: f64,
    /// Mean score of incomplete entries, 100 when there are none.
    pub average_completeness_score: f64,
    /// `total_issues` followed by the finding count of each report section.
    pub issues: IndexMap<String, usize>,
}

/// A schema operation without documentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingDocumentation {
    /// HTTP verb.
    pub method: HttpMethod,
    /// Schema path.
    pub path: String,
    /// Schema summary, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Schema `operationId`, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    /// Documented paths that look alike.
    pub similar_documented_paths: Vec<String>,
}

/// A matched endpoint whose documentation is thin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncompleteDocumentation {
    /// HTTP verb.
    pub method: HttpMethod,
    /// Schema path.
    pub path: String,
    /// Quality issues.
    pub issues: Vec<String>,
    /// Absent elements.
    pub missing_elements: Vec<MissingElement>,
    /// Score in `0..=100`.
    pub completeness_score: u32,
    /// How to fix each issue.
    pub suggestions: Vec<String>,
}

/// Authoring mistake categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MistakeKind {
    /// Placeholder names differ between schema and docs.
    PathParameterMismatch,
    /// Method documented for a path that lacks it in the schema.
    ExtraMethodDocumentation,
    /// Schema method undocumented while siblings on the path are.
    MissingMethodDocumentation,
    /// Endpoint documented more than once.
    DuplicateDocumentation,
}

impl MistakeKind {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            MistakeKind::PathParameterMismatch => "path_parameter_mismatch",
            MistakeKind::ExtraMethodDocumentation => "extra_method_documentation",
            MistakeKind::MissingMethodDocumentation => "missing_method_documentation",
            MistakeKind::DuplicateDocumentation => "duplicate_documentation",
        }
    }
}

/// An authoring mistake.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommonMistake {
    /// Category.
    #[serde(rename = "type")]
    pub kind: MistakeKind,
    /// Severity.
    pub severity: Severity,
    /// HTTP verb.
    pub method: HttpMethod,
    /// Path as written in the schema (or the docs when the schema lacks it).
    pub path: String,
    /// Path as written in the docs, when it differs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documented_path: Option<String>,
    /// What is wrong.
    pub message: String,
    /// How to fix it.
    pub suggestion: String,
}

/// Documentation for an endpoint the schema does not have.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrphanedDocumentation {
    /// HTTP verb.
    pub method: HttpMethod,
    /// Documented path.
    pub path: String,
    /// What is wrong.
    pub message: String,
    /// How to fix it.
    pub suggestion: String,
}

/// The enhancer failed or left a documented description unused.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnhancementFailure {
    /// `enhancement_process_error` or `description_not_enhanced`.
    #[serde(rename = "type")]
    pub kind: String,
    /// `critical` when the enhancer failed, `error` otherwise.
    pub severity: Severity,
    /// HTTP verb, when tied to one endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<HttpMethod>,
    /// Path, when tied to one endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// What happened.
    pub message: String,
}

/// A TODO marker in a markdown file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodoEntry {
    /// File, relative to the documentation directory.
    pub file: String,
    /// 1-based line number.
    pub line: usize,
    /// The whole line, trimmed.
    pub content: String,
    /// Text after the marker.
    pub todo_text: String,
    /// `in endpoint METHOD /path` or `in general documentation`.
    pub context: String,
}

/// A prioritized action item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    /// Priority.
    pub priority: Priority,
    /// Report section it addresses.
    pub category: String,
    /// Short title.
    pub title: String,
    /// Details.
    pub description: String,
    /// Concrete next step.
    pub action: String,
}

/// Result of one lint run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LintReport {
    /// Headline.
    pub summary: LintSummary,
    /// Counters.
    pub statistics: LintStatistics,
    /// Schema operations without documentation.
    pub missing_documentation: Vec<MissingDocumentation>,
    /// Thin documentation.
    pub incomplete_documentation: Vec<IncompleteDocumentation>,
    /// Authoring mistakes.
    pub common_mistakes: Vec<CommonMistake>,
    /// Documentation without a schema operation.
    pub orphaned_documentation: Vec<OrphanedDocumentation>,
    /// Enhancer problems.
    pub enhancement_failures: Vec<EnhancementFailure>,
    /// TODO markers.
    pub todo_entries: Vec<TodoEntry>,
    /// Action items, highest priority first.
    pub recommendations: Vec<Recommendation>,
}

impl LintReport {
    /// Whether anything other than TODO markers was found.
    pub fn has_issues(&self) -> bool {
        self.summary.total_issues > 0
    }
}
