#![deny(missing_docs)]

//! # Markdocs Core
//!
//! Reconciles an OpenAPI schema with hand-written markdown documentation.
//!
//! Markdown text flows through the extractor and loader into
//! [`DocumentationData`], is matched against a schema by the analyzer, and is
//! either reported on by the linter or merged into the schema by the enhancer.

/// Shared error types.
pub mod error;

/// Documentation data model.
pub mod models;

/// Content-type detection for response bodies.
pub mod content_type;

/// Markdown endpoint extraction.
pub mod markdown;

/// Documentation directory loading and caching.
pub mod loader;

/// Read-only OpenAPI schema access.
pub mod schema;

/// Endpoint matching and completeness scoring.
pub mod analyzer;

/// Code sample generation.
pub mod samples;

/// Schema enhancement.
pub mod enhancer;

/// Documentation linting.
pub mod lint;

pub use analyzer::matching::{MatchType, MatcherConfig};
pub use analyzer::scoring::{CompletenessWeights, EndpointAnalysis, MissingElement};
pub use analyzer::{extract_openapi_endpoints, AnalyzerConfig, EndpointMatch, UnifiedEndpointAnalyzer};
pub use content_type::{classify_and_parse, detect_content_type, Classified};
pub use enhancer::{
    build_info_description, enhance_openapi_with_docs, ApiLink, EnhancementConfig,
    EnhancementStats, OpenApiEnhancer, SchemaEnhancer,
};
pub use error::{AppError, AppResult};
pub use lint::config::{find_config_file, ExclusionRule, ExclusionSet, LinterConfig, OutputFormat};
pub use lint::report::LintReport;
pub use lint::{lint, DocumentationLinter, LintOptions};
pub use loader::{LoaderConfig, MarkdownDocumentationLoader, TextEncoding};
pub use markdown::{extract_endpoints, Extraction, MarkdownExtractor};
pub use models::{
    CodeLanguage, CodeSample, DocumentationData, DocumentationStats, EndpointDocumentation,
    EndpointKey, HttpMethod, IssueKind, ParameterDocumentation, ResponseExample, ValidationIssue,
};
pub use samples::{CodeSampleGenerator, SampleRequest, TemplateSampleGenerator};
pub use schema::{SchemaOperation, SchemaView};
