#![deny(missing_docs)]

//! # Markdown Endpoint Extraction
//!
//! - **frontmatter**: Leading `---` YAML block.
//! - **lexer**: Line classification and endpoint section slicing.
//! - **sections**: Per-section field extraction.

pub mod frontmatter;
pub mod lexer;
pub mod sections;

use crate::models::{CodeLanguage, CodeSample, EndpointDocumentation, ValidationIssue};
use indexmap::IndexMap;
use serde_json::Value;

pub use frontmatter::{split_frontmatter, Frontmatter};
pub use lexer::{endpoint_heading, lex, outline, Line, LineKind, Outline, Section};

/// Everything extracted from one markdown document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    /// One record per endpoint heading, in document order. Duplicates are kept.
    pub endpoints: Vec<EndpointDocumentation>,
    /// Code samples outside any endpoint section.
    pub global_examples: Vec<CodeSample>,
    /// Frontmatter key/values.
    pub metadata: IndexMap<String, Value>,
    /// Overview text keyed by the tags it describes.
    pub tag_descriptions: IndexMap<String, String>,
    /// Recovered anomalies.
    pub issues: Vec<ValidationIssue>,
}

/// Extracts endpoint documentation from markdown text.
#[derive(Debug, Clone)]
pub struct MarkdownExtractor {
    supported_languages: Vec<CodeLanguage>,
}

impl Default for MarkdownExtractor {
    fn default() -> Self {
        Self::new(CodeLanguage::ALL.to_vec())
    }
}

impl MarkdownExtractor {
    /// Creates an extractor keeping only code samples in `supported_languages`.
    pub fn new(supported_languages: Vec<CodeLanguage>) -> Self {
        Self {
            supported_languages,
        }
    }

    /// Extracts every endpoint section of `text`. Never fails: malformed
    /// fragments are skipped and reported in [`Extraction::issues`].
    pub fn extract(&self, text: &str) -> Extraction {
        let front = split_frontmatter(text);
        let lines = lex(front.body, front.body_first_line);
        let outline = outline(&lines);

        let mut issues: Vec<ValidationIssue> = front.issue.into_iter().collect();
        issues.extend(lexer::structural_issues(&lines));

        let mut endpoints = Vec::with_capacity(outline.sections.len());
        for section in &outline.sections {
            match sections::build_endpoint(section, &self.supported_languages) {
                Ok((doc, section_issues)) => {
                    endpoints.push(doc);
                    issues.extend(section_issues);
                }
                Err(e) => log::warn!("Skipping section at line {}: {}", section.heading_line, e),
            }
        }

        let global_examples =
            sections::global_examples(&lines, &outline.outside, &self.supported_languages);
        let tag_descriptions = match sections::overview_text(&lines, &outline.outside) {
            Some(text) => overview_tags(&endpoints)
                .into_iter()
                .map(|tag| (tag, text.clone()))
                .collect(),
            None => IndexMap::new(),
        };

        Extraction {
            endpoints,
            global_examples,
            metadata: front.metadata,
            tag_descriptions,
            issues,
        }
    }
}

/// Tags a file-level overview describes: those carried by every tagged
/// endpoint of the file, else the first tag found.
fn overview_tags(endpoints: &[EndpointDocumentation]) -> Vec<String> {
    let mut tagged = endpoints.iter().filter(|e| !e.tags.is_empty());
    let Some(first) = tagged.next() else {
        return Vec::new();
    };
    let shared: Vec<String> = first
        .tags
        .iter()
        .filter(|tag| tagged.clone().all(|e| e.tags.contains(*tag)))
        .cloned()
        .collect();
    if shared.is_empty() {
        first.tags.iter().take(1).cloned().collect()
    } else {
        shared
    }
}

/// Extracts endpoints with every language supported.
pub fn extract_endpoints(text: &str) -> Vec<EndpointDocumentation> {
    MarkdownExtractor::default().extract(text).endpoints
}
