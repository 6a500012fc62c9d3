#![deny(missing_docs)]

//! # Frontmatter
//!
//! Splits a leading `---` delimited YAML block from a markdown document.

use crate::models::{IssueKind, ValidationIssue};
use indexmap::IndexMap;
use serde_json::Value;

/// A document with its frontmatter separated.
#[derive(Debug, Clone, PartialEq)]
pub struct Frontmatter<'a> {
    /// Parsed key/values. Empty when absent or malformed.
    pub metadata: IndexMap<String, Value>,
    /// The text after the closing delimiter.
    pub body: &'a str,
    /// 1-based line number of the first body line.
    pub body_first_line: usize,
    /// Set when the block exists but is not a YAML mapping.
    pub issue: Option<ValidationIssue>,
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == "---"
}

/// Splits `text` into frontmatter and body.
///
/// The opening `---` must be the very first line. Without a closing delimiter
/// the whole text is body.
pub fn split_frontmatter(text: &str) -> Frontmatter<'_> {
    let untouched = Frontmatter {
        metadata: IndexMap::new(),
        body: text,
        body_first_line: 1,
        issue: None,
    };

    let mut chunks = text.split_inclusive('\n');
    match chunks.next() {
        Some(first) if is_delimiter(first) => {}
        _ => return untouched,
    }

    let mut offset = text.split_inclusive('\n').next().map_or(0, str::len);
    let block_start = offset;
    for (idx, chunk) in chunks.enumerate() {
        if is_delimiter(chunk) {
            let block = &text[block_start..offset];
            let body = &text[offset + chunk.len()..];
            // Delimiter line + block lines + closing delimiter.
            let body_first_line = idx + 3;
            let (metadata, issue) = parse_block(block);
            return Frontmatter {
                metadata,
                body,
                body_first_line,
                issue,
            };
        }
        offset += chunk.len();
    }

    untouched
}

fn parse_block(block: &str) -> (IndexMap<String, Value>, Option<ValidationIssue>) {
    if block.trim().is_empty() {
        return (IndexMap::new(), None);
    }
    match serde_yaml::from_str::<IndexMap<String, Value>>(block) {
        Ok(map) => (map, None),
        Err(e) => {
            log::warn!("Ignoring malformed frontmatter: {}", e);
            let issue = ValidationIssue {
                file_path: None,
                line_number: Some(2),
                error_type: IssueKind::InvalidFrontmatter,
                message: format!("Frontmatter is not a YAML mapping: {}", e),
                suggestion: Some("Use 'key: value' lines between the '---' delimiters".into()),
            };
            (IndexMap::new(), Some(issue))
        }
    }
}
