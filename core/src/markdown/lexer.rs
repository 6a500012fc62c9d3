#![deny(missing_docs)]

//! # Markdown Lexer
//!
//! Two passes over a markdown body:
//!
//! 1. [`lex`] classifies every line (heading, fence, code, text, blank), pairing
//!    code fences so that `#` comments inside code blocks are never mistaken for
//!    headings.
//! 2. [`outline`] slices the classified lines into endpoint sections.
//!
//! The endpoint heading rules (verb set, path shape) live in [`endpoint_heading`]
//! and are built from [`HttpMethod::ALL`].

use crate::models::{HttpMethod, IssueKind, ValidationIssue};
use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;

/// Classification of one markdown line.
#[derive(Debug, Clone, PartialEq)]
pub enum LineKind<'a> {
    /// ATX heading (`## Title`).
    Heading {
        /// Number of `#` characters (1-6).
        level: usize,
        /// Heading text with the markers stripped.
        text: &'a str,
    },
    /// Opening code fence.
    FenceOpen {
        /// Info string (first word after the backticks), possibly empty.
        info: &'a str,
        /// Whether a matching closing fence exists.
        terminated: bool,
    },
    /// Closing code fence.
    FenceClose,
    /// A line inside a code block.
    Code(&'a str),
    /// Non-blank prose.
    Text(&'a str),
    /// Blank line.
    Blank,
}

/// A classified line with its 1-based line number in the source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Line<'a> {
    /// 1-based line number.
    pub number: usize,
    /// Classification.
    pub kind: LineKind<'a>,
}

/// A heading that opens an endpoint section.
#[derive(Debug, Clone, PartialEq)]
pub struct Section<'a> {
    /// HTTP verb from the heading.
    pub method: HttpMethod,
    /// Path from the heading.
    pub path: &'a str,
    /// Heading level.
    pub level: usize,
    /// Line number of the heading.
    pub heading_line: usize,
    /// Lines belonging to the section, heading excluded.
    pub body: &'a [Line<'a>],
}

/// Endpoint sections plus the index ranges of lines outside any section.
#[derive(Debug, Clone, PartialEq)]
pub struct Outline<'a> {
    /// Endpoint sections in document order.
    pub sections: Vec<Section<'a>>,
    /// Line index ranges not covered by a section.
    pub outside: Vec<Range<usize>>,
}

fn heading_re() -> &'static Regex {
    static HEADING_RE: OnceLock<Regex> = OnceLock::new();
    HEADING_RE
        .get_or_init(|| Regex::new(r"^(#{1,6})\s+(.*?)(?:\s+#+)?\s*$").expect("Invalid regex"))
}

fn fence_re() -> &'static Regex {
    static FENCE_RE: OnceLock<Regex> = OnceLock::new();
    FENCE_RE.get_or_init(|| Regex::new(r"^\s{0,3}(`{3,}|~{3,})\s*([^`\s]*)").expect("Invalid regex"))
}

fn endpoint_re() -> &'static Regex {
    static ENDPOINT_RE: OnceLock<Regex> = OnceLock::new();
    ENDPOINT_RE.get_or_init(|| {
        let verbs: Vec<&str> = HttpMethod::ALL.iter().map(HttpMethod::as_str).collect();
        Regex::new(&format!(r"^({})\s+(/\S*)$", verbs.join("|"))).expect("Invalid regex")
    })
}

fn endpoint_like_re() -> &'static Regex {
    static ENDPOINT_LIKE_RE: OnceLock<Regex> = OnceLock::new();
    ENDPOINT_LIKE_RE
        .get_or_init(|| Regex::new(r"^([A-Za-z_]+)(?:\s+(/\S*))?\s*$").expect("Invalid regex"))
}

/// Parses a heading line into `(level, text)`.
pub fn parse_heading(line: &str) -> Option<(usize, &str)> {
    let caps = heading_re().captures(line)?;
    let level = caps.get(1)?.as_str().len();
    let text = caps.get(2).map_or("", |m| m.as_str());
    Some((level, text))
}

/// Parses heading text of the form `METHOD /path`.
pub fn endpoint_heading(text: &str) -> Option<(HttpMethod, &str)> {
    let caps = endpoint_re().captures(text.trim())?;
    let method = caps.get(1)?.as_str().parse().ok()?;
    Some((method, caps.get(2)?.as_str()))
}

/// Explains why a heading that resembles an endpoint heading was rejected.
///
/// Returns `None` for ordinary headings (`Overview`, `Request Body`) and for
/// valid endpoint headings.
pub fn rejected_endpoint_heading(text: &str) -> Option<String> {
    let text = text.trim();
    if endpoint_heading(text).is_some() {
        return None;
    }
    let caps = endpoint_like_re().captures(text)?;
    let word = caps.get(1)?.as_str();
    let path = caps.get(2).map(|m| m.as_str());
    let upper = word.to_ascii_uppercase();
    let is_verb = upper.parse::<HttpMethod>().is_ok();
    match path {
        Some(path) if is_verb => Some(format!(
            "HTTP method '{}' must be uppercase ('{} {}')",
            word, upper, path
        )),
        Some(_) if word == upper => Some(format!("Invalid HTTP method '{}'", word)),
        None if word == upper && is_verb => {
            Some(format!("Endpoint heading '{}' is missing a path", word))
        }
        _ => None,
    }
}

fn fence_open(line: &str) -> Option<(char, usize, &str)> {
    let caps = fence_re().captures(line)?;
    let marker = caps.get(1)?.as_str();
    let first = marker.chars().next()?;
    let info = caps.get(2).map_or("", |m| m.as_str());
    Some((first, marker.len(), info))
}

fn is_fence_close(line: &str, marker: char, len: usize) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= len && trimmed.chars().all(|c| c == marker)
}

fn is_endpoint_heading_line(line: &str) -> bool {
    parse_heading(line).is_some_and(|(_, text)| endpoint_heading(text).is_some())
}

/// Classifies every line of `text`. `first_line` is the 1-based number of the
/// first line (non-zero when a frontmatter block was stripped).
///
/// A fence is terminated only when its closing marker appears before the next
/// endpoint heading. An unterminated fence closes implicitly at the next heading.
pub fn lex(text: &str, first_line: usize) -> Vec<Line<'_>> {
    let raw: Vec<&str> = text.lines().collect();
    let mut lines = Vec::with_capacity(raw.len());
    let mut i = 0;

    while i < raw.len() {
        let line = raw[i];
        let number = first_line + i;

        if let Some((marker, len, info)) = fence_open(line) {
            let close = raw[i + 1..]
                .iter()
                .take_while(|l| !is_endpoint_heading_line(l))
                .position(|l| is_fence_close(l, marker, len))
                .map(|offset| i + 1 + offset);

            let end = match close {
                Some(j) => j,
                None => (i + 1..raw.len())
                    .find(|&j| parse_heading(raw[j]).is_some())
                    .unwrap_or(raw.len()),
            };

            lines.push(Line {
                number,
                kind: LineKind::FenceOpen {
                    info,
                    terminated: close.is_some(),
                },
            });
            for (k, &code) in raw.iter().enumerate().take(end).skip(i + 1) {
                lines.push(Line {
                    number: first_line + k,
                    kind: LineKind::Code(code),
                });
            }
            if let Some(j) = close {
                lines.push(Line {
                    number: first_line + j,
                    kind: LineKind::FenceClose,
                });
                i = j + 1;
            } else {
                i = end;
            }
            continue;
        }

        let kind = if let Some((level, text)) = parse_heading(line) {
            LineKind::Heading { level, text }
        } else if line.trim().is_empty() {
            LineKind::Blank
        } else {
            LineKind::Text(line)
        };
        lines.push(Line { number, kind });
        i += 1;
    }

    lines
}

/// Slices lexed lines into endpoint sections.
///
/// A section runs from its heading to the next endpoint heading (any level) or
/// the next other heading of equal or shallower level.
pub fn outline<'a>(lines: &'a [Line<'a>]) -> Outline<'a> {
    let mut sections = Vec::new();
    let mut outside = Vec::new();
    let mut outside_start = 0;
    let mut i = 0;

    while i < lines.len() {
        let opened = match &lines[i].kind {
            LineKind::Heading { level, text } => {
                endpoint_heading(*text).map(|(m, p)| (*level, m, p))
            }
            _ => None,
        };
        let Some((level, method, path)) = opened else {
            i += 1;
            continue;
        };

        if outside_start < i {
            outside.push(outside_start..i);
        }

        let end = (i + 1..lines.len())
            .find(|&j| match &lines[j].kind {
                LineKind::Heading { level: l, text } => {
                    *l <= level || endpoint_heading(text).is_some()
                }
                _ => false,
            })
            .unwrap_or(lines.len());

        sections.push(Section {
            method,
            path,
            level,
            heading_line: lines[i].number,
            body: &lines[i + 1..end],
        });

        i = end;
        outside_start = end;
    }

    if outside_start < lines.len() {
        outside.push(outside_start..lines.len());
    }

    Outline { sections, outside }
}

/// Issues for rejected endpoint-like headings and unterminated fences.
pub fn structural_issues(lines: &[Line<'_>]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for line in lines {
        match &line.kind {
            LineKind::Heading { text, .. } => {
                if let Some(message) = rejected_endpoint_heading(text) {
                    issues.push(ValidationIssue {
                        file_path: None,
                        line_number: Some(line.number),
                        error_type: IssueKind::InvalidEndpointHeading,
                        message,
                        suggestion: Some(
                            "Use the form '## METHOD /path' with an uppercase HTTP verb"
                                .to_string(),
                        ),
                    });
                }
            }
            LineKind::FenceOpen {
                terminated: false, ..
            } => issues.push(ValidationIssue {
                file_path: None,
                line_number: Some(line.number),
                error_type: IssueKind::UnterminatedCodeFence,
                message: "Code block is never closed".to_string(),
                suggestion: Some("Add a closing ``` line after the code".to_string()),
            }),
            _ => {}
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_heading() {
        assert_eq!(parse_heading("## GET /users"), Some((2, "GET /users")));
        assert_eq!(parse_heading("#### C#"), Some((4, "C#")));
        assert_eq!(parse_heading("### Title ###"), Some((3, "Title")));
        assert_eq!(parse_heading("#comment"), None);
        assert_eq!(parse_heading("####### too deep"), None);
    }

    #[test]
    fn test_endpoint_heading_rules() {
        assert_eq!(
            endpoint_heading("GET /users/{id}"),
            Some((HttpMethod::Get, "/users/{id}"))
        );
        assert_eq!(endpoint_heading("OPTIONS /"), Some((HttpMethod::Options, "/")));
        assert_eq!(endpoint_heading("Get /users"), None);
        assert_eq!(endpoint_heading("GET"), None);
        assert_eq!(endpoint_heading("GET users"), None);
        assert_eq!(endpoint_heading("INVALID_METHOD /api/test"), None);
    }

    #[test]
    fn test_rejected_heading_reasons() {
        assert!(rejected_endpoint_heading("INVALID_METHOD /api/test").is_some());
        assert!(rejected_endpoint_heading("GET").is_some());
        assert!(rejected_endpoint_heading("Get /users").is_some());
        assert_eq!(rejected_endpoint_heading("Overview"), None);
        assert_eq!(rejected_endpoint_heading("Request Body"), None);
        assert_eq!(rejected_endpoint_heading("GET /ok"), None);
    }

    #[test]
    fn test_comments_inside_fences_are_code() {
        let text = "## GET /a\n```python\n# not a heading\nprint(1)\n```\ntext";
        let lines = lex(text, 1);
        assert_eq!(
            lines[1].kind,
            LineKind::FenceOpen {
                info: "python",
                terminated: true
            }
        );
        assert_eq!(lines[2].kind, LineKind::Code("# not a heading"));
        assert_eq!(lines[4].kind, LineKind::FenceClose);
        assert_eq!(lines[5], Line { number: 6, kind: LineKind::Text("text") });
    }

    #[test]
    fn test_unterminated_fence_closes_at_next_heading() {
        let text = "## GET /broken\n```python\nimport requests\n\n## POST /another\nBody";
        let lines = lex(text, 1);
        assert_eq!(
            lines[1].kind,
            LineKind::FenceOpen {
                info: "python",
                terminated: false
            }
        );
        assert_eq!(
            lines[4].kind,
            LineKind::Heading {
                level: 2,
                text: "POST /another"
            }
        );

        let outline = outline(&lines);
        assert_eq!(outline.sections.len(), 2);
        assert_eq!(outline.sections[1].path, "/another");
        assert_eq!(structural_issues(&lines).len(), 1);
    }

    #[test]
    fn test_fence_close_does_not_cross_endpoint_headings() {
        let text = "## GET /a\n```\nbroken\n## GET /b\n```bash\ncurl /b\n```";
        let lines = lex(text, 1);
        let outline = outline(&lines);
        assert_eq!(outline.sections.len(), 2);
        assert!(outline.sections[1]
            .body
            .iter()
            .any(|l| l.kind == LineKind::Code("curl /b")));
    }

    #[test]
    fn test_sections_are_level_bounded() {
        let text = "# API\nintro\n## GET /a\nA\n### Details\nmore\n## Other\nskip\n## POST /b\nB";
        let lines = lex(text, 10);
        let outline = outline(&lines);

        assert_eq!(outline.sections.len(), 2);
        let first = &outline.sections[0];
        assert_eq!(first.heading_line, 12);
        assert_eq!(first.body.len(), 3);
        assert_eq!(outline.outside, vec![0..2, 6..8]);
    }

    #[test]
    fn test_nested_endpoint_heading_starts_new_section() {
        let text = "## GET /a\nA\n### GET /a/b\nB";
        let lines = lex(text, 1);
        let outline = outline(&lines);
        assert_eq!(outline.sections.len(), 2);
        assert_eq!(outline.sections[0].body.len(), 1);
    }
}
