#![deny(missing_docs)]

//! # Section Fields
//!
//! Turns one endpoint [`Section`] into an [`EndpointDocumentation`].
//!
//! The section body is walked once. Sub-headings switch the current
//! subsection (`Parameters`, `Response Examples`, `Code Examples`, ...) and
//! each line is routed according to it. Headings nested deeper than the current
//! subsection only label what follows (`#### cURL`, `#### 404 Not Found`).

use super::lexer::{Line, LineKind, Section};
use crate::error::AppResult;
use crate::models::{
    CodeLanguage, CodeSample, EndpointDocumentation, IssueKind, ParameterDocumentation,
    ResponseExample, ValidationIssue,
};
use regex::Regex;
use serde_json::Value;
use std::ops::Range;
use std::sync::OnceLock;

/// Role of the subsection a line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subsection {
    /// Directly under the endpoint heading.
    Top,
    /// `Description` / `Overview`.
    Description,
    /// `Parameters` and its variants.
    Parameters,
    /// `Response Examples`.
    Responses,
    /// `Code Examples`.
    CodeExamples,
    /// Anything else (`Request Body`, `Authentication`...). Prose only.
    Other,
}

/// Maps a sub-heading to its subsection role.
pub fn classify_subsection(heading: &str) -> Subsection {
    let normalized = heading.trim().trim_end_matches(':').to_ascii_lowercase();
    match normalized.as_str() {
        "description" | "overview" | "details" => Subsection::Description,
        "parameters" | "path parameters" | "query parameters" | "request parameters"
        | "header parameters" => Subsection::Parameters,
        "response examples" | "response example" | "responses" | "response"
        | "example responses" | "example response" => Subsection::Responses,
        "code examples" | "code example" | "code samples" | "examples" | "example requests" => {
            Subsection::CodeExamples
        }
        _ => Subsection::Other,
    }
}

fn parameter_re() -> &'static Regex {
    static PARAMETER_RE: OnceLock<Regex> = OnceLock::new();
    PARAMETER_RE.get_or_init(|| {
        Regex::new(r"^[-*+]\s+`([^`]+)`\s*(?:\(([^)]*)\))?\s*(?:[:\-–—]\s*)?(.*)$")
            .expect("Invalid regex")
    })
}

fn example_re() -> &'static Regex {
    static EXAMPLE_RE: OnceLock<Regex> = OnceLock::new();
    EXAMPLE_RE.get_or_init(|| {
        Regex::new(r"(?i)(?:^|[\s(])(?:example|e\.g\.)\s*:\s*(.+?)\)?\.?\s*$").expect("Invalid regex")
    })
}

fn tags_re() -> &'static Regex {
    static TAGS_RE: OnceLock<Regex> = OnceLock::new();
    TAGS_RE.get_or_init(|| {
        Regex::new(r"(?i)^(?:\*\*)?(?:tags?|sections?)(?:\*\*)?\s*:\s*(?:\*\*)?\s*(.+)$")
            .expect("Invalid regex")
    })
}

fn deprecated_re() -> &'static Regex {
    static DEPRECATED_RE: OnceLock<Regex> = OnceLock::new();
    DEPRECATED_RE.get_or_init(|| {
        Regex::new(r"(?i)^(?:>\s*)?(?:\*\*deprecated\*\*|deprecated\s*:\s*true\s*$)")
            .expect("Invalid regex")
    })
}

fn summary_label_re() -> &'static Regex {
    static SUMMARY_RE: OnceLock<Regex> = OnceLock::new();
    SUMMARY_RE.get_or_init(|| {
        Regex::new(r"(?i)^(?:\*\*summary:\*\*|\*\*summary\*\*:|summary:)\s*(.*)$").expect("Invalid regex")
    })
}

fn status_re() -> &'static Regex {
    static STATUS_RE: OnceLock<Regex> = OnceLock::new();
    STATUS_RE.get_or_init(|| Regex::new(r"\((\d{3})\b|\b(\d{3})\b").expect("Invalid regex"))
}

fn is_rule(line: &str) -> bool {
    line.len() >= 3
        && (line.chars().all(|c| c == '-')
            || line.chars().all(|c| c == '*')
            || line.chars().all(|c| c == '_'))
}

/// Parses a `` - `name` (type, required): description `` bullet.
pub fn parse_parameter(line: &str) -> Option<ParameterDocumentation> {
    let caps = parameter_re().captures(line.trim())?;
    let name = caps.get(1)?.as_str().trim();
    let description = caps.get(3).map_or("", |m| m.as_str()).trim();
    let mut param = ParameterDocumentation::new(name, description).ok()?;

    if let Some(attrs) = caps.get(2) {
        for token in attrs.as_str().split(',').map(str::trim).filter(|t| !t.is_empty()) {
            match token.to_ascii_lowercase().as_str() {
                "required" => param.required = Some(true),
                "optional" => param.required = Some(false),
                _ if param.param_type.is_none() => param.param_type = Some(token.to_string()),
                _ => {}
            }
        }
    }

    param.example = example_re()
        .captures(description)
        .and_then(|c| c.get(1))
        .map(|m| parse_example(m.as_str()));

    Some(param)
}

fn parse_example(raw: &str) -> Value {
    let raw = raw.trim().trim_matches('`');
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Parses a `Tags: a, b` / `Section: a` line.
pub fn parse_tags(line: &str) -> Option<Vec<String>> {
    let caps = tags_re().captures(line.trim())?;
    let tags = caps
        .get(1)?
        .as_str()
        .split(',')
        .map(|t| t.trim_matches(|c: char| c.is_whitespace() || c == '`' || c == '*'))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    Some(tags)
}

/// Status code named by a response label, preferring a parenthesised one.
pub fn status_from_label(label: &str) -> Option<u16> {
    let caps = status_re().captures(label)?;
    caps.get(1).or_else(|| caps.get(2))?.as_str().parse().ok()
}

fn clean_label(label: &str) -> String {
    label
        .trim_matches(|c: char| c == '*' || c.is_whitespace())
        .trim_end_matches(':')
        .trim_matches(|c: char| c == '*' || c.is_whitespace())
        .trim_end_matches(':')
        .to_string()
}

fn default_response_description(status: u16) -> &'static str {
    match status {
        200..=299 => "Successful response",
        400..=599 => "Error response",
        _ => "Response",
    }
}

fn finish_description(lines: &[String]) -> Option<String> {
    let mut out: Vec<&str> = Vec::new();
    for line in lines {
        if line.trim().is_empty() && out.last().map_or(true, |l| l.trim().is_empty()) {
            continue;
        }
        out.push(line);
    }
    let text = out.join("\n").trim().to_string();
    (!text.is_empty()).then_some(text)
}

struct SectionParser<'s> {
    supported: &'s [CodeLanguage],
    doc: EndpointDocumentation,
    issues: Vec<ValidationIssue>,
    mode: Subsection,
    mode_level: usize,
    summary_lines: Vec<String>,
    summary_done: bool,
    summary_labelled: bool,
    description: Vec<String>,
    label: Option<String>,
    sub_title: Option<String>,
}

impl<'s> SectionParser<'s> {
    fn end_summary(&mut self) {
        if !self.summary_lines.is_empty() {
            self.summary_done = true;
        }
    }

    /// Code Examples stay out of the description; their content ends up in
    /// `x-codeSamples`.
    fn collects_prose(&self) -> bool {
        self.mode != Subsection::CodeExamples
    }

    fn on_heading(&mut self, level: usize, text: &str) {
        self.end_summary();
        let kind = classify_subsection(text);
        if self.mode == Subsection::Top || level <= self.mode_level || kind != Subsection::Other {
            self.mode = kind;
            self.mode_level = level;
            self.sub_title = None;
            self.label = None;
        } else {
            self.sub_title = Some(text.to_string());
            self.label = Some(text.to_string());
        }

        let titled = matches!(
            kind,
            Subsection::Other | Subsection::Parameters | Subsection::Responses
        );
        if titled && self.collects_prose() {
            self.description.push(String::new());
            self.description
                .push(format!("{} {}", "#".repeat(level), text));
        }
    }

    fn on_text(&mut self, line: &str) {
        let trimmed = line.trim();
        if let Some(tags) = parse_tags(trimmed) {
            for tag in tags {
                self.doc.add_tag(tag);
            }
            return;
        }
        if deprecated_re().is_match(trimmed) {
            self.doc.deprecated = true;
            return;
        }
        if is_rule(trimmed) {
            self.end_summary();
            self.description.push(String::new());
            return;
        }

        match self.mode {
            Subsection::Parameters => {
                if let Some(param) = parse_parameter(trimmed) {
                    self.doc.parameters.push(param);
                }
                self.description.push(line.trim_end().to_string());
            }
            Subsection::Responses => {
                self.label = Some(trimmed.to_string());
                self.description.push(line.trim_end().to_string());
            }
            Subsection::CodeExamples => {
                self.label = Some(trimmed.to_string());
            }
            Subsection::Top | Subsection::Description | Subsection::Other => {
                let may_summarise =
                    matches!(self.mode, Subsection::Top | Subsection::Description);
                if may_summarise && !self.summary_done {
                    if self.summary_lines.is_empty() {
                        if let Some(caps) = summary_label_re().captures(trimmed) {
                            let rest = caps.get(1).map_or("", |m| m.as_str()).trim();
                            self.summary_labelled = true;
                            if !rest.is_empty() {
                                self.summary_lines.push(rest.to_string());
                            }
                            return;
                        }
                    }
                    self.summary_lines.push(trimmed.to_string());
                    if self.summary_labelled {
                        return;
                    }
                }
                self.description.push(line.trim_end().to_string());
            }
        }
    }

    fn on_blank(&mut self) {
        self.end_summary();
        if self.collects_prose() {
            self.description.push(String::new());
        }
    }

    fn on_fence(&mut self, info: &str, code: &str) {
        match self.mode {
            Subsection::CodeExamples | Subsection::Top => self.code_sample(info, code),
            Subsection::Responses => self.response_example(code),
            _ => {}
        }
        self.label = None;
    }

    fn code_sample(&mut self, info: &str, code: &str) {
        let language = if info.is_empty() {
            self.label
                .as_deref()
                .and_then(CodeLanguage::from_label)
                .or_else(|| self.sub_title.as_deref().and_then(CodeLanguage::from_label))
        } else {
            CodeLanguage::from_alias(info)
        };
        let Some(language) = language else {
            log::debug!(
                "Skipping code block with unrecognised language '{}' in {} {}",
                info,
                self.doc.method(),
                self.doc.path()
            );
            return;
        };
        if !self.supported.contains(&language) {
            log::debug!("Skipping unsupported language '{}'", language);
            return;
        }
        match CodeSample::new(language, code) {
            Ok(mut sample) => {
                sample.title = self.sub_title.clone();
                self.doc.code_samples.push(sample);
            }
            Err(e) => log::debug!("Skipping code block: {}", e),
        }
    }

    fn response_example(&mut self, code: &str) {
        if code.trim().is_empty() {
            return;
        }
        let label = self.label.take();
        let status = label.as_deref().and_then(status_from_label).unwrap_or(200);
        let description = label
            .as_deref()
            .map(clean_label)
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| default_response_description(status).to_string());

        match ResponseExample::from_raw(status, description, code, None) {
            Ok(example) => self.doc.response_examples.push(example),
            Err(e) => self.issues.push(ValidationIssue {
                file_path: None,
                line_number: None,
                error_type: IssueKind::InvalidStatusCode,
                message: format!(
                    "{} in {} {}",
                    e,
                    self.doc.method(),
                    self.doc.path()
                ),
                suggestion: Some("Label responses like 'Success Response (200 OK)'".into()),
            }),
        }
    }

    fn finish(mut self) -> (EndpointDocumentation, Vec<ValidationIssue>) {
        let summary = self.summary_lines.join(" ").trim().to_string();
        if !summary.is_empty() {
            self.doc.summary = Some(summary);
        }
        self.doc.description = finish_description(&self.description);
        (self.doc, self.issues)
    }
}

/// Extracts the documentation record of one section.
///
/// Code inside unterminated fences is ignored. The returned issues only cover
/// field-level problems; structural ones come from the lexer.
pub fn build_endpoint(
    section: &Section<'_>,
    supported: &[CodeLanguage],
) -> AppResult<(EndpointDocumentation, Vec<ValidationIssue>)> {
    let doc = EndpointDocumentation::new(section.method, section.path)?;
    let mut parser = SectionParser {
        supported,
        doc,
        issues: Vec::new(),
        mode: Subsection::Top,
        mode_level: section.level,
        summary_lines: Vec::new(),
        summary_done: false,
        summary_labelled: false,
        description: Vec::new(),
        label: None,
        sub_title: None,
    };

    let body = section.body;
    let mut i = 0;
    while i < body.len() {
        match &body[i].kind {
            LineKind::Heading { level, text } => parser.on_heading(*level, text),
            LineKind::FenceOpen { info, terminated } => {
                let (code, next) = fenced_code(body, i + 1);
                if *terminated {
                    parser.on_fence(info, &code);
                }
                parser.end_summary();
                i = next;
                continue;
            }
            LineKind::Text(text) => parser.on_text(text),
            LineKind::Blank => parser.on_blank(),
            LineKind::Code(_) | LineKind::FenceClose => {}
        }
        i += 1;
    }

    let (doc, mut issues) = parser.finish();
    for issue in &mut issues {
        issue.line_number.get_or_insert(section.heading_line);
    }
    Ok((doc, issues))
}

/// Collects code lines from `start` up to the closing fence. Returns the code
/// and the index after the fence.
fn fenced_code(lines: &[Line<'_>], start: usize) -> (String, usize) {
    let mut code = Vec::new();
    let mut j = start;
    loop {
        match lines.get(j).map(|l| &l.kind) {
            Some(LineKind::Code(c)) => {
                code.push(*c);
                j += 1;
            }
            Some(LineKind::FenceClose) => {
                j += 1;
                break;
            }
            _ => break,
        }
    }
    (code.join("\n"), j)
}

fn render_line(kind: &LineKind<'_>) -> String {
    match kind {
        LineKind::Heading { level, text } => format!("{} {}", "#".repeat(*level), text),
        LineKind::FenceOpen { info, .. } => format!("```{}", info),
        LineKind::FenceClose => "```".to_string(),
        LineKind::Code(line) | LineKind::Text(line) => line.trim_end().to_string(),
        LineKind::Blank => String::new(),
    }
}

/// Markdown under the first `Overview` heading found outside every endpoint
/// section, up to the next heading of equal or shallower level.
pub fn overview_text(lines: &[Line<'_>], outside: &[Range<usize>]) -> Option<String> {
    for range in outside {
        let opening = range.clone().find_map(|i| match &lines[i].kind {
            LineKind::Heading { level, text }
                if text.trim().trim_end_matches(':').eq_ignore_ascii_case("overview") =>
            {
                Some((i, *level))
            }
            _ => None,
        });
        let Some((start, level)) = opening else {
            continue;
        };
        let body: Vec<String> = lines[start + 1..range.end]
            .iter()
            .take_while(|line| {
                !matches!(line.kind, LineKind::Heading { level: l, .. } if l <= level)
            })
            .filter(|line| !matches!(&line.kind, LineKind::Text(t) if is_rule(t.trim())))
            .map(|line| render_line(&line.kind))
            .collect();
        if let Some(text) = finish_description(&body) {
            return Some(text);
        }
    }
    None
}

/// Code samples found in fenced blocks outside every endpoint section.
pub fn global_examples(
    lines: &[Line<'_>],
    outside: &[Range<usize>],
    supported: &[CodeLanguage],
) -> Vec<CodeSample> {
    let mut samples = Vec::new();
    for range in outside {
        let mut title: Option<&str> = None;
        let mut i = range.start;
        while i < range.end {
            match &lines[i].kind {
                LineKind::Heading { text, .. } => title = Some(*text),
                LineKind::FenceOpen {
                    info,
                    terminated: true,
                } => {
                    let (code, next) = fenced_code(lines, i + 1);
                    let language = if info.is_empty() {
                        title.and_then(CodeLanguage::from_label)
                    } else {
                        CodeLanguage::from_alias(info)
                    };
                    if let Some(language) = language.filter(|l| supported.contains(l)) {
                        if let Ok(sample) = CodeSample::new(language, code) {
                            samples.push(match title {
                                Some(t) => sample.with_title(t),
                                None => sample,
                            });
                        }
                    }
                    i = next;
                    continue;
                }
                _ => {}
            }
            i += 1;
        }
    }
    samples
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_parse_parameter_full() {
        let p = parse_parameter("- `user_id` (integer, required): The user identifier").unwrap();
        assert_eq!(p.name(), "user_id");
        assert_eq!(p.param_type.as_deref(), Some("integer"));
        assert_eq!(p.required, Some(true));
        assert_eq!(p.description, "The user identifier");
    }

    #[test]
    fn test_parse_parameter_example() {
        let p = parse_parameter("- `limit` (integer, optional): Page size. Example: 25").unwrap();
        assert_eq!(p.required, Some(false));
        assert_eq!(p.example, Some(json!(25)));

        let p = parse_parameter("* `sort` (string): Sort order (example: `name`)").unwrap();
        assert_eq!(p.example, Some(json!("name")));
    }

    #[test]
    fn test_parse_parameter_rejects_other_shapes() {
        assert!(parse_parameter("- user_id: no backticks").is_none());
        assert!(parse_parameter("Some prose").is_none());
    }

    #[test]
    fn test_parse_tags() {
        assert_eq!(
            parse_tags("Tags: users, list").unwrap(),
            vec!["users".to_string(), "list".to_string()]
        );
        assert_eq!(parse_tags("**Section:** Admin").unwrap(), vec!["Admin".to_string()]);
        assert!(parse_tags("Not a tag line").is_none());
    }

    #[test]
    fn test_status_from_label() {
        assert_eq!(status_from_label("**Success (200 OK):**"), Some(200));
        assert_eq!(status_from_label("Success Response (201 Created)"), Some(201));
        assert_eq!(status_from_label("404 Not Found"), Some(404));
        assert_eq!(status_from_label("Success"), None);
    }

    #[test]
    fn test_clean_label() {
        assert_eq!(clean_label("**Success Response (200 OK):**"), "Success Response (200 OK)");
        assert_eq!(clean_label("Error (404):"), "Error (404)");
    }

    #[test]
    fn test_classify_subsection() {
        assert_eq!(classify_subsection("Parameters"), Subsection::Parameters);
        assert_eq!(classify_subsection("Query Parameters"), Subsection::Parameters);
        assert_eq!(classify_subsection("Response Examples"), Subsection::Responses);
        assert_eq!(classify_subsection("Code Examples"), Subsection::CodeExamples);
        assert_eq!(classify_subsection("Overview"), Subsection::Description);
        assert_eq!(classify_subsection("Request Body"), Subsection::Other);
    }
}
