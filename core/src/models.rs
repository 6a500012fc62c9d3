#![deny(missing_docs)]

//! # Documentation Models
//!
//! Typed records produced by the markdown extractor and consumed by the
//! analyzer, linter and enhancer.
//!
//! Constructors validate their invariants eagerly: an endpoint without a path,
//! an empty code sample or an out-of-range status code never exist as values.

use crate::content_type;
use crate::error::{AppError, AppResult};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// The seven HTTP verbs an endpoint may be documented under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
    /// `HEAD`
    Head,
    /// `OPTIONS`
    Options,
}

impl HttpMethod {
    /// Every supported verb, in declaration order.
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
        HttpMethod::Head,
        HttpMethod::Options,
    ];

    /// Canonical uppercase spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }

    /// Lowercase spelling used as an operation key under an OpenAPI path item.
    pub fn schema_key(&self) -> String {
        self.as_str().to_ascii_lowercase()
    }

    /// Parses an OpenAPI path-item key (`get`, `post`...).
    ///
    /// Non-operation keys such as `parameters`, `summary` or `trace` yield `None`.
    pub fn from_schema_key(key: &str) -> Option<Self> {
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(key))
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsing is case-sensitive: `Get` is not a method.
impl FromStr for HttpMethod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| AppError::Validation(format!("Invalid HTTP method: '{}'", s)))
    }
}

/// Languages a code sample can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeLanguage {
    /// Shell `curl` invocation.
    Curl,
    /// Python using `requests`.
    Python,
    /// JavaScript using `fetch`.
    Javascript,
    /// TypeScript using `fetch`.
    Typescript,
    /// Go using `net/http`.
    Go,
    /// Java using `java.net.http`.
    Java,
    /// PHP using the curl extension.
    Php,
    /// Ruby using `Net::HTTP`.
    Ruby,
    /// C# using `HttpClient`.
    Csharp,
}

impl CodeLanguage {
    /// Every supported language.
    pub const ALL: [CodeLanguage; 9] = [
        CodeLanguage::Curl,
        CodeLanguage::Python,
        CodeLanguage::Javascript,
        CodeLanguage::Typescript,
        CodeLanguage::Go,
        CodeLanguage::Java,
        CodeLanguage::Php,
        CodeLanguage::Ruby,
        CodeLanguage::Csharp,
    ];

    /// Canonical lowercase identifier (also used as the `x-codeSamples` `lang`).
    pub fn as_str(&self) -> &'static str {
        match self {
            CodeLanguage::Curl => "curl",
            CodeLanguage::Python => "python",
            CodeLanguage::Javascript => "javascript",
            CodeLanguage::Typescript => "typescript",
            CodeLanguage::Go => "go",
            CodeLanguage::Java => "java",
            CodeLanguage::Php => "php",
            CodeLanguage::Ruby => "ruby",
            CodeLanguage::Csharp => "csharp",
        }
    }

    /// Human-facing name.
    pub fn display_name(&self) -> &'static str {
        match self {
            CodeLanguage::Curl => "cURL",
            CodeLanguage::Python => "Python",
            CodeLanguage::Javascript => "JavaScript",
            CodeLanguage::Typescript => "TypeScript",
            CodeLanguage::Go => "Go",
            CodeLanguage::Java => "Java",
            CodeLanguage::Php => "PHP",
            CodeLanguage::Ruby => "Ruby",
            CodeLanguage::Csharp => "C#",
        }
    }

    /// Resolves a code-fence info string through the alias table.
    ///
    /// Returns `None` for unsupported languages (e.g. `kotlin`, `json`).
    pub fn from_alias(tag: &str) -> Option<Self> {
        let tag = tag.trim().to_ascii_lowercase();
        let lang = match tag.as_str() {
            "curl" | "bash" | "sh" | "shell" | "zsh" => CodeLanguage::Curl,
            "python" | "py" | "python3" => CodeLanguage::Python,
            "javascript" | "js" | "node" => CodeLanguage::Javascript,
            "typescript" | "ts" => CodeLanguage::Typescript,
            "go" | "golang" => CodeLanguage::Go,
            "java" => CodeLanguage::Java,
            "php" => CodeLanguage::Php,
            "ruby" | "rb" => CodeLanguage::Ruby,
            "csharp" | "cs" | "c#" => CodeLanguage::Csharp,
            _ => return None,
        };
        Some(lang)
    }

    /// Resolves a free-form label such as `cURL` or `JavaScript (fetch)` by its first word.
    pub fn from_label(label: &str) -> Option<Self> {
        let first = label
            .split(|c: char| c.is_whitespace() || c == '(' || c == ':')
            .find(|w| !w.is_empty())?;
        Self::from_alias(first.trim_matches(|c: char| c == '*' || c == '`'))
    }
}

impl fmt::Display for CodeLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CodeLanguage {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_alias(s)
            .ok_or_else(|| AppError::Validation(format!("Unsupported code language: '{}'", s)))
    }
}

/// A runnable example request in one language.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodeSample {
    /// Language of `code`.
    pub language: CodeLanguage,
    code: String,
    /// Optional prose attached to the sample.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional title (e.g. the `#### cURL` sub-heading it appeared under).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl CodeSample {
    /// Creates a sample, rejecting blank code.
    pub fn new(language: CodeLanguage, code: impl Into<String>) -> AppResult<Self> {
        let code = code.into();
        if code.trim().is_empty() {
            return Err(AppError::Validation(format!(
                "Code sample for '{}' cannot be empty",
                language
            )));
        }
        Ok(Self {
            language,
            code,
            description: None,
            title: None,
        })
    }

    /// The sample's source text.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Sets the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// An example HTTP response body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseExample {
    status_code: u16,
    /// Label the example was found under.
    pub description: String,
    /// Parsed payload: a structure for JSON/YAML, a string otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    /// MIME type, explicit or detected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// The unparsed payload text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_content: Option<String>,
    /// Example response headers.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, String>,
}

impl ResponseExample {
    /// Lowest accepted status code.
    pub const MIN_STATUS: u16 = 100;
    /// Highest accepted status code.
    pub const MAX_STATUS: u16 = 599;

    /// Creates an example without content.
    pub fn new(status_code: u16, description: impl Into<String>) -> AppResult<Self> {
        if !(Self::MIN_STATUS..=Self::MAX_STATUS).contains(&status_code) {
            return Err(AppError::Validation(format!(
                "Invalid status code {}: must be between {} and {}",
                status_code,
                Self::MIN_STATUS,
                Self::MAX_STATUS
            )));
        }
        Ok(Self {
            status_code,
            description: description.into(),
            content: None,
            content_type: None,
            raw_content: None,
            headers: IndexMap::new(),
        })
    }

    /// Creates an example from raw body text.
    ///
    /// With an explicit `content_type` the text is stored verbatim; otherwise the
    /// content-type classifier decides the type and parses the payload.
    pub fn from_raw(
        status_code: u16,
        description: impl Into<String>,
        raw: &str,
        content_type: Option<&str>,
    ) -> AppResult<Self> {
        let mut example = Self::new(status_code, description)?;
        match content_type {
            Some(ct) => {
                example.content_type = Some(ct.to_string());
                example.content = Some(Value::String(raw.to_string()));
            }
            None => {
                let classified = content_type::classify_and_parse(raw);
                example.content_type = Some(classified.content_type.to_string());
                example.content = Some(classified.value);
            }
        }
        example.raw_content = Some(raw.to_string());
        Ok(example)
    }

    /// HTTP status code, guaranteed within `100..=599`.
    pub fn status_code(&self) -> u16 {
        self.status_code
    }
}

/// A documented request parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterDocumentation {
    name: String,
    /// Free-text description.
    pub description: String,
    /// Example value, JSON-decoded when possible.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    /// Whether the parameter is required, if stated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    /// Declared type (e.g. `string`, `integer`).
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,
}

impl ParameterDocumentation {
    /// Creates a parameter, rejecting a blank name.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> AppResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(AppError::Validation(
                "Parameter name cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            name,
            description: description.into(),
            example: None,
            required: None,
            param_type: None,
        })
    }

    /// Parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// The unit of matching: an HTTP method plus a path template.
///
/// Ordering is by path first, so sorted key sets group methods of one path together.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EndpointKey {
    /// Path template, e.g. `/users/{id}`.
    pub path: String,
    /// HTTP verb.
    pub method: HttpMethod,
}

impl EndpointKey {
    /// Creates a key.
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
        }
    }
}

impl fmt::Display for EndpointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Everything documented about one endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointDocumentation {
    path: String,
    method: HttpMethod,
    /// Short summary (first paragraph of the section).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Markdown-flavoured description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Code samples in document order.
    pub code_samples: Vec<CodeSample>,
    /// Response examples in document order.
    pub response_examples: Vec<ResponseExample>,
    /// Parameters in document order.
    pub parameters: Vec<ParameterDocumentation>,
    /// Tags / sections, without duplicates.
    pub tags: Vec<String>,
    /// Whether the endpoint is marked deprecated.
    pub deprecated: bool,
}

impl EndpointDocumentation {
    /// Creates an empty record, rejecting a blank path.
    pub fn new(method: HttpMethod, path: impl Into<String>) -> AppResult<Self> {
        let path = path.into();
        if path.trim().is_empty() {
            return Err(AppError::Validation(format!(
                "Endpoint path cannot be empty (method {})",
                method
            )));
        }
        Ok(Self {
            path,
            method,
            summary: None,
            description: None,
            code_samples: Vec::new(),
            response_examples: Vec::new(),
            parameters: Vec::new(),
            tags: Vec::new(),
            deprecated: false,
        })
    }

    /// Path template.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// HTTP verb.
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// The `(method, path)` key of this record.
    pub fn key(&self) -> EndpointKey {
        EndpointKey::new(self.method, self.path.clone())
    }

    /// Adds a tag unless already present.
    pub fn add_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if !tag.is_empty() && !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
    }

    /// Number of populated documentation fields, used to rank duplicate records.
    pub fn populated_fields(&self) -> usize {
        let present = |s: &Option<String>| s.as_deref().is_some_and(|v| !v.trim().is_empty());
        [
            present(&self.summary),
            present(&self.description),
            !self.code_samples.is_empty(),
            !self.response_examples.is_empty(),
            !self.parameters.is_empty(),
            !self.tags.is_empty(),
        ]
        .into_iter()
        .filter(|p| *p)
        .count()
    }
}

/// Category of a recoverable anomaly found while reading documentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Heading shaped like an endpoint but with a bad method or no path.
    InvalidEndpointHeading,
    /// Code fence that was never closed.
    UnterminatedCodeFence,
    /// Frontmatter block that is not a YAML mapping.
    InvalidFrontmatter,
    /// Response label with a status code outside `100..=599`.
    InvalidStatusCode,
}

/// A recoverable problem found while parsing a markdown file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    /// File the issue was found in (filled in by the loader).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,
    /// 1-based line number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_number: Option<usize>,
    /// Issue category.
    pub error_type: IssueKind,
    /// Human-readable message.
    pub message: String,
    /// How to fix it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// Counters gathered while loading a documentation directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DocumentationStats {
    /// Markdown files parsed (the general docs file excluded).
    pub total_files: usize,
    /// Endpoint records extracted.
    pub total_endpoints: usize,
    /// Code samples across endpoints and global examples.
    pub total_code_samples: usize,
    /// Languages seen, sorted.
    pub languages_found: Vec<CodeLanguage>,
    /// Recovered parse anomalies.
    pub validation_errors: Vec<ValidationIssue>,
    /// Wall-clock load duration.
    pub load_time_ms: f64,
}

/// The aggregate result of loading a documentation directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DocumentationData {
    /// Endpoint records in file order, then document order. Duplicates are kept.
    pub endpoints: Vec<EndpointDocumentation>,
    /// Code samples found outside any endpoint section.
    pub global_examples: Vec<CodeSample>,
    /// Frontmatter key/values (first file wins on conflicts).
    pub metadata: IndexMap<String, Value>,
    /// Overview text per tag (first file wins on conflicts).
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub tag_descriptions: IndexMap<String, String>,
    /// Content of the general documentation file, never merged into endpoints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub general_docs: Option<String>,
    /// Load statistics.
    pub stats: DocumentationStats,
}

impl DocumentationData {
    /// Records documented under exactly `method` and `path`.
    pub fn find<'a>(
        &'a self,
        method: HttpMethod,
        path: &'a str,
    ) -> impl Iterator<Item = &'a EndpointDocumentation> + 'a {
        self.endpoints
            .iter()
            .filter(move |e| e.method() == method && e.path() == path)
    }
}
