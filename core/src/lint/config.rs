//! Linter configuration file (`.markdocs-lint.yaml`).
//!
//! ```yaml
//! openapi: openapi.json
//! docs: [docs]
//! completeness_threshold: 80
//! exclude:
//!   endpoints:
//!     - path: "^/internal/"
//!       methods: ["get", "post"]
//!     - "GET /health"
//!     - "/metrics"
//! spec_generator:
//!   - python manage.py spectacular --file openapi.json
//! ```

use crate::error::{AppError, AppResult};
use crate::models::{EndpointKey, HttpMethod};
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// File names searched for by [`find_config_file`], in order.
pub const CONFIG_FILE_NAMES: [&str; 2] = [".markdocs-lint.yaml", ".markdocs-lint.yml"];

/// Report rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// JSON document.
    Json,
}

impl FromStr for OutputFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(AppError::Config(format!("Unknown output format '{}'", other))),
        }
    }
}

/// One `exclude.endpoints` entry as written in the file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ExclusionRule {
    /// `{path: <regex>, methods: [<regex>...]}`.
    Pattern {
        /// Regex matched from the start of the path.
        path: String,
        /// Case-insensitive method regexes; empty means every method.
        #[serde(default)]
        methods: Vec<String>,
    },
    /// `"GET /path"` or `"/path"`.
    Legacy(String),
}

#[derive(Debug, Clone)]
enum CompiledRule {
    Pattern { path: Regex, methods: Vec<Regex> },
    Exact { method: Option<HttpMethod>, path: String },
}

impl CompiledRule {
    fn compile(rule: &ExclusionRule) -> AppResult<Self> {
        let regex = |pattern: String| {
            Regex::new(&pattern)
                .map_err(|e| AppError::Config(format!("Invalid exclusion regex '{}': {}", pattern, e)))
        };
        match rule {
            ExclusionRule::Pattern { path, methods } => Ok(CompiledRule::Pattern {
                path: regex(format!("^(?:{})", path.trim_start_matches('^')))?,
                methods: methods
                    .iter()
                    .map(|m| regex(format!("(?i)^(?:{})$", m)))
                    .collect::<AppResult<_>>()?,
            }),
            ExclusionRule::Legacy(text) => {
                let text = text.trim();
                match text.split_once(char::is_whitespace) {
                    Some((method, path)) => Ok(CompiledRule::Exact {
                        method: Some(method.to_ascii_uppercase().parse().map_err(|_| {
                            AppError::Config(format!("Invalid method in exclusion '{}'", text))
                        })?),
                        path: path.trim().to_string(),
                    }),
                    None => Ok(CompiledRule::Exact {
                        method: None,
                        path: text.to_string(),
                    }),
                }
            }
        }
    }

    fn matches(&self, key: &EndpointKey) -> bool {
        match self {
            CompiledRule::Pattern { path, methods } => {
                path.is_match(&key.path)
                    && (methods.is_empty()
                        || methods.iter().any(|m| m.is_match(key.method.as_str())))
            }
            CompiledRule::Exact { method, path } => {
                *path == key.path && method.map_or(true, |m| m == key.method)
            }
        }
    }
}

/// Compiled exclusion rules.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    rules: Vec<CompiledRule>,
}

impl ExclusionSet {
    /// Compiles `rules`, failing on the first invalid one.
    pub fn compile(rules: &[ExclusionRule]) -> AppResult<Self> {
        Ok(Self {
            rules: rules.iter().map(CompiledRule::compile).collect::<AppResult<_>>()?,
        })
    }

    /// Whether any rule excludes `key`.
    pub fn should_exclude_endpoint(&self, key: &EndpointKey) -> bool {
        self.rules.iter().any(|r| r.matches(key))
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether there are no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ExcludeSection {
    endpoints: Vec<ExclusionRule>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawConfig {
    openapi: Option<PathBuf>,
    docs: Vec<PathBuf>,
    recursive: bool,
    base_url: String,
    format: OutputFormat,
    output: Option<PathBuf>,
    completeness_threshold: u32,
    spec_generator: Vec<String>,
    exclude: ExcludeSection,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            openapi: None,
            docs: Vec::new(),
            recursive: true,
            base_url: "https://api.example.com".to_string(),
            format: OutputFormat::Text,
            output: None,
            completeness_threshold: 80,
            spec_generator: Vec::new(),
            exclude: ExcludeSection::default(),
        }
    }
}

/// Settings read from the linter configuration file.
#[derive(Debug, Clone)]
pub struct LinterConfig {
    /// Schema file.
    pub openapi: Option<PathBuf>,
    /// Documentation directories; the first is linted.
    pub docs: Vec<PathBuf>,
    /// Descend into subdirectories.
    pub recursive: bool,
    /// Base URL for generated samples.
    pub base_url: String,
    /// Report format.
    pub format: OutputFormat,
    /// Report destination (stdout when absent).
    pub output: Option<PathBuf>,
    /// Scores below this mark an endpoint incomplete.
    pub completeness_threshold: u32,
    /// Shell commands regenerating the schema before linting.
    pub spec_generator: Vec<String>,
    /// Rules as written.
    pub exclusion_rules: Vec<ExclusionRule>,
    /// Compiled rules.
    pub exclusions: ExclusionSet,
}

impl Default for LinterConfig {
    fn default() -> Self {
        Self::assemble(RawConfig::default(), ExclusionSet::default())
    }
}

impl LinterConfig {
    fn assemble(raw: RawConfig, exclusions: ExclusionSet) -> Self {
        Self {
            exclusions,
            exclusion_rules: raw.exclude.endpoints,
            openapi: raw.openapi,
            docs: raw.docs,
            recursive: raw.recursive,
            base_url: raw.base_url,
            format: raw.format,
            output: raw.output,
            completeness_threshold: raw.completeness_threshold,
            spec_generator: raw.spec_generator,
        }
    }

    /// Parses YAML text. An empty document yields the defaults.
    pub fn from_yaml_str(text: &str) -> AppResult<Self> {
        let value: serde_yaml::Value = serde_yaml::from_str(text)
            .map_err(|e| AppError::Config(format!("Invalid linter config: {}", e)))?;
        let raw = if value.is_null() {
            RawConfig::default()
        } else {
            serde_yaml::from_value(value)
                .map_err(|e| AppError::Config(format!("Invalid linter config: {}", e)))?
        };
        let exclusions = ExclusionSet::compile(&raw.exclude.endpoints)?;
        Ok(Self::assemble(raw, exclusions))
    }

    /// Reads a configuration file.
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Cannot read config {}: {}", path.display(), e))
        })?;
        log::debug!("Using linter config {}", path.display());
        Self::from_yaml_str(&text)
    }

    /// Whether `key` is excluded from linting.
    pub fn should_exclude_endpoint(&self, key: &EndpointKey) -> bool {
        self.exclusions.should_exclude_endpoint(key)
    }
}

/// First configuration file found in `start` or one of its ancestors.
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    start.ancestors().find_map(|dir| {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    fn key(method: HttpMethod, path: &str) -> EndpointKey {
        EndpointKey::new(method, path)
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = LinterConfig::from_yaml_str("").unwrap();
        assert!(config.recursive);
        assert_eq!(config.completeness_threshold, 80);
        assert_eq!(config.base_url, "https://api.example.com");
        assert_eq!(config.format, OutputFormat::Text);
        assert!(config.exclusions.is_empty());

        let commented = LinterConfig::from_yaml_str("# nothing here\n").unwrap();
        assert!(commented.docs.is_empty());
    }

    #[test]
    fn test_full_config() {
        let yaml = r#"
openapi: api/openapi.yaml
docs: [docs, more-docs]
recursive: false
format: json
completeness_threshold: 60
spec_generator:
  - make schema
exclude:
  endpoints:
    - path: "/internal/"
      methods: ["get|head"]
    - path: "^/admin"
    - "GET /health"
    - "/metrics"
"#;
        let config = LinterConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.openapi, Some(PathBuf::from("api/openapi.yaml")));
        assert_eq!(config.docs.len(), 2);
        assert!(!config.recursive);
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.completeness_threshold, 60);
        assert_eq!(config.spec_generator, vec!["make schema".to_string()]);
        assert_eq!(config.exclusions.len(), 4);

        assert!(config.should_exclude_endpoint(&key(HttpMethod::Get, "/internal/jobs")));
        assert!(config.should_exclude_endpoint(&key(HttpMethod::Head, "/internal/jobs")));
        assert!(!config.should_exclude_endpoint(&key(HttpMethod::Post, "/internal/jobs")));
        assert!(!config.should_exclude_endpoint(&key(HttpMethod::Get, "/api/internal/")));
        assert!(config.should_exclude_endpoint(&key(HttpMethod::Delete, "/admin/users")));
        assert!(config.should_exclude_endpoint(&key(HttpMethod::Get, "/health")));
        assert!(!config.should_exclude_endpoint(&key(HttpMethod::Post, "/health")));
        assert!(config.should_exclude_endpoint(&key(HttpMethod::Put, "/metrics")));
        assert!(!config.should_exclude_endpoint(&key(HttpMethod::Put, "/metrics/cpu")));
    }

    #[test]
    fn test_invalid_regex_is_config_error() {
        let err = LinterConfig::from_yaml_str("exclude:\n  endpoints:\n    - path: \"([\"\n")
            .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        let err = LinterConfig::from_yaml_str("exclude:\n  endpoints:\n    - \"FETCH /x\"\n")
            .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_find_config_file_walks_up() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a/b");
        fs::create_dir_all(&nested).unwrap();
        assert_eq!(find_config_file(&nested), None);

        let path = dir.path().join(".markdocs-lint.yml");
        fs::write(&path, "completeness_threshold: 90\n").unwrap();
        assert_eq!(find_config_file(&nested), Some(path.clone()));
        assert_eq!(LinterConfig::from_file(&path).unwrap().completeness_threshold, 90);
    }
}
