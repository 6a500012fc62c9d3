#![deny(missing_docs)]

//! # Lint Command
//!
//! Resolves settings (flags over config file over defaults), regenerates the
//! schema if configured, lints the documentation and writes the report.

use crate::error::{CliError, CliResult};
use crate::format::{render_json, render_text};
use crate::generator::{run_spec_generators, CommandExecutor};
use markdocs_core::lint::report::LintReport;
use markdocs_core::{
    find_config_file, DocumentationLinter, LintOptions, LinterConfig, OutputFormat, SchemaView,
};
use std::fs;
use std::path::{Path, PathBuf};

/// Report format flag.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    /// Human-readable text.
    Text,
    /// JSON document.
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

/// Arguments for the lint command.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct LintArgs {
    /// OpenAPI schema file (JSON or YAML).
    #[clap(long, env = "MARKDOCS_OPENAPI")]
    pub openapi: Option<PathBuf>,

    /// Documentation directory.
    #[clap(long, env = "MARKDOCS_DOCS")]
    pub docs: Option<PathBuf>,

    /// Linter config file. Defaults to `.markdocs-lint.yaml` found upwards from the working directory.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Report format.
    #[clap(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Write the report to this file instead of stdout.
    #[clap(long)]
    pub output: Option<PathBuf>,

    /// Only read the top level of the documentation directory.
    #[clap(long)]
    pub no_recursive: bool,

    /// Base URL used in generated code samples.
    #[clap(long)]
    pub base_url: Option<String>,

    /// Show every entry instead of the first 10 per section.
    #[clap(long)]
    pub all: bool,
}

fn load_config(args: &LintArgs, cwd: &Path) -> CliResult<LinterConfig> {
    let path = args.config.clone().or_else(|| find_config_file(cwd));
    match path {
        Some(path) => Ok(LinterConfig::from_file(&path)?),
        None => Ok(LinterConfig::default()),
    }
}

/// Executes the lint command.
///
/// # Returns
///
/// * `CliResult<bool>` - Whether the report contains issues.
pub fn execute(args: &LintArgs, executor: &impl CommandExecutor) -> CliResult<bool> {
    let cwd = std::env::current_dir()?;
    let config = load_config(args, &cwd)?;
    run_spec_generators(&config.spec_generator, executor)?;

    let openapi = args.openapi.clone().or_else(|| config.openapi.clone()).ok_or_else(|| {
        CliError::General(
            "No OpenAPI schema given: pass --openapi or set 'openapi' in the config file"
                .to_string(),
        )
    })?;
    let docs = args
        .docs
        .clone()
        .or_else(|| config.docs.first().cloned())
        .unwrap_or_else(|| PathBuf::from("docs"));

    let mut options = LintOptions::from(&config);
    if args.no_recursive {
        options.recursive = false;
    }
    if let Some(base_url) = &args.base_url {
        options.base_url = base_url.clone();
    }

    let report = lint_files(&openapi, &docs, options)?;

    let format = args.format.map(OutputFormat::from).unwrap_or(config.format);
    let rendered = match format {
        OutputFormat::Json => render_json(&report)?,
        OutputFormat::Text => render_text(&report, args.all),
    };
    match args.output.as_ref().or(config.output.as_ref()) {
        Some(path) => {
            fs::write(path, rendered)?;
            log::info!("Report written to {}", path.display());
        }
        None => println!("{}", rendered),
    }

    Ok(report.has_issues())
}

/// Lints `docs` against the schema file at `openapi`.
pub fn lint_files(openapi: &Path, docs: &Path, options: LintOptions) -> CliResult<LintReport> {
    let schema = SchemaView::from_path(openapi)?;
    Ok(DocumentationLinter::new(schema, docs, options)?.lint()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::ShellExecutor;
    use markdocs_core::AppError;
    use serde_json::json;
    use tempfile::tempdir;

    fn fixture() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("docs")).unwrap();
        fs::write(
            dir.path().join("docs/api.md"),
            "## GET /health\n\nHealth check for load balancers.\n\nReports whether the service and its database connection are ready.\n\n### Response Examples\n\n```json\n{\"ok\": true}\n```\n\n```json\n{\"ok\": false}\n```\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("openapi.json"),
            json!({"paths": {"/health": {"get": {}}, "/users": {"get": {}}}}).to_string(),
        )
        .unwrap();
        dir
    }

    #[test]
    fn test_lint_files() {
        let dir = fixture();
        let report = lint_files(
            &dir.path().join("openapi.json"),
            &dir.path().join("docs"),
            LintOptions::default(),
        )
        .unwrap();
        assert_eq!(report.missing_documentation.len(), 1);
        assert!(report.has_issues());
    }

    #[test]
    fn test_execute_writes_json_report() {
        let dir = fixture();
        let output = dir.path().join("report.json");
        let args = LintArgs {
            openapi: Some(dir.path().join("openapi.json")),
            docs: Some(dir.path().join("docs")),
            config: Some(dir.path().join("lint.yaml")),
            format: Some(FormatArg::Json),
            output: Some(output.clone()),
            ..LintArgs::default()
        };
        fs::write(
            dir.path().join("lint.yaml"),
            "exclude:\n  endpoints:\n    - \"/users\"\n",
        )
        .unwrap();

        let has_issues = execute(&args, &ShellExecutor).unwrap();
        assert!(!has_issues);
        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(output).unwrap()).unwrap();
        assert_eq!(written["summary"]["status"], json!("good"));
    }

    #[test]
    fn test_missing_schema_is_an_error() {
        let dir = fixture();
        let args = LintArgs {
            config: Some(dir.path().join("empty.yaml")),
            ..LintArgs::default()
        };
        fs::write(dir.path().join("empty.yaml"), "").unwrap();
        assert!(matches!(execute(&args, &ShellExecutor), Err(CliError::General(_))));

        let err = lint_files(
            &dir.path().join("openapi.json"),
            &dir.path().join("nope"),
            LintOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CliError::Core(AppError::Load(_, _))));
    }
}
