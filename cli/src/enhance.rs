#![deny(missing_docs)]

//! # Enhance Command
//!
//! Writes an enhanced copy of a schema. The output format follows the output
//! file extension (`.yaml`/`.yml` for YAML, JSON otherwise).

use crate::error::{CliError, CliResult};
use markdocs_core::{
    ApiLink, CodeLanguage, EnhancementConfig, LoaderConfig, MarkdownDocumentationLoader,
    OpenApiEnhancer, SchemaView,
};
use std::fs;
use std::path::{Path, PathBuf};

/// Arguments for the enhance command.
#[derive(clap::Args, Debug, Clone)]
pub struct EnhanceArgs {
    /// OpenAPI schema file (JSON or YAML).
    #[clap(long, env = "MARKDOCS_OPENAPI")]
    pub openapi: PathBuf,

    /// Documentation directory.
    #[clap(long, env = "MARKDOCS_DOCS", default_value = "docs")]
    pub docs: PathBuf,

    /// Output file. Prints JSON to stdout when omitted.
    #[clap(long)]
    pub output: Option<PathBuf>,

    /// Base URL used in generated code samples.
    #[clap(long, default_value = "https://api.example.com")]
    pub base_url: String,

    /// Languages to generate samples for, comma separated (e.g. `curl,python,go`).
    #[clap(long, value_delimiter = ',', value_parser = parse_language)]
    pub languages: Vec<CodeLanguage>,

    /// Replaces `info.title` and heads `info.description`.
    #[clap(long)]
    pub app_title: Option<String>,

    /// Application line of `info.description`.
    #[clap(long)]
    pub app_description: Option<String>,

    /// Related API shown above the description, as `DESCRIPTION=URL`. Repeatable.
    #[clap(long = "api-link", value_parser = parse_api_link)]
    pub api_links: Vec<ApiLink>,
}

fn parse_language(s: &str) -> Result<CodeLanguage, String> {
    s.parse::<CodeLanguage>().map_err(|e| e.to_string())
}

fn parse_api_link(s: &str) -> Result<ApiLink, String> {
    let (description, url) = s
        .split_once('=')
        .ok_or_else(|| format!("Expected DESCRIPTION=URL, got '{}'", s))?;
    ApiLink::new(url.trim(), description.trim()).map_err(|e| e.to_string())
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
}

/// Executes the enhance command.
pub fn execute(args: &EnhanceArgs) -> CliResult<()> {
    let schema = SchemaView::from_path(&args.openapi)?;
    let loader = MarkdownDocumentationLoader::new(LoaderConfig::new(&args.docs))?;
    let docs = loader.load_documentation()?;

    let mut config = EnhancementConfig {
        base_url: args.base_url.clone(),
        api_links: args.api_links.clone(),
        app_title: args.app_title.clone(),
        app_description: args.app_description.clone(),
        ..EnhancementConfig::default()
    };
    if !args.languages.is_empty() {
        config.code_sample_languages = args.languages.clone();
    }
    let (enhanced, stats) =
        OpenApiEnhancer::new(config).enhance_with_stats(schema.as_value(), &docs)?;
    log::info!(
        "{} of {} endpoints enhanced",
        stats.endpoints_enhanced,
        stats.total_endpoints
    );

    match &args.output {
        Some(path) if is_yaml(path) => {
            let text = serde_yaml::to_string(&enhanced)
                .map_err(|e| CliError::General(format!("Cannot write YAML: {}", e)))?;
            fs::write(path, text)?;
        }
        Some(path) => fs::write(path, render(&enhanced)?)?,
        None => println!("{}", render(&enhanced)?),
    }
    Ok(())
}

fn render(value: &serde_json::Value) -> CliResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| CliError::General(format!("Cannot write JSON: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn fixture() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("docs")).unwrap();
        fs::write(
            dir.path().join("docs/users.md"),
            "## GET /users\n\nList users.\n\nReturns every user.\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("openapi.yaml"),
            "openapi: 3.0.0\ninfo:\n  title: T\n  version: '1'\npaths:\n  /users:\n    get:\n      responses:\n        '200':\n          description: OK\n",
        )
        .unwrap();
        dir
    }

    fn args(dir: &Path, output: &str) -> EnhanceArgs {
        EnhanceArgs {
            openapi: dir.join("openapi.yaml"),
            docs: dir.join("docs"),
            output: Some(dir.join(output)),
            base_url: "https://api.test".to_string(),
            languages: vec![CodeLanguage::Go],
            app_title: None,
            app_description: None,
            api_links: Vec::new(),
        }
    }

    #[test]
    fn test_enhance_to_json() {
        let dir = fixture();
        execute(&args(dir.path(), "out.json")).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("out.json")).unwrap())
                .unwrap();
        let op = &value["paths"]["/users"]["get"];
        assert_eq!(op["summary"], serde_json::json!("List users."));
        assert_eq!(op["x-codeSamples"][0]["lang"], serde_json::json!("go"));
        assert!(op["x-codeSamples"][0]["source"]
            .as_str()
            .unwrap()
            .contains("https://api.test/users"));
    }

    #[test]
    fn test_enhance_to_yaml() {
        let dir = fixture();
        execute(&args(dir.path(), "out.yml")).unwrap();
        let text = fs::read_to_string(dir.path().join("out.yml")).unwrap();
        let value: serde_json::Value = serde_yaml::from_str(&text).unwrap();
        assert_eq!(
            value["info"]["x-documentation-stats"]["endpoints_enhanced"],
            serde_json::json!(1)
        );
    }

    #[test]
    fn test_enhance_with_links() {
        let dir = fixture();
        let mut args = args(dir.path(), "out.json");
        args.app_title = Some("Gateway".to_string());
        args.api_links = vec![parse_api_link("Main API=/docs").unwrap()];
        execute(&args).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("out.json")).unwrap())
                .unwrap();
        assert_eq!(value["info"]["title"], serde_json::json!("Gateway"));
        assert_eq!(
            value["info"]["description"],
            serde_json::json!("APIs: [Main API](/docs)\n\n* * *\n\nGateway")
        );
    }

    #[test]
    fn test_api_link_parser() {
        let link = parse_api_link("Admin API = /admin/docs").unwrap();
        assert_eq!((link.description(), link.url()), ("Admin API", "/admin/docs"));
        assert!(parse_api_link("/docs").is_err());
        assert!(parse_api_link("Main API=").is_err());
    }

    #[test]
    fn test_language_parser() {
        assert_eq!(parse_language("py"), Ok(CodeLanguage::Python));
        assert!(parse_language("kotlin").is_err());
    }
}
