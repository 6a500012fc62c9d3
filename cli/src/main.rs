#![deny(missing_docs)]

//! # Markdocs CLI
//!
//! Command Line Interface for markdown-backed OpenAPI documentation.
//!
//! Supported Commands:
//! - `lint`: Checks documentation coverage and quality against a schema.
//! - `enhance`: Merges the documentation into a copy of the schema.

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use crate::generator::ShellExecutor;

mod enhance;
mod error;
mod format;
mod generator;
mod lint;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Markdown documentation linter and OpenAPI enhancer")]
struct Cli {
    /// Enable debug logging (overrides RUST_LOG).
    #[clap(long, short, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Lint documentation against an OpenAPI schema. Exits with 1 when issues are found.
    Lint(lint::LintArgs),
    /// Write an OpenAPI schema enriched with the documentation.
    Enhance(enhance::EnhanceArgs),
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match &cli.command {
        Commands::Lint(args) => lint::execute(args, &ShellExecutor),
        Commands::Enhance(args) => enhance::execute(args).map(|()| false),
    };

    match result {
        Ok(false) => ExitCode::SUCCESS,
        Ok(true) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli_structure() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_lint_flags() {
        let cli = Cli::try_parse_from([
            "markdocs",
            "lint",
            "--openapi",
            "api.json",
            "--format",
            "json",
            "--no-recursive",
            "--all",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Lint(args) => {
                assert_eq!(args.format, Some(lint::FormatArg::Json));
                assert!(args.no_recursive);
                assert!(args.all);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_enhance_languages() {
        let cli = Cli::try_parse_from([
            "markdocs",
            "enhance",
            "--openapi",
            "api.yaml",
            "--languages",
            "curl,ts,golang",
        ])
        .unwrap();
        match cli.command {
            Commands::Enhance(args) => assert_eq!(
                args.languages,
                vec![
                    markdocs_core::CodeLanguage::Curl,
                    markdocs_core::CodeLanguage::Typescript,
                    markdocs_core::CodeLanguage::Go,
                ]
            ),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
