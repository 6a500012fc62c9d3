#![deny(missing_docs)]

//! # Report Formatting
//!
//! Renders a [`LintReport`] as text or JSON.

use crate::error::{CliError, CliResult};
use markdocs_core::lint::report::{LintReport, SummaryStatus};

/// Entries shown per section unless `--all` is given.
pub const DEFAULT_LIMIT: usize = 10;

/// Pretty-printed JSON.
pub fn render_json(report: &LintReport) -> CliResult<String> {
    serde_json::to_string_pretty(report)
        .map_err(|e| CliError::General(format!("Cannot serialize report: {}", e)))
}

fn section<T>(
    out: &mut Vec<String>,
    title: &str,
    items: &[T],
    show_all: bool,
    render: impl Fn(&T) -> Vec<String>,
) {
    if items.is_empty() {
        return;
    }
    let heading = format!("{} ({})", title, items.len());
    out.push(String::new());
    out.push(heading.clone());
    out.push("-".repeat(heading.len()));
    let shown = if show_all { items.len() } else { DEFAULT_LIMIT.min(items.len()) };
    for item in &items[..shown] {
        out.extend(render(item));
    }
    if shown < items.len() {
        out.push(format!(
            "  ... and {} more (use --all to show everything)",
            items.len() - shown
        ));
    }
}

/// Human-readable report. Each section lists at most [`DEFAULT_LIMIT`]
/// entries unless `show_all` is set.
pub fn render_text(report: &LintReport, show_all: bool) -> String {
    let summary = &report.summary;
    let stats = &report.statistics;
    let status = match summary.status {
        SummaryStatus::Good => "GOOD",
        SummaryStatus::NeedsImprovement => "NEEDS IMPROVEMENT",
        SummaryStatus::Poor => "POOR",
    };

    let mut out = vec![
        "Documentation Lint Report".to_string(),
        "=========================".to_string(),
        format!("Status: {} - {}", status, summary.message),
        format!(
            "Coverage: {} ({} schema endpoints, {} documented)",
            summary.coverage, stats.total_openapi_endpoints, stats.total_documented_endpoints
        ),
        format!("Completeness: {}", summary.completeness),
        format!("Issues: {} | TODOs: {}", summary.total_issues, summary.todo_count),
    ];

    section(&mut out, "Missing Documentation", &report.missing_documentation, show_all, |m| {
        let mut lines = vec![match &m.summary {
            Some(s) => format!("  {} {} - {}", m.method, m.path, s),
            None => format!("  {} {}", m.method, m.path),
        }];
        if !m.similar_documented_paths.is_empty() {
            lines.push(format!(
                "      similar documented paths: {}",
                m.similar_documented_paths.join(", ")
            ));
        }
        lines
    });

    section(
        &mut out,
        "Incomplete Documentation",
        &report.incomplete_documentation,
        show_all,
        |e| {
            let mut lines = vec![format!(
                "  {} {} (score {}/100)",
                e.method, e.path, e.completeness_score
            )];
            lines.extend(e.issues.iter().map(|i| format!("      - {}", i)));
            lines.extend(e.suggestions.iter().map(|s| format!("      > {}", s)));
            lines
        },
    );

    section(&mut out, "Common Mistakes", &report.common_mistakes, show_all, |m| {
        vec![
            format!("  [{}] {}: {}", m.severity, m.kind.as_str(), m.message),
            format!("      > {}", m.suggestion),
        ]
    });

    section(
        &mut out,
        "Orphaned Documentation",
        &report.orphaned_documentation,
        show_all,
        |o| vec![format!("  {} {} - {}", o.method, o.path, o.suggestion)],
    );

    section(
        &mut out,
        "Enhancement Failures",
        &report.enhancement_failures,
        show_all,
        |f| vec![format!("  [{}] {}", f.severity, f.message)],
    );

    section(&mut out, "TODO Items", &report.todo_entries, show_all, |t| {
        vec![format!("  {}:{} {} ({})", t.file, t.line, t.todo_text, t.context)]
    });

    section(&mut out, "Recommendations", &report.recommendations, show_all, |r| {
        vec![
            format!("  [{}] {}", r.priority, r.title),
            format!("      {}", r.description),
            format!("      > {}", r.action),
        ]
    });

    out.push(String::new());
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use markdocs_core::{lint, LintOptions};
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    fn report_with_missing(count: usize) -> LintReport {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("api.md"), "# API\n\nTODO: everything\n").unwrap();
        let paths: serde_json::Map<String, serde_json::Value> = (0..count)
            .map(|i| (format!("/items{}", i), json!({"get": {"summary": "Item"}})))
            .collect();
        lint(&json!({ "paths": paths }), dir.path(), LintOptions::default()).unwrap()
    }

    #[test]
    fn test_text_truncates_sections() {
        let report = report_with_missing(12);
        let text = render_text(&report, false);
        assert!(text.starts_with("Documentation Lint Report"));
        assert!(text.contains("Missing Documentation (12)"));
        assert!(text.contains("  GET /items0 - Item"));
        assert!(text.contains("... and 2 more (use --all to show everything)"));
        assert!(text.contains("api.md:3 everything (in general documentation)"));

        let full = render_text(&report, true);
        assert!(!full.contains("... and"));
        assert!(full.contains("GET /items9 - Item"));
    }

    #[test]
    fn test_json_is_parseable() {
        let report = report_with_missing(1);
        let value: serde_json::Value = serde_json::from_str(&render_json(&report).unwrap()).unwrap();
        assert_eq!(value["statistics"]["total_openapi_endpoints"], json!(1));
        assert_eq!(value["missing_documentation"][0]["method"], json!("GET"));
    }
}
