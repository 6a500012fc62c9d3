//! TODO marker inventory.

use super::report::TodoEntry;
use crate::markdown::{lex, outline, LineKind};
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Context of a marker outside any endpoint section.
pub const GENERAL_CONTEXT: &str = "in general documentation";

fn todo_re() -> &'static Regex {
    static TODO_RE: OnceLock<Regex> = OnceLock::new();
    TODO_RE.get_or_init(|| Regex::new(r"(?i)\btodo\b:?\s*(.*)").expect("Invalid regex"))
}

/// Finds TODO markers in `text`, labelling entries with `file`.
///
/// Markers inside code blocks count too; the context is the endpoint section
/// the line belongs to.
pub fn scan_todos(text: &str, file: &str) -> Vec<TodoEntry> {
    let raw: Vec<&str> = text.lines().collect();
    let lines = lex(text, 1);
    let sections = outline(&lines);

    let mut context: HashMap<usize, String> = HashMap::new();
    for section in &sections.sections {
        let label = format!("in endpoint {} {}", section.method, section.path);
        context.insert(section.heading_line, label.clone());
        for line in section.body {
            context.insert(line.number, label.clone());
        }
    }

    lines
        .iter()
        .filter_map(|line| {
            let content = match line.kind {
                LineKind::Heading { text, .. } => text,
                LineKind::Code(s) | LineKind::Text(s) => s,
                _ => return None,
            };
            let caps = todo_re().captures(content)?;
            let todo_text = caps
                .get(1)
                .map_or("", |m| m.as_str())
                .trim()
                .trim_end_matches("-->")
                .trim_end();
            Some(TodoEntry {
                file: file.to_string(),
                line: line.number,
                content: raw
                    .get(line.number - 1)
                    .map_or(content, |l| l.trim())
                    .to_string(),
                todo_text: todo_text.to_string(),
                context: context
                    .get(&line.number)
                    .cloned()
                    .unwrap_or_else(|| GENERAL_CONTEXT.to_string()),
            })
        })
        .collect()
}
