//! Summary tiers and recommendations derived from the findings.

use super::report::{
    EnhancementFailure, LintStatistics, LintSummary, Priority, Recommendation, Severity,
    SummaryStatus,
};

/// Coverage below this triggers a high-priority recommendation.
pub const COVERAGE_TARGET: f64 = 80.0;
/// Average completeness below this triggers a medium-priority recommendation.
pub const COMPLETENESS_TARGET: f64 = 70.0;
/// TODO count at which the TODO recommendation becomes high priority.
pub const TODO_HIGH_WATERMARK: usize = 10;

/// Rounds to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Counts the recommendations are derived from.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FindingCounts {
    /// Missing documentation entries.
    pub missing: usize,
    /// Incomplete documentation entries.
    pub incomplete: usize,
    /// Common mistakes.
    pub mistakes: usize,
    /// Orphaned documentation entries.
    pub orphaned: usize,
    /// Enhancement failures.
    pub enhancement_failures: usize,
    /// TODO markers.
    pub todos: usize,
}

impl FindingCounts {
    /// Every finding except TODO markers.
    pub fn total_issues(&self) -> usize {
        self.missing + self.incomplete + self.mistakes + self.orphaned + self.enhancement_failures
    }
}

/// Headline for `counts`.
pub fn build_summary(counts: &FindingCounts, statistics: &LintStatistics) -> LintSummary {
    let total = counts.total_issues();
    let (status, message) = match total {
        0 => (
            SummaryStatus::Good,
            "Excellent! No documentation issues found.".to_string(),
        ),
        1..=5 => (
            SummaryStatus::Good,
            format!("Good documentation with {} minor issues", total),
        ),
        6..=15 => (
            SummaryStatus::NeedsImprovement,
            format!("Documentation needs improvement: {} issues found", total),
        ),
        _ => (
            SummaryStatus::Poor,
            format!("Documentation needs significant work: {} issues found", total),
        ),
    };
    LintSummary {
        status,
        message,
        total_issues: total,
        todo_count: counts.todos,
        coverage: format!("{:.1}%", statistics.documentation_coverage_percentage),
        completeness: format!("{:.1}%", statistics.average_completeness_score),
    }
}

fn recommendation(
    priority: Priority,
    category: &str,
    title: impl Into<String>,
    description: impl Into<String>,
    action: impl Into<String>,
) -> Recommendation {
    Recommendation {
        priority,
        category: category.to_string(),
        title: title.into(),
        description: description.into(),
        action: action.into(),
    }
}

/// Action items, sorted by priority (stable within a priority).
pub fn build_recommendations(
    counts: &FindingCounts,
    statistics: &LintStatistics,
    enhancement_failures: &[EnhancementFailure],
) -> Vec<Recommendation> {
    let mut items = Vec::new();

    let critical = enhancement_failures
        .iter()
        .filter(|f| f.severity == Severity::Critical)
        .count();
    if critical > 0 {
        items.push(recommendation(
            Priority::Critical,
            "enhancement_failures",
            "Fix the enhancement process",
            format!("The schema enhancer failed {} time(s); documentation is not being published", critical),
            "Run the enhance command with --verbose and fix the reported error",
        ));
    }
    let other = enhancement_failures.len() - critical;
    if other > 0 {
        items.push(recommendation(
            Priority::High,
            "enhancement_failures",
            "Documentation is not applied to the schema",
            format!("{} documented endpoint(s) kept their original description after enhancement", other),
            "Check that endpoint headings match the schema paths and methods exactly",
        ));
    }
    if statistics.documentation_coverage_percentage < COVERAGE_TARGET {
        items.push(recommendation(
            Priority::High,
            "missing_documentation",
            "Improve documentation coverage",
            format!(
                "Only {:.1}% of schema endpoints are documented ({} missing)",
                statistics.documentation_coverage_percentage, counts.missing
            ),
            format!("Document the missing endpoints to reach at least {:.0}% coverage", COVERAGE_TARGET),
        ));
    }
    if counts.mistakes > 0 {
        items.push(recommendation(
            Priority::High,
            "common_mistakes",
            "Fix common documentation mistakes",
            format!("{} mistake(s) in endpoint headings, methods or duplicates", counts.mistakes),
            "Align endpoint headings with the schema paths and remove duplicate sections",
        ));
    }
    if statistics.average_completeness_score < COMPLETENESS_TARGET {
        items.push(recommendation(
            Priority::Medium,
            "incomplete_documentation",
            "Complete partially documented endpoints",
            format!(
                "Average completeness of incomplete endpoints is {:.1}%",
                statistics.average_completeness_score
            ),
            "Add summaries, descriptions, parameters and response examples",
        ));
    }
    if counts.orphaned > 0 {
        items.push(recommendation(
            Priority::Low,
            "orphaned_documentation",
            "Remove orphaned documentation",
            format!("{} documented endpoint(s) do not exist in the schema", counts.orphaned),
            "Delete the sections or add the endpoints to the schema",
        ));
    }
    if counts.todos > 0 {
        let priority = if counts.todos >= TODO_HIGH_WATERMARK {
            Priority::High
        } else {
            Priority::Medium
        };
        items.push(recommendation(
            priority,
            "todo_entries",
            format!("Resolve {} TODO item(s)", counts.todos),
            format!(
                "Found {} TODO entries marking unfinished documentation",
                counts.todos
            ),
            "Complete or remove each TODO marker",
        ));
    }

    items.sort_by_key(|r| r.priority);
    items
}
