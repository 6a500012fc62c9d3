//! Completeness scoring of one documented endpoint.
//!
//! A single pass starts from 100 and deducts per-element weights, collecting
//! the missing elements and quality issues along the way.

use super::matching::{is_placeholder, segments};
use crate::models::EndpointDocumentation;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Deduction weights and minimum lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletenessWeights {
    /// Deduction for a missing or short summary.
    pub summary: u32,
    /// Deduction for a missing or short description.
    pub description: u32,
    /// Deduction for having no code samples.
    pub code_samples: u32,
    /// Deduction for having no response examples.
    pub response_examples: u32,
    /// Deduction for having exactly one response example.
    pub single_response_example: u32,
    /// Deduction for undocumented parameters.
    pub parameters: u32,
    /// Shortest acceptable summary, in characters.
    pub min_summary_length: usize,
    /// Shortest acceptable description, in characters.
    pub min_description_length: usize,
}

impl Default for CompletenessWeights {
    fn default() -> Self {
        Self {
            summary: 20,
            description: 25,
            code_samples: 0,
            response_examples: 20,
            single_response_example: 10,
            parameters: 10,
            min_summary_length: 10,
            min_description_length: 50,
        }
    }
}

/// A documentation element an endpoint lacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingElement {
    /// No summary.
    Summary,
    /// No description.
    Description,
    /// No code samples.
    CodeSamples,
    /// No response examples.
    ResponseExamples,
    /// Parameters exist but are not documented.
    Parameters,
}

impl MissingElement {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            MissingElement::Summary => "summary",
            MissingElement::Description => "description",
            MissingElement::CodeSamples => "code_samples",
            MissingElement::ResponseExamples => "response_examples",
            MissingElement::Parameters => "parameters",
        }
    }
}

impl fmt::Display for MissingElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of scoring one endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointAnalysis {
    /// Score in `0..=100`.
    pub completeness_score: u32,
    /// Elements that are absent.
    pub missing_elements: Vec<MissingElement>,
    /// Human-readable problems.
    pub quality_issues: Vec<String>,
    /// Whether generated content could still improve the endpoint.
    pub can_be_enhanced: bool,
}

fn char_len(text: &Option<String>) -> Option<usize> {
    text.as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| t.chars().count())
}

fn has_parameters(doc: &EndpointDocumentation, operation: Option<&Map<String, Value>>) -> bool {
    segments(doc.path()).into_iter().any(is_placeholder)
        || operation
            .and_then(|op| op.get("parameters"))
            .and_then(Value::as_array)
            .is_some_and(|params| !params.is_empty())
}

/// Scores `doc`, optionally against its schema operation.
pub fn score_endpoint(
    doc: &EndpointDocumentation,
    operation: Option<&Map<String, Value>>,
    weights: &CompletenessWeights,
) -> EndpointAnalysis {
    let mut deduction = 0u32;
    let mut missing = Vec::new();
    let mut issues = Vec::new();

    match char_len(&doc.summary) {
        None => {
            deduction += weights.summary;
            missing.push(MissingElement::Summary);
            issues.push("Missing summary".to_string());
        }
        Some(n) if n < weights.min_summary_length => {
            deduction += weights.summary;
            issues.push(format!(
                "Summary too short ({} characters, minimum {})",
                n, weights.min_summary_length
            ));
        }
        Some(_) => {}
    }

    match char_len(&doc.description) {
        None => {
            deduction += weights.description;
            missing.push(MissingElement::Description);
            issues.push("Missing description".to_string());
        }
        Some(n) if n < weights.min_description_length => {
            deduction += weights.description;
            issues.push(format!(
                "Description too short ({} characters, minimum {})",
                n, weights.min_description_length
            ));
        }
        Some(_) => {}
    }

    if doc.code_samples.is_empty() {
        deduction += weights.code_samples;
        missing.push(MissingElement::CodeSamples);
    }

    match doc.response_examples.len() {
        0 => {
            deduction += weights.response_examples;
            missing.push(MissingElement::ResponseExamples);
            issues.push("No response examples provided".to_string());
        }
        1 => deduction += weights.single_response_example,
        _ => {}
    }

    if doc.parameters.is_empty() && has_parameters(doc, operation) {
        deduction += weights.parameters;
        missing.push(MissingElement::Parameters);
        issues.push("Path has parameters but no parameter documentation".to_string());
    }

    let can_be_enhanced = !missing.is_empty() || doc.response_examples.len() == 1;
    EndpointAnalysis {
        completeness_score: 100u32.saturating_sub(deduction),
        missing_elements: missing,
        quality_issues: issues,
        can_be_enhanced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CodeLanguage, CodeSample, HttpMethod, ParameterDocumentation, ResponseExample};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn documented(path: &str) -> EndpointDocumentation {
        let mut doc = EndpointDocumentation::new(HttpMethod::Get, path).unwrap();
        doc.summary = Some("Get a user by id".to_string());
        doc.description = Some(
            "Returns the full user record including profile and account settings.".to_string(),
        );
        doc.response_examples
            .push(ResponseExample::new(200, "OK").unwrap());
        doc
    }

    #[test]
    fn test_reference_scenario_scores_eighty() {
        let analysis = score_endpoint(&documented("/users/{id}"), None, &CompletenessWeights::default());
        assert_eq!(analysis.completeness_score, 80);
        assert_eq!(
            analysis.missing_elements,
            vec![MissingElement::CodeSamples, MissingElement::Parameters]
        );
        assert_eq!(
            analysis.quality_issues,
            vec!["Path has parameters but no parameter documentation".to_string()]
        );
        assert!(analysis.can_be_enhanced);
    }

    #[test]
    fn test_fully_documented_scores_hundred() {
        let mut doc = documented("/users/{id}");
        doc.parameters.push(ParameterDocumentation::new("id", "User id").unwrap());
        doc.response_examples.push(ResponseExample::new(404, "Missing").unwrap());
        doc.code_samples
            .push(CodeSample::new(CodeLanguage::Curl, "curl /users/1").unwrap());
        let analysis = score_endpoint(&doc, None, &CompletenessWeights::default());
        assert_eq!(analysis.completeness_score, 100);
        assert!(analysis.missing_elements.is_empty());
        assert!(!analysis.can_be_enhanced);
    }

    #[test]
    fn test_empty_record_is_clamped() {
        let doc = EndpointDocumentation::new(HttpMethod::Post, "/users").unwrap();
        let weights = CompletenessWeights {
            code_samples: 50,
            ..CompletenessWeights::default()
        };
        let analysis = score_endpoint(&doc, None, &weights);
        assert_eq!(analysis.completeness_score, 0);
        assert_eq!(
            analysis.quality_issues,
            vec![
                "Missing summary".to_string(),
                "Missing description".to_string(),
                "No response examples provided".to_string(),
            ]
        );
    }

    #[test]
    fn test_short_fields_are_issues_not_missing() {
        let mut doc = documented("/users");
        doc.summary = Some("Users".to_string());
        doc.description = Some("Lists users.".to_string());
        let analysis = score_endpoint(&doc, None, &CompletenessWeights::default());
        assert_eq!(analysis.completeness_score, 100 - 20 - 25 - 10);
        assert_eq!(analysis.missing_elements, vec![MissingElement::CodeSamples]);
        assert_eq!(
            analysis.quality_issues[0],
            "Summary too short (5 characters, minimum 10)"
        );
    }

    #[test]
    fn test_schema_parameters_require_docs() {
        let doc = documented("/users");
        let op = json!({"parameters": [{"name": "limit", "in": "query"}]});
        let analysis = score_endpoint(&doc, op.as_object(), &CompletenessWeights::default());
        assert!(analysis.missing_elements.contains(&MissingElement::Parameters));
        assert_eq!(analysis.completeness_score, 80);
    }
}
