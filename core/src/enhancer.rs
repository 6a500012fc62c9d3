#![deny(missing_docs)]

//! # Schema Enhancer
//!
//! Merges documentation into an OpenAPI document: summaries, descriptions,
//! tags, code samples (`x-codeSamples`), response examples and parameter
//! examples. The input schema is never modified; a new document is returned.
//!
//! At the document level, `info.description` receives the optional API links
//! banner and the general documentation, and the root `tags` list receives the
//! overview text of every tag used by an operation.

use crate::analyzer::matching::MatcherConfig;
use crate::analyzer::{AnalyzerConfig, UnifiedEndpointAnalyzer};
use crate::error::{AppError, AppResult};
use crate::loader::{LoaderConfig, MarkdownDocumentationLoader};
use crate::models::{
    CodeLanguage, CodeSample, DocumentationData, EndpointDocumentation, HttpMethod,
};
use crate::samples::{CodeSampleGenerator, TemplateSampleGenerator};
use crate::schema::SchemaView;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeSet;
use std::path::Path;

/// A link to a related API rendered at the top of `info.description`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiLink {
    url: String,
    description: String,
}

impl ApiLink {
    /// Creates a link. Both parts must be non-empty.
    pub fn new(url: impl Into<String>, description: impl Into<String>) -> AppResult<Self> {
        let url = url.into();
        let description = description.into();
        if url.trim().is_empty() {
            return Err(AppError::Validation("URL cannot be empty".to_string()));
        }
        if description.trim().is_empty() {
            return Err(AppError::Validation(
                "Description cannot be empty".to_string(),
            ));
        }
        Ok(Self { url, description })
    }

    /// Link target.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Link text.
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Builds the API description block.
///
/// Layout: `APIs: [a](/a) | [b](/b)`, a `* * *` rule, then the application
/// line (`title - description`, or whichever of the two is set). Without an
/// application line, `original` takes its place.
pub fn build_info_description(
    app_title: Option<&str>,
    app_description: Option<&str>,
    api_links: &[ApiLink],
    original: Option<&str>,
) -> String {
    fn non_empty(s: Option<&str>) -> Option<&str> {
        s.map(str::trim).filter(|s| !s.is_empty())
    }
    let body = match (non_empty(app_title), non_empty(app_description)) {
        (Some(title), Some(description)) => Some(format!("{} - {}", title, description)),
        (Some(only), None) | (None, Some(only)) => Some(only.to_string()),
        (None, None) => non_empty(original).map(str::to_string),
    };

    if api_links.is_empty() {
        return body.unwrap_or_default();
    }
    let links: Vec<String> = api_links
        .iter()
        .map(|l| format!("[{}]({})", l.description, l.url))
        .collect();
    let mut out = format!("APIs: {}\n\n* * *\n", links.join(" | "));
    if let Some(body) = body {
        out.push('\n');
        out.push_str(&body);
    }
    out
}

/// What the enhancer adds.
#[derive(Debug, Clone, PartialEq)]
pub struct EnhancementConfig {
    /// Add `x-codeSamples`.
    pub include_code_samples: bool,
    /// Add response examples.
    pub include_response_examples: bool,
    /// Copy parameter examples.
    pub include_parameter_examples: bool,
    /// Languages generated when the documentation lacks them.
    pub code_sample_languages: Vec<CodeLanguage>,
    /// Base URL used in generated samples.
    pub base_url: String,
    /// Headers added to generated samples.
    pub custom_headers: IndexMap<String, String>,
    /// Links rendered at the top of `info.description`.
    pub api_links: Vec<ApiLink>,
    /// Replaces `info.title` and heads the description.
    pub app_title: Option<String>,
    /// Application line of the description.
    pub app_description: Option<String>,
}

impl Default for EnhancementConfig {
    fn default() -> Self {
        Self {
            include_code_samples: true,
            include_response_examples: true,
            include_parameter_examples: true,
            code_sample_languages: vec![
                CodeLanguage::Curl,
                CodeLanguage::Python,
                CodeLanguage::Javascript,
            ],
            base_url: "https://api.example.com".to_string(),
            custom_headers: IndexMap::new(),
            api_links: Vec::new(),
            app_title: None,
            app_description: None,
        }
    }
}

/// Counters recorded under `info.x-documentation-stats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EnhancementStats {
    /// Operations changed in any way.
    pub endpoints_enhanced: usize,
    /// Operations in the schema.
    pub total_endpoints: usize,
    /// `x-codeSamples` entries added.
    pub code_samples_added: usize,
    /// Response examples added.
    pub examples_added: usize,
    /// Descriptions replaced.
    pub descriptions_enhanced: usize,
}

/// Produces an enhanced copy of a schema.
pub trait SchemaEnhancer {
    /// Returns `schema` enriched with `docs`.
    ///
    /// Failures are reported as [`AppError::Enhancement`] with the cause kept.
    fn enhance(&self, schema: &Value, docs: &DocumentationData) -> AppResult<Value>;
}

/// Default [`SchemaEnhancer`].
pub struct OpenApiEnhancer {
    config: EnhancementConfig,
    matcher: MatcherConfig,
    generator: Box<dyn CodeSampleGenerator + Send + Sync>,
}

impl OpenApiEnhancer {
    /// Enhancer generating samples with a [`TemplateSampleGenerator`].
    pub fn new(config: EnhancementConfig) -> Self {
        let generator = TemplateSampleGenerator::new(config.base_url.clone())
            .with_headers(config.custom_headers.clone());
        Self {
            config,
            matcher: MatcherConfig::default(),
            generator: Box::new(generator),
        }
    }

    /// Replaces the sample generator.
    pub fn with_generator(mut self, generator: Box<dyn CodeSampleGenerator + Send + Sync>) -> Self {
        self.generator = generator;
        self
    }

    /// Replaces the matcher thresholds.
    pub fn with_matcher(mut self, matcher: MatcherConfig) -> Self {
        self.matcher = matcher;
        self
    }

    /// Enhances `schema` and returns the counters alongside it.
    pub fn enhance_with_stats(
        &self,
        schema: &Value,
        docs: &DocumentationData,
    ) -> AppResult<(Value, EnhancementStats)> {
        let view = SchemaView::from_value(schema.clone())
            .map_err(|e| AppError::enhancement("Cannot enhance an invalid schema", e))?;
        let analyzer = UnifiedEndpointAnalyzer::with_config(
            &view,
            AnalyzerConfig {
                matcher: self.matcher,
                ..AnalyzerConfig::default()
            },
        );
        let keys = analyzer.extract_openapi_endpoints(|_| false);
        let matches = analyzer.match_endpoints(&keys, &docs.endpoints);

        let mut stats = EnhancementStats {
            total_endpoints: keys.len(),
            ..EnhancementStats::default()
        };
        let mut enhanced = schema.clone();

        for found in &matches {
            let Some(doc) = found.endpoint_doc else {
                continue;
            };
            let operation = enhanced
                .get_mut("paths")
                .and_then(|paths| paths.get_mut(&found.openapi_path))
                .and_then(|item| item.get_mut(found.openapi_method.schema_key()))
                .and_then(Value::as_object_mut)
                .ok_or_else(|| {
                    AppError::Enhancement(
                        format!("Operation {} is not a mapping", found.key()),
                        None,
                    )
                })?;
            let generated = if self.config.include_code_samples {
                let documented: BTreeSet<CodeLanguage> =
                    doc.code_samples.iter().map(|s| s.language).collect();
                let wanted: Vec<CodeLanguage> = self
                    .config
                    .code_sample_languages
                    .iter()
                    .copied()
                    .filter(|l| !documented.contains(l))
                    .collect();
                analyzer.generate_code_samples(doc, &wanted, self.generator.as_ref())
            } else {
                Vec::new()
            };
            if self.enhance_operation(operation, doc, &generated, &mut stats) {
                stats.endpoints_enhanced += 1;
            }
        }

        if let Some(root) = enhanced.as_object_mut() {
            merge_tag_descriptions(root, &docs.tag_descriptions);
            let info = root.entry("info").or_insert_with(|| json!({}));
            if let Some(info) = info.as_object_mut() {
                self.enhance_info(info, docs.general_docs.as_deref());
                let recorded = serde_json::to_value(stats).map_err(|e| {
                    AppError::Enhancement(format!("Cannot record statistics: {}", e), None)
                })?;
                info.insert("x-documentation-stats".to_string(), recorded);
            }
        }

        log::info!(
            "Enhanced {}/{} endpoints ({} code samples, {} examples)",
            stats.endpoints_enhanced,
            stats.total_endpoints,
            stats.code_samples_added,
            stats.examples_added
        );
        Ok((enhanced, stats))
    }

    fn enhance_info(&self, info: &mut Map<String, Value>, general_docs: Option<&str>) {
        let config = &self.config;
        if let Some(title) = config.app_title.as_deref().filter(|t| !t.trim().is_empty()) {
            info.insert("title".to_string(), json!(title));
        }
        if !config.api_links.is_empty()
            || config.app_title.is_some()
            || config.app_description.is_some()
        {
            let description = build_info_description(
                config.app_title.as_deref(),
                config.app_description.as_deref(),
                &config.api_links,
                info.get("description").and_then(Value::as_str),
            );
            info.insert("description".to_string(), json!(description));
        }

        let Some(general) = general_docs.map(str::trim).filter(|g| !g.is_empty()) else {
            return;
        };
        let description = match info.get("description").and_then(Value::as_str) {
            Some(existing) if existing.contains(general) => return,
            Some(existing) if !existing.trim().is_empty() => {
                format!("{}\n\n{}", existing.trim_end(), general)
            }
            _ => general.to_string(),
        };
        info.insert("description".to_string(), json!(description));
    }

    fn enhance_operation(
        &self,
        operation: &mut Map<String, Value>,
        doc: &EndpointDocumentation,
        generated: &[CodeSample],
        stats: &mut EnhancementStats,
    ) -> bool {
        let mut changed = false;

        if let Some(summary) = doc.summary.as_deref().filter(|s| !s.trim().is_empty()) {
            let empty = operation
                .get("summary")
                .and_then(Value::as_str)
                .map_or(true, |s| s.trim().is_empty());
            if empty {
                operation.insert("summary".to_string(), json!(summary));
                changed = true;
            }
        }

        if let Some(description) = doc.description.as_deref().filter(|s| !s.trim().is_empty()) {
            if operation.get("description").and_then(Value::as_str) != Some(description) {
                operation.insert("description".to_string(), json!(description));
                stats.descriptions_enhanced += 1;
                changed = true;
            }
        }

        if !doc.tags.is_empty() {
            let tags = operation
                .entry("tags")
                .or_insert_with(|| json!([]));
            if let Some(tags) = tags.as_array_mut() {
                for tag in &doc.tags {
                    if !tags.iter().any(|t| t.as_str() == Some(tag)) {
                        tags.push(json!(tag));
                        changed = true;
                    }
                }
            }
        }

        if doc.deprecated && operation.get("deprecated") != Some(&Value::Bool(true)) {
            operation.insert("deprecated".to_string(), Value::Bool(true));
            changed = true;
        }

        if self.config.include_code_samples {
            let added = add_code_samples(operation, doc.code_samples.iter().chain(generated));
            stats.code_samples_added += added;
            changed |= added > 0;
        }

        if self.config.include_response_examples {
            let added = add_response_examples(operation, doc);
            stats.examples_added += added;
            changed |= added > 0;
        }

        if self.config.include_parameter_examples {
            changed |= add_parameter_examples(operation, doc);
        }

        changed
    }
}

impl SchemaEnhancer for OpenApiEnhancer {
    fn enhance(&self, schema: &Value, docs: &DocumentationData) -> AppResult<Value> {
        self.enhance_with_stats(schema, docs).map(|(value, _)| value)
    }
}

fn add_code_samples<'a>(
    operation: &mut Map<String, Value>,
    samples: impl Iterator<Item = &'a CodeSample>,
) -> usize {
    let entries = operation
        .entry("x-codeSamples")
        .or_insert_with(|| json!([]));
    let Some(entries) = entries.as_array_mut() else {
        log::warn!("Skipping code samples: existing x-codeSamples is not a list");
        return 0;
    };
    let mut added = 0;
    for sample in samples {
        let entry = json!({
            "lang": sample.language.as_str(),
            "label": sample
                .title
                .clone()
                .unwrap_or_else(|| sample.language.display_name().to_string()),
            "source": sample.code(),
        });
        if !entries.contains(&entry) {
            entries.push(entry);
            added += 1;
        }
    }
    added
}

fn schema_type(value: &Value) -> &'static str {
    match value {
        Value::Array(_) => "array",
        Value::String(_) => "string",
        Value::Number(_) => "number",
        Value::Bool(_) => "boolean",
        Value::Object(_) | Value::Null => "object",
    }
}

fn add_response_examples(operation: &mut Map<String, Value>, doc: &EndpointDocumentation) -> usize {
    let mut added = 0;
    for example in &doc.response_examples {
        let Some(value) = example
            .content
            .clone()
            .or_else(|| example.raw_content.clone().map(Value::String))
        else {
            continue;
        };
        let code = example.status_code().to_string();
        let description = if example.description.trim().is_empty() {
            format!("{} response", code)
        } else {
            example.description.clone()
        };
        let content_type = example
            .content_type
            .clone()
            .unwrap_or_else(|| crate::content_type::JSON.to_string());

        let Some(responses) = operation
            .entry("responses")
            .or_insert_with(|| json!({}))
            .as_object_mut()
        else {
            return added;
        };
        let Some(response) = responses
            .entry(code.clone())
            .or_insert_with(|| json!({ "description": description }))
            .as_object_mut()
        else {
            continue;
        };
        let Some(media) = response
            .entry("content")
            .or_insert_with(|| json!({}))
            .as_object_mut()
            .and_then(|content| {
                content
                    .entry(content_type)
                    .or_insert_with(|| json!({}))
                    .as_object_mut()
            })
        else {
            continue;
        };
        media
            .entry("schema")
            .or_insert_with(|| json!({ "type": schema_type(&value) }));
        if let Some(examples) = media
            .entry("examples")
            .or_insert_with(|| json!({}))
            .as_object_mut()
        {
            let replaced = examples.insert(
                format!("example_{}", code),
                json!({ "summary": description, "value": value }),
            );
            if replaced.is_none() {
                added += 1;
            }
        }
    }
    added
}

/// Fills the root `tags` list for every tag used by an operation that has a
/// documented overview. Existing descriptions are kept.
fn merge_tag_descriptions(root: &mut Map<String, Value>, descriptions: &IndexMap<String, String>) {
    if descriptions.is_empty() {
        return;
    }
    let mut used: Vec<String> = Vec::new();
    for item in root
        .get("paths")
        .and_then(Value::as_object)
        .into_iter()
        .flat_map(|paths| paths.values())
    {
        let Some(item) = item.as_object() else {
            continue;
        };
        for (method, operation) in item {
            if HttpMethod::from_schema_key(method).is_none() {
                continue;
            }
            let tags = operation.get("tags").and_then(Value::as_array);
            for tag in tags.into_iter().flatten().filter_map(Value::as_str) {
                if !used.iter().any(|u| u == tag) {
                    used.push(tag.to_string());
                }
            }
        }
    }

    let described: Vec<(&String, &String)> = used
        .iter()
        .filter_map(|tag| descriptions.get(tag).map(|text| (tag, text)))
        .collect();
    if described.is_empty() {
        return;
    }
    let Some(entries) = root
        .entry("tags")
        .or_insert_with(|| json!([]))
        .as_array_mut()
    else {
        log::warn!("Skipping tag descriptions: existing tags is not a list");
        return;
    };
    for (tag, text) in described {
        let existing = entries
            .iter_mut()
            .filter_map(Value::as_object_mut)
            .find(|entry| entry.get("name").and_then(Value::as_str) == Some(tag.as_str()));
        match existing {
            Some(entry) => {
                let blank = entry
                    .get("description")
                    .and_then(Value::as_str)
                    .map_or(true, |d| d.trim().is_empty());
                if blank {
                    entry.insert("description".to_string(), json!(text));
                }
            }
            None => entries.push(json!({ "name": tag, "description": text })),
        }
    }
}

fn add_parameter_examples(operation: &mut Map<String, Value>, doc: &EndpointDocumentation) -> bool {
    let Some(params) = operation.get_mut("parameters").and_then(Value::as_array_mut) else {
        return false;
    };
    let mut changed = false;
    for param in params.iter_mut().filter_map(Value::as_object_mut) {
        let Some(name) = param.get("name").and_then(Value::as_str) else {
            continue;
        };
        let example = doc
            .parameters
            .iter()
            .find(|p| p.name() == name)
            .and_then(|p| p.example.clone());
        if let Some(example) = example {
            if param.get("example") != Some(&example) {
                param.insert("example".to_string(), example);
                changed = true;
            }
        }
    }
    changed
}

/// Loads `docs_dir` and enhances `schema`, returning the original schema on
/// any failure.
pub fn enhance_openapi_with_docs(
    schema: &Value,
    docs_dir: &Path,
    config: EnhancementConfig,
) -> Value {
    let enhanced = MarkdownDocumentationLoader::new(LoaderConfig::new(docs_dir))
        .and_then(|loader| loader.load_documentation())
        .and_then(|docs| OpenApiEnhancer::new(config).enhance(schema, &docs));
    match enhanced {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Enhancement failed, returning original schema: {}", e);
            schema.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HttpMethod, ParameterDocumentation, ResponseExample};
    use crate::samples::SampleRequest;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    fn schema() -> Value {
        json!({
            "openapi": "3.0.0",
            "info": {"title": "Users", "version": "1.0"},
            "paths": {
                "/users/{id}": {
                    "get": {
                        "summary": "",
                        "description": "Generated",
                        "parameters": [{"name": "id", "in": "path", "required": true}],
                        "responses": {"200": {"description": "OK"}}
                    }
                },
                "/health": {"get": {"summary": "Health"}}
            }
        })
    }

    fn docs() -> DocumentationData {
        let mut doc = EndpointDocumentation::new(HttpMethod::Get, "/users/{user_id}").unwrap();
        doc.summary = Some("Fetch a user".to_string());
        doc.description = Some("Returns one user.".to_string());
        doc.add_tag("Users");
        doc.deprecated = true;
        let mut id = ParameterDocumentation::new("id", "User id").unwrap();
        id.example = Some(json!(42));
        doc.parameters.push(id);
        doc.code_samples
            .push(CodeSample::new(CodeLanguage::Curl, "curl https://x/users/42").unwrap());
        doc.response_examples.push(
            ResponseExample::from_raw(200, "Success", r#"{"id": 42}"#, None).unwrap(),
        );
        DocumentationData {
            endpoints: vec![doc],
            ..DocumentationData::default()
        }
    }

    #[test]
    fn test_enhance_merges_documentation() {
        let original = schema();
        let (enhanced, stats) = OpenApiEnhancer::new(EnhancementConfig::default())
            .enhance_with_stats(&original, &docs())
            .unwrap();

        let op = &enhanced["paths"]["/users/{id}"]["get"];
        assert_eq!(op["summary"], json!("Fetch a user"));
        assert_eq!(op["description"], json!("Returns one user."));
        assert_eq!(op["tags"], json!(["Users"]));
        assert_eq!(op["deprecated"], json!(true));
        assert_eq!(op["parameters"][0]["example"], json!(42));

        let samples = op["x-codeSamples"].as_array().unwrap();
        let langs: Vec<&str> = samples.iter().map(|s| s["lang"].as_str().unwrap()).collect();
        assert_eq!(langs, vec!["curl", "python", "javascript"]);
        assert_eq!(samples[1]["label"], json!("Python Request"));

        let media = &op["responses"]["200"]["content"]["application/json"];
        assert_eq!(media["schema"], json!({"type": "object"}));
        assert_eq!(
            media["examples"]["example_200"],
            json!({"summary": "Success", "value": {"id": 42}})
        );
        assert_eq!(op["responses"]["200"]["description"], json!("OK"));

        assert_eq!(
            stats,
            EnhancementStats {
                endpoints_enhanced: 1,
                total_endpoints: 2,
                code_samples_added: 3,
                examples_added: 1,
                descriptions_enhanced: 1,
            }
        );
        assert_eq!(
            enhanced["info"]["x-documentation-stats"]["total_endpoints"],
            json!(2)
        );
        assert_eq!(original, schema());
    }

    #[test]
    fn test_api_link_rejects_empty_parts() {
        assert!(matches!(ApiLink::new("", "Main API"), Err(AppError::Validation(_))));
        assert!(matches!(ApiLink::new("/docs", " "), Err(AppError::Validation(_))));
        let link = ApiLink::new("/docs", "Main API").unwrap();
        assert_eq!((link.url(), link.description()), ("/docs", "Main API"));
    }

    #[test]
    fn test_info_description_layout() {
        let links = vec![
            ApiLink::new("/docs", "Main API").unwrap(),
            ApiLink::new("/admin/docs", "Admin API").unwrap(),
        ];
        assert_eq!(
            build_info_description(Some("Test API"), Some("A test API service"), &links, Some("Original")),
            "APIs: [Main API](/docs) | [Admin API](/admin/docs)\n\n* * *\n\nTest API - A test API service"
        );
        assert_eq!(
            build_info_description(None, None, &links[..1], Some("Original")),
            "APIs: [Main API](/docs)\n\n* * *\n\nOriginal"
        );
        assert_eq!(
            build_info_description(None, None, &links[..1], None),
            "APIs: [Main API](/docs)\n\n* * *\n"
        );
        assert_eq!(build_info_description(Some("Custom API"), None, &[], Some("Original")), "Custom API");
        assert_eq!(build_info_description(None, Some("Custom service"), &[], None), "Custom service");
        assert_eq!(build_info_description(None, None, &[], Some("Original")), "Original");
        assert_eq!(build_info_description(None, None, &[], None), "");
    }

    #[test]
    fn test_app_title_and_links_rewrite_info() {
        let config = EnhancementConfig {
            api_links: vec![
                ApiLink::new("/docs", "Authorization").unwrap(),
                ApiLink::new("/storage/docs", "Storage").unwrap(),
            ],
            app_title: Some("My API Gateway".to_string()),
            app_description: Some("Access control service".to_string()),
            ..EnhancementConfig::default()
        };
        let enhanced = OpenApiEnhancer::new(config).enhance(&schema(), &docs()).unwrap();
        assert_eq!(enhanced["info"]["title"], json!("My API Gateway"));
        assert_eq!(
            enhanced["info"]["description"],
            json!("APIs: [Authorization](/docs) | [Storage](/storage/docs)\n\n* * *\n\nMy API Gateway - Access control service")
        );

        let untouched = OpenApiEnhancer::new(EnhancementConfig::default())
            .enhance(&schema(), &docs())
            .unwrap();
        assert_eq!(untouched["info"]["title"], json!("Users"));
        assert!(untouched["info"].get("description").is_none());
    }

    #[test]
    fn test_general_docs_extend_info_description_only() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("general_docs.md"),
            "# API General Documentation\n\nAll requests need an API key.\n\n## Getting Started\n\n1. Get a key\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("users.md"),
            "## GET /users/{id}\n\nRetrieve one user.\n\n### Parameters\n- `id` (integer, required): User id\n",
        )
        .unwrap();
        let mut original = schema();
        original["info"]["description"] = json!("Base");

        let enhanced = enhance_openapi_with_docs(&original, dir.path(), EnhancementConfig::default());

        let info = enhanced["info"]["description"].as_str().unwrap();
        assert!(info.starts_with("Base\n\n# API General Documentation"));
        assert!(info.contains("All requests need an API key."));
        assert!(info.contains("Getting Started"));

        let op = enhanced["paths"]["/users/{id}"]["get"]["description"]
            .as_str()
            .unwrap();
        assert!(op.contains("Retrieve one user."));
        assert!(op.contains("Parameters"));
        assert!(!op.contains("API key"));
        assert!(!op.contains("General Documentation"));
    }

    #[test]
    fn test_tag_descriptions_fill_root_tags() {
        let mut original = schema();
        original["tags"] = json!([
            {"name": "Users", "description": "Existing description"},
            {"name": "Admin"}
        ]);
        original["paths"]["/health"]["get"]["tags"] = json!(["Admin", "Ops"]);

        let mut data = docs();
        data.tag_descriptions.insert("Users".to_string(), "User accounts.".to_string());
        data.tag_descriptions.insert("Admin".to_string(), "Administration.".to_string());
        data.tag_descriptions.insert("Ops".to_string(), "Operations.".to_string());
        data.tag_descriptions.insert("Unused".to_string(), "Never referenced.".to_string());

        let enhanced = OpenApiEnhancer::new(EnhancementConfig::default())
            .enhance(&original, &data)
            .unwrap();
        assert_eq!(
            enhanced["tags"],
            json!([
                {"name": "Users", "description": "Existing description"},
                {"name": "Admin", "description": "Administration."},
                {"name": "Ops", "description": "Operations."}
            ])
        );
    }

    #[test]
    fn test_tag_descriptions_need_tagged_operations() {
        let mut data = docs();
        data.endpoints[0].tags.clear();
        data.tag_descriptions.insert("Unused".to_string(), "Never referenced.".to_string());
        let enhanced = OpenApiEnhancer::new(EnhancementConfig::default())
            .enhance(&schema(), &data)
            .unwrap();
        assert!(enhanced.get("tags").is_none());
    }

    #[test]
    fn test_shared_status_code_counts_one_example() {
        let mut data = docs();
        data.endpoints[0].response_examples.push(
            ResponseExample::from_raw(200, "Also success", r#"{"id": 7}"#, None).unwrap(),
        );
        let (enhanced, stats) = OpenApiEnhancer::new(EnhancementConfig::default())
            .enhance_with_stats(&schema(), &data)
            .unwrap();
        assert_eq!(stats.examples_added, 1);
        let examples = enhanced["paths"]["/users/{id}"]["get"]["responses"]["200"]["content"]
            ["application/json"]["examples"]
            .as_object()
            .unwrap();
        assert_eq!(examples.len(), 1);
    }

    #[test]
    fn test_disabled_features_are_skipped() {
        let config = EnhancementConfig {
            include_code_samples: false,
            include_response_examples: false,
            include_parameter_examples: false,
            ..EnhancementConfig::default()
        };
        let enhanced = OpenApiEnhancer::new(config).enhance(&schema(), &docs()).unwrap();
        let op = &enhanced["paths"]["/users/{id}"]["get"];
        assert!(op.get("x-codeSamples").is_none());
        assert!(op["responses"]["200"].get("content").is_none());
        assert!(op["parameters"][0].get("example").is_none());
    }

    #[test]
    fn test_invalid_schema_is_wrapped() {
        let err = OpenApiEnhancer::new(EnhancementConfig::default())
            .enhance(&json!({"info": {}}), &docs())
            .unwrap_err();
        match err {
            AppError::Enhancement(_, Some(cause)) => {
                assert!(matches!(*cause, AppError::Schema(_)))
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    struct Broken;

    impl CodeSampleGenerator for Broken {
        fn render(&self, _: &SampleRequest, _: CodeLanguage) -> AppResult<CodeSample> {
            Err(AppError::Generation("template missing".to_string()))
        }
    }

    #[test]
    fn test_generation_failure_does_not_abort() {
        let enhanced = OpenApiEnhancer::new(EnhancementConfig::default())
            .with_generator(Box::new(Broken))
            .enhance(&schema(), &docs())
            .unwrap();
        let samples = enhanced["paths"]["/users/{id}"]["get"]["x-codeSamples"]
            .as_array()
            .unwrap();
        assert_eq!(samples.len(), 1);
    }

    #[test]
    fn test_convenience_entry_falls_back() {
        let original = schema();
        let missing = enhance_openapi_with_docs(
            &original,
            Path::new("/definitely/not/here"),
            EnhancementConfig::default(),
        );
        assert_eq!(missing, original);

        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("api.md"),
            "## GET /health\n\nService health check.\n",
        )
        .unwrap();
        let enhanced = enhance_openapi_with_docs(&original, dir.path(), EnhancementConfig::default());
        assert_eq!(
            enhanced["paths"]["/health"]["get"]["description"],
            json!("Service health check.")
        );
    }
}
