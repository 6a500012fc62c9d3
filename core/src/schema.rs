#![deny(missing_docs)]

//! # Schema View
//!
//! Read-only access to the parts of an OpenAPI document the analyzer needs:
//! `paths` (operations keyed by method) and `info`.
//!
//! Construction validates the shape once so later lookups cannot fail.

use crate::error::{AppError, AppResult};
use crate::models::{EndpointKey, HttpMethod};
use serde_json::{Map, Value};
use std::path::Path;

/// One operation under `paths`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchemaOperation<'a> {
    /// HTTP verb.
    pub method: HttpMethod,
    /// Path template.
    pub path: &'a str,
    /// The operation object.
    pub operation: &'a Map<String, Value>,
}

impl SchemaOperation<'_> {
    /// The operation's key.
    pub fn key(&self) -> EndpointKey {
        EndpointKey::new(self.method, self.path)
    }

    /// String field of the operation (`summary`, `description`, `operationId`).
    pub fn text(&self, field: &str) -> Option<&str> {
        self.operation.get(field).and_then(Value::as_str)
    }
}

/// A validated OpenAPI document.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaView {
    root: Value,
}

impl SchemaView {
    /// Wraps `root`, failing unless it is a mapping with a `paths` mapping.
    pub fn from_value(root: Value) -> AppResult<Self> {
        let object = root
            .as_object()
            .ok_or_else(|| AppError::Schema("Schema root must be a mapping".to_string()))?;
        match object.get("paths") {
            None => Err(AppError::Schema(
                "Schema is missing the 'paths' mapping".to_string(),
            )),
            Some(paths) if !paths.is_object() => {
                Err(AppError::Schema("'paths' must be a mapping".to_string()))
            }
            Some(_) => Ok(Self { root }),
        }
    }

    /// Parses a JSON document.
    pub fn from_json_str(text: &str) -> AppResult<Self> {
        let value = serde_json::from_str(text)
            .map_err(|e| AppError::Schema(format!("Invalid JSON schema: {}", e)))?;
        Self::from_value(value)
    }

    /// Parses a YAML document.
    pub fn from_yaml_str(text: &str) -> AppResult<Self> {
        let value = serde_yaml::from_str(text)
            .map_err(|e| AppError::Schema(format!("Invalid YAML schema: {}", e)))?;
        Self::from_value(value)
    }

    /// Reads a schema file; `.json` is parsed as JSON, anything else as YAML.
    pub fn from_path(path: &Path) -> AppResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| AppError::Load(path.to_path_buf(), e.to_string()))?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&text)
        } else {
            Self::from_yaml_str(&text)
        }
    }

    /// The underlying document.
    pub fn as_value(&self) -> &Value {
        &self.root
    }

    /// Consumes the view, returning the document.
    pub fn into_value(self) -> Value {
        self.root
    }

    /// The `info` object, if present.
    pub fn info(&self) -> Option<&Map<String, Value>> {
        self.root.get("info").and_then(Value::as_object)
    }

    fn paths(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.root
            .get("paths")
            .and_then(Value::as_object)
            .into_iter()
            .flatten()
    }

    /// Every operation in document order. Non-verb keys (`parameters`,
    /// `summary`, `trace`...) and non-object entries are skipped.
    pub fn operations(&self) -> Vec<SchemaOperation<'_>> {
        let mut ops = Vec::new();
        for (path, item) in self.paths() {
            let Some(item) = item.as_object() else {
                continue;
            };
            for (key, operation) in item {
                let (Some(method), Some(operation)) =
                    (HttpMethod::from_schema_key(key), operation.as_object())
                else {
                    continue;
                };
                ops.push(SchemaOperation {
                    method,
                    path,
                    operation,
                });
            }
        }
        ops
    }

    /// Looks up one operation.
    pub fn operation(&self, method: HttpMethod, path: &str) -> Option<&Map<String, Value>> {
        self.root
            .get("paths")?
            .get(path)?
            .get(method.schema_key())?
            .as_object()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample() -> SchemaView {
        SchemaView::from_value(json!({
            "openapi": "3.0.0",
            "info": {"title": "Test", "version": "1.0"},
            "paths": {
                "/users": {
                    "parameters": [],
                    "get": {"summary": "List users"},
                    "post": {"summary": "Create user"}
                },
                "/health": {"options": {}, "trace": {}}
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_operations() {
        let schema = sample();
        let keys: Vec<String> = schema
            .operations()
            .iter()
            .map(|o| o.key().to_string())
            .collect();
        assert_eq!(keys, vec!["GET /users", "POST /users", "OPTIONS /health"]);
        assert_eq!(schema.operations()[0].text("summary"), Some("List users"));
    }

    #[test]
    fn test_operation_lookup() {
        let schema = sample();
        assert!(schema.operation(HttpMethod::Post, "/users").is_some());
        assert!(schema.operation(HttpMethod::Delete, "/users").is_none());
        assert!(schema.operation(HttpMethod::Get, "/missing").is_none());
    }

    #[test]
    fn test_malformed_schemas_fail() {
        assert!(matches!(
            SchemaView::from_value(json!({"info": {}})),
            Err(AppError::Schema(_))
        ));
        assert!(SchemaView::from_value(json!([1, 2])).is_err());
        assert!(SchemaView::from_value(json!({"paths": []})).is_err());
        assert!(SchemaView::from_json_str("{not json").is_err());
    }

    #[test]
    fn test_from_yaml_and_path() {
        let yaml = "openapi: 3.0.0\ninfo:\n  title: T\npaths:\n  /a:\n    get:\n      summary: A\n";
        let schema = SchemaView::from_yaml_str(yaml).unwrap();
        assert_eq!(schema.info().and_then(|i| i.get("title")), Some(&json!("T")));

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("openapi.json");
        std::fs::write(&file, r#"{"paths": {"/b": {"delete": {}}}}"#).unwrap();
        let schema = SchemaView::from_path(&file).unwrap();
        assert_eq!(schema.operations()[0].key().to_string(), "DELETE /b");
    }
}
