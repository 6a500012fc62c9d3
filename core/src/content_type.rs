#![deny(missing_docs)]

//! # Content-Type Classifier
//!
//! Decides the MIME type of a raw response body and parses it when the format
//! has a structured representation.
//!
//! Detection is an ordered list of independent detectors. Each one either claims
//! the text (returning the parsed value) or passes. The first claim wins, so the
//! order encodes precedence between overlapping formats: Prometheus exposition
//! text looks like YAML, malformed JSON looks like a YAML flow mapping, and so on.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// `application/json`
pub const JSON: &str = "application/json";
/// `application/yaml`
pub const YAML: &str = "application/yaml";
/// `application/xml`
pub const XML: &str = "application/xml";
/// `text/html`
pub const HTML: &str = "text/html";
/// `text/csv`
pub const CSV: &str = "text/csv";
/// Prometheus text exposition format.
pub const PROMETHEUS: &str = "text/plain; version=0.0.4";
/// `text/plain`
pub const PLAIN_TEXT: &str = "text/plain";

/// Result of classifying a text block.
#[derive(Debug, Clone, PartialEq)]
pub struct Classified {
    /// Detected MIME type.
    pub content_type: &'static str,
    /// Parsed structure for JSON/YAML, the raw string otherwise.
    pub value: Value,
}

/// One step of the detection chain.
pub struct ContentDetector {
    /// Content type reported when this detector claims the text.
    pub content_type: &'static str,
    /// Returns the parsed value when the (trimmed) text belongs to this format.
    pub detect: fn(&str) -> Option<Value>,
}

/// The detection chain in priority order.
pub fn detectors() -> &'static [ContentDetector] {
    const CHAIN: &[ContentDetector] = &[
        ContentDetector {
            content_type: PROMETHEUS,
            detect: detect_prometheus,
        },
        ContentDetector {
            content_type: JSON,
            detect: detect_json,
        },
        ContentDetector {
            content_type: PLAIN_TEXT,
            detect: detect_malformed_json,
        },
        ContentDetector {
            content_type: XML,
            detect: detect_xml,
        },
        ContentDetector {
            content_type: HTML,
            detect: detect_html,
        },
        ContentDetector {
            content_type: CSV,
            detect: detect_csv,
        },
        ContentDetector {
            content_type: YAML,
            detect: detect_yaml,
        },
    ];
    CHAIN
}

/// Classifies `raw` and parses it where possible. Never fails.
pub fn classify_and_parse(raw: &str) -> Classified {
    let text = raw.trim();
    for detector in detectors() {
        if let Some(value) = (detector.detect)(text) {
            return Classified {
                content_type: detector.content_type,
                value,
            };
        }
    }
    Classified {
        content_type: PLAIN_TEXT,
        value: Value::String(text.to_string()),
    }
}

/// Content type only, discarding the parsed value.
pub fn detect_content_type(raw: &str) -> &'static str {
    classify_and_parse(raw).content_type
}

fn raw(text: &str) -> Value {
    Value::String(text.to_string())
}

fn looks_like_json(text: &str) -> bool {
    text.starts_with('{') || text.starts_with('[')
}

/// `# HELP` / `# TYPE` preamble, or a `name{labels} value` sample line.
pub fn detect_prometheus(text: &str) -> Option<Value> {
    static METRIC_RE: OnceLock<Regex> = OnceLock::new();
    let metric_re = METRIC_RE.get_or_init(|| {
        Regex::new(r"(?m)^[a-zA-Z_:][a-zA-Z0-9_:]*\{[^}]*\}\s+[-+]?(?:[0-9.]+(?:[eE][-+]?[0-9]+)?|NaN|[-+]?Inf)(?:\s+[0-9]+)?\s*$")
            .expect("Invalid regex")
    });
    if text.starts_with("# HELP") || text.starts_with("# TYPE") || metric_re.is_match(text) {
        return Some(raw(text));
    }
    None
}

/// Object or array root that parses as JSON.
pub fn detect_json(text: &str) -> Option<Value> {
    if !looks_like_json(text) {
        return None;
    }
    serde_json::from_str::<Value>(text).ok()
}

/// JSON-looking text that failed to parse degrades to plain text.
pub fn detect_malformed_json(text: &str) -> Option<Value> {
    looks_like_json(text).then(|| raw(text))
}

/// `<?xml` prolog, or a single element whose closing tag ends the text.
pub fn detect_xml(text: &str) -> Option<Value> {
    static OPEN_TAG_RE: OnceLock<Regex> = OnceLock::new();
    if text.starts_with("<?xml") {
        return Some(raw(text));
    }
    let open_tag_re = OPEN_TAG_RE
        .get_or_init(|| Regex::new(r"^<([A-Za-z_][\w:.-]*)[^>]*>").expect("Invalid regex"));
    let name = open_tag_re.captures(text)?.get(1)?.as_str();
    if name.eq_ignore_ascii_case("html") {
        return None;
    }
    text.ends_with(&format!("</{}>", name)).then(|| raw(text))
}

/// `<!DOCTYPE html` prefix or an `<html` tag anywhere.
pub fn detect_html(text: &str) -> Option<Value> {
    let lower = text.to_ascii_lowercase();
    (lower.starts_with("<!doctype html") || lower.contains("<html")).then(|| raw(text))
}

/// A header line of at least two fields followed by rows of the same width.
pub fn detect_csv(text: &str) -> Option<Value> {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
    let width = lines.next()?.split(',').count();
    if width < 2 {
        return None;
    }
    let mut rows = 0;
    for line in lines {
        if line.split(',').count() != width {
            return None;
        }
        rows += 1;
    }
    (rows > 0).then(|| raw(text))
}

/// A YAML document whose root is a mapping or a sequence.
///
/// Mappings with non-string keys cannot become JSON values; those keep the raw
/// string but are still reported as YAML.
pub fn detect_yaml(text: &str) -> Option<Value> {
    let doc: serde_yaml::Value = serde_yaml::from_str(text).ok()?;
    if !(doc.is_mapping() || doc.is_sequence()) {
        return None;
    }
    Some(serde_json::to_value(&doc).unwrap_or_else(|_| raw(text)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_json_object_and_array() {
        let c = classify_and_parse(r#"{"status": "success", "data": {"id": 123}}"#);
        assert_eq!(c.content_type, JSON);
        assert_eq!(c.value, json!({"status": "success", "data": {"id": 123}}));

        let c = classify_and_parse("[1, 2, 3]");
        assert_eq!(c.content_type, JSON);
        assert_eq!(c.value, json!([1, 2, 3]));
    }

    #[test]
    fn test_malformed_json_is_plain_text() {
        let c = classify_and_parse(r#"{"invalid": json content}"#);
        assert_eq!(c.content_type, PLAIN_TEXT);
        assert_eq!(c.value, json!(r#"{"invalid": json content}"#));
    }

    #[test]
    fn test_json_reclassification_is_stable() {
        let first = classify_and_parse(r#"{"users": [{"id": 1, "name": "Ada"}]}"#);
        let reserialized = serde_json::to_string_pretty(&first.value).unwrap();
        let second = classify_and_parse(&reserialized);
        assert_eq!(first, second);
    }

    #[test]
    fn test_prometheus() {
        let text = "# HELP http_requests_total Total requests\n# TYPE http_requests_total counter\nhttp_requests_total{method=\"get\"} 1027";
        let c = classify_and_parse(text);
        assert_eq!(c.content_type, PROMETHEUS);
        assert_eq!(c.value, json!(text));

        let samples = "up{job=\"api\"} 1\nprocess_cpu_seconds_total{job=\"api\"} 12.5";
        assert_eq!(detect_content_type(samples), PROMETHEUS);
    }

    #[test]
    fn test_xml() {
        assert_eq!(
            detect_content_type("<?xml version=\"1.0\"?><user><id>1</id></user>"),
            XML
        );
        assert_eq!(
            detect_content_type("<user id=\"1\"><name>Ada</name></user>"),
            XML
        );
    }

    #[test]
    fn test_html() {
        assert_eq!(
            detect_content_type("<!DOCTYPE html><html><body>Hi</body></html>"),
            HTML
        );
        assert_eq!(detect_content_type("<html><body>Hi</body></html>"), HTML);
    }

    #[test]
    fn test_csv() {
        assert_eq!(
            detect_content_type("name,age,city\nJohn,30,New York\nJane,25,Boston"),
            CSV
        );
        // Ragged rows are not CSV.
        assert_ne!(detect_content_type("a,b,c\n1,2"), CSV);
    }

    #[test]
    fn test_yaml() {
        let c = classify_and_parse("status: ok\nitems:\n  - 1\n  - 2");
        assert_eq!(c.content_type, YAML);
        assert_eq!(c.value, json!({"status": "ok", "items": [1, 2]}));

        let c = classify_and_parse("- a\n- b");
        assert_eq!(c.content_type, YAML);
    }

    #[test]
    fn test_plain_text_default() {
        let c = classify_and_parse("Plain text content without any specific format.");
        assert_eq!(c.content_type, PLAIN_TEXT);
        assert_eq!(c.value, json!("Plain text content without any specific format."));
    }

    #[test]
    fn test_detectors_are_independent() {
        assert!(detect_json("not json").is_none());
        assert!(detect_xml("plain").is_none());
        assert!(detect_csv("single").is_none());
        assert!(detect_yaml("just a scalar").is_none());
        assert!(detect_prometheus("{\"a\": 1}").is_none());
    }
}
