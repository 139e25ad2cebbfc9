//! Record post-processing
//!
//! Records leave the tap as flat-ish JSON objects. Two normalizations are
//! applied before emission: nested `metadata` substructures are serialized
//! into a single JSON string field (downstream schemas treat metadata as
//! opaque), and oversized text fields are truncated to a fixed bound.

use serde_json::Value;

/// Upper bound on emitted string field length, in chars
pub const MAX_TEXT_CHARS: usize = 32_768;

/// Apply all post-processing steps to a record
pub fn clean_record(record: Value) -> Value {
    truncate_text_fields(stringify_metadata(record))
}

/// Recursively convert every `metadata` object or array property into a
/// JSON string
pub fn stringify_metadata(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let map = map
                .into_iter()
                .map(|(key, val)| {
                    if key == "metadata" && (val.is_object() || val.is_array()) {
                        let serialized =
                            serde_json::to_string(&val).unwrap_or_else(|_| String::new());
                        (key, Value::String(serialized))
                    } else {
                        (key, stringify_metadata(val))
                    }
                })
                .collect();
            Value::Object(map)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(stringify_metadata).collect()),
        other => other,
    }
}

/// Truncate string fields longer than [`MAX_TEXT_CHARS`]
pub fn truncate_text_fields(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(truncate_chars(s)),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, truncate_text_fields(v)))
                .collect(),
        ),
        Value::Array(items) => {
            Value::Array(items.into_iter().map(truncate_text_fields).collect())
        }
        other => other,
    }
}

fn truncate_chars(s: String) -> String {
    if s.chars().count() <= MAX_TEXT_CHARS {
        return s;
    }
    s.chars().take(MAX_TEXT_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_metadata_object_becomes_string() {
        let record = json!({"message_id": 1, "metadata": {"a": 1}});
        let cleaned = stringify_metadata(record);
        assert_eq!(cleaned["metadata"], json!("{\"a\":1}"));
    }

    #[test]
    fn test_metadata_array_becomes_string() {
        let record = json!({"metadata": [1, 2]});
        let cleaned = stringify_metadata(record);
        assert_eq!(cleaned["metadata"], json!("[1,2]"));
    }

    #[test]
    fn test_nested_metadata_converted() {
        let record = json!({"user": {"metadata": {"tier": "gold"}}, "items": [{"metadata": {}}]});
        let cleaned = stringify_metadata(record);
        assert_eq!(cleaned["user"]["metadata"], json!("{\"tier\":\"gold\"}"));
        assert_eq!(cleaned["items"][0]["metadata"], json!("{}"));
    }

    #[test]
    fn test_scalar_metadata_untouched() {
        let record = json!({"metadata": "already a string", "other": 7});
        let cleaned = stringify_metadata(record.clone());
        assert_eq!(cleaned, record);
    }

    #[test]
    fn test_truncates_long_text() {
        let long = "x".repeat(MAX_TEXT_CHARS + 100);
        let record = json!({"message": long});
        let cleaned = truncate_text_fields(record);
        assert_eq!(
            cleaned["message"].as_str().unwrap().chars().count(),
            MAX_TEXT_CHARS
        );
    }

    #[test]
    fn test_short_text_untouched() {
        let record = json!({"message": "hello", "count": 3});
        let cleaned = truncate_text_fields(record.clone());
        assert_eq!(cleaned, record);
    }

    #[test]
    fn test_clean_record_applies_both() {
        let long = "y".repeat(MAX_TEXT_CHARS + 1);
        let record = json!({"metadata": {"k": "v"}, "message": long});
        let cleaned = clean_record(record);
        assert!(cleaned["metadata"].is_string());
        assert_eq!(
            cleaned["message"].as_str().unwrap().chars().count(),
            MAX_TEXT_CHARS
        );
    }
}
