//! Pipeline output normalization and segment extraction
//!
//! A result slot's `output` arrives either as a JSON-encoded string or as an
//! already-structured value, depending on the pipeline step that produced
//! it. Normalization collapses both shapes into one structured value before
//! any field access happens.

use serde_json::Value;

use crate::core::constants::PREVIEW_MAX_CHARS;
use crate::utils::string::truncate_preview;

use super::error::LessonError;

/// Normalize a raw output slot into a structured value.
pub fn normalize_output(output: Option<&Value>, slot: usize) -> Result<Value, LessonError> {
    let Some(value) = output else {
        return Err(LessonError::MissingOutput { slot });
    };

    match value {
        Value::Null => Err(LessonError::MissingOutput { slot }),
        Value::String(text) => {
            if text.trim().is_empty() {
                return Err(LessonError::MissingOutput { slot });
            }
            match serde_json::from_str(text) {
                Ok(parsed) => {
                    tracing::debug!(slot, "Parsed result slot output from JSON string");
                    Ok(parsed)
                }
                Err(source) => Err(LessonError::MalformedJson {
                    slot,
                    preview: truncate_preview(text, PREVIEW_MAX_CHARS),
                    source,
                }),
            }
        }
        other => {
            tracing::debug!(slot, "Result slot output is already structured");
            Ok(other.clone())
        }
    }
}

/// Extract the segment list from a normalized output.
///
/// An empty list is rejected: a response with zero segments cannot produce
/// a lesson, so it fails here rather than as an empty success downstream.
pub fn extract_segments(parsed: &Value, slot: usize) -> Result<Vec<Value>, LessonError> {
    match parsed.get("segments") {
        Some(Value::Array(items)) if items.is_empty() => Err(LessonError::SegmentsEmpty { slot }),
        Some(Value::Array(items)) => {
            tracing::debug!(slot, count = items.len(), "Found segments");
            Ok(items.clone())
        }
        _ => Err(LessonError::SegmentsNotList { slot }),
    }
}

/// Read a non-empty `topic` field from a normalized output
pub fn topic_of(parsed: &Value) -> Option<String> {
    parsed
        .get("topic")
        .and_then(Value::as_str)
        .filter(|t| !t.trim().is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_structured_output_passes_through() {
        let value = json!({"topic": "Rust", "segments": [{"segment_id": 1}]});
        let parsed = normalize_output(Some(&value), 0).unwrap();
        assert_eq!(parsed, value);
    }

    #[test]
    fn test_string_output_is_parsed() {
        let value = json!(r#"{"topic": "Rust", "segments": []}"#);
        let parsed = normalize_output(Some(&value), 0).unwrap();
        assert_eq!(parsed["topic"], "Rust");
    }

    #[test]
    fn test_missing_output_is_an_error() {
        let err = normalize_output(None, 1).unwrap_err();
        assert!(matches!(err, LessonError::MissingOutput { slot: 1 }));
    }

    #[test]
    fn test_null_output_is_an_error() {
        let err = normalize_output(Some(&Value::Null), 0).unwrap_err();
        assert!(matches!(err, LessonError::MissingOutput { slot: 0 }));
    }

    #[test]
    fn test_empty_string_output_is_an_error() {
        let err = normalize_output(Some(&json!("   ")), 0).unwrap_err();
        assert!(matches!(err, LessonError::MissingOutput { slot: 0 }));
    }

    #[test]
    fn test_invalid_json_string_carries_bounded_preview() {
        let text = format!("not json {}", "x".repeat(400));
        let err = normalize_output(Some(&json!(text)), 1).unwrap_err();
        match err {
            LessonError::MalformedJson { slot, preview, .. } => {
                assert_eq!(slot, 1);
                assert!(preview.chars().count() <= 203);
                assert!(preview.starts_with("not json"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_segments_extracted() {
        let parsed = json!({"segments": [{"segment_id": 1}, {"segment_id": 2}]});
        let segments = extract_segments(&parsed, 0).unwrap();
        assert_eq!(segments.len(), 2);
    }

    #[test]
    fn test_empty_segments_is_an_error_not_empty_success() {
        let parsed = json!({"segments": []});
        let err = extract_segments(&parsed, 0).unwrap_err();
        assert!(matches!(err, LessonError::SegmentsEmpty { slot: 0 }));
    }

    #[test]
    fn test_missing_segments_is_not_a_list() {
        let err = extract_segments(&json!({"topic": "t"}), 1).unwrap_err();
        assert!(matches!(err, LessonError::SegmentsNotList { slot: 1 }));
    }

    #[test]
    fn test_non_list_segments_is_not_a_list() {
        let err = extract_segments(&json!({"segments": "oops"}), 0).unwrap_err();
        assert!(matches!(err, LessonError::SegmentsNotList { slot: 0 }));
    }

    #[test]
    fn test_topic_of_skips_blank_values() {
        assert_eq!(topic_of(&json!({"topic": "Rust"})), Some("Rust".into()));
        assert_eq!(topic_of(&json!({"topic": "  "})), None);
        assert_eq!(topic_of(&json!({"topic": 42})), None);
        assert_eq!(topic_of(&json!({})), None);
    }
}
