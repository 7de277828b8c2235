//! Segment record types shared by the reconciliation stages

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Audio payload as delivered by the upstream pipeline.
///
/// The field shape varies per response: absent on content-side records, a
/// single base64 string, or an ordered list of base64 chunks. Modeled as a
/// tagged variant at the boundary so the merge logic never branches on raw
/// JSON types.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum AudioField {
    #[default]
    Absent,
    Scalar(String),
    Chunks(Vec<String>),
}

impl AudioField {
    /// True when there is no usable payload
    pub fn is_empty(&self) -> bool {
        match self {
            AudioField::Absent => true,
            AudioField::Scalar(s) => s.is_empty(),
            AudioField::Chunks(chunks) => chunks.is_empty(),
        }
    }

    /// Total encoded length in characters, across chunks if chunked
    pub fn encoded_len(&self) -> usize {
        match self {
            AudioField::Absent => 0,
            AudioField::Scalar(s) => s.len(),
            AudioField::Chunks(chunks) => chunks.iter().map(String::len).sum(),
        }
    }
}

/// One segment as reported by one side of the pipeline response.
///
/// Audio-side records populate `audio_base64`; content-side records populate
/// `narration`, `image_url` and `duration`. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct SegmentRecord {
    pub segment_id: Option<i64>,
    #[serde(default)]
    pub audio_base64: AudioField,
    #[serde(default)]
    pub narration: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
}

/// Parse raw segment values into records, skipping entries whose shape does
/// not match (e.g. an audio field of an unexpected JSON type).
pub fn parse_records(values: &[Value], slot: usize) -> Vec<SegmentRecord> {
    values
        .iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value.clone()) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(slot, index, error = %e, "Skipping segment record with unexpected shape");
                None
            }
        })
        .collect()
}

/// The output unit returned to the client: one fully-assembled lesson
/// segment with recombined audio.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CombinedSegment {
    pub segment_id: i64,
    #[serde(rename = "audioBase64")]
    pub audio_base64: String,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
    pub narration: String,
    pub duration: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_audio_field_absent_when_missing() {
        let record: SegmentRecord =
            serde_json::from_value(json!({"segment_id": 1, "narration": "hi"})).unwrap();
        assert_eq!(record.audio_base64, AudioField::Absent);
        assert!(record.audio_base64.is_empty());
    }

    #[test]
    fn test_audio_field_absent_when_null() {
        let record: SegmentRecord =
            serde_json::from_value(json!({"segment_id": 1, "audio_base64": null})).unwrap();
        assert_eq!(record.audio_base64, AudioField::Absent);
    }

    #[test]
    fn test_audio_field_scalar() {
        let record: SegmentRecord =
            serde_json::from_value(json!({"segment_id": 1, "audio_base64": "QQ=="})).unwrap();
        assert_eq!(record.audio_base64, AudioField::Scalar("QQ==".into()));
        assert!(!record.audio_base64.is_empty());
        assert_eq!(record.audio_base64.encoded_len(), 4);
    }

    #[test]
    fn test_audio_field_chunks() {
        let record: SegmentRecord =
            serde_json::from_value(json!({"segment_id": 1, "audio_base64": ["QQ==", "Qg=="]}))
                .unwrap();
        assert_eq!(
            record.audio_base64,
            AudioField::Chunks(vec!["QQ==".into(), "Qg==".into()])
        );
        assert_eq!(record.audio_base64.encoded_len(), 8);
    }

    #[test]
    fn test_empty_chunk_list_is_empty() {
        let field = AudioField::Chunks(vec![]);
        assert!(field.is_empty());
    }

    #[test]
    fn test_parse_records_skips_unexpected_shapes() {
        let values = vec![
            json!({"segment_id": 1, "audio_base64": "QQ=="}),
            json!({"segment_id": 2, "audio_base64": 42}),
            json!({"segment_id": 3}),
        ];
        let records = parse_records(&values, 0);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].segment_id, Some(1));
        assert_eq!(records[1].segment_id, Some(3));
    }

    #[test]
    fn test_missing_segment_id_preserved_as_none() {
        let records = parse_records(&[json!({"narration": "no id"})], 1);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].segment_id, None);
    }

    #[test]
    fn test_combined_segment_serializes_client_field_names() {
        let segment = CombinedSegment {
            segment_id: 1,
            audio_base64: "QQ==".into(),
            image_url: Some("http://x/1.png".into()),
            narration: "Hello".into(),
            duration: Some(5.0),
        };
        let value = serde_json::to_value(&segment).unwrap();
        assert_eq!(
            value,
            json!({
                "segment_id": 1,
                "audioBase64": "QQ==",
                "imageUrl": "http://x/1.png",
                "narration": "Hello",
                "duration": 5.0
            })
        );
    }
}
