//! Lesson segment reconciliation
//!
//! The generation pipeline answers a lesson request with two independently
//! produced result slots: one carries per-segment audio, the other carries
//! per-segment narration, images and timing. Neither the slot order nor the
//! audio encoding (scalar vs. chunked base64) is stable, so this module
//! detects which slot is which, repairs chunked audio, and joins the two
//! lists by segment identifier. The whole stage is pure: no I/O beyond
//! tracing, fully exercisable in tests.

pub mod audio;
pub mod error;
pub mod merge;
pub mod output;
pub mod roles;
pub mod segment;

pub use error::LessonError;
pub use merge::{MergeReport, SkipReason};
pub use roles::AudioRole;
pub use segment::{AudioField, CombinedSegment, SegmentRecord};

use crate::core::constants::MIN_RESULT_SLOTS;
use crate::data::pipeline::PipelineSlot;

/// A fully reconciled lesson, ready to serialize for the client
#[derive(Debug)]
pub struct Lesson {
    pub topic: String,
    pub segments: Vec<CombinedSegment>,
    pub report: MergeReport,
}

/// Reconcile the pipeline's result slots into a lesson.
///
/// `fallback_topic` is the user's original input, used when neither slot
/// reports a topic of its own.
pub fn build_lesson(slots: &[PipelineSlot], fallback_topic: &str) -> Result<Lesson, LessonError> {
    if slots.len() < MIN_RESULT_SLOTS {
        return Err(LessonError::IncompleteResult { found: slots.len() });
    }

    for (index, slot) in slots.iter().take(MIN_RESULT_SLOTS).enumerate() {
        tracing::debug!(
            slot = index,
            step_id = slot.step_id.as_deref().unwrap_or("-"),
            step_type = slot.step_type.as_deref().unwrap_or("-"),
            "Inspecting result slot"
        );
    }

    let parsed_first = output::normalize_output(slots[0].output.as_ref(), 0)?;
    let parsed_second = output::normalize_output(slots[1].output.as_ref(), 1)?;

    let segments_first = output::extract_segments(&parsed_first, 0)?;
    let segments_second = output::extract_segments(&parsed_second, 1)?;

    let records_first = segment::parse_records(&segments_first, 0);
    let records_second = segment::parse_records(&segments_second, 1);

    let assignment = roles::detect_audio_role(&records_first, &records_second)?;
    let (audio_records, content_records, audio_parsed, content_parsed) = match assignment.audio {
        AudioRole::First => (&records_first, &records_second, &parsed_first, &parsed_second),
        AudioRole::Second => (&records_second, &records_first, &parsed_second, &parsed_first),
    };

    tracing::info!(
        audio_slot = match assignment.audio {
            AudioRole::First => 0,
            AudioRole::Second => 1,
        },
        ambiguous = assignment.ambiguous,
        audio_segments = audio_records.len(),
        content_segments = content_records.len(),
        "Detected segment roles"
    );

    let (segments, report) = merge::merge_segments(audio_records, content_records)?;

    let topic = output::topic_of(audio_parsed)
        .or_else(|| output::topic_of(content_parsed))
        .unwrap_or_else(|| fallback_topic.to_string());

    tracing::info!(
        topic = %topic,
        segments = segments.len(),
        "Assembled lesson"
    );

    Ok(Lesson {
        topic,
        segments,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn slot(output: serde_json::Value) -> PipelineSlot {
        PipelineSlot {
            step_id: Some("step".into()),
            step_type: Some("Agent".into()),
            output: Some(output),
        }
    }

    #[test]
    fn test_lesson_built_from_structured_slots() {
        let audio_slot = slot(json!({
            "segments": [{"segment_id": 1, "audio_base64": "QQ=="}]
        }));
        let content_slot = slot(json!({
            "topic": "Photosynthesis",
            "segments": [{
                "segment_id": 1,
                "narration": "Hello",
                "image_url": "http://x/1.png",
                "duration": 5
            }]
        }));

        let lesson = build_lesson(&[audio_slot, content_slot], "fallback").unwrap();

        assert_eq!(lesson.topic, "Photosynthesis");
        assert_eq!(lesson.segments.len(), 1);
        assert_eq!(lesson.segments[0].audio_base64, "QQ==");
        assert_eq!(lesson.segments[0].narration, "Hello");
    }

    #[test]
    fn test_roles_detected_when_slots_are_swapped() {
        let content_slot = slot(json!({
            "segments": [{"segment_id": 1, "narration": "Hello"}]
        }));
        let audio_slot = slot(json!({
            "segments": [{"segment_id": 1, "audio_base64": "QQ=="}]
        }));

        let lesson = build_lesson(&[content_slot, audio_slot], "topic").unwrap();
        assert_eq!(lesson.segments[0].audio_base64, "QQ==");
        assert_eq!(lesson.segments[0].narration, "Hello");
    }

    #[test]
    fn test_string_encoded_outputs_are_normalized() {
        let audio_slot = slot(json!(
            r#"{"segments": [{"segment_id": 1, "audio_base64": "QQ=="}]}"#
        ));
        let content_slot = slot(json!(
            r#"{"topic": "Rust", "segments": [{"segment_id": 1, "narration": "n"}]}"#
        ));

        let lesson = build_lesson(&[audio_slot, content_slot], "fallback").unwrap();
        assert_eq!(lesson.topic, "Rust");
    }

    #[test]
    fn test_topic_falls_back_to_user_input() {
        let audio_slot = slot(json!({
            "segments": [{"segment_id": 1, "audio_base64": "QQ=="}]
        }));
        let content_slot = slot(json!({
            "segments": [{"segment_id": 1, "narration": "n"}]
        }));

        let lesson = build_lesson(&[audio_slot, content_slot], "volcanoes").unwrap();
        assert_eq!(lesson.topic, "volcanoes");
    }

    #[test]
    fn test_audio_side_topic_wins() {
        let audio_slot = slot(json!({
            "topic": "from audio",
            "segments": [{"segment_id": 1, "audio_base64": "QQ=="}]
        }));
        let content_slot = slot(json!({
            "topic": "from content",
            "segments": [{"segment_id": 1, "narration": "n"}]
        }));

        let lesson = build_lesson(&[audio_slot, content_slot], "fallback").unwrap();
        assert_eq!(lesson.topic, "from audio");
    }

    #[test]
    fn test_too_few_slots_is_an_error() {
        let only = slot(json!({"segments": [{"segment_id": 1, "audio_base64": "QQ=="}]}));
        let err = build_lesson(&[only], "t").unwrap_err();
        assert!(matches!(err, LessonError::IncompleteResult { found: 1 }));
    }

    #[test]
    fn test_missing_output_propagates_slot_index() {
        let audio_slot = slot(json!({
            "segments": [{"segment_id": 1, "audio_base64": "QQ=="}]
        }));
        let empty = PipelineSlot {
            step_id: None,
            step_type: None,
            output: None,
        };

        let err = build_lesson(&[audio_slot, empty], "t").unwrap_err();
        assert!(matches!(err, LessonError::MissingOutput { slot: 1 }));
    }

    #[test]
    fn test_skipped_ids_reported_end_to_end() {
        let audio_slot = slot(json!({
            "segments": [
                {"segment_id": 1, "audio_base64": "QQ=="},
                {"segment_id": 3, "audio_base64": "Qg=="}
            ]
        }));
        let content_slot = slot(json!({
            "segments": [
                {"segment_id": 1, "narration": "a"},
                {"segment_id": 2, "narration": "b"}
            ]
        }));

        let lesson = build_lesson(&[audio_slot, content_slot], "t").unwrap();

        let ids: Vec<i64> = lesson.segments.iter().map(|s| s.segment_id).collect();
        assert_eq!(ids, vec![1]);
        assert_eq!(lesson.report.skipped.len(), 2);
    }
}
