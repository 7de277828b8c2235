//! Audio role detection
//!
//! The pipeline returns two segment lists whose slot order is not
//! guaranteed: either slot may carry the audio stream. The role is derived
//! from the lists themselves by sampling leading records for a populated
//! audio field, never from slot position.

use crate::core::constants::AUDIO_SAMPLE_DEPTH;

use super::error::LessonError;
use super::segment::SegmentRecord;

/// Which of the two argument lists carries audio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioRole {
    First,
    Second,
}

#[derive(Debug, Clone, Copy)]
pub struct RoleAssignment {
    pub audio: AudioRole,
    /// True when both lists carried audio and a tie-break decided the role
    pub ambiguous: bool,
}

/// Determine which list is the audio list.
///
/// A list "has audio" when any of its first `AUDIO_SAMPLE_DEPTH` records
/// carries a non-empty audio field. When both qualify the list with the
/// larger average sampled audio length wins, with ties falling back to the
/// first argument; the ambiguity is surfaced as a warning event.
pub fn detect_audio_role(
    first: &[SegmentRecord],
    second: &[SegmentRecord],
) -> Result<RoleAssignment, LessonError> {
    let first_has = has_audio(first);
    let second_has = has_audio(second);

    match (first_has, second_has) {
        (true, false) => Ok(RoleAssignment {
            audio: AudioRole::First,
            ambiguous: false,
        }),
        (false, true) => Ok(RoleAssignment {
            audio: AudioRole::Second,
            ambiguous: false,
        }),
        (false, false) => Err(LessonError::NoAudioFound),
        (true, true) => {
            let first_avg = average_audio_len(first);
            let second_avg = average_audio_len(second);
            let audio = if second_avg > first_avg {
                AudioRole::Second
            } else {
                AudioRole::First
            };
            tracing::warn!(
                first_avg,
                second_avg,
                chosen = ?audio,
                "Both segment lists carry audio; preferring the larger average payload"
            );
            Ok(RoleAssignment {
                audio,
                ambiguous: true,
            })
        }
    }
}

fn has_audio(records: &[SegmentRecord]) -> bool {
    records
        .iter()
        .take(AUDIO_SAMPLE_DEPTH)
        .any(|record| !record.audio_base64.is_empty())
}

/// Mean encoded audio length over the sampled records
fn average_audio_len(records: &[SegmentRecord]) -> f64 {
    let sampled = records.len().min(AUDIO_SAMPLE_DEPTH);
    if sampled == 0 {
        return 0.0;
    }
    let total: usize = records
        .iter()
        .take(sampled)
        .map(|record| record.audio_base64.encoded_len())
        .sum();
    total as f64 / sampled as f64
}
