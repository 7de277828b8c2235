//! Segment merger
//!
//! Joins the audio-role and content-role segment lists on `segment_id`.
//! A combined segment exists only for identifiers present on both sides;
//! everything else is skipped with a recorded reason. Output ordering is
//! ascending `segment_id` regardless of input order; callers rely on this.

use std::collections::{BTreeMap, BTreeSet};

use super::audio::combine_audio;
use super::error::LessonError;
use super::segment::{CombinedSegment, SegmentRecord};

/// Why an identifier was excluded from the merged output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingFromAudio,
    MissingFromContent,
    EmptyAudioAfterDecode,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::MissingFromAudio => "missing-from-audio",
            SkipReason::MissingFromContent => "missing-from-content",
            SkipReason::EmptyAudioAfterDecode => "empty-audio-after-decode",
        }
    }
}

/// Diagnostic companion to the merged output
#[derive(Debug, Default)]
pub struct MergeReport {
    /// Identifiers excluded from the output, with the reason each was skipped
    pub skipped: Vec<(i64, SkipReason)>,
    /// Audio-side records dropped for lacking a segment identifier
    pub audio_records_without_id: usize,
    /// Content-side records dropped for lacking a segment identifier
    pub content_records_without_id: usize,
}

struct ContentEntry {
    narration: String,
    image_url: Option<String>,
    duration: Option<f64>,
}

/// Merge the audio and content segment lists into combined segments.
///
/// Fails with `NoValidSegments` only when nothing usable remains; every
/// per-segment problem is recovered by exclusion and recorded in the report.
pub fn merge_segments(
    audio: &[SegmentRecord],
    content: &[SegmentRecord],
) -> Result<(Vec<CombinedSegment>, MergeReport), LessonError> {
    let mut report = MergeReport::default();

    // Identifier -> recombined audio. Records whose audio cannot be decoded
    // (or decodes to nothing) are tracked separately so the skip reason can
    // distinguish them from identifiers the audio side never produced.
    let mut audio_map: BTreeMap<i64, String> = BTreeMap::new();
    let mut audio_unusable: BTreeSet<i64> = BTreeSet::new();

    for record in audio {
        let Some(segment_id) = record.segment_id else {
            tracing::warn!("Skipping audio segment with no segment_id");
            report.audio_records_without_id += 1;
            continue;
        };

        if record.audio_base64.is_empty() {
            tracing::warn!(segment_id, "Audio segment has no audio payload");
            audio_unusable.insert(segment_id);
            continue;
        }

        match combine_audio(&record.audio_base64, segment_id) {
            Ok(encoded) if !encoded.is_empty() => {
                tracing::debug!(
                    segment_id,
                    audio_length = encoded.len(),
                    "Mapped audio segment"
                );
                audio_map.insert(segment_id, encoded);
            }
            Ok(_) => {
                tracing::warn!(segment_id, "Audio payload empty after decoding");
                audio_unusable.insert(segment_id);
            }
            Err(e) => {
                tracing::warn!(segment_id, error = %e, "Excluding segment with undecodable audio");
                audio_unusable.insert(segment_id);
            }
        }
    }

    let mut content_map: BTreeMap<i64, ContentEntry> = BTreeMap::new();
    for record in content {
        let Some(segment_id) = record.segment_id else {
            tracing::warn!("Skipping content segment with no segment_id");
            report.content_records_without_id += 1;
            continue;
        };
        content_map.insert(
            segment_id,
            ContentEntry {
                narration: record.narration.clone().unwrap_or_default(),
                image_url: record.image_url.clone(),
                duration: record.duration,
            },
        );
    }

    // Union of identifiers seen on either side, ascending.
    let all_ids: BTreeSet<i64> = audio_map
        .keys()
        .chain(audio_unusable.iter())
        .chain(content_map.keys())
        .copied()
        .collect();

    let mut combined = Vec::new();
    for segment_id in all_ids {
        let Some(audio_base64) = audio_map.get(&segment_id) else {
            let reason = if audio_unusable.contains(&segment_id) {
                SkipReason::EmptyAudioAfterDecode
            } else {
                SkipReason::MissingFromAudio
            };
            tracing::warn!(segment_id, reason = reason.as_str(), "Skipping segment");
            report.skipped.push((segment_id, reason));
            continue;
        };

        let Some(entry) = content_map.get(&segment_id) else {
            tracing::warn!(
                segment_id,
                reason = SkipReason::MissingFromContent.as_str(),
                "Skipping segment"
            );
            report
                .skipped
                .push((segment_id, SkipReason::MissingFromContent));
            continue;
        };

        combined.push(CombinedSegment {
            segment_id,
            audio_base64: audio_base64.clone(),
            image_url: entry.image_url.clone(),
            narration: entry.narration.clone(),
            duration: entry.duration,
        });
    }

    // Should not trigger after the join above; re-checked before serving.
    combined.retain(|segment| {
        if segment.audio_base64.is_empty() {
            tracing::warn!(segment_id = segment.segment_id, "Dropping segment with empty audio");
            false
        } else {
            true
        }
    });

    if combined.is_empty() {
        return Err(LessonError::NoValidSegments);
    }

    tracing::info!(
        segments = combined.len(),
        skipped = report.skipped.len(),
        "Combined segments"
    );

    Ok((combined, report))
}
