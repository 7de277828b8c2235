//! Lesson reconciliation errors
//!
//! These cover whole-response failures that abort the request. Per-segment
//! failures (bad identifiers, undecodable audio) are recovered locally by
//! the merger and never surface here unless nothing usable remains.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LessonError {
    /// The pipeline returned fewer result slots than the lesson flow needs
    #[error("invalid pipeline response: expected at least 2 result slots, found {found}")]
    IncompleteResult { found: usize },

    /// A result slot carried no output at all
    #[error("missing output in result slot {slot}")]
    MissingOutput { slot: usize },

    /// A result slot's output was a string but not valid JSON
    #[error("failed to parse result slot {slot} output as JSON: {source}")]
    MalformedJson {
        slot: usize,
        preview: String,
        source: serde_json::Error,
    },

    /// The `segments` field was absent or not a list
    #[error("invalid pipeline response: result slot {slot} segments is not a list")]
    SegmentsNotList { slot: usize },

    /// The `segments` list was present but empty
    #[error("invalid pipeline response: result slot {slot} segments is empty")]
    SegmentsEmpty { slot: usize },

    /// Neither segment list carried audio in its sampled records
    #[error("invalid pipeline response: neither result slot contains audio data")]
    NoAudioFound,

    /// Every candidate segment was dropped during the merge
    #[error("no valid segments could be assembled from the pipeline response")]
    NoValidSegments,
}
