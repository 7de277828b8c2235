//! Audio chunk recombination
//!
//! The pipeline may deliver a segment's audio as one base64 string or as an
//! ordered list of base64 chunks, each encoding a contiguous byte range.
//! Chunked audio must be decoded chunk-by-chunk and the raw bytes
//! concatenated in delivery order before re-encoding once: base64 text
//! cannot be concatenated directly because chunk padding would corrupt the
//! byte stream.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

use super::segment::AudioField;

/// Per-segment audio failures. These exclude a single segment from the
/// merge; they never abort the request.
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("segment {segment_id}: no audio payload")]
    NoAudio { segment_id: i64 },

    #[error("segment {segment_id}: invalid base64 in chunk {chunk}: {source}")]
    InvalidBase64 {
        segment_id: i64,
        chunk: usize,
        source: base64::DecodeError,
    },
}

/// Normalize an audio field into a single base64 string.
///
/// Scalar payloads are stripped of a leading `data:...,` URI prefix and
/// validated; chunked payloads are decoded in list order, concatenated as
/// raw bytes, and re-encoded.
pub fn combine_audio(field: &AudioField, segment_id: i64) -> Result<String, AudioError> {
    match field {
        AudioField::Absent => Err(AudioError::NoAudio { segment_id }),
        AudioField::Scalar(encoded) => {
            let payload = strip_data_uri(encoded);
            STANDARD
                .decode(payload)
                .map_err(|source| AudioError::InvalidBase64 {
                    segment_id,
                    chunk: 0,
                    source,
                })?;
            Ok(payload.to_string())
        }
        AudioField::Chunks(chunks) => {
            let mut combined = Vec::new();
            for (index, chunk) in chunks.iter().enumerate() {
                let bytes =
                    STANDARD
                        .decode(chunk)
                        .map_err(|source| AudioError::InvalidBase64 {
                            segment_id,
                            chunk: index,
                            source,
                        })?;
                combined.extend_from_slice(&bytes);
            }
            tracing::debug!(
                segment_id,
                chunks = chunks.len(),
                bytes = combined.len(),
                "Recombined chunked audio"
            );
            Ok(STANDARD.encode(combined))
        }
    }
}

/// Strip a `data:<mime>;base64,` prefix, returning the payload after the
/// first comma. Strings without a data-URI prefix pass through unchanged.
fn strip_data_uri(encoded: &str) -> &str {
    if encoded.starts_with("data:") {
        match encoded.find(',') {
            Some(idx) => &encoded[idx + 1..],
            None => encoded,
        }
    } else {
        encoded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(bytes: &[u8]) -> String {
        STANDARD.encode(bytes)
    }

    #[test]
    fn test_scalar_passes_through() {
        let field = AudioField::Scalar("QQ==".into());
        assert_eq!(combine_audio(&field, 1).unwrap(), "QQ==");
    }

    #[test]
    fn test_scalar_strips_data_uri_prefix() {
        let field = AudioField::Scalar("data:audio/mp3;base64,QQ==".into());
        assert_eq!(combine_audio(&field, 1).unwrap(), "QQ==");
    }

    #[test]
    fn test_scalar_invalid_base64_reports_segment() {
        let field = AudioField::Scalar("not base64!!".into());
        let err = combine_audio(&field, 7).unwrap_err();
        assert!(matches!(
            err,
            AudioError::InvalidBase64 { segment_id: 7, chunk: 0, .. }
        ));
    }

    #[test]
    fn test_chunks_recombine_byte_exact() {
        let (b1, b2, b3) = (b"hello ".as_slice(), b"chunked ".as_slice(), b"world".as_slice());
        let field = AudioField::Chunks(vec![encode(b1), encode(b2), encode(b3)]);

        let combined = combine_audio(&field, 1).unwrap();
        let decoded = STANDARD.decode(&combined).unwrap();
        assert_eq!(decoded, b"hello chunked world");
    }

    #[test]
    fn test_chunks_differ_from_naive_text_concatenation() {
        // Padded chunks: concatenating the base64 text produces a string
        // that no longer decodes to the original byte sequence.
        let (b1, b2) = (b"A".as_slice(), b"B".as_slice());
        let field = AudioField::Chunks(vec![encode(b1), encode(b2)]);

        let combined = combine_audio(&field, 1).unwrap();
        let naive = format!("{}{}", encode(b1), encode(b2));

        assert_ne!(combined, naive);
        assert_eq!(STANDARD.decode(&combined).unwrap(), b"AB");
    }

    #[test]
    fn test_chunk_order_is_preserved() {
        let forward = AudioField::Chunks(vec![encode(b"ab"), encode(b"cd")]);
        let reversed = AudioField::Chunks(vec![encode(b"cd"), encode(b"ab")]);

        let forward_bytes = STANDARD
            .decode(combine_audio(&forward, 1).unwrap())
            .unwrap();
        let reversed_bytes = STANDARD
            .decode(combine_audio(&reversed, 1).unwrap())
            .unwrap();

        assert_eq!(forward_bytes, b"abcd");
        assert_eq!(reversed_bytes, b"cdab");
    }

    #[test]
    fn test_bad_chunk_aborts_with_index() {
        let field = AudioField::Chunks(vec![encode(b"ok"), "%%%".into()]);
        let err = combine_audio(&field, 3).unwrap_err();
        assert!(matches!(
            err,
            AudioError::InvalidBase64 { segment_id: 3, chunk: 1, .. }
        ));
    }

    #[test]
    fn test_absent_reports_no_audio() {
        let err = combine_audio(&AudioField::Absent, 9).unwrap_err();
        assert!(matches!(err, AudioError::NoAudio { segment_id: 9 }));
    }

    #[test]
    fn test_empty_chunk_list_yields_empty_payload() {
        let field = AudioField::Chunks(vec![]);
        assert_eq!(combine_audio(&field, 1).unwrap(), "");
    }
}
