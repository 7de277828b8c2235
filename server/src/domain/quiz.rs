//! Quiz payload extraction
//!
//! The quiz pipeline answers with a single result value: usually a markdown
//! string wrapping a JSON document in a ```json fence, occasionally the
//! bare JSON, occasionally an already-structured value. Extraction tolerates
//! all three, then reshapes each question into the client format by
//! resolving the correct answer's position within its options.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use utoipa::ToSchema;

use crate::core::constants::PREVIEW_MAX_CHARS;
use crate::utils::string::truncate_preview;

static JSON_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```json\s*\n(.*?)\n```").expect("valid fence regex"));

#[derive(Error, Debug)]
pub enum QuizError {
    #[error("failed to parse quiz JSON: {source}")]
    MalformedJson {
        preview: String,
        source: serde_json::Error,
    },

    #[error("no quiz array found in response")]
    NoQuizArray,

    #[error("no valid questions found in quiz")]
    NoValidQuestions,
}

/// One quiz question in the client-facing shape
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct QuizQuestion {
    /// 1-based position among the kept questions, renumbered sequentially
    pub id: usize,
    pub question: String,
    pub options: Vec<String>,
    #[serde(rename = "correctAnswer")]
    pub correct_answer: usize,
}

/// Extract quiz questions from the pipeline's result value, whatever its
/// delivery shape.
pub fn extract_quiz_from_result(result: &Value) -> Result<Vec<QuizQuestion>, QuizError> {
    match result {
        Value::String(raw) => extract_quiz(raw),
        other => {
            tracing::debug!("Quiz result is already structured");
            questions_from_document(other)
        }
    }
}

/// Extract quiz questions from a raw result string.
pub fn extract_quiz(raw: &str) -> Result<Vec<QuizQuestion>, QuizError> {
    let candidate = match JSON_FENCE.captures(raw) {
        Some(captures) => {
            tracing::debug!("Extracted JSON from markdown code fence");
            captures
                .get(1)
                .map(|m| m.as_str())
                .unwrap_or_default()
                .trim()
        }
        None => {
            tracing::debug!("No markdown code fence found, using result as-is");
            raw.trim()
        }
    };

    let document: Value =
        serde_json::from_str(candidate).map_err(|source| QuizError::MalformedJson {
            preview: truncate_preview(candidate, PREVIEW_MAX_CHARS),
            source,
        })?;

    questions_from_document(&document)
}

fn questions_from_document(document: &Value) -> Result<Vec<QuizQuestion>, QuizError> {
    let Some(Value::Array(entries)) = document.get("quiz") else {
        return Err(QuizError::NoQuizArray);
    };

    let mut questions = Vec::new();
    for (index, entry) in entries.iter().enumerate() {
        let question = entry
            .get("question")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let Some(options) = string_options(entry.get("options")) else {
            tracing::warn!(index, "Dropping question with malformed options");
            continue;
        };

        let correct_text = entry
            .get("correct_answer")
            .and_then(Value::as_str)
            .unwrap_or_default();

        let Some(correct_answer) = resolve_answer(&options, correct_text) else {
            tracing::warn!(
                index,
                correct_answer = correct_text,
                "Dropping question whose correct answer is not among its options"
            );
            continue;
        };

        questions.push(QuizQuestion {
            id: 0, // renumbered below over kept questions
            question,
            options,
            correct_answer,
        });
    }

    if questions.is_empty() {
        return Err(QuizError::NoValidQuestions);
    }

    for (position, question) in questions.iter_mut().enumerate() {
        question.id = position + 1;
    }

    tracing::info!(questions = questions.len(), "Formatted quiz questions");
    Ok(questions)
}

/// Options must be a list of strings; anything else disqualifies the entry
fn string_options(value: Option<&Value>) -> Option<Vec<String>> {
    let Some(Value::Array(items)) = value else {
        return None;
    };
    items
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}

/// Resolve the correct answer's index: exact match first, then a
/// case-insensitive trimmed match.
fn resolve_answer(options: &[String], correct: &str) -> Option<usize> {
    options.iter().position(|option| option == correct).or_else(|| {
        let normalized = correct.trim().to_lowercase();
        options
            .iter()
            .position(|option| option.trim().to_lowercase() == normalized)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const FENCED: &str = "Here is your quiz:\n```json\n{\"quiz\": [{\"question\": \"Capital of France?\", \"options\": [\"Paris\", \"London\"], \"correct_answer\": \"Paris\"}]}\n```\nEnjoy!";

    #[test]
    fn test_extracts_from_markdown_fence() {
        let questions = extract_quiz(FENCED).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].question, "Capital of France?");
        assert_eq!(questions[0].correct_answer, 0);
    }

    #[test]
    fn test_bare_json_without_fence() {
        let raw = r#"{"quiz": [{"question": "Q", "options": ["a", "b"], "correct_answer": "b"}]}"#;
        let questions = extract_quiz(raw).unwrap();
        assert_eq!(questions[0].correct_answer, 1);
    }

    #[test]
    fn test_structured_result_value() {
        let result = json!({
            "quiz": [{"question": "Q", "options": ["a", "b"], "correct_answer": "a"}]
        });
        let questions = extract_quiz_from_result(&result).unwrap();
        assert_eq!(questions.len(), 1);
    }

    #[test]
    fn test_malformed_json_carries_preview() {
        let err = extract_quiz("definitely { not json").unwrap_err();
        match err {
            QuizError::MalformedJson { preview, .. } => {
                assert!(preview.contains("definitely"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_quiz_array() {
        let err = extract_quiz(r#"{"questions": []}"#).unwrap_err();
        assert!(matches!(err, QuizError::NoQuizArray));
    }

    #[test]
    fn test_quiz_field_must_be_a_list() {
        let err = extract_quiz(r#"{"quiz": "nope"}"#).unwrap_err();
        assert!(matches!(err, QuizError::NoQuizArray));
    }

    #[test]
    fn test_case_insensitive_answer_resolution() {
        let raw = r#"{"quiz": [{
            "question": "Capital of Germany?",
            "options": ["Paris", "London", "Berlin"],
            "correct_answer": "berlin"
        }]}"#;
        let questions = extract_quiz(raw).unwrap();
        assert_eq!(questions[0].correct_answer, 2);
    }

    #[test]
    fn test_trimmed_answer_resolution() {
        let raw = r#"{"quiz": [{
            "question": "Q",
            "options": ["Yes", "No"],
            "correct_answer": "  yes "
        }]}"#;
        let questions = extract_quiz(raw).unwrap();
        assert_eq!(questions[0].correct_answer, 0);
    }

    #[test]
    fn test_exact_match_takes_precedence() {
        // Both an exact and a case-folded candidate exist; exact wins.
        let raw = r#"{"quiz": [{
            "question": "Q",
            "options": ["ABC", "abc"],
            "correct_answer": "abc"
        }]}"#;
        let questions = extract_quiz(raw).unwrap();
        assert_eq!(questions[0].correct_answer, 1);
    }

    #[test]
    fn test_unresolvable_questions_dropped_and_survivors_renumbered() {
        let raw = r#"{"quiz": [
            {"question": "first", "options": ["a"], "correct_answer": "a"},
            {"question": "broken", "options": ["a"], "correct_answer": "z"},
            {"question": "third", "options": ["b"], "correct_answer": "b"}
        ]}"#;
        let questions = extract_quiz(raw).unwrap();

        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].question, "first");
        assert_eq!(questions[0].id, 1);
        assert_eq!(questions[1].question, "third");
        assert_eq!(questions[1].id, 2);
    }

    #[test]
    fn test_malformed_options_drop_the_question() {
        let raw = r#"{"quiz": [
            {"question": "bad", "options": ["a", 7], "correct_answer": "a"},
            {"question": "good", "options": ["a"], "correct_answer": "a"}
        ]}"#;
        let questions = extract_quiz(raw).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].question, "good");
    }

    #[test]
    fn test_all_questions_dropped_is_an_error() {
        let raw = r#"{"quiz": [{"question": "q", "options": ["a"], "correct_answer": "z"}]}"#;
        let err = extract_quiz(raw).unwrap_err();
        assert!(matches!(err, QuizError::NoValidQuestions));
    }

    #[test]
    fn test_empty_quiz_array_is_an_error() {
        let err = extract_quiz(r#"{"quiz": []}"#).unwrap_err();
        assert!(matches!(err, QuizError::NoValidQuestions));
    }

    #[test]
    fn test_question_serializes_client_field_names() {
        let question = QuizQuestion {
            id: 1,
            question: "Q".into(),
            options: vec!["a".into()],
            correct_answer: 0,
        };
        let value = serde_json::to_value(&question).unwrap();
        assert_eq!(
            value,
            json!({"id": 1, "question": "Q", "options": ["a"], "correctAnswer": 0})
        );
    }
}
