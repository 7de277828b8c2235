//! Learner profile store client
//!
//! The profile store accumulates a learner's lesson prompts and quiz
//! outcomes, and answers natural-language questions about their learning
//! history. Everything here is best-effort from the relay's point of view:
//! the lesson and quiz flows degrade to the unmodified prompt when a call
//! fails.

use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::core::config::ProfileConfig;
use crate::core::constants::{
    PREVIEW_MAX_CHARS, PROFILE_INGEST_TIMEOUT_SECS, PROFILE_QUERY_TIMEOUT_SECS,
};
use crate::utils::string::truncate_preview;

use super::error::ProfileError;

const INGEST_SOURCE: &str = "lessonsmith";

/// A graded quiz answer, ingested so future quizzes can target weak spots
#[derive(Debug, Clone)]
pub struct QuizOutcome {
    pub topic: String,
    pub question: String,
    pub answer: String,
    pub user_answer: String,
    pub verdict: String,
}

pub struct ProfileClient {
    client: reqwest::Client,
    config: ProfileConfig,
}

impl ProfileClient {
    pub fn new(config: ProfileConfig) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(format!("Lessonsmith/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, config })
    }

    /// Register a learner and return their profile-store user id
    pub async fn register(
        &self,
        email: &str,
        name: &str,
        age: u32,
        tone: &str,
    ) -> Result<String, ProfileError> {
        let payload = json!({
            "email": email,
            "traits": {
                "name": name,
                "age": age,
                "tone": tone,
            },
        });

        tracing::info!(email, "Registering learner with profile store");
        let response = self
            .post("register", &payload, PROFILE_QUERY_TIMEOUT_SECS)
            .await?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| ProfileError::Malformed(format!("register body is not JSON: {e}")))?;

        body.get("user_id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ProfileError::Malformed("register response lacks user_id".into()))
    }

    /// Ingest a lesson prompt into the learner's history
    pub async fn ingest_lesson(&self, user_id: &str, topic: &str) -> Result<(), ProfileError> {
        let payload = ingest_payload(user_id, lesson_document(topic));
        tracing::info!(user_id, topic, "Ingesting lesson prompt");
        self.post("ingest", &payload, PROFILE_INGEST_TIMEOUT_SECS)
            .await?;
        Ok(())
    }

    /// Ingest a graded quiz answer into the learner's history
    pub async fn ingest_quiz(
        &self,
        user_id: &str,
        outcome: &QuizOutcome,
    ) -> Result<(), ProfileError> {
        let payload = ingest_payload(user_id, quiz_document(outcome));
        tracing::info!(user_id, topic = %outcome.topic, "Ingesting quiz outcome");
        self.post("ingest", &payload, PROFILE_INGEST_TIMEOUT_SECS)
            .await?;
        Ok(())
    }

    /// Ask the profile store about the learner's history. Returns `None`
    /// when the store has nothing to say.
    pub async fn query(
        &self,
        user_id: &str,
        question: &str,
        use_cache: bool,
    ) -> Result<Option<String>, ProfileError> {
        let payload = json!({
            "user_id": user_id,
            "question": question,
            "use_cache": use_cache,
        });

        tracing::info!(user_id, "Querying profile store");
        let response = self
            .post("query", &payload, PROFILE_QUERY_TIMEOUT_SECS)
            .await?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| ProfileError::Malformed(format!("query body is not JSON: {e}")))?;

        let answer = body
            .get("answer")
            .and_then(Value::as_str)
            .filter(|a| !a.trim().is_empty())
            .map(str::to_string);

        if let Some(answer) = &answer {
            tracing::debug!(
                user_id,
                answer = %truncate_preview(answer, PREVIEW_MAX_CHARS),
                "Profile store answered"
            );
        } else {
            tracing::info!(user_id, "Profile store had no answer");
        }

        Ok(answer)
    }

    async fn post(
        &self,
        path: &str,
        payload: &Value,
        timeout_secs: u64,
    ) -> Result<reqwest::Response, ProfileError> {
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), path);
        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .timeout(Duration::from_secs(timeout_secs))
            .json(payload)
            .send()
            .await
            .map_err(ProfileError::Request)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ProfileError::Status {
                status: status.as_u16(),
                preview: truncate_preview(&text, PREVIEW_MAX_CHARS),
            });
        }

        Ok(response)
    }
}

fn ingest_payload(user_id: &str, document: Value) -> Value {
    json!({
        "user_id": user_id,
        "source": INGEST_SOURCE,
        "documents": [document],
        "options": {"dedupe": true},
    })
}

fn lesson_document(topic: &str) -> Value {
    json!({
        "doc_id": format!("lesson-{}", Uuid::new_v4()),
        "kind": "lesson",
        "title": format!("Lesson: {topic}"),
        "created_at": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "content": topic,
        "document_type": "lesson",
    })
}

fn quiz_document(outcome: &QuizOutcome) -> Value {
    let content = format!(
        "Quiz Question: {}\nCorrect Answer: {}\nUser Answer: {}\nVerdict: {}",
        outcome.question, outcome.answer, outcome.user_answer, outcome.verdict
    );

    json!({
        "doc_id": format!("quiz-{}", Uuid::new_v4()),
        "kind": "quiz",
        "title": format!("Quiz: {} - {}", outcome.topic, truncate_preview(&outcome.question, 50)),
        "created_at": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "content": content,
        "document_type": "quiz",
        "metadata": {
            "topic": outcome.topic,
            "question": outcome.question,
            "correct_answer": outcome.answer,
            "user_answer": outcome.user_answer,
            "verdict": outcome.verdict,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome() -> QuizOutcome {
        QuizOutcome {
            topic: "Volcanoes".into(),
            question: "What is magma called above ground?".into(),
            answer: "Lava".into(),
            user_answer: "Ash".into(),
            verdict: "wrong".into(),
        }
    }

    #[test]
    fn test_lesson_document_shape() {
        let doc = lesson_document("Volcanoes");
        assert!(doc["doc_id"].as_str().unwrap().starts_with("lesson-"));
        assert_eq!(doc["kind"], "lesson");
        assert_eq!(doc["title"], "Lesson: Volcanoes");
        assert_eq!(doc["content"], "Volcanoes");
        assert_eq!(doc["document_type"], "lesson");
        assert!(doc["created_at"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn test_quiz_document_content_and_metadata() {
        let doc = quiz_document(&outcome());
        let content = doc["content"].as_str().unwrap();
        assert!(content.contains("Quiz Question: What is magma called above ground?"));
        assert!(content.contains("Correct Answer: Lava"));
        assert!(content.contains("User Answer: Ash"));
        assert!(content.contains("Verdict: wrong"));
        assert_eq!(doc["metadata"]["verdict"], "wrong");
        assert_eq!(doc["metadata"]["topic"], "Volcanoes");
    }

    #[test]
    fn test_ingest_payload_wraps_document() {
        let payload = ingest_payload("user-1", lesson_document("t"));
        assert_eq!(payload["user_id"], "user-1");
        assert_eq!(payload["source"], INGEST_SOURCE);
        assert_eq!(payload["documents"].as_array().unwrap().len(), 1);
        assert_eq!(payload["options"]["dedupe"], true);
    }

    #[test]
    fn test_doc_ids_are_unique() {
        let a = lesson_document("t");
        let b = lesson_document("t");
        assert_ne!(a["doc_id"], b["doc_id"]);
    }
}
