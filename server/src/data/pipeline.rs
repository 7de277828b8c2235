//! Generation pipeline client
//!
//! Relays lesson and quiz prompts to the external pipeline-execution
//! endpoint. Calls are synchronous on the pipeline side (`asyncOutput:
//! false`), so the client carries a generous total timeout while keeping a
//! short connect timeout. Failed calls are never retried.

use std::time::Duration;

use serde::Deserialize;
use serde_json::{Value, json};

use crate::core::config::PipelineConfig;
use crate::core::constants::{
    PIPELINE_CONNECT_TIMEOUT_SECS, PIPELINE_TIMEOUT_SECS, PREVIEW_MAX_CHARS,
};
use crate::utils::string::truncate_preview;

use super::error::UpstreamError;

/// One slot of the pipeline's result collection. `step_id` and `step_type`
/// are opaque tags, passed through for diagnostics only.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineSlot {
    #[serde(default, rename = "stepId")]
    pub step_id: Option<String>,
    #[serde(default, rename = "stepType")]
    pub step_type: Option<String>,
    #[serde(default)]
    pub output: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ExecutionResponse {
    #[serde(default)]
    result: Option<Value>,
}

pub struct PipelineClient {
    client: reqwest::Client,
    config: PipelineConfig,
    debug: bool,
}

impl PipelineClient {
    pub fn new(config: PipelineConfig, debug: bool) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(PIPELINE_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(PIPELINE_CONNECT_TIMEOUT_SECS))
            .user_agent(format!("Lessonsmith/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            config,
            debug,
        })
    }

    /// Run the lesson pipeline and return its result slots.
    pub async fn run_lesson(&self, user_input: &str) -> Result<Vec<PipelineSlot>, UpstreamError> {
        let payload = lesson_payload(&self.config.user_id, user_input);
        let response = self.execute(&self.config.lesson_url, &payload).await?;

        let result = response.result.ok_or_else(|| missing_result())?;
        let slots: Vec<PipelineSlot> =
            serde_json::from_value(result).map_err(|e| UpstreamError::MalformedResponse {
                reason: format!("result is not a slot array: {e}"),
            })?;

        tracing::info!(slots = slots.len(), "Lesson pipeline response received");
        Ok(slots)
    }

    /// Run the quiz pipeline and return its raw result value (a string or
    /// an already-structured document).
    pub async fn run_quiz(&self, user_input: &str) -> Result<Value, UpstreamError> {
        let payload = quiz_payload(user_input);
        let response = self.execute(&self.config.quiz_url, &payload).await?;

        match response.result {
            None | Some(Value::Null) => Err(missing_result()),
            Some(result) => Ok(result),
        }
    }

    async fn execute(&self, url: &str, payload: &Value) -> Result<ExecutionResponse, UpstreamError> {
        let body = payload.to_string();
        tracing::info!(url, bytes = body.len(), "Calling generation pipeline");

        let response = self
            .client
            .post(url)
            .header("X-API-KEY", &self.config.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| UpstreamError::from_send(e, PIPELINE_TIMEOUT_SECS))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| UpstreamError::from_send(e, PIPELINE_TIMEOUT_SECS))?;

        tracing::info!(status = status.as_u16(), bytes = text.len(), "Pipeline responded");
        if self.debug {
            tracing::debug!(body = %text, "Raw pipeline response");
        }

        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                preview: truncate_preview(&text, PREVIEW_MAX_CHARS),
            });
        }

        serde_json::from_str(&text).map_err(|e| UpstreamError::MalformedResponse {
            reason: format!(
                "body is not JSON ({e}): {}",
                truncate_preview(&text, PREVIEW_MAX_CHARS)
            ),
        })
    }
}

fn missing_result() -> UpstreamError {
    UpstreamError::MalformedResponse {
        reason: "missing result in pipeline response".into(),
    }
}

/// Lesson payload: the pipeline account id travels with the prompt
fn lesson_payload(user_id: &str, user_input: &str) -> Value {
    json!({
        "userId": user_id,
        "userInput": user_input,
        "asyncOutput": false,
    })
}

fn quiz_payload(user_input: &str) -> Value {
    json!({
        "userInput": user_input,
        "asyncOutput": false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lesson_payload_shape() {
        let payload = lesson_payload("acct-1", "volcanoes");
        assert_eq!(
            payload,
            json!({"userId": "acct-1", "userInput": "volcanoes", "asyncOutput": false})
        );
    }

    #[test]
    fn test_quiz_payload_has_no_account_id() {
        let payload = quiz_payload("volcanoes");
        assert_eq!(payload, json!({"userInput": "volcanoes", "asyncOutput": false}));
    }

    #[test]
    fn test_slot_array_parses() {
        let response: ExecutionResponse = serde_json::from_str(
            r#"{"result": [
                {"stepId": "a", "stepType": "Agent", "output": "{}"},
                {"stepId": "b", "stepType": "Voice", "output": {"segments": []}}
            ]}"#,
        )
        .unwrap();

        let slots: Vec<PipelineSlot> = serde_json::from_value(response.result.unwrap()).unwrap();
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].step_id.as_deref(), Some("a"));
        assert_eq!(slots[1].step_type.as_deref(), Some("Voice"));
        assert!(slots[1].output.as_ref().unwrap().is_object());
    }

    #[test]
    fn test_slots_tolerate_missing_fields() {
        let slots: Vec<PipelineSlot> = serde_json::from_value(json!([{}])).unwrap();
        assert_eq!(slots.len(), 1);
        assert!(slots[0].step_id.is_none());
        assert!(slots[0].output.is_none());
    }

    #[test]
    fn test_string_result_survives_for_quiz() {
        let response: ExecutionResponse =
            serde_json::from_str(r#"{"result": "```json\n{}\n```"}"#).unwrap();
        assert!(matches!(response.result, Some(Value::String(_))));
    }

    #[test]
    fn test_missing_result_field() {
        let response: ExecutionResponse = serde_json::from_str(r#"{"other": 1}"#).unwrap();
        assert!(response.result.is_none());
    }
}
