//! Axum route handlers for the Enhancement API.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use crate::enhancement::{enhance, EnhanceInput};
use crate::errors::{AppError, AppJson};
use crate::llm_client::retry::RetryError;
use crate::llm_client::LlmError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhanceRequest {
    pub resume_text: String,
    #[serde(default)]
    pub job_description: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub user_prompt: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EnhanceResponse {
    pub success: bool,
    pub analysis: Map<String, Value>,
    pub enhancements: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EnhanceResponse {
    fn failure(message: &str) -> Self {
        Self {
            success: false,
            analysis: Map::new(),
            enhancements: Map::new(),
            error: Some(message.to_string()),
        }
    }
}

/// Status and sanitized caller message for a failed upstream call.
/// Details stay in the logs.
fn upstream_failure(err: &RetryError<LlmError>) -> (StatusCode, &'static str) {
    match err {
        RetryError::Fatal {
            error: LlmError::Config(_),
            ..
        } => (
            StatusCode::SERVICE_UNAVAILABLE,
            "Resume enhancement is not available right now.",
        ),
        RetryError::Fatal { .. } => (
            StatusCode::BAD_GATEWAY,
            "The AI service could not process this request.",
        ),
        RetryError::Exhausted { .. } | RetryError::DeadlineExceeded { .. } => (
            StatusCode::SERVICE_UNAVAILABLE,
            "The AI service is busy. Please try again in a few minutes.",
        ),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/enhance
///
/// Rewrites the resume for the job description through the upstream model.
/// Transient upstream failures are retried; anything left is reported with a
/// non-technical message.
pub async fn handle_enhance(
    State(state): State<AppState>,
    AppJson(request): AppJson<EnhanceRequest>,
) -> Result<(StatusCode, Json<EnhanceResponse>), AppError> {
    if request.resume_text.trim().is_empty() {
        return Err(AppError::Validation("resumeText cannot be empty".to_string()));
    }

    let request_id = Uuid::new_v4();
    let input = EnhanceInput {
        resume_text: request.resume_text,
        job_description: request.job_description,
        model: request.model,
        system_prompt: request.system_prompt,
        user_prompt: request.user_prompt,
    };

    let outcome = enhance(state.llm.as_ref(), &state.retry, &input)
        .instrument(info_span!("enhance", %request_id))
        .await;

    match outcome {
        Ok(result) => {
            info!(%request_id, "Resume enhancement completed");
            Ok((
                StatusCode::OK,
                Json(EnhanceResponse {
                    success: true,
                    analysis: result.analysis,
                    enhancements: result.enhancements,
                    error: None,
                }),
            ))
        }
        Err(err) => {
            error!(%request_id, attempts = err.attempts(), error = %err, "Resume enhancement failed");
            let (status, message) = upstream_failure(&err);
            Ok((status, Json(EnhanceResponse::failure(message))))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::Config;
    use crate::enhancement::testing::ScriptedBackend;

    fn state(backend: Arc<ScriptedBackend>) -> AppState {
        AppState::new(Config::default(), backend)
    }

    fn request(resume_text: &str) -> EnhanceRequest {
        EnhanceRequest {
            resume_text: resume_text.to_string(),
            job_description: "Staff engineer".to_string(),
            model: None,
            system_prompt: None,
            user_prompt: None,
        }
    }

    #[tokio::test]
    async fn test_success_response() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok(
            r#"{"analysis": {"match_score": 70}, "enhancements": {}}"#.to_string(),
        )]));
        let (status, Json(body)) = handle_enhance(State(state(backend)), AppJson(request("Jane Doe")))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::OK);
        assert!(body.success);
        assert_eq!(body.analysis["match_score"], 70);
        assert!(body.error.is_none());
    }

    #[tokio::test]
    async fn test_fatal_error_is_sanitized_and_not_retried() {
        let backend = Arc::new(ScriptedBackend::new(vec![Err(LlmError::Api {
            status: 401,
            message: "invalid x-api-key sk-ant-123".to_string(),
        })]));
        let (status, Json(body)) =
            handle_enhance(State(state(backend.clone())), AppJson(request("Jane Doe")))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(!body.success);
        let message = body.error.unwrap();
        assert!(!message.contains("x-api-key"));
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_resume_is_rejected() {
        let backend = Arc::new(ScriptedBackend::default());
        let result = handle_enhance(State(state(backend)), AppJson(request("  "))).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
