//! Axum route handler for the guided chat flow.

use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

const INITIAL_STEP: &str = "initial";
const START_WORDS: &[&str] = &["yes", "start", "create", "sure"];

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default = "initial_step")]
    pub step: String,
}

fn initial_step() -> String {
    INITIAL_STEP.to_string()
}

#[derive(Debug, PartialEq, Serialize)]
pub struct ChatResponse {
    pub success: bool,
    pub response: String,
    pub next_step: String,
}

/// Reply text and next step for `message` sent at `step`. Unknown steps are
/// acknowledged and kept.
fn advance(message: &str, step: &str) -> (&'static str, String) {
    match step {
        INITIAL_STEP => {
            let lower = message.to_lowercase();
            if START_WORDS.iter().any(|w| lower.contains(w)) {
                (
                    "Great! Let's begin. First, please upload your existing resume or paste your details in text format. You can upload a file using the upload button below.",
                    "awaiting_resume".to_string(),
                )
            } else {
                (
                    "No problem! Whenever you're ready to create your resume, just let me know!",
                    INITIAL_STEP.to_string(),
                )
            }
        }
        "awaiting_missing_sections" => (
            "Perfect! I'm now generating your resume. This will take just a moment...",
            "generating".to_string(),
        ),
        other => ("I understand. Let me help you with that.", other.to_string()),
    }
}

/// POST /api/chat/message
pub async fn handle_chat_message(
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let (response, next_step) = advance(&request.message, &request.step);
    Ok(Json(ChatResponse {
        success: true,
        response: response.to_string(),
        next_step,
    }))
}
