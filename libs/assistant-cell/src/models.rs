use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_models::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub conversation_history: Vec<ChatTurn>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub response: String,
    pub conversation_history: Vec<ChatTurn>,
}

#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("Message is required")]
    MessageRequired,

    #[error("OPENAI_API_KEY environment variable not set")]
    MissingApiKey,

    #[error("Invalid completion response format")]
    InvalidResponse,

    #[error("Completion API error: {0}")]
    Upstream(String),

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<AssistantError> for AppError {
    fn from(err: AssistantError) -> Self {
        match err {
            AssistantError::MessageRequired => {
                AppError::BadRequest("Message is required".to_string())
            }
            AssistantError::MissingApiKey => AppError::Internal(err.to_string()),
            AssistantError::InvalidResponse
            | AssistantError::Upstream(_)
            | AssistantError::Http(_) => AppError::ExternalService(
                "Failed to get AI response. Please try again.".to_string(),
            ),
        }
    }
}
