use axum::Json;
use serde_json::{json, Value};

use shared_models::error::AppError;

use crate::models::{AssistantError, ChatRequest};
use crate::services::chat::AssistantService;

#[axum::debug_handler]
pub async fn chat_with_assistant(
    Json(request): Json<ChatRequest>,
) -> Result<Json<Value>, AppError> {
    if request.message.trim().is_empty() {
        return Err(AssistantError::MessageRequired.into());
    }

    let service = AssistantService::new()?;
    let response = service.chat(request).await?;

    Ok(Json(json!(response)))
}
