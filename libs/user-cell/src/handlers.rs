use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    Json,
};
use serde_json::{json, Value};
use tracing::{error, info, warn};

use shared_config::AppConfig;
use shared_models::error::AppError;
use shared_utils::webhook::verify_webhook_signature;

use crate::models::{IdentityEvent, PublicProfessional};
use crate::services::directory::UserDirectoryService;

/// Identity-provider webhook: keeps the user directory in sync with sign-ups,
/// profile changes, and deletions. The payload must be verified against the
/// raw body before parsing.
#[axum::debug_handler]
pub async fn handle_identity_webhook(
    State(state): State<Arc<AppConfig>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    if !state.is_webhook_configured() {
        error!("CLERK_WEBHOOK_SECRET is not set");
        return Err(AppError::Internal("Server configuration error".to_string()));
    }

    let message_id = header_str(&headers, "svix-id")?;
    let timestamp = header_str(&headers, "svix-timestamp")?;
    let signature = header_str(&headers, "svix-signature")?;

    verify_webhook_signature(
        &state.clerk_webhook_secret,
        message_id,
        timestamp,
        signature,
        &body,
    )
    .map_err(|e| {
        warn!("Webhook verification failed: {}", e);
        AppError::BadRequest("Invalid webhook signature".to_string())
    })?;

    let event: IdentityEvent = serde_json::from_slice(&body)
        .map_err(|_| AppError::BadRequest("Invalid webhook payload".to_string()))?;

    info!("Webhook received: {}", event.event_type);

    let directory = UserDirectoryService::new(&state);

    match event.event_type.as_str() {
        "user.created" => {
            let user = directory
                .create_from_identity(&event.data)
                .await
                .map_err(|e| AppError::Internal(e.to_string()))?;
            info!("User {} created in directory", user.external_id);
        }
        "user.updated" => {
            directory
                .update_from_identity(&event.data)
                .await
                .map_err(|e| AppError::Internal(e.to_string()))?;
        }
        "user.deleted" => match event.data.id.as_deref() {
            Some(external_id) => {
                directory
                    .delete_by_external_id(external_id)
                    .await
                    .map_err(|e| AppError::Internal(e.to_string()))?;
            }
            None => warn!("User deleted event received without an id"),
        },
        other => info!("Unhandled webhook event type: {}", other),
    }

    Ok(Json(json!({ "message": "Webhook received and processed" })))
}

#[axum::debug_handler]
pub async fn list_medical_professionals(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let directory = UserDirectoryService::new(&state);

    let professionals = directory
        .list_medical_professionals()
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let professionals: Vec<PublicProfessional> = professionals
        .into_iter()
        .map(PublicProfessional::from)
        .collect();

    Ok(Json(json!(professionals)))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, AppError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("Missing webhook signature headers".to_string()))
}
