use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::AuthUser;
use shared_models::error::AppError;
use shared_models::role::UserRole;
use user_cell::UserDirectoryService;

use crate::models::CreateAvailabilityRequest;
use crate::services::slots::AvailabilityService;

const OFFERING_ROLES: &[UserRole] = &[UserRole::Medical, UserRole::Admin];

#[axum::debug_handler]
pub async fn create_availability(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreateAvailabilityRequest>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    let directory = UserDirectoryService::new(&state);
    let owner = directory
        .require_role(&user.id, OFFERING_ROLES, Some(token))
        .await?;

    let service = AvailabilityService::new(&state);
    let slot = service.register_slot(&owner, request, token).await?;

    Ok(Json(json!(slot)))
}

#[axum::debug_handler]
pub async fn get_my_availability(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    let directory = UserDirectoryService::new(&state);
    let owner = directory
        .require_role(&user.id, OFFERING_ROLES, Some(token))
        .await?;

    let service = AvailabilityService::new(&state);
    let slots = service.list_for_professional(owner.id, Some(token)).await?;

    Ok(Json(json!(slots)))
}

/// Public: a professional's weekly availability, for booking pages.
#[axum::debug_handler]
pub async fn get_availability_for_professional(
    State(state): State<Arc<AppConfig>>,
    Path(external_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let directory = UserDirectoryService::new(&state);
    let professional = directory
        .get_by_external_id(&external_id, None)
        .await
        .map_err(|_| AppError::NotFound("Medical user not found".to_string()))?;

    let service = AvailabilityService::new(&state);
    let slots = service.list_for_professional(professional.id, None).await?;

    Ok(Json(json!(slots)))
}

#[axum::debug_handler]
pub async fn delete_availability(
    State(state): State<Arc<AppConfig>>,
    Path(slot_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    let directory = UserDirectoryService::new(&state);
    let requester = directory
        .require_role(&user.id, OFFERING_ROLES, Some(token))
        .await?;

    let service = AvailabilityService::new(&state);
    service.remove_slot(slot_id, &requester, token).await?;

    Ok(Json(json!({ "message": "Availability slot removed" })))
}
