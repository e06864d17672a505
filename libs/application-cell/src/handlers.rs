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

use crate::models::SubmitApplicationRequest;
use crate::services::workflow::ApplicationService;

#[axum::debug_handler]
pub async fn submit_application(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<SubmitApplicationRequest>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    let service = ApplicationService::new(&state);
    let application = service.submit(&user.id, request, token).await?;

    Ok(Json(json!(application)))
}

#[axum::debug_handler]
pub async fn get_my_application_status(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    let service = ApplicationService::new(&state);
    let application = service.my_status(&user.id, token).await?;

    Ok(Json(json!(application)))
}

#[axum::debug_handler]
pub async fn get_pending_applications(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    let directory = UserDirectoryService::new(&state);
    directory
        .require_role(&user.id, &[UserRole::Admin], Some(token))
        .await?;

    let service = ApplicationService::new(&state);
    let applications = service.list_pending(token).await?;

    Ok(Json(json!(applications)))
}

#[axum::debug_handler]
pub async fn approve_application(
    State(state): State<Arc<AppConfig>>,
    Path(application_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    let directory = UserDirectoryService::new(&state);
    directory
        .require_role(&user.id, &[UserRole::Admin], Some(token))
        .await?;

    let service = ApplicationService::new(&state);
    service.approve(application_id, token).await?;

    Ok(Json(json!({ "message": "Application approved and user role updated." })))
}

#[axum::debug_handler]
pub async fn reject_application(
    State(state): State<Arc<AppConfig>>,
    Path(application_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    let directory = UserDirectoryService::new(&state);
    directory
        .require_role(&user.id, &[UserRole::Admin], Some(token))
        .await?;

    let service = ApplicationService::new(&state);
    service.reject(application_id, token).await?;

    Ok(Json(json!({ "message": "Application rejected." })))
}
