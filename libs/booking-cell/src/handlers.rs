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

use crate::models::CreateBookingRequest;
use crate::services::ledger::BookingService;

#[axum::debug_handler]
pub async fn create_booking(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    let service = BookingService::new(&state);
    let booking = service.create_booking(&user.id, request, token).await?;

    Ok(Json(json!(booking)))
}

#[axum::debug_handler]
pub async fn get_my_bookings(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    let service = BookingService::new(&state);
    let bookings = service.list_for_patient(&user.id, token).await?;

    Ok(Json(json!(bookings)))
}

#[axum::debug_handler]
pub async fn get_my_schedule(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    let directory = UserDirectoryService::new(&state);
    let professional = directory
        .require_role(&user.id, &[UserRole::Medical, UserRole::Admin], Some(token))
        .await?;

    let service = BookingService::new(&state);
    let bookings = service.list_for_professional(&professional, token).await?;

    Ok(Json(json!(bookings)))
}

/// Public: upcoming confirmed bookings for a professional, times only, so
/// booking pages can block out taken slots without exposing patients.
#[axum::debug_handler]
pub async fn get_bookings_for_professional(
    State(state): State<Arc<AppConfig>>,
    Path(external_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);
    let windows = service.list_public_upcoming(&external_id).await?;

    Ok(Json(json!(windows)))
}

#[axum::debug_handler]
pub async fn cancel_booking(
    State(state): State<Arc<AppConfig>>,
    Path(booking_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    let service = BookingService::new(&state);
    let booking = service.cancel_booking(booking_id, &user.id, token).await?;

    Ok(Json(json!(booking)))
}
