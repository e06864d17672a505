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

use crate::models::{CreateArticleRequest, CreateCategoryRequest, UpdateArticleRequest};
use crate::services::articles::ArticleService;
use crate::services::categories::CategoryService;

const PUBLISHING_ROLES: &[UserRole] = &[UserRole::Writer, UserRole::Admin];

// ==============================================================================
// CATEGORY HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn create_category(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    let directory = UserDirectoryService::new(&state);
    directory
        .require_role(&user.id, &[UserRole::Admin], Some(token))
        .await?;

    let service = CategoryService::new(&state);
    let category = service.create_category(request, token).await?;

    Ok(Json(json!(category)))
}

#[axum::debug_handler]
pub async fn get_categories(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let service = CategoryService::new(&state);
    let categories = service.list_categories().await?;

    Ok(Json(json!(categories)))
}

#[axum::debug_handler]
pub async fn get_category_by_slug(
    State(state): State<Arc<AppConfig>>,
    Path(slug): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = CategoryService::new(&state);
    let category = service.get_by_slug(&slug).await?;

    Ok(Json(json!(category)))
}

#[axum::debug_handler]
pub async fn get_articles_for_category(
    State(state): State<Arc<AppConfig>>,
    Path(slug): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = CategoryService::new(&state);
    let articles = service.list_articles_for_category(&slug).await?;

    Ok(Json(json!(articles)))
}

// ==============================================================================
// ARTICLE HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn create_article(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreateArticleRequest>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    let directory = UserDirectoryService::new(&state);
    directory
        .require_role(&user.id, PUBLISHING_ROLES, Some(token))
        .await?;

    let service = ArticleService::new(&state);
    let article = service.create_article(&user.id, request, token).await?;

    Ok(Json(json!(article)))
}

#[axum::debug_handler]
pub async fn get_published_articles(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let service = ArticleService::new(&state);
    let articles = service.list_published().await?;

    Ok(Json(json!(articles)))
}

#[axum::debug_handler]
pub async fn get_article_by_slug(
    State(state): State<Arc<AppConfig>>,
    Path(slug): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = ArticleService::new(&state);
    let article = service.get_published_by_slug(&slug).await?;

    Ok(Json(json!(article)))
}

#[axum::debug_handler]
pub async fn get_my_articles(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    let directory = UserDirectoryService::new(&state);
    directory
        .require_role(&user.id, PUBLISHING_ROLES, Some(token))
        .await?;

    let service = ArticleService::new(&state);
    let articles = service.list_for_author(&user.id, token).await?;

    Ok(Json(json!(articles)))
}

#[axum::debug_handler]
pub async fn update_article(
    State(state): State<Arc<AppConfig>>,
    Path(article_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<UpdateArticleRequest>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    let directory = UserDirectoryService::new(&state);
    directory
        .require_role(&user.id, PUBLISHING_ROLES, Some(token))
        .await?;

    let service = ArticleService::new(&state);
    let article = service
        .update_article(article_id, &user.id, request, token)
        .await?;

    Ok(Json(json!(article)))
}

#[axum::debug_handler]
pub async fn delete_article(
    State(state): State<Arc<AppConfig>>,
    Path(article_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    let directory = UserDirectoryService::new(&state);
    directory
        .require_role(&user.id, PUBLISHING_ROLES, Some(token))
        .await?;

    let service = ArticleService::new(&state);
    service.delete_article(article_id, &user.id, token).await?;

    Ok(Json(json!({ "message": "Article removed" })))
}
