use std::sync::Arc;

use assert_matches::assert_matches;
use axum::extract::{Extension, Path, State};
use axum::Json;
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use content_cell::handlers;
use content_cell::models::{CreateArticleRequest, CreateCategoryRequest, UpdateArticleRequest};
use shared_config::AppConfig;
use shared_models::error::AppError;
use shared_utils::test_utils::{MockRows, TestConfig, TestUser};

fn test_config(server: &MockServer) -> Arc<AppConfig> {
    TestConfig::with_store_url(&server.uri()).to_arc()
}

fn auth_header() -> TypedHeader<Authorization<Bearer>> {
    TypedHeader(Authorization::bearer("test-token").expect("valid bearer"))
}

async fn mount_directory_user(server: &MockServer, user: &TestUser, row: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("external_id", format!("eq.{}", user.external_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn create_category_succeeds_for_admin() {
    let server = MockServer::start().await;
    let admin = TestUser::admin("admin@example.com");
    let category_id = Uuid::new_v4();

    mount_directory_user(
        &server,
        &admin,
        MockRows::user(Uuid::new_v4(), &admin.external_id, &admin.email, "admin"),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/categories"))
        .and(query_param("name", "eq.Mental Health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/categories"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockRows::category(category_id, "Mental Health", "mental-health")
        ])))
        .mount(&server)
        .await;

    let request: CreateCategoryRequest = serde_json::from_value(json!({
        "name": "Mental Health",
        "description": "Caring for your mind"
    }))
    .expect("valid request shape");

    let result = handlers::create_category(
        State(test_config(&server)),
        auth_header(),
        Extension(admin.to_auth_user()),
        Json(request),
    )
    .await;

    let Json(body) = result.expect("category should be created");
    assert_eq!(body["slug"], "mental-health");
}

#[tokio::test]
async fn create_duplicate_category_is_rejected() {
    let server = MockServer::start().await;
    let admin = TestUser::admin("admin@example.com");

    mount_directory_user(
        &server,
        &admin,
        MockRows::user(Uuid::new_v4(), &admin.external_id, &admin.email, "admin"),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRows::category(Uuid::new_v4(), "Fitness", "fitness")
        ])))
        .mount(&server)
        .await;

    let request: CreateCategoryRequest = serde_json::from_value(json!({
        "name": "Fitness",
        "description": "Move more"
    }))
    .expect("valid request shape");

    let result = handlers::create_category(
        State(test_config(&server)),
        auth_header(),
        Extension(admin.to_auth_user()),
        Json(request),
    )
    .await;

    assert_matches!(result, Err(AppError::Conflict(msg)) => {
        assert_eq!(msg, "Category already exists");
    });
}

#[tokio::test]
async fn create_category_requires_admin() {
    let server = MockServer::start().await;
    let writer = TestUser::writer("writer@example.com");

    mount_directory_user(
        &server,
        &writer,
        MockRows::user(Uuid::new_v4(), &writer.external_id, &writer.email, "writer"),
    )
    .await;

    let request: CreateCategoryRequest = serde_json::from_value(json!({
        "name": "Fitness",
        "description": "Move more"
    }))
    .expect("valid request shape");

    let result = handlers::create_category(
        State(test_config(&server)),
        auth_header(),
        Extension(writer.to_auth_user()),
        Json(request),
    )
    .await;

    assert_matches!(result, Err(AppError::Forbidden(_)));
}

#[tokio::test]
async fn create_article_rejects_missing_category() {
    let server = MockServer::start().await;
    let writer = TestUser::writer("writer@example.com");
    let missing_category = Uuid::new_v4();

    mount_directory_user(
        &server,
        &writer,
        MockRows::user(Uuid::new_v4(), &writer.external_id, &writer.email, "writer"),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/categories"))
        .and(query_param("id", format!("eq.{}", missing_category)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let request: CreateArticleRequest = serde_json::from_value(json!({
        "title": "Healthy Eating 101",
        "content": "Eat your vegetables.",
        "excerpt": "A primer on healthy eating.",
        "categoryId": missing_category
    }))
    .expect("valid request shape");

    let result = handlers::create_article(
        State(test_config(&server)),
        auth_header(),
        Extension(writer.to_auth_user()),
        Json(request),
    )
    .await;

    assert_matches!(result, Err(AppError::NotFound(msg)) => {
        assert_eq!(msg, "Category not found");
    });
}

#[tokio::test]
async fn create_article_defaults_to_draft() {
    let server = MockServer::start().await;
    let writer = TestUser::writer("writer@example.com");
    let category_id = Uuid::new_v4();

    mount_directory_user(
        &server,
        &writer,
        MockRows::user(Uuid::new_v4(), &writer.external_id, &writer.email, "writer"),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRows::category(category_id, "Nutrition", "nutrition")
        ])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/articles"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockRows::article(Uuid::new_v4(), &writer.external_id, category_id, "draft")
        ])))
        .mount(&server)
        .await;

    let request: CreateArticleRequest = serde_json::from_value(json!({
        "title": "Healthy Eating 101",
        "content": "Eat your vegetables.",
        "excerpt": "A primer on healthy eating.",
        "categoryId": category_id
    }))
    .expect("valid request shape");

    let result = handlers::create_article(
        State(test_config(&server)),
        auth_header(),
        Extension(writer.to_auth_user()),
        Json(request),
    )
    .await;

    let Json(body) = result.expect("article should be created");
    assert_eq!(body["status"], "draft");
    assert_eq!(body["slug"], "healthy-eating-101");
}

#[tokio::test]
async fn update_article_rejects_non_author() {
    let server = MockServer::start().await;
    let writer = TestUser::writer("writer@example.com");
    let article_id = Uuid::new_v4();

    mount_directory_user(
        &server,
        &writer,
        MockRows::user(Uuid::new_v4(), &writer.external_id, &writer.email, "writer"),
    )
    .await;

    // Someone else's article.
    Mock::given(method("GET"))
        .and(path("/rest/v1/articles"))
        .and(query_param("id", format!("eq.{}", article_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRows::article(article_id, "user_other", Uuid::new_v4(), "published")
        ])))
        .mount(&server)
        .await;

    let request: UpdateArticleRequest = serde_json::from_value(json!({
        "title": "Hijacked title"
    }))
    .expect("valid request shape");

    let result = handlers::update_article(
        State(test_config(&server)),
        Path(article_id),
        auth_header(),
        Extension(writer.to_auth_user()),
        Json(request),
    )
    .await;

    assert_matches!(result, Err(AppError::Forbidden(msg)) => {
        assert_eq!(msg, "User not authorized to update this article");
    });
}

#[tokio::test]
async fn unpublished_article_is_not_found_by_slug() {
    let server = MockServer::start().await;

    // Status filter excludes drafts at the store, so the row never comes back.
    Mock::given(method("GET"))
        .and(path("/rest/v1/articles"))
        .and(query_param("status", "eq.published"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let result = handlers::get_article_by_slug(
        State(test_config(&server)),
        Path("secret-draft".to_string()),
    )
    .await;

    assert_matches!(result, Err(AppError::NotFound(msg)) => {
        assert_eq!(msg, "Article not found");
    });
}

#[tokio::test]
async fn category_article_listing_excludes_content() {
    let server = MockServer::start().await;
    let category_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/categories"))
        .and(query_param("slug", "eq.nutrition"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRows::category(category_id, "Nutrition", "nutrition")
        ])))
        .mount(&server)
        .await;

    let mut summary = MockRows::article(Uuid::new_v4(), "user_writer", category_id, "published");
    summary.as_object_mut().expect("object row").remove("content");
    summary.as_object_mut().expect("object row").remove("author_external_id");
    summary.as_object_mut().expect("object row").remove("updated_at");

    Mock::given(method("GET"))
        .and(path("/rest/v1/articles"))
        .and(query_param("category_id", format!("eq.{}", category_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([summary])))
        .mount(&server)
        .await;

    let result = handlers::get_articles_for_category(
        State(test_config(&server)),
        Path("nutrition".to_string()),
    )
    .await;

    let Json(body) = result.expect("listing should succeed");
    assert!(body[0].get("content").is_none());
    assert_eq!(body[0]["excerpt"], "A primer on healthy eating.");
}
