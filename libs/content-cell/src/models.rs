use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_database::error::StoreError;
use shared_models::error::AppError;
use user_cell::DirectoryError;

pub const DEFAULT_ARTICLE_IMAGE: &str =
    "https://placehold.co/600x400/22c55e/FFFFFF?text=ThriveWell";
pub const DEFAULT_CATEGORY_IMAGE: &str =
    "https://placehold.co/400x300/65a30d/FFFFFF?text=Category";
pub const DEFAULT_AUTHOR_NAME: &str = "ThriveWell Writer";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    /// Derived from `name`; unique at the storage layer.
    pub slug: String,
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    Draft,
    Published,
}

impl fmt::Display for ArticleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArticleStatus::Draft => write!(f, "draft"),
            ArticleStatus::Published => write!(f, "published"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    /// Derived from `title`; unique at the storage layer.
    pub slug: String,
    pub content: String,
    pub excerpt: String,
    #[serde(default)]
    pub featured_image: String,
    pub author_external_id: String,
    /// Denormalized for display without a directory lookup.
    pub author_name: String,
    pub category_id: Uuid,
    pub status: ArticleStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing shape for category pages: everything but the full content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleSummary {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    #[serde(default)]
    pub featured_image: String,
    pub author_name: String,
    pub category_id: Uuid,
    pub status: ArticleStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize)]
pub struct CategorySummary {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Serialize)]
pub struct ArticleWithCategory {
    #[serde(flatten)]
    pub article: Article,
    pub category: CategorySummary,
}

// ==============================================================================
// REQUESTS
// ==============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateArticleRequest {
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub category_id: Uuid,
    pub status: Option<ArticleStatus>,
    pub featured_image: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateArticleRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub category_id: Option<Uuid>,
    pub status: Option<ArticleStatus>,
    pub featured_image: Option<String>,
}

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Category already exists")]
    CategoryExists,

    #[error("Category not found")]
    CategoryNotFound,

    #[error("Article not found")]
    ArticleNotFound,

    #[error("Author user not found.")]
    AuthorNotFound,

    #[error("An article with this title already exists")]
    DuplicateSlug,

    #[error("User not authorized to {action} this article")]
    NotAuthor { action: &'static str },

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ContentError> for AppError {
    fn from(err: ContentError) -> Self {
        match err {
            ContentError::CategoryExists => {
                AppError::Conflict("Category already exists".to_string())
            }
            ContentError::CategoryNotFound => {
                AppError::NotFound("Category not found".to_string())
            }
            ContentError::ArticleNotFound => AppError::NotFound("Article not found".to_string()),
            ContentError::AuthorNotFound => {
                AppError::NotFound("Author user not found.".to_string())
            }
            ContentError::DuplicateSlug => {
                AppError::Conflict("An article with this title already exists".to_string())
            }
            err @ ContentError::NotAuthor { .. } => AppError::Forbidden(err.to_string()),
            ContentError::Directory(e) => e.into(),
            ContentError::Store(e) => e.into(),
        }
    }
}
