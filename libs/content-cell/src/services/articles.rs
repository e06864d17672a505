use std::collections::HashMap;

use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::error::StoreError;
use shared_database::supabase::SupabaseClient;
use shared_utils::slug::slugify;
use user_cell::UserDirectoryService;

use crate::models::{
    Article, ArticleStatus, ArticleWithCategory, Category, CategorySummary, ContentError,
    CreateArticleRequest, UpdateArticleRequest, DEFAULT_ARTICLE_IMAGE, DEFAULT_AUTHOR_NAME,
};

pub struct ArticleService {
    supabase: SupabaseClient,
    directory: UserDirectoryService,
}

impl ArticleService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            directory: UserDirectoryService::new(config),
        }
    }

    pub async fn create_article(
        &self,
        author_external_id: &str,
        request: CreateArticleRequest,
        auth_token: &str,
    ) -> Result<Article, ContentError> {
        let author = self
            .directory
            .try_get_by_external_id(author_external_id, Some(auth_token))
            .await?
            .ok_or(ContentError::AuthorNotFound)?;

        let category_path = format!("/rest/v1/categories?id=eq.{}", request.category_id);
        let category: Vec<Value> = self
            .supabase
            .request(Method::GET, &category_path, Some(auth_token), None)
            .await?;
        if category.is_empty() {
            return Err(ContentError::CategoryNotFound);
        }

        let author_name = if author.username.is_empty() {
            DEFAULT_AUTHOR_NAME.to_string()
        } else {
            author.username
        };

        let article_data = json!({
            "title": request.title,
            "slug": slugify(&request.title),
            "content": request.content,
            "excerpt": request.excerpt,
            "featured_image": request.featured_image.unwrap_or_else(|| DEFAULT_ARTICLE_IMAGE.to_string()),
            "author_external_id": author_external_id,
            "author_name": author_name,
            "category_id": request.category_id,
            "status": request.status.unwrap_or(ArticleStatus::Draft),
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        });

        let result = self
            .supabase
            .insert_returning("/rest/v1/articles", Some(auth_token), article_data)
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => ContentError::DuplicateSlug,
                other => ContentError::Store(other),
            })?;

        let row = result.into_iter().next().ok_or(ContentError::Store(StoreError::Api {
            status: 500,
            message: "Failed to create article".to_string(),
        }))?;

        let article: Article = serde_json::from_value(row).map_err(StoreError::from)?;
        info!("Article {} created by {}", article.slug, author_external_id);

        Ok(article)
    }

    pub async fn list_published(&self) -> Result<Vec<ArticleWithCategory>, ContentError> {
        let path = "/rest/v1/articles?status=eq.published&order=created_at.desc";
        let articles = self.fetch_articles(path, None).await?;
        self.attach_categories(articles, None).await
    }

    pub async fn get_published_by_slug(&self, slug: &str) -> Result<ArticleWithCategory, ContentError> {
        let path = format!("/rest/v1/articles?slug=eq.{}&status=eq.published", slug);
        let articles = self.fetch_articles(&path, None).await?;

        let mut with_categories = self.attach_categories(articles, None).await?;
        if with_categories.is_empty() {
            return Err(ContentError::ArticleNotFound);
        }

        Ok(with_categories.remove(0))
    }

    /// All of the author's articles, drafts included, freshest edits first.
    pub async fn list_for_author(
        &self,
        author_external_id: &str,
        auth_token: &str,
    ) -> Result<Vec<ArticleWithCategory>, ContentError> {
        let path = format!(
            "/rest/v1/articles?author_external_id=eq.{}&order=updated_at.desc",
            author_external_id
        );
        let articles = self.fetch_articles(&path, Some(auth_token)).await?;
        self.attach_categories(articles, Some(auth_token)).await
    }

    pub async fn update_article(
        &self,
        article_id: Uuid,
        author_external_id: &str,
        request: UpdateArticleRequest,
        auth_token: &str,
    ) -> Result<Article, ContentError> {
        let article = self.get_by_id(article_id, auth_token).await?;

        if article.author_external_id != author_external_id {
            return Err(ContentError::NotAuthor { action: "update" });
        }

        let mut update = serde_json::Map::new();
        if let Some(title) = &request.title {
            update.insert("title".to_string(), json!(title));
            // Slug follows the title, as on creation.
            update.insert("slug".to_string(), json!(slugify(title)));
        }
        if let Some(content) = request.content {
            update.insert("content".to_string(), json!(content));
        }
        if let Some(excerpt) = request.excerpt {
            update.insert("excerpt".to_string(), json!(excerpt));
        }
        if let Some(category_id) = request.category_id {
            update.insert("category_id".to_string(), json!(category_id));
        }
        if let Some(status) = request.status {
            update.insert("status".to_string(), json!(status));
        }
        if let Some(featured_image) = request.featured_image {
            update.insert("featured_image".to_string(), json!(featured_image));
        }
        update.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!("/rest/v1/articles?id=eq.{}", article_id);
        let result = self
            .supabase
            .update_returning(&path, Some(auth_token), Value::Object(update))
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => ContentError::DuplicateSlug,
                other => ContentError::Store(other),
            })?;

        let row = result.into_iter().next().ok_or(ContentError::ArticleNotFound)?;
        let updated = serde_json::from_value(row).map_err(StoreError::from)?;

        Ok(updated)
    }

    pub async fn delete_article(
        &self,
        article_id: Uuid,
        author_external_id: &str,
        auth_token: &str,
    ) -> Result<(), ContentError> {
        let article = self.get_by_id(article_id, auth_token).await?;

        if article.author_external_id != author_external_id {
            return Err(ContentError::NotAuthor { action: "delete" });
        }

        let path = format!("/rest/v1/articles?id=eq.{}", article_id);
        let _: Vec<Value> = self
            .supabase
            .request(Method::DELETE, &path, Some(auth_token), None)
            .await?;

        debug!("Article {} removed", article_id);
        Ok(())
    }

    async fn get_by_id(&self, article_id: Uuid, auth_token: &str) -> Result<Article, ContentError> {
        let path = format!("/rest/v1/articles?id=eq.{}", article_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        let row = result.into_iter().next().ok_or(ContentError::ArticleNotFound)?;
        let article = serde_json::from_value(row).map_err(StoreError::from)?;

        Ok(article)
    }

    async fn fetch_articles(
        &self,
        path: &str,
        auth_token: Option<&str>,
    ) -> Result<Vec<Article>, ContentError> {
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, path, auth_token, None)
            .await?;

        let articles = result
            .into_iter()
            .map(|row| serde_json::from_value(row).map_err(StoreError::from))
            .collect::<Result<Vec<Article>, _>>()?;

        Ok(articles)
    }

    async fn attach_categories(
        &self,
        articles: Vec<Article>,
        auth_token: Option<&str>,
    ) -> Result<Vec<ArticleWithCategory>, ContentError> {
        if articles.is_empty() {
            return Ok(vec![]);
        }

        let mut category_ids: Vec<Uuid> = articles.iter().map(|a| a.category_id).collect();
        category_ids.sort();
        category_ids.dedup();

        let ids: Vec<String> = category_ids.iter().map(|id| id.to_string()).collect();
        let path = format!("/rest/v1/categories?id=in.({})", ids.join(","));
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await?;

        let categories: HashMap<Uuid, Category> = result
            .into_iter()
            .map(|row| serde_json::from_value::<Category>(row).map_err(StoreError::from))
            .collect::<Result<Vec<Category>, _>>()?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        let views = articles
            .into_iter()
            .map(|article| {
                let category = categories
                    .get(&article.category_id)
                    .map(|c| CategorySummary {
                        name: c.name.clone(),
                        slug: c.slug.clone(),
                    })
                    .unwrap_or_default();
                ArticleWithCategory { article, category }
            })
            .collect();

        Ok(views)
    }
}
