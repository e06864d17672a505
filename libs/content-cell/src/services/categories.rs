use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::error::StoreError;
use shared_database::supabase::SupabaseClient;
use shared_utils::slug::slugify;

use crate::models::{
    ArticleSummary, Category, ContentError, CreateCategoryRequest, DEFAULT_CATEGORY_IMAGE,
};

pub struct CategoryService {
    supabase: SupabaseClient,
}

impl CategoryService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn create_category(
        &self,
        request: CreateCategoryRequest,
        auth_token: &str,
    ) -> Result<Category, ContentError> {
        let existing_path = format!("/rest/v1/categories?name=eq.{}", request.name);
        let existing: Vec<Value> = self
            .supabase
            .request(Method::GET, &existing_path, Some(auth_token), None)
            .await?;

        if !existing.is_empty() {
            return Err(ContentError::CategoryExists);
        }

        let category_data = json!({
            "name": request.name,
            "slug": slugify(&request.name),
            "description": request.description,
            "image_url": request.image_url.unwrap_or_else(|| DEFAULT_CATEGORY_IMAGE.to_string()),
            "created_at": Utc::now().to_rfc3339()
        });

        let result = self
            .supabase
            .insert_returning("/rest/v1/categories", Some(auth_token), category_data)
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => ContentError::CategoryExists,
                other => ContentError::Store(other),
            })?;

        let row = result.into_iter().next().ok_or(ContentError::Store(StoreError::Api {
            status: 500,
            message: "Failed to create category".to_string(),
        }))?;

        let category: Category = serde_json::from_value(row).map_err(StoreError::from)?;
        debug!("Category {} created", category.slug);

        Ok(category)
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, ContentError> {
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, "/rest/v1/categories?order=name.asc", None, None)
            .await?;

        let categories = result
            .into_iter()
            .map(|row| serde_json::from_value(row).map_err(StoreError::from))
            .collect::<Result<Vec<Category>, _>>()?;

        Ok(categories)
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Category, ContentError> {
        let path = format!("/rest/v1/categories?slug=eq.{}", slug);
        let result: Vec<Value> = self.supabase.request(Method::GET, &path, None, None).await?;

        let row = result.into_iter().next().ok_or(ContentError::CategoryNotFound)?;
        let category = serde_json::from_value(row).map_err(StoreError::from)?;

        Ok(category)
    }

    /// Published articles for a category page; excerpts only, never the full
    /// content.
    pub async fn list_articles_for_category(
        &self,
        slug: &str,
    ) -> Result<Vec<ArticleSummary>, ContentError> {
        let category = self.get_by_slug(slug).await?;

        let path = format!(
            "/rest/v1/articles?category_id=eq.{}&status=eq.published&select=id,title,slug,excerpt,featured_image,author_name,category_id,status,created_at",
            category.id
        );
        let result: Vec<Value> = self.supabase.request(Method::GET, &path, None, None).await?;

        let articles = result
            .into_iter()
            .map(|row| serde_json::from_value(row).map_err(StoreError::from))
            .collect::<Result<Vec<ArticleSummary>, _>>()?;

        Ok(articles)
    }
}
