use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::error::StoreError;
use shared_database::supabase::SupabaseClient;
use shared_models::role::UserRole;

use crate::models::{DirectoryError, IdentityEventData, User};

pub struct UserDirectoryService {
    supabase: SupabaseClient,
}

impl UserDirectoryService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn try_get_by_external_id(
        &self,
        external_id: &str,
        auth_token: Option<&str>,
    ) -> Result<Option<User>, StoreError> {
        let path = format!("/rest/v1/users?external_id=eq.{}", external_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await?;

        match result.into_iter().next() {
            Some(row) => Ok(Some(serde_json::from_value(row)?)),
            None => Ok(None),
        }
    }

    pub async fn get_by_external_id(
        &self,
        external_id: &str,
        auth_token: Option<&str>,
    ) -> Result<User, DirectoryError> {
        self.try_get_by_external_id(external_id, auth_token)
            .await?
            .ok_or(DirectoryError::UserNotFound)
    }

    pub async fn try_get_by_id(
        &self,
        user_id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<Option<User>, StoreError> {
        let path = format!("/rest/v1/users?id=eq.{}", user_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await?;

        match result.into_iter().next() {
            Some(row) => Ok(Some(serde_json::from_value(row)?)),
            None => Ok(None),
        }
    }

    /// Role guard: fetches the caller's directory record and checks it
    /// against the allowed roles. Returns the fresh record so handlers do
    /// not fetch twice.
    pub async fn require_role(
        &self,
        external_id: &str,
        allowed: &[UserRole],
        auth_token: Option<&str>,
    ) -> Result<User, DirectoryError> {
        let user = self.get_by_external_id(external_id, auth_token).await?;

        if !allowed.contains(&user.role) {
            let roles: Vec<&str> = allowed.iter().map(|r| r.as_str()).collect();
            return Err(DirectoryError::RoleDenied(roles.join(", ")));
        }

        Ok(user)
    }

    pub async fn list_medical_professionals(&self) -> Result<Vec<User>, StoreError> {
        let path = "/rest/v1/users?role=eq.medical&order=created_at.desc";
        let result: Vec<Value> = self.supabase.request(Method::GET, path, None, None).await?;

        result
            .into_iter()
            .map(|row| serde_json::from_value(row).map_err(StoreError::from))
            .collect()
    }

    /// Resolve several users by row id in one query; used to attach
    /// counterpart names to booking lists.
    pub async fn get_by_ids(
        &self,
        user_ids: &[Uuid],
        auth_token: Option<&str>,
    ) -> Result<Vec<User>, StoreError> {
        if user_ids.is_empty() {
            return Ok(vec![]);
        }

        let ids: Vec<String> = user_ids.iter().map(|id| id.to_string()).collect();
        let path = format!("/rest/v1/users?id=in.({})", ids.join(","));
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await?;

        result
            .into_iter()
            .map(|row| serde_json::from_value(row).map_err(StoreError::from))
            .collect()
    }

    // ==========================================================================
    // IDENTITY-PROVIDER SYNCHRONIZATION (webhook-driven)
    // ==========================================================================

    pub async fn create_from_identity(&self, data: &IdentityEventData) -> Result<User, StoreError> {
        let external_id = data.id.as_deref().unwrap_or_default();
        debug!("Creating directory record for identity {}", external_id);

        let email = data
            .email_addresses
            .first()
            .map(|e| e.email_address.clone())
            .unwrap_or_default();

        let user_data = json!({
            "external_id": external_id,
            "email": email,
            "username": data.username.clone().unwrap_or_default(),
            "role": UserRole::User,
            "profile_picture_url": data.image_url.clone().unwrap_or_default(),
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        });

        let result = self
            .supabase
            .insert_returning("/rest/v1/users", None, user_data)
            .await?;

        let row = result.into_iter().next().ok_or_else(|| StoreError::Api {
            status: 500,
            message: "Failed to create user".to_string(),
        })?;

        Ok(serde_json::from_value(row)?)
    }

    pub async fn update_from_identity(&self, data: &IdentityEventData) -> Result<(), StoreError> {
        let external_id = data.id.as_deref().unwrap_or_default();

        let mut update = serde_json::Map::new();
        if let Some(email) = data.email_addresses.first() {
            update.insert("email".to_string(), json!(email.email_address));
        }
        if let Some(username) = &data.username {
            update.insert("username".to_string(), json!(username));
        }
        if let Some(image_url) = &data.image_url {
            update.insert("profile_picture_url".to_string(), json!(image_url));
        }
        update.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!("/rest/v1/users?external_id=eq.{}", external_id);
        let updated = self
            .supabase
            .update_returning(&path, None, Value::Object(update))
            .await?;

        if updated.is_empty() {
            warn!("Identity {} not found for update", external_id);
        }

        Ok(())
    }

    pub async fn delete_by_external_id(&self, external_id: &str) -> Result<(), StoreError> {
        let path = format!("/rest/v1/users?external_id=eq.{}", external_id);
        let _: Vec<Value> = self.supabase.request(Method::DELETE, &path, None, None).await?;

        debug!("Directory record for identity {} deleted", external_id);
        Ok(())
    }

    /// Application-approval side effect: copy the application's bio (and
    /// specialty, for medical applications) onto the user and set the role.
    pub async fn apply_promotion(
        &self,
        user_id: Uuid,
        role: UserRole,
        bio: &str,
        specialty: Option<&str>,
        auth_token: Option<&str>,
    ) -> Result<User, StoreError> {
        let mut update = serde_json::Map::new();
        update.insert("role".to_string(), json!(role));
        update.insert("bio".to_string(), json!(bio));
        if let Some(specialty) = specialty {
            update.insert("specialty".to_string(), json!(specialty));
        }
        update.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!("/rest/v1/users?id=eq.{}", user_id);
        let result = self
            .supabase
            .update_returning(&path, auth_token, Value::Object(update))
            .await?;

        let row = result.into_iter().next().ok_or_else(|| {
            StoreError::NotFound(format!("User {} not found for promotion", user_id))
        })?;

        Ok(serde_json::from_value(row)?)
    }
}
