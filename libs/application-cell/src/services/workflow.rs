use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::error::StoreError;
use shared_database::supabase::SupabaseClient;
use user_cell::UserDirectoryService;

use crate::models::{
    ApplicantSummary, Application, ApplicationError, ApplicationStatus, AppliedRole,
    PendingApplicationView, SubmitApplicationRequest,
};

pub struct ApplicationService {
    supabase: SupabaseClient,
    directory: UserDirectoryService,
}

impl ApplicationService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            directory: UserDirectoryService::new(config),
        }
    }

    pub async fn submit(
        &self,
        applicant_external_id: &str,
        request: SubmitApplicationRequest,
        auth_token: &str,
    ) -> Result<Application, ApplicationError> {
        debug!("Application submitted by {}", applicant_external_id);

        let applicant = self
            .directory
            .get_by_external_id(applicant_external_id, Some(auth_token))
            .await?;

        if !applicant.role.is_base() {
            return Err(ApplicationError::AlreadyElevated);
        }

        let pending_path = format!(
            "/rest/v1/applications?user_external_id=eq.{}&status=eq.pending",
            applicant_external_id
        );
        let pending: Vec<Value> = self
            .supabase
            .request(Method::GET, &pending_path, Some(auth_token), None)
            .await?;

        if !pending.is_empty() {
            return Err(ApplicationError::DuplicatePending);
        }

        // Specialty only applies to medical applications.
        let specialty = match request.role_applied_for {
            AppliedRole::Medical => request.specialty.unwrap_or_default(),
            AppliedRole::Writer => String::new(),
        };

        let application_data = json!({
            "user_external_id": applicant.external_id,
            "user_id": applicant.id,
            "role_applied_for": request.role_applied_for,
            "status": ApplicationStatus::Pending,
            "bio": request.bio,
            "specialty": specialty,
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        });

        let result = self
            .supabase
            .insert_returning("/rest/v1/applications", Some(auth_token), application_data)
            .await?;

        let row = result.into_iter().next().ok_or(ApplicationError::Store(StoreError::Api {
            status: 500,
            message: "Failed to create application".to_string(),
        }))?;

        let application: Application = serde_json::from_value(row).map_err(StoreError::from)?;
        info!("Application {} created", application.id);

        Ok(application)
    }

    /// The applicant's most recent application, regardless of status.
    pub async fn my_status(
        &self,
        applicant_external_id: &str,
        auth_token: &str,
    ) -> Result<Application, ApplicationError> {
        let path = format!(
            "/rest/v1/applications?user_external_id=eq.{}&order=created_at.desc&limit=1",
            applicant_external_id
        );
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        let row = result.into_iter().next().ok_or(ApplicationError::NoApplication)?;
        let application = serde_json::from_value(row).map_err(StoreError::from)?;

        Ok(application)
    }

    /// All pending applications, oldest first, for review order.
    pub async fn list_pending(
        &self,
        auth_token: &str,
    ) -> Result<Vec<PendingApplicationView>, ApplicationError> {
        let path = "/rest/v1/applications?status=eq.pending&order=created_at.asc";
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, path, Some(auth_token), None)
            .await?;

        let applications = result
            .into_iter()
            .map(|row| serde_json::from_value(row).map_err(StoreError::from))
            .collect::<Result<Vec<Application>, _>>()?;

        let mut applicant_ids: Vec<Uuid> = applications.iter().map(|a| a.user_id).collect();
        applicant_ids.sort();
        applicant_ids.dedup();

        let users = self
            .directory
            .get_by_ids(&applicant_ids, Some(auth_token))
            .await
            .map_err(ApplicationError::Store)?;

        let views = applications
            .into_iter()
            .map(|application| {
                let applicant = users
                    .iter()
                    .find(|u| u.id == application.user_id)
                    .map(|u| ApplicantSummary {
                        username: u.username.clone(),
                        email: u.email.clone(),
                    })
                    .unwrap_or_default();
                PendingApplicationView { application, applicant }
            })
            .collect();

        Ok(views)
    }

    /// Approve: promote the user, then mark the application approved.
    ///
    /// The two writes are sequential, not transactional. A failure between
    /// them leaves the user promoted with the application still pending;
    /// that window is accepted and documented rather than papered over.
    pub async fn approve(
        &self,
        application_id: Uuid,
        auth_token: &str,
    ) -> Result<(), ApplicationError> {
        let application = self.get_pending(application_id, auth_token).await?;

        let user = self
            .directory
            .try_get_by_id(application.user_id, Some(auth_token))
            .await
            .map_err(ApplicationError::Store)?;

        let Some(user) = user else {
            // Applicant deleted since applying; close out the orphaned
            // application instead of leaving it reviewable forever.
            warn!(
                "Applicant {} missing for application {}, rejecting",
                application.user_id, application_id
            );
            self.set_status(application_id, ApplicationStatus::Rejected, auth_token)
                .await?;
            return Err(ApplicationError::ApplicantMissing);
        };

        let specialty = match application.role_applied_for {
            AppliedRole::Medical if !application.specialty.is_empty() => {
                Some(application.specialty.as_str())
            }
            _ => None,
        };

        self.directory
            .apply_promotion(
                user.id,
                application.role_applied_for.to_user_role(),
                &application.bio,
                specialty,
                Some(auth_token),
            )
            .await
            .map_err(ApplicationError::Store)?;

        self.set_status(application_id, ApplicationStatus::Approved, auth_token)
            .await?;

        info!(
            "Application {} approved, user {} promoted to {}",
            application_id, user.external_id, application.role_applied_for
        );
        Ok(())
    }

    pub async fn reject(
        &self,
        application_id: Uuid,
        auth_token: &str,
    ) -> Result<(), ApplicationError> {
        let application = self.get_pending(application_id, auth_token).await?;

        self.set_status(application.id, ApplicationStatus::Rejected, auth_token)
            .await?;

        info!("Application {} rejected", application_id);
        Ok(())
    }

    async fn get_pending(
        &self,
        application_id: Uuid,
        auth_token: &str,
    ) -> Result<Application, ApplicationError> {
        let path = format!("/rest/v1/applications?id=eq.{}", application_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        let row = result.into_iter().next().ok_or(ApplicationError::ApplicationNotFound)?;
        let application: Application = serde_json::from_value(row).map_err(StoreError::from)?;

        if application.status != ApplicationStatus::Pending {
            return Err(ApplicationError::AlreadyDecided(application.status));
        }

        Ok(application)
    }

    async fn set_status(
        &self,
        application_id: Uuid,
        status: ApplicationStatus,
        auth_token: &str,
    ) -> Result<(), ApplicationError> {
        let path = format!("/rest/v1/applications?id=eq.{}", application_id);
        let update = json!({
            "status": status,
            "updated_at": Utc::now().to_rfc3339()
        });

        self.supabase
            .update_returning(&path, Some(auth_token), update)
            .await?;

        Ok(())
    }
}
