use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_database::error::StoreError;
use shared_models::error::AppError;
use shared_models::role::UserRole;
use user_cell::DirectoryError;

/// The roles a base user may apply to be elevated to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppliedRole {
    Writer,
    Medical,
}

impl AppliedRole {
    pub fn to_user_role(self) -> UserRole {
        match self {
            AppliedRole::Writer => UserRole::Writer,
            AppliedRole::Medical => UserRole::Medical,
        }
    }
}

impl fmt::Display for AppliedRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppliedRole::Writer => write!(f, "writer"),
            AppliedRole::Medical => write!(f, "medical"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplicationStatus::Pending => write!(f, "pending"),
            ApplicationStatus::Approved => write!(f, "approved"),
            ApplicationStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// A role-upgrade request. A user can hold at most one pending application;
/// pending is the only state that can still be decided.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub id: Uuid,
    pub user_external_id: String,
    pub user_id: Uuid,
    pub role_applied_for: AppliedRole,
    pub status: ApplicationStatus,
    pub bio: String,
    /// Only meaningful for medical applications.
    #[serde(default)]
    pub specialty: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitApplicationRequest {
    pub role_applied_for: AppliedRole,
    pub bio: String,
    pub specialty: Option<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct ApplicantSummary {
    pub username: String,
    pub email: String,
}

/// A pending application with the applicant's display info for review.
#[derive(Debug, Serialize)]
pub struct PendingApplicationView {
    #[serde(flatten)]
    pub application: Application,
    pub applicant: ApplicantSummary,
}

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("You already have an advanced role.")]
    AlreadyElevated,

    #[error("You already have a pending application.")]
    DuplicatePending,

    #[error("No application found")]
    NoApplication,

    #[error("Application not found")]
    ApplicationNotFound,

    #[error("Application is already {0}")]
    AlreadyDecided(ApplicationStatus),

    /// The applicant was deleted after applying; the application has been
    /// marked rejected as cleanup.
    #[error("User not found")]
    ApplicantMissing,

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ApplicationError> for AppError {
    fn from(err: ApplicationError) -> Self {
        match err {
            err @ (ApplicationError::AlreadyElevated | ApplicationError::DuplicatePending) => {
                AppError::Conflict(err.to_string())
            }
            ApplicationError::NoApplication => {
                AppError::NotFound("No application found".to_string())
            }
            ApplicationError::ApplicationNotFound => {
                AppError::NotFound("Application not found".to_string())
            }
            err @ ApplicationError::AlreadyDecided(_) => AppError::Conflict(err.to_string()),
            ApplicationError::ApplicantMissing => AppError::NotFound("User not found".to_string()),
            ApplicationError::Directory(e) => e.into(),
            ApplicationError::Store(e) => e.into(),
        }
    }
}
