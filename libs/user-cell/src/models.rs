use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_database::error::StoreError;
use shared_models::error::AppError;
use shared_models::role::UserRole;

/// A user directory record. Rows are created and removed exclusively by the
/// identity-provider webhook; role and profile fields are mutated by the
/// application-approval flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub external_id: String,
    pub email: String,
    #[serde(default)]
    pub username: String,
    pub role: UserRole,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub specialty: String,
    #[serde(default)]
    pub profile_picture_url: String,
    #[serde(default)]
    pub meeting_link: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public listing shape for medical professionals; omits internal ids and
/// the meeting link (that is only copied onto bookings).
#[derive(Debug, Serialize)]
pub struct PublicProfessional {
    pub external_id: String,
    pub username: String,
    pub email: String,
    pub bio: String,
    pub specialty: String,
    pub profile_picture_url: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for PublicProfessional {
    fn from(user: User) -> Self {
        Self {
            external_id: user.external_id,
            username: user.username,
            email: user.email,
            bio: user.bio,
            specialty: user.specialty,
            profile_picture_url: user.profile_picture_url,
            created_at: user.created_at,
        }
    }
}

// ==============================================================================
// IDENTITY-PROVIDER WEBHOOK PAYLOADS
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct IdentityEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: IdentityEventData,
}

#[derive(Debug, Deserialize)]
pub struct IdentityEventData {
    pub id: Option<String>,
    #[serde(default)]
    pub email_addresses: Vec<EmailAddress>,
    pub username: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EmailAddress {
    pub email_address: String,
}

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("User not found")]
    UserNotFound,

    #[error("Forbidden. You must have one of the following roles: {0}")]
    RoleDenied(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<DirectoryError> for AppError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::UserNotFound => AppError::NotFound("User not found".to_string()),
            err @ DirectoryError::RoleDenied(_) => AppError::Forbidden(err.to_string()),
            DirectoryError::Store(store) => store.into(),
        }
    }
}
