use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_database::error::StoreError;
use shared_models::error::AppError;
use user_cell::{DirectoryError, User};

/// A concrete appointment between one patient and one medical professional.
///
/// At most one `confirmed` booking can exist per `(medical_user_id,
/// start_time)` pair; a partial unique index enforces this at the storage
/// layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub medical_user_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: BookingStatus,
    #[serde(default)]
    pub notes: String,
    /// Copied from the professional's profile at creation time, so a later
    /// profile change does not alter existing bookings.
    #[serde(default)]
    pub meeting_link: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
    /// No operation transitions a booking here; the state exists for
    /// administrative tooling outside this API.
    Completed,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStatus::Confirmed => write!(f, "confirmed"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
            BookingStatus::Completed => write!(f, "completed"),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    /// External identity reference of the professional being booked.
    pub medical_clerk_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub notes: Option<String>,
}

// ==============================================================================
// LIST VIEWS
// ==============================================================================

#[derive(Debug, Default, Serialize)]
pub struct ProfessionalSummary {
    pub username: String,
    pub bio: String,
    pub specialty: String,
    pub profile_picture_url: String,
}

impl From<&User> for ProfessionalSummary {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            bio: user.bio.clone(),
            specialty: user.specialty.clone(),
            profile_picture_url: user.profile_picture_url.clone(),
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct PatientSummary {
    pub username: String,
}

/// A patient's booking with the professional's display info attached.
#[derive(Debug, Serialize)]
pub struct PatientBookingView {
    #[serde(flatten)]
    pub booking: Booking,
    pub medical_user: ProfessionalSummary,
}

/// A professional's booking with the patient's display name attached.
#[derive(Debug, Serialize)]
pub struct ScheduleBookingView {
    #[serde(flatten)]
    pub booking: Booking,
    pub patient: PatientSummary,
}

/// Public calendar entry: times only, no patient identity.
#[derive(Debug, Serialize, Deserialize)]
pub struct PublicBookingWindow {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("User not found")]
    UserNotFound,

    #[error("This user is not a medical professional")]
    NotMedicalProfessional,

    #[error("You cannot book an appointment with yourself")]
    SelfBooking,

    #[error("Cannot book appointments in the past")]
    PastDate,

    #[error("This time slot is already booked")]
    SlotTaken,

    #[error("Booking not found")]
    BookingNotFound,

    #[error("Not authorized to modify this booking")]
    NotParticipant,

    #[error("Booking is already {0}")]
    AlreadyClosed(BookingStatus),

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::UserNotFound => AppError::NotFound("User not found".to_string()),
            err @ (BookingError::NotMedicalProfessional
            | BookingError::SelfBooking
            | BookingError::PastDate) => AppError::ValidationError(err.to_string()),
            BookingError::SlotTaken => {
                AppError::Conflict("This time slot is already booked".to_string())
            }
            BookingError::BookingNotFound => AppError::NotFound("Booking not found".to_string()),
            BookingError::NotParticipant => {
                AppError::Forbidden("Not authorized to modify this booking".to_string())
            }
            err @ BookingError::AlreadyClosed(_) => AppError::Conflict(err.to_string()),
            BookingError::Directory(e) => e.into(),
            // An insert losing the race to the partial unique index reads
            // the same as the pre-check catching the double-booking.
            BookingError::Store(StoreError::Conflict(_)) => {
                AppError::Conflict("This time slot is already booked".to_string())
            }
            BookingError::Store(e) => e.into(),
        }
    }
}
