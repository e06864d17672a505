use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_database::error::StoreError;
use shared_models::error::AppError;
use user_cell::DirectoryError;

/// A recurring weekly availability window offered by a medical professional.
/// `(medical_user_id, day_of_week, start_time)` is unique at the storage
/// layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilitySlot {
    pub id: Uuid,
    pub medical_user_id: Uuid,
    /// 0 = Sunday through 6 = Saturday.
    pub day_of_week: i32,
    /// 24-hour "HH:MM".
    pub start_time: String,
    pub end_time: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAvailabilityRequest {
    pub day_of_week: i32,
    pub start_time: String,
    pub end_time: String,
}

/// Time-of-day format used by availability windows.
pub fn is_valid_time_of_day(value: &str) -> bool {
    static TIME_RE: OnceLock<Regex> = OnceLock::new();
    let re = TIME_RE.get_or_init(|| {
        Regex::new(r"^([0-1]?[0-9]|2[0-3]):[0-5][0-9]$").expect("valid time regex")
    });
    re.is_match(value)
}

#[derive(Error, Debug)]
pub enum AvailabilityError {
    #[error("This availability slot already exists")]
    SlotExists,

    #[error("Availability slot not found")]
    SlotNotFound,

    #[error("Not authorized to delete this slot")]
    NotOwner,

    #[error("Day of week must be between 0 (Sunday) and 6 (Saturday)")]
    InvalidDay,

    #[error("Please use HH:mm format for start and end times")]
    InvalidTimeFormat,

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<AvailabilityError> for AppError {
    fn from(err: AvailabilityError) -> Self {
        match err {
            AvailabilityError::SlotExists => {
                AppError::Conflict("This availability slot already exists".to_string())
            }
            AvailabilityError::SlotNotFound => {
                AppError::NotFound("Availability slot not found".to_string())
            }
            AvailabilityError::NotOwner => {
                AppError::Forbidden("Not authorized to delete this slot".to_string())
            }
            err @ (AvailabilityError::InvalidDay | AvailabilityError::InvalidTimeFormat) => {
                AppError::ValidationError(err.to_string())
            }
            AvailabilityError::Directory(e) => e.into(),
            // The unique index is the race backstop: losing the insert race
            // reads the same as the pre-check catching the duplicate.
            AvailabilityError::Store(StoreError::Conflict(_)) => {
                AppError::Conflict("This availability slot already exists".to_string())
            }
            AvailabilityError::Store(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_of_day_format() {
        assert!(is_valid_time_of_day("09:00"));
        assert!(is_valid_time_of_day("9:05"));
        assert!(is_valid_time_of_day("23:59"));
        assert!(!is_valid_time_of_day("24:00"));
        assert!(!is_valid_time_of_day("12:60"));
        assert!(!is_valid_time_of_day("noon"));
        assert!(!is_valid_time_of_day("12:5"));
    }
}
