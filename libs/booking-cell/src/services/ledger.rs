use std::collections::HashMap;

use chrono::{SecondsFormat, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::error::StoreError;
use shared_database::supabase::SupabaseClient;
use shared_models::role::UserRole;
use user_cell::{User, UserDirectoryService};

use crate::models::{
    Booking, BookingError, BookingStatus, CreateBookingRequest, PatientBookingView,
    PatientSummary, ProfessionalSummary, PublicBookingWindow, ScheduleBookingView,
};

pub struct BookingService {
    supabase: SupabaseClient,
    directory: UserDirectoryService,
}

impl BookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            directory: UserDirectoryService::new(config),
        }
    }

    /// Create a confirmed booking for a patient with a medical professional.
    ///
    /// The existence pre-check produces a clean error message; the partial
    /// unique index on `(medical_user_id, start_time)` is what actually
    /// prevents double-booking under concurrent requests.
    pub async fn create_booking(
        &self,
        patient_external_id: &str,
        request: CreateBookingRequest,
        auth_token: &str,
    ) -> Result<Booking, BookingError> {
        info!(
            "Creating booking for patient {} with professional {}",
            patient_external_id, request.medical_clerk_id
        );

        let patient = self
            .directory
            .try_get_by_external_id(patient_external_id, Some(auth_token))
            .await?
            .ok_or(BookingError::UserNotFound)?;
        let professional = self
            .directory
            .try_get_by_external_id(&request.medical_clerk_id, Some(auth_token))
            .await?
            .ok_or(BookingError::UserNotFound)?;

        if professional.role != UserRole::Medical {
            return Err(BookingError::NotMedicalProfessional);
        }
        if patient.id == professional.id {
            return Err(BookingError::SelfBooking);
        }
        if request.start_time < Utc::now() {
            return Err(BookingError::PastDate);
        }

        let start = request
            .start_time
            .to_rfc3339_opts(SecondsFormat::Secs, true);

        let existing_path = format!(
            "/rest/v1/bookings?medical_user_id=eq.{}&start_time=eq.{}&status=eq.confirmed",
            professional.id, start
        );
        let existing: Vec<Value> = self
            .supabase
            .request(Method::GET, &existing_path, Some(auth_token), None)
            .await?;

        if !existing.is_empty() {
            warn!(
                "Double-booking attempt for professional {} at {}",
                professional.id, start
            );
            return Err(BookingError::SlotTaken);
        }

        let booking_data = json!({
            "patient_id": patient.id,
            "medical_user_id": professional.id,
            "start_time": start,
            "end_time": request.end_time.to_rfc3339_opts(SecondsFormat::Secs, true),
            "status": BookingStatus::Confirmed,
            "notes": request.notes.unwrap_or_default(),
            "meeting_link": professional.meeting_link,
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        });

        let result = self
            .supabase
            .insert_returning("/rest/v1/bookings", Some(auth_token), booking_data)
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => BookingError::SlotTaken,
                other => BookingError::Store(other),
            })?;

        let row = result.into_iter().next().ok_or(BookingError::Store(StoreError::Api {
            status: 500,
            message: "Failed to create booking".to_string(),
        }))?;

        let booking: Booking = serde_json::from_value(row).map_err(StoreError::from)?;
        info!("Booking {} confirmed", booking.id);

        Ok(booking)
    }

    pub async fn list_for_patient(
        &self,
        patient_external_id: &str,
        auth_token: &str,
    ) -> Result<Vec<PatientBookingView>, BookingError> {
        let patient = self
            .directory
            .try_get_by_external_id(patient_external_id, Some(auth_token))
            .await?
            .ok_or(BookingError::UserNotFound)?;

        let path = format!(
            "/rest/v1/bookings?patient_id=eq.{}&order=start_time.asc",
            patient.id
        );
        let bookings = self.fetch_bookings(&path, Some(auth_token)).await?;

        let professional_ids: Vec<Uuid> =
            bookings.iter().map(|b| b.medical_user_id).collect();
        let professionals =
            self.lookup_users(&professional_ids, Some(auth_token)).await?;

        let views = bookings
            .into_iter()
            .map(|booking| {
                let medical_user = professionals
                    .get(&booking.medical_user_id)
                    .map(ProfessionalSummary::from)
                    .unwrap_or_default();
                PatientBookingView { booking, medical_user }
            })
            .collect();

        Ok(views)
    }

    pub async fn list_for_professional(
        &self,
        professional: &User,
        auth_token: &str,
    ) -> Result<Vec<ScheduleBookingView>, BookingError> {
        let path = format!(
            "/rest/v1/bookings?medical_user_id=eq.{}&order=start_time.asc",
            professional.id
        );
        let bookings = self.fetch_bookings(&path, Some(auth_token)).await?;

        let patient_ids: Vec<Uuid> = bookings.iter().map(|b| b.patient_id).collect();
        let patients = self.lookup_users(&patient_ids, Some(auth_token)).await?;

        let views = bookings
            .into_iter()
            .map(|booking| {
                let patient = patients
                    .get(&booking.patient_id)
                    .map(|user| PatientSummary { username: user.username.clone() })
                    .unwrap_or_default();
                ScheduleBookingView { booking, patient }
            })
            .collect();

        Ok(views)
    }

    /// Public calendar feed for a professional: upcoming confirmed bookings,
    /// times only.
    pub async fn list_public_upcoming(
        &self,
        professional_external_id: &str,
    ) -> Result<Vec<PublicBookingWindow>, BookingError> {
        let professional = self
            .directory
            .try_get_by_external_id(professional_external_id, None)
            .await?
            .ok_or(BookingError::UserNotFound)?;

        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let path = format!(
            "/rest/v1/bookings?medical_user_id=eq.{}&status=eq.confirmed&start_time=gte.{}&select=start_time,end_time&order=start_time.asc",
            professional.id, now
        );
        let result: Vec<Value> = self.supabase.request(Method::GET, &path, None, None).await?;

        let windows = result
            .into_iter()
            .map(|row| serde_json::from_value(row).map_err(StoreError::from))
            .collect::<Result<Vec<PublicBookingWindow>, _>>()?;

        Ok(windows)
    }

    /// Cancel a booking. Either participant may cancel; cancelled and
    /// completed are terminal.
    pub async fn cancel_booking(
        &self,
        booking_id: Uuid,
        requester_external_id: &str,
        auth_token: &str,
    ) -> Result<Booking, BookingError> {
        let requester = self
            .directory
            .try_get_by_external_id(requester_external_id, Some(auth_token))
            .await?
            .ok_or(BookingError::UserNotFound)?;

        let path = format!("/rest/v1/bookings?id=eq.{}", booking_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        let row = result.into_iter().next().ok_or(BookingError::BookingNotFound)?;
        let booking: Booking = serde_json::from_value(row).map_err(StoreError::from)?;

        let is_patient = booking.patient_id == requester.id;
        let is_professional = booking.medical_user_id == requester.id;
        if !is_patient && !is_professional {
            return Err(BookingError::NotParticipant);
        }

        if booking.status != BookingStatus::Confirmed {
            return Err(BookingError::AlreadyClosed(booking.status));
        }

        let update = json!({
            "status": BookingStatus::Cancelled,
            "updated_at": Utc::now().to_rfc3339()
        });

        let updated = self
            .supabase
            .update_returning(&path, Some(auth_token), update)
            .await?;

        let row = updated.into_iter().next().ok_or(BookingError::BookingNotFound)?;
        let cancelled: Booking = serde_json::from_value(row).map_err(StoreError::from)?;

        debug!("Booking {} cancelled by {}", booking_id, requester.external_id);
        Ok(cancelled)
    }

    async fn fetch_bookings(
        &self,
        path: &str,
        auth_token: Option<&str>,
    ) -> Result<Vec<Booking>, BookingError> {
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, path, auth_token, None)
            .await?;

        let bookings = result
            .into_iter()
            .map(|row| serde_json::from_value(row).map_err(StoreError::from))
            .collect::<Result<Vec<Booking>, _>>()?;

        Ok(bookings)
    }

    async fn lookup_users(
        &self,
        user_ids: &[Uuid],
        auth_token: Option<&str>,
    ) -> Result<HashMap<Uuid, User>, BookingError> {
        let mut unique = user_ids.to_vec();
        unique.sort();
        unique.dedup();

        let users = self.directory.get_by_ids(&unique, auth_token).await?;
        Ok(users.into_iter().map(|u| (u.id, u)).collect())
    }
}
