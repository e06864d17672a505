use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::error::StoreError;
use shared_database::supabase::SupabaseClient;
use user_cell::User;

use crate::models::{is_valid_time_of_day, AvailabilitySlot, AvailabilityError, CreateAvailabilityRequest};

pub struct AvailabilityService {
    supabase: SupabaseClient,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Register a recurring weekly slot for a professional. Duplicate
    /// `(day, start)` pairs are pre-checked for a clean message; the storage
    /// unique index has the final word under concurrent registration.
    pub async fn register_slot(
        &self,
        owner: &User,
        request: CreateAvailabilityRequest,
        auth_token: &str,
    ) -> Result<AvailabilitySlot, AvailabilityError> {
        debug!("Registering availability for professional {}", owner.id);

        if !(0..=6).contains(&request.day_of_week) {
            return Err(AvailabilityError::InvalidDay);
        }
        if !is_valid_time_of_day(&request.start_time) || !is_valid_time_of_day(&request.end_time) {
            return Err(AvailabilityError::InvalidTimeFormat);
        }

        let existing_path = format!(
            "/rest/v1/availability_slots?medical_user_id=eq.{}&day_of_week=eq.{}&start_time=eq.{}",
            owner.id, request.day_of_week, request.start_time
        );
        let existing: Vec<Value> = self
            .supabase
            .request(Method::GET, &existing_path, Some(auth_token), None)
            .await?;

        if !existing.is_empty() {
            return Err(AvailabilityError::SlotExists);
        }

        let slot_data = json!({
            "medical_user_id": owner.id,
            "day_of_week": request.day_of_week,
            "start_time": request.start_time,
            "end_time": request.end_time,
            "created_at": Utc::now().to_rfc3339()
        });

        let result = self
            .supabase
            .insert_returning("/rest/v1/availability_slots", Some(auth_token), slot_data)
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => AvailabilityError::SlotExists,
                other => AvailabilityError::Store(other),
            })?;

        let row = result
            .into_iter()
            .next()
            .ok_or(AvailabilityError::Store(StoreError::Api {
                status: 500,
                message: "Failed to create availability slot".to_string(),
            }))?;

        let slot: AvailabilitySlot = serde_json::from_value(row).map_err(StoreError::from)?;
        debug!("Availability slot created with ID: {}", slot.id);

        Ok(slot)
    }

    pub async fn list_for_professional(
        &self,
        medical_user_id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<Vec<AvailabilitySlot>, AvailabilityError> {
        let path = format!(
            "/rest/v1/availability_slots?medical_user_id=eq.{}&order=day_of_week.asc,start_time.asc",
            medical_user_id
        );
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await?;

        let slots = result
            .into_iter()
            .map(|row| serde_json::from_value(row).map_err(StoreError::from))
            .collect::<Result<Vec<AvailabilitySlot>, _>>()?;

        Ok(slots)
    }

    pub async fn remove_slot(
        &self,
        slot_id: Uuid,
        requester: &User,
        auth_token: &str,
    ) -> Result<(), AvailabilityError> {
        let path = format!("/rest/v1/availability_slots?id=eq.{}", slot_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        let row = result
            .into_iter()
            .next()
            .ok_or(AvailabilityError::SlotNotFound)?;
        let slot: AvailabilitySlot = serde_json::from_value(row).map_err(StoreError::from)?;

        if slot.medical_user_id != requester.id {
            return Err(AvailabilityError::NotOwner);
        }

        let _: Vec<Value> = self
            .supabase
            .request(Method::DELETE, &path, Some(auth_token), None)
            .await?;

        debug!("Availability slot {} removed", slot_id);
        Ok(())
    }
}
