// libs/booking-cell/src/services/availability.rs
use std::sync::Arc;

use chrono::NaiveDate;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_backend::PortalApiClient;
use shared_config::PortalConfig;

use crate::models::{BookingError, DayAvailability, Slot};

/// Resolves the bookable slots for a doctor on a date. The result is a
/// point-in-time snapshot: any change to doctor, date or service requires a
/// fresh resolution, and the selection layer drops responses that arrive
/// for a superseded input combination.
pub struct AvailabilityService {
    api: Arc<PortalApiClient>,
}

impl AvailabilityService {
    pub fn new(config: &PortalConfig) -> Self {
        Self {
            api: Arc::new(PortalApiClient::new(config)),
        }
    }

    pub fn with_client(api: Arc<PortalApiClient>) -> Self {
        Self { api }
    }

    /// Two-phase lookup, because the backend materializes slot records
    /// lazily:
    ///
    /// 1. Ask for the day's availability. A populated slot list is returned
    ///    directly, each slot stamped with the day's date.
    /// 2. No slots but at least one schedule: fetch (and thereby
    ///    materialize) the slots of the first schedule, stamped with that
    ///    schedule's date.
    /// 3. Neither slots nor schedules: the doctor has no availability that
    ///    day. That is an empty result, not an error. Backend failures are
    ///    the only error path, and callers must offer a retry instead of
    ///    treating them as "no availability".
    pub async fn resolve_slots(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        medical_service_id: Option<Uuid>,
        auth_token: &str,
    ) -> Result<Vec<Slot>, BookingError> {
        debug!("Resolving slots for doctor {} on {}", doctor_id, date);

        let mut path = format!(
            "/api/v1/doctors/{}/availability?date={}",
            doctor_id,
            urlencoding::encode(&date.to_string())
        );
        if let Some(service_id) = medical_service_id {
            path.push_str(&format!("&service_id={}", service_id));
        }

        let day: DayAvailability = self.api.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await.map_err(|e| BookingError::ResolutionFailed(e.to_string()))?;

        if !day.available_slots.is_empty() {
            debug!("Day availability already holds {} slots", day.available_slots.len());
            return Ok(stamp_date(filter_bookable(day.available_slots), date));
        }

        if day.schedules.is_empty() {
            debug!("No schedules for doctor {} on {}: no availability", doctor_id, date);
            return Ok(Vec::new());
        }

        if day.schedules.len() > 1 {
            warn!(
                "{} schedules found for doctor {} on {}, using the first",
                day.schedules.len(), doctor_id, date
            );
        }
        let schedule = &day.schedules[0];

        let slots = self.slots_for_schedule(schedule.id, auth_token).await?;
        debug!("Materialized {} slots from schedule {}", slots.len(), schedule.id);

        Ok(stamp_date(filter_bookable(slots), schedule.date))
    }

    /// Fallback materialization path for a schedule whose slots do not
    /// exist yet.
    async fn slots_for_schedule(
        &self,
        schedule_id: Uuid,
        auth_token: &str,
    ) -> Result<Vec<Slot>, BookingError> {
        let path = format!("/api/v1/schedules/slots/multiple?schedule_id={}", schedule_id);

        let result: Vec<Value> = self.api.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await.map_err(|e| BookingError::ResolutionFailed(e.to_string()))?;

        result.into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<Slot>, _>>()
            .map_err(|e| BookingError::ParseError(e.to_string()))
    }
}

fn filter_bookable(mut slots: Vec<Slot>) -> Vec<Slot> {
    slots.retain(|slot| slot.is_available);
    slots
}

fn stamp_date(slots: Vec<Slot>, date: NaiveDate) -> Vec<Slot> {
    slots.into_iter()
        .map(|mut slot| {
            slot.date = Some(date);
            slot
        })
        .collect()
}
