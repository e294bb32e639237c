// libs/booking-cell/src/services/history.rs
use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use shared_backend::PortalApiClient;
use shared_config::PortalConfig;

use crate::models::{Appointment, BookingError};

/// Read side of the appointment record: the patient's history list, which
/// reflects a confirmed booking as soon as payment lands.
pub struct HistoryService {
    api: Arc<PortalApiClient>,
}

impl HistoryService {
    pub fn new(config: &PortalConfig) -> Self {
        Self {
            api: Arc::new(PortalApiClient::new(config)),
        }
    }

    pub fn with_client(api: Arc<PortalApiClient>) -> Self {
        Self { api }
    }

    pub async fn patient_appointments(
        &self,
        patient_id: Uuid,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, BookingError> {
        debug!("Fetching appointment history for patient {}", patient_id);

        let path = format!("/api/v1/appointments/patient/{}", patient_id);
        let result: Vec<Value> = self.api.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await.map_err(|e| BookingError::HistoryFailed(e.to_string()))?;

        result.into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<Appointment>, _>>()
            .map_err(|e| BookingError::ParseError(e.to_string()))
    }
}
