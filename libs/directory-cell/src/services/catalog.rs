use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use shared_backend::PortalApiClient;
use shared_config::PortalConfig;

use crate::models::{Doctor, DirectoryError, MedicalService, PrimaryService};

/// Proxies the practice backend's reference-data endpoints. Lists are
/// re-fetched after a failed call rather than served stale; the caller
/// keeps whatever affordance it uses for retries.
pub struct CatalogService {
    api: Arc<PortalApiClient>,
}

impl CatalogService {
    pub fn new(config: &PortalConfig) -> Self {
        Self {
            api: Arc::new(PortalApiClient::new(config)),
        }
    }

    pub fn with_client(api: Arc<PortalApiClient>) -> Self {
        Self { api }
    }

    pub async fn list_doctors(&self, auth_token: &str) -> Result<Vec<Doctor>, DirectoryError> {
        debug!("Fetching doctor directory");

        let result: Vec<Value> = self.api.request(
            Method::GET,
            "/api/v1/doctors",
            Some(auth_token),
            None,
        ).await.map_err(|e| DirectoryError::FetchFailed(e.to_string()))?;

        let doctors: Vec<Doctor> = result.into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<Doctor>, _>>()
            .map_err(|e| DirectoryError::ParseError(e.to_string()))?;

        Ok(doctors)
    }

    pub async fn get_doctor(&self, doctor_id: Uuid, auth_token: &str) -> Result<Doctor, DirectoryError> {
        debug!("Fetching doctor: {}", doctor_id);

        let path = format!("/api/v1/doctors/{}", doctor_id);
        let result: Value = self.api.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await.map_err(|e| {
            let message = e.to_string();
            if message.starts_with("Resource not found") {
                DirectoryError::DoctorNotFound
            } else {
                DirectoryError::FetchFailed(message)
            }
        })?;

        serde_json::from_value(result)
            .map_err(|e| DirectoryError::ParseError(e.to_string()))
    }

    /// Billing categories are practice-wide, not doctor-scoped.
    pub async fn primary_services(&self, auth_token: &str) -> Result<Vec<PrimaryService>, DirectoryError> {
        debug!("Fetching primary services");

        let result: Vec<Value> = self.api.request(
            Method::GET,
            "/api/v1/services/primary",
            Some(auth_token),
            None,
        ).await.map_err(|e| DirectoryError::FetchFailed(e.to_string()))?;

        let services: Vec<PrimaryService> = result.into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<PrimaryService>, _>>()
            .map_err(|e| DirectoryError::ParseError(e.to_string()))?;

        Ok(services)
    }

    pub async fn medical_services(
        &self,
        doctor_id: Uuid,
        auth_token: &str,
    ) -> Result<Vec<MedicalService>, DirectoryError> {
        debug!("Fetching medical services for doctor: {}", doctor_id);

        let path = format!("/api/v1/services/doctor/{}", doctor_id);
        let result: Vec<Value> = self.api.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await.map_err(|e| DirectoryError::FetchFailed(e.to_string()))?;

        let services: Vec<MedicalService> = result.into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<MedicalService>, _>>()
            .map_err(|e| DirectoryError::ParseError(e.to_string()))?;

        Ok(services)
    }
}
