use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Read-only reference data: fetched once per portal session, never written
/// by the booking flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub specialization: String,
}

impl Doctor {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Billing-level encounter category ("New Patient", "Follow Up"). The
/// normalized name drives the additive pricing rule in the booking cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrimaryService {
    pub id: Uuid,
    pub name: String,
    pub base_price: String,
}

/// Clinical service offered by one doctor. Fetching is doctor-scoped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicalService {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub name: String,
    pub base_price: String,
    pub duration_minutes: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum DirectoryError {
    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Directory lookup failed: {0}")]
    FetchFailed(String),

    #[error("Unexpected directory payload: {0}")]
    ParseError(String),
}
