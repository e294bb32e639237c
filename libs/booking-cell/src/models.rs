// libs/booking-cell/src/models.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc, NaiveDate};
use std::fmt;

// ==============================================================================
// AVAILABILITY MODELS
// ==============================================================================

/// A doctor's working window for one calendar date. Slot records may not be
/// materialized for it yet; the resolver handles that lazily.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
}

/// Atomic bookable time unit. `start_time`/`end_time` are the backend's own
/// clock strings and travel through the flow verbatim; the stored
/// appointment time is always a copy of `start_time`, never a reformat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub id: Uuid,
    pub schedule_id: Uuid,
    pub start_time: String,
    pub end_time: String,
    pub is_available: bool,
    /// Stamped by the resolver from the owning schedule's date.
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// Response of the day-availability endpoint. Either list may be empty:
/// slots missing with schedules present means "not materialized yet", both
/// empty means the doctor has no availability that day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayAvailability {
    #[serde(default)]
    pub schedules: Vec<Schedule>,
    #[serde(default)]
    pub available_slots: Vec<Slot>,
}

// ==============================================================================
// APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    PendingPayment,
    Confirmed,
    Cancelled,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::PendingPayment => write!(f, "pending_payment"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Unconfirmed appointment returned by the temporary-creation endpoint.
/// Holds no slot exclusively until payment confirms it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TempAppointment {
    pub id: Uuid,
    pub amount: String,
    pub status: AppointmentStatus,
}

/// Durable appointment row as listed in the patient's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub medical_service_id: Uuid,
    pub primary_service_id: Uuid,
    pub slot_id: Uuid,
    pub appointment_date: NaiveDate,
    pub appointment_time: String,
    pub duration_minutes: i32,
    pub amount: String,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
}

// ==============================================================================
// PAYMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

/// How the hosted card-entry step ended. `Cancelled` is the user closing
/// the widget; it is not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum CardPaymentOutcome {
    Succeeded,
    Declined { reason: String },
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub appointment_id: Uuid,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaymentResolution {
    Confirmed(BookingConfirmation),
    Cancelled,
}

// ==============================================================================
// ORCHESTRATION MODELS
// ==============================================================================

/// Phase of the booking protocol. `Confirmed` is terminal for the booking
/// it concludes; a new submission may start from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingPhase {
    Idle,
    CreatingTemporary,
    AwaitingPayment,
    Confirmed,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum BookingError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Another booking is already in progress")]
    SubmissionInProgress,

    #[error("No payment is awaiting completion")]
    NoPendingPayment,

    #[error("Availability lookup failed: {0}")]
    ResolutionFailed(String),

    #[error("Could not create appointment: {0}")]
    SubmissionFailed(String),

    #[error("Payment failed: {0}")]
    PaymentFailed(String),

    #[error("Appointment history lookup failed: {0}")]
    HistoryFailed(String),

    #[error("Unexpected backend payload: {0}")]
    ParseError(String),
}
