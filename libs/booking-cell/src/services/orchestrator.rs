// libs/booking-cell/src/services/orchestrator.rs
use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_backend::PortalApiClient;
use shared_config::PortalConfig;
use shared_utils::session::Session;

use crate::models::{
    BookingConfirmation, BookingError, BookingPhase, CardPaymentOutcome, PaymentResolution,
    TempAppointment,
};
use crate::selection::BookingSelection;
use crate::services::payment::{CardPaymentCapability, PaymentService};
use crate::services::pricing;

/// Sink for the flow's user-visible outcomes. The orchestrator calls each
/// hook at most once per submission, on the state transition itself, so
/// re-rendering callers cannot stack duplicate notifications.
#[cfg_attr(test, mockall::automock)]
pub trait BookingNotifier: Send + Sync {
    fn notify_success(&self, message: &str);
    fn notify_error(&self, message: &str);
}

/// Logs outcomes when the embedding shell has not installed its own sink.
pub struct TracingNotifier;

impl BookingNotifier for TracingNotifier {
    fn notify_success(&self, message: &str) {
        info!("{}", message);
    }

    fn notify_error(&self, message: &str) {
        tracing::error!("{}", message);
    }
}

/// Drives a submission through its phases:
///
/// ```text
/// Idle -> CreatingTemporary -> AwaitingPayment -> Confirmed
/// CreatingTemporary --backend error--> Idle   (selections kept)
/// AwaitingPayment --cancel or failure--> Idle (temporary record discarded,
///                                              selections kept)
/// ```
///
/// `Confirmed` is terminal for the booking it concludes; the next
/// submission may start from it. While a submission is in flight
/// (`CreatingTemporary`/`AwaitingPayment`) further submissions are
/// rejected, which is the client-side half of the double-submit guard (the
/// UI disables its submit control off the same phase).
pub struct BookingOrchestrator {
    api: Arc<PortalApiClient>,
    payments: PaymentService,
    notifier: Arc<dyn BookingNotifier>,
    phase: BookingPhase,
    pending: Option<TempAppointment>,
}

impl BookingOrchestrator {
    pub fn new(config: &PortalConfig, notifier: Arc<dyn BookingNotifier>) -> Self {
        let api = Arc::new(PortalApiClient::new(config));
        Self {
            payments: PaymentService::with_client(Arc::clone(&api), config.payment_currency.clone()),
            api,
            notifier,
            phase: BookingPhase::Idle,
            pending: None,
        }
    }

    pub fn phase(&self) -> BookingPhase {
        self.phase
    }

    pub fn pending_appointment(&self) -> Option<&TempAppointment> {
        self.pending.as_ref()
    }

    /// Step one: create the unconfirmed appointment record. On success the
    /// orchestrator holds the temporary id and waits for the payment step.
    ///
    /// The patient id comes from the session, never from the caller, and
    /// the appointment time is the selected slot's own `start_time`
    /// verbatim, so the stored time cannot drift from the displayed slot.
    pub async fn submit(
        &mut self,
        selection: &BookingSelection,
        session: &Session,
    ) -> Result<TempAppointment, BookingError> {
        if !matches!(self.phase, BookingPhase::Idle | BookingPhase::Confirmed) {
            debug!("Submission rejected: booking already in phase {:?}", self.phase);
            return Err(BookingError::SubmissionInProgress);
        }

        let parts = match selection.complete() {
            Some(parts) => parts,
            None => {
                let err = validation_error(selection);
                self.notifier.notify_error(&err.to_string());
                return Err(err);
            }
        };

        self.phase = BookingPhase::CreatingTemporary;
        info!("Creating temporary appointment for patient {} with doctor {}",
              session.patient_id, parts.doctor.id);

        let total = pricing::compute_total(parts.medical_service, Some(parts.primary_service));
        let body = json!({
            "patient_id": session.patient_id,
            "doctor_id": parts.doctor.id,
            "medical_service_id": parts.medical_service.id,
            "primary_service_id": parts.primary_service.id,
            "slot_id": parts.slot.id,
            "appointment_date": parts.date,
            "appointment_time": parts.slot.start_time,
            "duration_minutes": parts.medical_service.duration_minutes,
            "amount": pricing::format_amount(total),
        });

        let mut headers = HeaderMap::new();
        headers.insert(
            "Idempotency-Key",
            HeaderValue::from_str(&Uuid::new_v4().to_string()).unwrap(),
        );

        let result: Value = match self.api.request_with_headers(
            Method::POST,
            "/api/v1/appointments/temporary",
            Some(&session.auth_token),
            Some(body),
            Some(headers),
        ).await {
            Ok(value) => value,
            Err(e) => {
                self.phase = BookingPhase::Idle;
                let err = BookingError::SubmissionFailed(e.to_string());
                self.notifier.notify_error(&err.to_string());
                return Err(err);
            }
        };

        let temp: TempAppointment = match serde_json::from_value(result) {
            Ok(temp) => temp,
            Err(e) => {
                self.phase = BookingPhase::Idle;
                let err = BookingError::ParseError(e.to_string());
                self.notifier.notify_error(&err.to_string());
                return Err(err);
            }
        };

        info!("Temporary appointment {} created, awaiting payment of {}", temp.id, temp.amount);
        self.pending = Some(temp.clone());
        self.phase = BookingPhase::AwaitingPayment;
        Ok(temp)
    }

    /// Step two: run the payment capability against the pending temporary
    /// appointment.
    ///
    /// Success confirms the appointment server-side, resets the selection
    /// and fires the success notification once. Closing the card step is
    /// not an error: the temporary record is discarded, selections stay so
    /// the user can retry, and no notification fires. Declines and
    /// transport failures discard the record and fire the error
    /// notification once.
    pub async fn complete_payment(
        &mut self,
        card: &dyn CardPaymentCapability,
        selection: &mut BookingSelection,
        session: &Session,
    ) -> Result<PaymentResolution, BookingError> {
        if self.phase != BookingPhase::AwaitingPayment {
            debug!("No payment pending in phase {:?}", self.phase);
            return Err(BookingError::NoPendingPayment);
        }
        let pending = match self.pending.clone() {
            Some(pending) => pending,
            None => return Err(BookingError::NoPendingPayment),
        };

        let intent = match self.payments
            .create_intent(pending.id, &pending.amount, &session.auth_token)
            .await
        {
            Ok(intent) => intent,
            Err(e) => return Err(self.fail_payment(e, &session.auth_token).await),
        };

        let outcome = match card.collect_card(&intent.client_secret, &pending.amount).await {
            Ok(outcome) => outcome,
            Err(e) => return Err(self.fail_payment(e, &session.auth_token).await),
        };

        match outcome {
            CardPaymentOutcome::Succeeded => {
                if let Err(e) = self.payments
                    .confirm(&intent.id, pending.id, &session.auth_token)
                    .await
                {
                    return Err(self.fail_payment(e, &session.auth_token).await);
                }

                self.pending = None;
                self.phase = BookingPhase::Confirmed;
                selection.reset();
                self.notifier.notify_success("Your appointment is booked");
                info!("Appointment {} confirmed", pending.id);

                Ok(PaymentResolution::Confirmed(BookingConfirmation {
                    appointment_id: pending.id,
                    amount: pending.amount,
                }))
            }
            CardPaymentOutcome::Declined { reason } => {
                Err(self.fail_payment(BookingError::PaymentFailed(reason), &session.auth_token).await)
            }
            CardPaymentOutcome::Cancelled => {
                info!("Payment step closed before completion, discarding temporary appointment {}",
                      pending.id);
                self.discard_pending(&session.auth_token).await;
                self.phase = BookingPhase::Idle;
                Ok(PaymentResolution::Cancelled)
            }
        }
    }

    /// The user closed the payment step before submitting a card. Same
    /// cleanup as a cancelled card interaction.
    pub async fn abandon_payment(&mut self, session: &Session) -> Result<(), BookingError> {
        if self.phase != BookingPhase::AwaitingPayment {
            return Err(BookingError::NoPendingPayment);
        }

        self.discard_pending(&session.auth_token).await;
        self.phase = BookingPhase::Idle;
        Ok(())
    }

    /// Shared failure path: discard the temporary record, return to Idle
    /// with selections untouched, and fire the error notification once.
    async fn fail_payment(&mut self, err: BookingError, auth_token: &str) -> BookingError {
        self.discard_pending(auth_token).await;
        self.phase = BookingPhase::Idle;
        self.notifier.notify_error(&err.to_string());
        err
    }

    /// Asks the backend to drop the temporary record. The backend also
    /// expires unconfirmed records on its own, so a failed discard is a
    /// diagnostic, not a user-facing error.
    async fn discard_pending(&mut self, auth_token: &str) {
        if let Some(pending) = self.pending.take() {
            let path = format!("/api/v1/appointments/temporary/{}", pending.id);
            let result: Result<Value, _> = self.api.request(
                Method::DELETE,
                &path,
                Some(auth_token),
                None,
            ).await;

            if let Err(e) = result {
                warn!("Failed to discard temporary appointment {}: {}", pending.id, e);
            }
        }
    }
}

fn validation_error(selection: &BookingSelection) -> BookingError {
    let missing = if selection.doctor().is_none() {
        "a doctor"
    } else if selection.primary_service().is_none() {
        "a visit type"
    } else if selection.medical_service().is_none() {
        "a medical service"
    } else if selection.date().is_none() {
        "a date"
    } else {
        "a time slot"
    };

    BookingError::ValidationError(format!("Please select {} before booking", missing))
}
