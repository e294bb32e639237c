// libs/booking-cell/src/services/payment.rs
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_backend::PortalApiClient;
use shared_config::PortalConfig;

use crate::models::{BookingError, CardPaymentOutcome, PaymentIntent};

/// The gateway's hosted card-entry step. Opaque to this engine: it is given
/// the intent's client secret and reports how the interaction ended. The
/// portal shell implements it against the gateway's client library.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CardPaymentCapability: Send + Sync {
    async fn collect_card(
        &self,
        client_secret: &str,
        amount: &str,
    ) -> Result<CardPaymentOutcome, BookingError>;
}

/// Backend half of the payment protocol: intent creation before the card
/// step and server-side confirmation after it.
pub struct PaymentService {
    api: Arc<PortalApiClient>,
    currency: String,
}

impl PaymentService {
    pub fn new(config: &PortalConfig) -> Self {
        Self {
            api: Arc::new(PortalApiClient::new(config)),
            currency: config.payment_currency.clone(),
        }
    }

    pub fn with_client(api: Arc<PortalApiClient>, currency: String) -> Self {
        Self { api, currency }
    }

    pub async fn create_intent(
        &self,
        appointment_id: Uuid,
        amount: &str,
        auth_token: &str,
    ) -> Result<PaymentIntent, BookingError> {
        debug!("Creating payment intent for appointment {} ({} {})",
               appointment_id, amount, self.currency);

        let body = json!({
            "appointment_id": appointment_id,
            "amount": amount,
            "currency": self.currency,
        });

        let result: Value = self.api.request(
            Method::POST,
            "/api/v1/payments/intent",
            Some(auth_token),
            Some(body),
        ).await.map_err(|e| BookingError::PaymentFailed(e.to_string()))?;

        let intent: PaymentIntent = serde_json::from_value(result)
            .map_err(|e| BookingError::ParseError(e.to_string()))?;

        info!("Payment intent {} created for appointment {}", intent.id, appointment_id);
        Ok(intent)
    }

    pub async fn confirm(
        &self,
        payment_intent_id: &str,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<(), BookingError> {
        debug!("Confirming payment intent {} for appointment {}",
               payment_intent_id, appointment_id);

        let body = json!({
            "payment_intent_id": payment_intent_id,
            "appointment_id": appointment_id,
        });

        let _: Value = self.api.request(
            Method::POST,
            "/api/v1/payments/confirm",
            Some(auth_token),
            Some(body),
        ).await.map_err(|e| BookingError::PaymentFailed(e.to_string()))?;

        info!("Payment confirmed for appointment {}", appointment_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: &str) -> PortalConfig {
        PortalConfig {
            api_base_url: base_url.to_string(),
            portal_api_key: "test-portal-key".to_string(),
            payment_base_url: base_url.to_string(),
            payment_publishable_key: "pk_test".to_string(),
            payment_currency: "eur".to_string(),
            session_file: "/tmp/session.json".to_string(),
        }
    }

    #[tokio::test]
    async fn create_intent_sends_amount_and_currency() {
        let mock_server = MockServer::start().await;
        let appointment_id = Uuid::new_v4();

        Mock::given(method("POST"))
            .and(path("/api/v1/payments/intent"))
            .and(body_partial_json(json!({
                "appointment_id": appointment_id,
                "amount": "130.00",
                "currency": "eur"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "pi_123",
                "client_secret": "pi_123_secret_test"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let payments = PaymentService::new(&test_config(&mock_server.uri()));
        let intent = payments.create_intent(appointment_id, "130.00", "token").await.unwrap();

        assert_eq!(intent.id, "pi_123");
        assert_eq!(intent.client_secret, "pi_123_secret_test");
    }

    #[tokio::test]
    async fn gateway_decline_surfaces_backend_message() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/payments/confirm"))
            .respond_with(ResponseTemplate::new(402).set_body_json(json!({
                "message": "Card declined"
            })))
            .mount(&mock_server)
            .await;

        let payments = PaymentService::new(&test_config(&mock_server.uri()));
        let result = payments.confirm("pi_123", Uuid::new_v4(), "token").await;

        assert_matches!(result, Err(BookingError::PaymentFailed(message)) => {
            assert!(message.contains("Card declined"));
        });
    }

    #[tokio::test]
    async fn mocked_card_capability_reports_outcome() {
        let mut card = MockCardPaymentCapability::new();
        card.expect_collect_card()
            .withf(|secret, amount| secret == "pi_123_secret_test" && amount == "130.00")
            .times(1)
            .returning(|_, _| Ok(CardPaymentOutcome::Succeeded));

        let outcome = card.collect_card("pi_123_secret_test", "130.00").await.unwrap();
        assert_eq!(outcome, CardPaymentOutcome::Succeeded);
    }
}
