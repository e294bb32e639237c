use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

/// A stored session with a decodable (unsigned) access token, shaped like
/// the file the sign-in screen persists. Signature verification is the
/// backend's job, so a static signature segment is enough for client tests.
pub struct TestSession {
    pub patient_id: Uuid,
    pub auth_token: String,
}

impl Default for TestSession {
    fn default() -> Self {
        let patient_id = Uuid::new_v4();
        Self {
            auth_token: Self::make_token(&patient_id.to_string(), 24),
            patient_id,
        }
    }
}

impl TestSession {
    pub fn expired() -> Self {
        let patient_id = Uuid::new_v4();
        Self {
            auth_token: Self::make_token(&patient_id.to_string(), -1),
            patient_id,
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "patient_id": self.patient_id,
            "auth_token": self.auth_token,
            "display_name": "Test Patient"
        })
    }

    pub fn make_token(sub: &str, exp_hours: i64) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours);

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": sub,
            "email": "patient@example.com",
            "role": "patient",
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = URL_SAFE_NO_PAD.encode(payload.to_string());
        let signature_encoded = URL_SAFE_NO_PAD.encode("test-signature");

        format!("{}.{}.{}", header_encoded, payload_encoded, signature_encoded)
    }
}

/// Canned backend bodies for wiremock tests, matching the practice API's
/// wire contracts.
pub struct MockPortalResponses;

impl MockPortalResponses {
    pub fn doctor_response(doctor_id: &str, first_name: &str, last_name: &str, specialization: &str) -> Value {
        json!({
            "id": doctor_id,
            "first_name": first_name,
            "last_name": last_name,
            "specialization": specialization
        })
    }

    pub fn primary_service_response(service_id: &str, name: &str, base_price: &str) -> Value {
        json!({
            "id": service_id,
            "name": name,
            "base_price": base_price
        })
    }

    pub fn medical_service_response(
        service_id: &str,
        doctor_id: &str,
        name: &str,
        base_price: &str,
        duration_minutes: i32,
    ) -> Value {
        json!({
            "id": service_id,
            "doctor_id": doctor_id,
            "name": name,
            "base_price": base_price,
            "duration_minutes": duration_minutes
        })
    }

    pub fn schedule_response(schedule_id: &str, doctor_id: &str, date: &str) -> Value {
        json!({
            "id": schedule_id,
            "doctor_id": doctor_id,
            "date": date,
            "start_time": "09:00:00",
            "end_time": "17:00:00"
        })
    }

    pub fn slot_response(slot_id: &str, schedule_id: &str, start_time: &str, end_time: &str) -> Value {
        json!({
            "id": slot_id,
            "schedule_id": schedule_id,
            "start_time": start_time,
            "end_time": end_time,
            "is_available": true
        })
    }

    pub fn day_availability_response(schedules: Vec<Value>, available_slots: Vec<Value>) -> Value {
        json!({
            "schedules": schedules,
            "available_slots": available_slots
        })
    }

    pub fn temp_appointment_response(appointment_id: &str, amount: &str) -> Value {
        json!({
            "id": appointment_id,
            "amount": amount,
            "status": "pending_payment"
        })
    }

    pub fn payment_intent_response(intent_id: &str) -> Value {
        json!({
            "id": intent_id,
            "client_secret": format!("{}_secret_test", intent_id)
        })
    }

    pub fn appointment_response(
        appointment_id: &str,
        patient_id: &str,
        doctor_id: &str,
        date: &str,
        time: &str,
        status: &str,
    ) -> Value {
        json!({
            "id": appointment_id,
            "patient_id": patient_id,
            "doctor_id": doctor_id,
            "medical_service_id": Uuid::new_v4(),
            "primary_service_id": Uuid::new_v4(),
            "slot_id": Uuid::new_v4(),
            "appointment_date": date,
            "appointment_time": time,
            "duration_minutes": 30,
            "amount": "100.00",
            "status": status,
            "created_at": Utc::now().to_rfc3339()
        })
    }
}
