use assert_matches::assert_matches;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use directory_cell::models::DirectoryError;
use directory_cell::services::CatalogService;
use shared_config::PortalConfig;
use shared_utils::test_utils::{MockPortalResponses, TestSession};

fn test_config(base_url: &str) -> PortalConfig {
    PortalConfig {
        api_base_url: base_url.to_string(),
        portal_api_key: "test-portal-key".to_string(),
        payment_base_url: "http://localhost:9999".to_string(),
        payment_publishable_key: "pk_test".to_string(),
        payment_currency: "usd".to_string(),
        session_file: "/tmp/session.json".to_string(),
    }
}

#[tokio::test]
async fn lists_doctors() {
    let mock_server = MockServer::start().await;
    let session = TestSession::default();
    let doctor_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/api/v1/doctors"))
        .and(header("x-portal-key", "test-portal-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockPortalResponses::doctor_response(&doctor_id, "Maya", "Okafor", "Dermatology")
        ])))
        .mount(&mock_server)
        .await;

    let catalog = CatalogService::new(&test_config(&mock_server.uri()));
    let doctors = catalog.list_doctors(&session.auth_token).await.unwrap();

    assert_eq!(doctors.len(), 1);
    assert_eq!(doctors[0].full_name(), "Maya Okafor");
    assert_eq!(doctors[0].specialization, "Dermatology");
}

#[tokio::test]
async fn medical_services_are_doctor_scoped() {
    let mock_server = MockServer::start().await;
    let session = TestSession::default();
    let doctor_id = Uuid::new_v4();
    let service_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path(format!("/api/v1/services/doctor/{}", doctor_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockPortalResponses::medical_service_response(
                &service_id,
                &doctor_id.to_string(),
                "General Consult",
                "100.00",
                30,
            )
        ])))
        .mount(&mock_server)
        .await;

    let catalog = CatalogService::new(&test_config(&mock_server.uri()));
    let services = catalog.medical_services(doctor_id, &session.auth_token).await.unwrap();

    assert_eq!(services.len(), 1);
    assert_eq!(services[0].doctor_id, doctor_id);
    assert_eq!(services[0].base_price, "100.00");
    assert_eq!(services[0].duration_minutes, 30);
}

#[tokio::test]
async fn primary_services_round_trip() {
    let mock_server = MockServer::start().await;
    let session = TestSession::default();

    Mock::given(method("GET"))
        .and(path("/api/v1/services/primary"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockPortalResponses::primary_service_response(&Uuid::new_v4().to_string(), "New Patient", "0.00"),
            MockPortalResponses::primary_service_response(&Uuid::new_v4().to_string(), "Follow Up", "30.00"),
        ])))
        .mount(&mock_server)
        .await;

    let catalog = CatalogService::new(&test_config(&mock_server.uri()));
    let services = catalog.primary_services(&session.auth_token).await.unwrap();

    assert_eq!(services.len(), 2);
    assert_eq!(services[1].name, "Follow Up");
}

#[tokio::test]
async fn missing_doctor_is_not_found() {
    let mock_server = MockServer::start().await;
    let session = TestSession::default();
    let doctor_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/api/v1/doctors/{}", doctor_id)))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "Doctor not found"
        })))
        .mount(&mock_server)
        .await;

    let catalog = CatalogService::new(&test_config(&mock_server.uri()));
    let result = catalog.get_doctor(doctor_id, &session.auth_token).await;

    assert_matches!(result, Err(DirectoryError::DoctorNotFound));
}

#[tokio::test]
async fn backend_failure_is_surfaced_not_swallowed() {
    let mock_server = MockServer::start().await;
    let session = TestSession::default();

    Mock::given(method("GET"))
        .and(path("/api/v1/doctors"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "message": "Upstream database unavailable"
        })))
        .mount(&mock_server)
        .await;

    let catalog = CatalogService::new(&test_config(&mock_server.uri()));
    let result = catalog.list_doctors(&session.auth_token).await;

    assert_matches!(result, Err(DirectoryError::FetchFailed(message)) => {
        assert!(message.contains("Upstream database unavailable"));
    });
}
