use chrono::Utc;
use dotenv::dotenv;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use booking_cell::services::pricing;
use booking_cell::services::AvailabilityService;
use directory_cell::services::CatalogService;
use shared_config::PortalConfig;
use shared_utils::session::FileSessionStore;

/// Read-only smoke run against the configured practice backend: loads the
/// stored session, walks the directory and resolves today's availability
/// for the first listed doctor. Booking itself stays in the portal shell.
#[tokio::main]
async fn main() {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Carebook portal smoke run");

    let config = PortalConfig::from_env();
    if !config.is_configured() {
        warn!("Backend not configured; set PORTAL_API_BASE_URL and PORTAL_API_KEY");
        return;
    }

    let session = match FileSessionStore::new(&config.session_file).load() {
        Ok(session) => session,
        Err(e) => {
            error!("No usable session: {}", e);
            return;
        }
    };
    info!("Running as patient {}", session.patient_id);

    let catalog = CatalogService::new(&config);
    let availability = AvailabilityService::new(&config);

    let doctors = match catalog.list_doctors(&session.auth_token).await {
        Ok(doctors) => doctors,
        Err(e) => {
            error!("Doctor directory unavailable: {}", e);
            return;
        }
    };
    info!("{} doctors available for booking", doctors.len());

    let doctor = match doctors.first() {
        Some(doctor) => doctor,
        None => {
            info!("Directory is empty, nothing further to check");
            return;
        }
    };

    let primary_services = match catalog.primary_services(&session.auth_token).await {
        Ok(services) => services,
        Err(e) => {
            error!("Primary services unavailable: {}", e);
            return;
        }
    };

    let medical_services = match catalog.medical_services(doctor.id, &session.auth_token).await {
        Ok(services) => services,
        Err(e) => {
            error!("Medical services unavailable for {}: {}", doctor.full_name(), e);
            return;
        }
    };

    // Per-option prices as the picker would show them, given the first
    // billing category on file.
    let selected_primary = primary_services.first();
    for service in &medical_services {
        info!(
            "{} - {} ({} min)",
            service.name,
            pricing::format_amount(pricing::option_price(service, selected_primary)),
            service.duration_minutes
        );
    }

    let today = Utc::now().date_naive();
    let service_id = medical_services.first().map(|service| service.id);
    match availability.resolve_slots(doctor.id, today, service_id, &session.auth_token).await {
        Ok(slots) if slots.is_empty() => {
            info!("{} has no availability today", doctor.full_name());
        }
        Ok(slots) => {
            info!(
                "{} has {} open slots today, first at {}",
                doctor.full_name(),
                slots.len(),
                slots[0].start_time
            );
        }
        Err(e) => {
            error!("Availability resolution failed: {}", e);
        }
    }
}
