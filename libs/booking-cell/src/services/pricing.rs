// libs/booking-cell/src/services/pricing.rs
//! Price composition for the booking flow.
//!
//! One implementation serves both call sites: the total submitted with the
//! temporary appointment and the per-option price shown next to each
//! candidate service in the picker. Keeping them on the same function is
//! what guarantees the displayed price equals what would be charged.

use directory_cell::models::{MedicalService, PrimaryService};

/// Prices arrive from the backend as strings. Anything that does not parse
/// to a finite number counts as zero; NaN must never reach the payment
/// request or the screen.
pub fn parse_price(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

fn normalize_service_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .collect()
}

/// "Follow Up", "follow-up" and "followup" all name the same encounter
/// category; only that category adds the primary service's price.
pub fn is_follow_up(primary: &PrimaryService) -> bool {
    normalize_service_name(&primary.name) == "followup"
}

/// Total chargeable amount for a medical service given the currently
/// selected primary service.
pub fn compute_total(medical: &MedicalService, primary: Option<&PrimaryService>) -> f64 {
    let base = parse_price(&medical.base_price);
    match primary {
        Some(p) if is_follow_up(p) => base + parse_price(&p.base_price),
        _ => base,
    }
}

/// Price shown next to a candidate service in the picker: what the total
/// would become if it were chosen. Delegates to [`compute_total`] so the
/// two can never diverge.
pub fn option_price(candidate: &MedicalService, selected_primary: Option<&PrimaryService>) -> f64 {
    compute_total(candidate, selected_primary)
}

/// Two-decimal rendering used in the submission payload and the payment
/// request.
pub fn format_amount(amount: f64) -> String {
    format!("{:.2}", amount)
}
