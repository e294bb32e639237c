pub mod availability;
pub mod history;
pub mod orchestrator;
pub mod payment;
pub mod pricing;

pub use availability::AvailabilityService;
pub use history::HistoryService;
pub use orchestrator::{BookingNotifier, BookingOrchestrator, TracingNotifier};
pub use payment::{CardPaymentCapability, PaymentService};
