pub mod models;
pub mod selection;
pub mod services;

pub use models::*;
pub use selection::{BookingSelection, CompleteSelection};
pub use services::*;
