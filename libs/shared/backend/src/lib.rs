pub mod client;

pub use client::PortalApiClient;
