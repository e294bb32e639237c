use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct PortalConfig {
    pub api_base_url: String,
    pub portal_api_key: String,
    pub payment_base_url: String,
    pub payment_publishable_key: String,
    pub payment_currency: String,
    pub session_file: String,
}

impl PortalConfig {
    pub fn from_env() -> Self {
        let config = Self {
            api_base_url: env::var("PORTAL_API_BASE_URL")
                .unwrap_or_else(|_| {
                    warn!("PORTAL_API_BASE_URL not set, using empty value");
                    String::new()
                }),
            portal_api_key: env::var("PORTAL_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("PORTAL_API_KEY not set, using empty value");
                    String::new()
                }),
            payment_base_url: env::var("PAYMENT_GATEWAY_BASE_URL")
                .unwrap_or_else(|_| {
                    warn!("PAYMENT_GATEWAY_BASE_URL not set, using default");
                    "https://api.stripe.com/v1".to_string()
                }),
            payment_publishable_key: env::var("PAYMENT_PUBLISHABLE_KEY")
                .unwrap_or_else(|_| {
                    warn!("PAYMENT_PUBLISHABLE_KEY not set, using empty value");
                    String::new()
                }),
            payment_currency: env::var("PAYMENT_CURRENCY")
                .unwrap_or_else(|_| "usd".to_string()),
            session_file: env::var("PORTAL_SESSION_FILE")
                .unwrap_or_else(|_| {
                    warn!("PORTAL_SESSION_FILE not set, using default");
                    ".carebook/session.json".to_string()
                }),
        };

        if !config.is_configured() {
            warn!("Portal not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.api_base_url.is_empty()
            && !self.portal_api_key.is_empty()
    }

    pub fn is_payments_configured(&self) -> bool {
        !self.payment_base_url.is_empty()
            && !self.payment_publishable_key.is_empty()
    }
}
