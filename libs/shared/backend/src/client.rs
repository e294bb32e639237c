use anyhow::{Result, anyhow};
use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION},
    Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::PortalConfig;

pub struct PortalApiClient {
    client: Client,
    base_url: String,
    portal_key: String,
}

impl PortalApiClient {
    pub fn new(config: &PortalConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.api_base_url.clone(),
            portal_key: config.portal_api_key.clone(),
        }
    }

    fn get_headers(&self, auth_token: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert("x-portal-key", HeaderValue::from_str(&self.portal_key).unwrap());
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = auth_token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
            );
        }

        headers
    }

    pub async fn request<T>(&self, method: Method, path: &str,
                            auth_token: Option<&str>, body: Option<Value>)
                            -> Result<T>
    where T: DeserializeOwned {
        self.request_with_headers(method, path, auth_token, body, None).await
    }

    pub async fn request_with_headers<T>(&self, method: Method, path: &str,
                                         auth_token: Option<&str>, body: Option<Value>,
                                         extra_headers: Option<HeaderMap>)
                                         -> Result<T>
    where T: DeserializeOwned {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making request to {}", url);

        let mut headers = self.get_headers(auth_token);
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url)
            .headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("Portal API error ({}): {}", status, error_text);

            let message = extract_backend_message(&error_text)
                .unwrap_or_else(|| error_text.clone());

            return Err(match status.as_u16() {
                401 | 403 => anyhow!("Authentication error: {}", message),
                404 => anyhow!("Resource not found: {}", message),
                _ => anyhow!("{}", message),
            });
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }
}

/// The backend wraps failures as `{"message": "..."}` (sometimes `"error"`).
/// Callers surface that text verbatim, so dig it out before falling back to
/// the raw body.
fn extract_backend_message(body: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(body).ok()?;
    parsed.get("message")
        .or_else(|| parsed.get("error"))
        .and_then(|m| m.as_str())
        .map(|m| m.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_message_field() {
        let body = r#"{"message": "Slot no longer available"}"#;
        assert_eq!(extract_backend_message(body), Some("Slot no longer available".to_string()));
    }

    #[test]
    fn extracts_error_field_when_message_absent() {
        let body = r#"{"error": "Doctor not found"}"#;
        assert_eq!(extract_backend_message(body), Some("Doctor not found".to_string()));
    }

    #[test]
    fn non_json_body_yields_none() {
        assert_eq!(extract_backend_message("<html>502</html>"), None);
    }
}
