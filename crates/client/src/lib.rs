use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, USER_AGENT};
use tracing::{debug, warn};
use url::Url;

use coursegrab_core::config::PortalConfig;
use coursegrab_core::{PortalError, Transport};

/// One login→logout portal session.
///
/// The cookie jar lives and dies with this value: the portal ties both
/// the anti-forgery token and the login state to the session cookies, so
/// every response's cookies are replayed on every following request.
/// Each round builds a fresh client; nothing is shared process-wide.
pub struct SessionClient {
    client: reqwest::Client,
}

impl SessionClient {
    pub fn new(portal: &PortalConfig) -> Result<Self, PortalError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, header_value(&portal.user_agent)?);
        headers.insert(ACCEPT, header_value(&portal.accept)?);
        headers.insert(ACCEPT_LANGUAGE, header_value(&portal.accept_language)?);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .connect_timeout(Duration::from_secs(portal.connect_timeout_seconds))
            .timeout(Duration::from_secs(portal.request_timeout_seconds))
            .build()
            .map_err(|e| PortalError::Network(e.to_string()))?;

        Ok(Self { client })
    }

    async fn read_body(url: &Url, resp: reqwest::Response) -> Result<String, PortalError> {
        let status = resp.status();
        if !status.is_success() {
            warn!(url = %url, status = status.as_u16(), "portal returned non-success status");
            return Err(PortalError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        resp.text()
            .await
            .map_err(|e| PortalError::Network(e.to_string()))
    }
}

fn header_value(raw: &str) -> Result<HeaderValue, PortalError> {
    HeaderValue::from_str(raw)
        .map_err(|e| PortalError::Config(format!("invalid header value {raw:?}: {e}")))
}

#[async_trait]
impl Transport for SessionClient {
    async fn get(&self, url: &Url) -> Result<String, PortalError> {
        debug!(url = %url, "GET");
        let resp = self.client.get(url.as_str()).send().await.map_err(|e| {
            warn!(url = %url, error = %e, "GET failed");
            PortalError::Network(e.to_string())
        })?;
        Self::read_body(url, resp).await
    }

    async fn post_form(&self, url: &Url, body: &str) -> Result<String, PortalError> {
        debug!(url = %url, body_len = body.len(), "POST");
        let resp = self
            .client
            .post(url.as_str())
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body.to_string())
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "POST failed");
                PortalError::Network(e.to_string())
            })?;
        Self::read_body(url, resp).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_from_default_portal_config() {
        assert!(SessionClient::new(&PortalConfig::default()).is_ok());
    }

    #[test]
    fn rejects_unencodable_header_values() {
        let portal = PortalConfig {
            user_agent: "bad\nagent".into(),
            ..PortalConfig::default()
        };
        assert!(matches!(
            SessionClient::new(&portal),
            Err(PortalError::Config(_))
        ));
    }
}
