use serde::Deserialize;

use crate::error::PortalError;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub account: AccountConfig,
    pub courses: CoursesConfig,
    #[serde(default)]
    pub portal: PortalConfig,
    #[serde(default)]
    pub retry: RetryConfig,
}

impl AppConfig {
    /// Reject configs that cannot possibly run before any request is made.
    pub fn validate(&self) -> Result<(), PortalError> {
        if self.account.username.is_empty() || self.account.password.is_empty() {
            return Err(PortalError::Config(
                "account.username and account.password must be set".into(),
            ));
        }
        if self.courses.codes.iter().all(|c| c.trim().is_empty()) {
            return Err(PortalError::Config(
                "courses.codes must list at least one course code".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AccountConfig {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CoursesConfig {
    #[serde(default)]
    pub codes: Vec<String>,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PortalConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_accept")]
    pub accept: String,
    #[serde(default = "default_accept_language")]
    pub accept_language: String,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    #[serde(default = "default_success_marker")]
    pub success_marker: String,
    #[serde(default = "default_landing_marker")]
    pub landing_marker: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            accept: default_accept(),
            accept_language: default_accept_language(),
            connect_timeout_seconds: default_connect_timeout(),
            request_timeout_seconds: default_request_timeout(),
            success_marker: default_success_marker(),
            landing_marker: default_landing_marker(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetryConfig {
    #[serde(default = "default_auth_backoff_base_ms")]
    pub auth_backoff_base_ms: u64,
    #[serde(default = "default_auth_backoff_cap_ms")]
    pub auth_backoff_cap_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            auth_backoff_base_ms: default_auth_backoff_base_ms(),
            auth_backoff_cap_ms: default_auth_backoff_cap_ms(),
        }
    }
}

fn default_retry_delay_ms() -> u64 {
    2000
}
fn default_base_url() -> String {
    "http://dangkyhoc.vnu.edu.vn".into()
}
fn default_user_agent() -> String {
    "Mozilla/5.0".into()
}
fn default_accept() -> String {
    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".into()
}
fn default_accept_language() -> String {
    "en-US,en;q=0.5".into()
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_request_timeout() -> u64 {
    30
}
fn default_success_marker() -> String {
    "thành công".into()
}
fn default_landing_marker() -> String {
    "<title>Trang chủ".into()
}
fn default_auth_backoff_base_ms() -> u64 {
    500
}
fn default_auth_backoff_cap_ms() -> u64 {
    60_000
}
