use async_trait::async_trait;
use log::{debug, error, info};
use std::time::Duration;

use super::protocol::{build_base_url, RestReply};
use crate::utils::error::JudoError;

#[async_trait]
pub trait RestTransport: Send + Sync {
    /// Issues one GET for `command` (a register code, or a write command string).
    async fn get(&self, command: &str) -> Result<RestReply, JudoError>;

    fn base_url(&self) -> &str;
}

pub struct JudoRestClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
}

impl JudoRestClient {
    pub fn new(
        host: &str,
        port: u16,
        username: &str,
        password: &str,
        timeout: Duration,
    ) -> Result<Self, JudoError> {
        let base_url = build_base_url(host, port);
        info!("🔌 Connecting to JUDO Connectivity Module at {}", base_url);
        info!("⚙️  Request timeout: {} ms", timeout.as_millis());

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| {
                error!("❌ Failed to build HTTP client: {}", e);
                JudoError::ConfigError(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            http,
            base_url,
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

#[async_trait]
impl RestTransport for JudoRestClient {
    async fn get(&self, command: &str) -> Result<RestReply, JudoError> {
        let url = format!("{}{}", self.base_url, command);
        debug!("📡 GET {}", url);

        let response = self
            .http
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(JudoError::from)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                JudoError::Timeout
            } else {
                JudoError::TransportError(format!("Failed to read response body: {}", e))
            }
        })?;

        debug!("📊 {} answered {} ({} bytes)", command, status, body.len());
        Ok(RestReply { status, body })
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
