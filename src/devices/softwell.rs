use chrono::Utc;
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use super::snapshot::DecodedSnapshot;
use crate::codec::decode::{decode_device_type, UNKNOWN_DEVICE_TYPE};
use crate::codec::encode::salt_refill_command;
use crate::codec::register::RegisterCode;
use crate::rest::client::RestTransport;
use crate::rest::protocol::{extract_payload, RestReply};
use crate::utils::error::{ErrorKind, JudoError};

/// Client for one SOFTwell appliance behind a Connectivity Module.
pub struct SoftwellDevice {
    name: String,
    transport: Arc<dyn RestTransport>,
    timeout: Duration,
}

impl SoftwellDevice {
    pub fn new(name: String, transport: Arc<dyn RestTransport>, timeout: Duration) -> Self {
        Self {
            name,
            transport,
            timeout,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    async fn call(&self, command: &str) -> Result<RestReply, JudoError> {
        let reply = tokio::time::timeout(self.timeout, self.transport.get(command)).await??;
        reply.ensure_success()
    }

    /// Raw hex payload of one register.
    pub async fn fetch(&self, register: RegisterCode) -> Result<String, JudoError> {
        let result = match self.call(register.code()).await {
            Ok(reply) => extract_payload(&reply.body),
            Err(e) => Err(e),
        };

        match &result {
            Ok(payload) => debug!("📊 {} ({}) = {}", register, register.description(), payload),
            Err(e) if e.kind() == ErrorKind::Transport => {
                debug!("🔌 Transport failure reading {} from {}: {}", register, self.name, e)
            }
            Err(e) => debug!("📨 Protocol failure reading {} from {}: {}", register, self.name, e),
        }
        result
    }

    /// Reads all `registers` one after another. The first failure aborts the
    /// cycle and nothing fetched so far is returned.
    pub async fn fetch_all(&self, registers: &[RegisterCode]) -> Result<DecodedSnapshot, JudoError> {
        let mut payloads = BTreeMap::new();
        for &register in registers {
            let payload = self.fetch(register).await?;
            payloads.insert(register, payload);
        }
        Ok(DecodedSnapshot::new(payloads, Utc::now()))
    }

    /// Sends the salt refill amount. Out-of-range masses fail before any request is made.
    pub async fn write_salt_refill(&self, mass_kg: f64) -> Result<(), JudoError> {
        let command = salt_refill_command(mass_kg)?;
        info!("🧂 Setting salt refill on {} to {:.1} kg ({})", self.name, mass_kg, command);
        self.call(&command).await?;
        info!("✅ Salt refill accepted by {}", self.name);
        Ok(())
    }

    /// Connectivity check used before a configuration is saved; changes nothing.
    pub async fn probe(&self) -> Result<&'static str, JudoError> {
        let raw = self.fetch(RegisterCode::DeviceType).await?;
        let device_type = decode_device_type(&raw).ok_or_else(|| {
            JudoError::DecodeError(format!("Device type payload '{}' is not decodable", raw))
        })?;

        if device_type == UNKNOWN_DEVICE_TYPE {
            warn!("⚠️  {} answered with unrecognized device type '{}'", self.base_url(), raw);
        } else {
            info!("✅ Found {} at {}", device_type, self.base_url());
        }
        Ok(device_type)
    }
}
