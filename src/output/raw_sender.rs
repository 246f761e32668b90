use chrono::{DateTime, Utc};
use log::info;
use serde_json::json;
use std::fs::OpenOptions;
use std::io::Write;
use std::str::FromStr;
use tokio::fs;

use crate::codec::payload::RawPayload;
use crate::codec::register::RegisterCode;
use crate::utils::error::JudoError;

/// One register payload as received, for debugging the wire format.
#[derive(Debug, Clone)]
pub struct RawRegisterDump {
    pub register: RegisterCode,
    pub timestamp: DateTime<Utc>,
    pub hex_string: String,
}

impl RawRegisterDump {
    pub fn new(register: RegisterCode, hex_string: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            register,
            timestamp,
            hex_string,
        }
    }

    /// `None` if the device sent something that is not valid hex.
    pub fn bytes(&self) -> Option<Vec<u8>> {
        RawPayload::parse(&self.hex_string)
            .ok()
            .map(|payload| payload.bytes().to_vec())
    }

    pub fn to_base64(&self) -> Option<String> {
        self.bytes().map(|bytes| base64::encode(&bytes))
    }

    pub fn to_binary_string(&self) -> Option<String> {
        self.bytes().map(|bytes| {
            bytes
                .iter()
                .map(|b| format!("{:08b}", b))
                .collect::<Vec<String>>()
                .join(" ")
        })
    }

    pub fn debug_info(&self) -> String {
        let size = match self.bytes() {
            Some(bytes) => format!("{} bytes", bytes.len()),
            None => "invalid hex".to_string(),
        };
        format!(
            "Register {} ({})\n\
            Timestamp: {}\n\
            Payload Size: {}\n\
            Hex: {}\n\
            Base64: {}\n\
            Binary: {}\n",
            self.register,
            self.register.description(),
            self.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
            size,
            self.hex_string,
            self.to_base64().unwrap_or_default(),
            self.to_binary_string().unwrap_or_default(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawDataFormat {
    Hex,
    Binary,
    Base64,
    Json,
    Debug,
}

impl FromStr for RawDataFormat {
    type Err = JudoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hex" => Ok(RawDataFormat::Hex),
            "binary" => Ok(RawDataFormat::Binary),
            "base64" => Ok(RawDataFormat::Base64),
            "json" => Ok(RawDataFormat::Json),
            "debug" => Ok(RawDataFormat::Debug),
            other => Err(JudoError::ValidationError(format!("Unknown raw format '{}'", other))),
        }
    }
}

impl RawDataFormat {
    pub fn render(&self, dump: &RawRegisterDump) -> String {
        match self {
            RawDataFormat::Hex => format!(
                "{} | Register {} | Hex: {}",
                dump.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
                dump.register,
                dump.hex_string
            ),
            RawDataFormat::Binary => dump.to_binary_string().unwrap_or_default(),
            RawDataFormat::Base64 => dump.to_base64().unwrap_or_default(),
            RawDataFormat::Json => json!({
                "register": dump.register.code(),
                "description": dump.register.description(),
                "timestamp": dump.timestamp.to_rfc3339(),
                "hex": dump.hex_string,
                "base64": dump.to_base64(),
            })
            .to_string(),
            RawDataFormat::Debug => dump.debug_info(),
        }
    }
}

pub struct RawDataSender {
    file_path: String,
    format: RawDataFormat,
    append: bool,
}

impl RawDataSender {
    pub fn new(file_path: &str, format: RawDataFormat, append: bool) -> Self {
        Self {
            file_path: file_path.to_string(),
            format,
            append,
        }
    }

    pub async fn send_raw_payload(&self, dump: &RawRegisterDump) -> Result<(), JudoError> {
        match self.format {
            // actual bytes, not their text rendering
            RawDataFormat::Binary => {
                let bytes = dump.bytes().ok_or_else(|| {
                    JudoError::DecodeError(format!("Register {} payload is not hex", dump.register))
                })?;
                self.write_bytes(&bytes).await
            }
            format => {
                let content = format!("{}\n", format.render(dump));
                self.write_bytes(content.as_bytes()).await
            }
        }
    }

    async fn write_bytes(&self, content: &[u8]) -> Result<(), JudoError> {
        if self.append {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.file_path)
                .map_err(|e| JudoError::IoError(format!("File open error: {}", e)))?;

            file.write_all(content)
                .map_err(|e| JudoError::IoError(format!("File write error: {}", e)))?;
        } else {
            fs::write(&self.file_path, content)
                .await
                .map_err(|e| JudoError::IoError(format!("File write error: {}", e)))?;
        }

        info!("📝 Raw data written to: {}", self.file_path);
        Ok(())
    }
}
