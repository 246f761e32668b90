use std::fmt;

use crate::utils::error::JudoError;

/// Bytes of one register payload, decoded from the hex string the device sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPayload {
    bytes: Vec<u8>,
}

impl RawPayload {
    /// Rejects odd-length strings and non-hex characters.
    pub fn parse(hex_string: &str) -> Result<Self, JudoError> {
        let bytes = hex::decode(hex_string).map_err(|e| {
            JudoError::DecodeError(format!("Invalid register payload '{}': {}", hex_string, e))
        })?;
        Ok(Self { bytes })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The first `width` bytes, or `None` when the payload is shorter.
    pub fn prefix(&self, width: usize) -> Option<&[u8]> {
        self.bytes.get(..width)
    }

    pub fn to_hex_string(&self) -> String {
        hex::encode_upper(&self.bytes)
    }
}

impl fmt::Display for RawPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex_string())
    }
}
