use serde_json::Value;

use crate::utils::error::JudoError;

pub const API_PATH: &str = "/api/rest/";
pub const PAYLOAD_FIELD: &str = "data";

/// Status and body of one REST call, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestReply {
    pub status: u16,
    pub body: String,
}

impl RestReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Fails with `HttpStatus` for anything outside 2xx.
    pub fn ensure_success(self) -> Result<Self, JudoError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(JudoError::HttpStatus(self.status))
        }
    }
}

/// Pulls the hex payload string out of a `{"data": "..."}` response body.
pub fn extract_payload(body: &str) -> Result<String, JudoError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| JudoError::ProtocolError(format!("Response is not JSON: {}", e)))?;

    match value.get(PAYLOAD_FIELD) {
        Some(Value::String(payload)) => Ok(payload.trim().to_string()),
        Some(other) => Err(JudoError::ProtocolError(format!(
            "Field '{}' is not a string: {}",
            PAYLOAD_FIELD, other
        ))),
        None => Err(JudoError::ProtocolError(format!(
            "Response has no '{}' field",
            PAYLOAD_FIELD
        ))),
    }
}

/// `http://{host}:{port}/api/rest/`; a scheme or trailing slash on `host` is tolerated.
pub fn build_base_url(host: &str, port: u16) -> String {
    let host = host.trim();
    let (scheme, rest) = match host.split_once("://") {
        Some((scheme, rest)) => (scheme.to_ascii_lowercase(), rest),
        None => ("http".to_string(), host),
    };
    let rest = rest.trim_end_matches('/');
    let authority = match rest.rsplit_once(':') {
        // an explicit port in the host wins over the configured one
        Some((_, explicit)) if explicit.parse::<u16>().is_ok() => rest.to_string(),
        _ => format!("{}:{}", rest, port),
    };
    format!("{}://{}{}", scheme, authority, API_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_payload() {
        assert_eq!(extract_payload(r#"{"data":"0BB81400"}"#).unwrap(), "0BB81400");
        assert_eq!(extract_payload(r#"{"data":"47","status":"ok"}"#).unwrap(), "47");
    }

    #[test]
    fn test_extract_payload_protocol_errors() {
        for body in [r#"{"value":"47"}"#, r#"{"data":47}"#, "<html>busy</html>", "", "[]"] {
            assert!(
                matches!(extract_payload(body), Err(JudoError::ProtocolError(_))),
                "body {:?}",
                body
            );
        }
    }

    #[test]
    fn test_status_check() {
        assert!(RestReply::new(204, "").ensure_success().is_ok());
        assert!(matches!(
            RestReply::new(401, "").ensure_success(),
            Err(JudoError::HttpStatus(401))
        ));
    }

    #[test]
    fn test_build_base_url() {
        assert_eq!(build_base_url("192.168.1.20", 8080), "http://192.168.1.20:8080/api/rest/");
        assert_eq!(build_base_url("http://192.168.1.20/", 8080), "http://192.168.1.20:8080/api/rest/");
        assert_eq!(build_base_url("https://judo.local", 443), "https://judo.local:443/api/rest/");
        assert_eq!(build_base_url("judo.local:9000", 8080), "http://judo.local:9000/api/rest/");
    }
}
