use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use super::client::RestTransport;
use super::protocol::RestReply;
use crate::utils::error::JudoError;

#[derive(Debug, Clone)]
pub enum MockReply {
    Reply(RestReply),
    Refused,
    Hang(Duration),
}

impl MockReply {
    pub fn data(payload: &str) -> Self {
        MockReply::Reply(RestReply::new(200, format!(r#"{{"data":"{}"}}"#, payload)))
    }

    pub fn status(status: u16) -> Self {
        MockReply::Reply(RestReply::new(status, r#"{"error":"denied"}"#))
    }

    pub fn body(body: &str) -> Self {
        MockReply::Reply(RestReply::new(200, body))
    }
}

/// Scripted transport: a fixed reply per command, with every call recorded.
#[derive(Default)]
pub struct MockTransport {
    replies: Mutex<HashMap<String, MockReply>>,
    calls: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A device answering every tracked register with a plausible payload.
    pub fn healthy() -> Self {
        let mock = Self::new();
        mock.set("FF00", MockReply::data("47"));
        mock.set("0600", MockReply::data("00BC614E"));
        mock.set("0100", MockReply::data("000215"));
        mock.set("2500", MockReply::data("1E0A0500"));
        mock.set("2900", MockReply::data("78563412"));
        mock.set("5600", MockReply::data("0BB81400"));
        mock.set("5100", MockReply::data("0E"));
        mock
    }

    pub fn set(&self, command: &str, reply: MockReply) {
        self.replies.lock().unwrap().insert(command.to_string(), reply);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }
}

#[async_trait]
impl RestTransport for MockTransport {
    async fn get(&self, command: &str) -> Result<RestReply, JudoError> {
        self.calls.lock().unwrap().push(command.to_string());
        let reply = self.replies.lock().unwrap().get(command).cloned();
        match reply {
            Some(MockReply::Reply(reply)) => Ok(reply),
            Some(MockReply::Refused) => Err(JudoError::TransportError("connection refused".into())),
            Some(MockReply::Hang(delay)) => {
                tokio::time::sleep(delay).await;
                Ok(RestReply::new(200, r#"{"data":"00"}"#))
            }
            None => Ok(RestReply::new(404, "not found")),
        }
    }

    fn base_url(&self) -> &str {
        "http://mock:8080/api/rest/"
    }
}
