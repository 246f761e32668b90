pub mod client;
pub mod protocol;
#[cfg(test)]
pub mod mock;

pub use client::{JudoRestClient, RestTransport};
pub use protocol::{build_base_url, extract_payload, RestReply};
