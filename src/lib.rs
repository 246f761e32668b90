//! JUDO SOFTwell Connectivity Module client
//!
//! Decodes the softener's hex register payloads into measurements, reads them
//! over the module's REST interface and keeps the last complete snapshot for
//! consumers, along with the one supported write (salt refill amount).

pub mod cli;
pub mod codec;
pub mod config;
pub mod devices;
pub mod output;
pub mod rest;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use codec::{Measurement, RawPayload, RegisterCode, TRACKED_REGISTERS};
pub use config::Config;
pub use devices::{DecodedSnapshot, DeviceData, Freshness, SoftwellDevice};
pub use output::{ConsoleFormatter, CsvFormatter, DataFormatter, DataSender, JsonFormatter};
pub use rest::{JudoRestClient, RestTransport};
pub use services::{DataService, RefreshOutcome, SnapshotStatus};
pub use utils::error::JudoError;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
