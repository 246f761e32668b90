use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::codec::decode::Measurement;

/// Read-only view of one poll result, as consumed by the formatters.
pub trait DeviceData: Send + Sync {
    fn timestamp(&self) -> DateTime<Utc>;

    fn to_json(&self) -> Value;

    /// Every exposed measurement in display order; `None` when the field could not be decoded.
    fn get_all_measurements(&self) -> Vec<(&'static str, Option<Measurement>)>;

    /// Same order as `get_all_measurements`, rendered with units.
    fn get_all_parameters(&self) -> Vec<(String, Option<String>)> {
        self.get_all_measurements()
            .into_iter()
            .map(|(key, measurement)| (key.to_string(), measurement.map(|m| m.to_string())))
            .collect()
    }

    fn device_name(&self) -> String;
}
