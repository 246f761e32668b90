use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

use super::traits::DeviceData;
use crate::codec::decode::{self, Measurement};
use crate::codec::register::RegisterCode;
use crate::codec::sensors::{find_sensor, SensorDescriptor, SENSORS};

/// Whether a snapshot reflects the most recent poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    /// The last cycle failed; the snapshot is from an earlier one.
    Stale,
}

/// Raw payloads of one complete poll cycle.
///
/// Only the hex strings are kept; every measurement is decoded again on
/// access so the payloads stay the single source of truth.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedSnapshot {
    timestamp: DateTime<Utc>,
    payloads: BTreeMap<RegisterCode, String>,
}

impl DecodedSnapshot {
    pub fn new(payloads: BTreeMap<RegisterCode, String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            payloads,
        }
    }

    pub fn raw(&self, register: RegisterCode) -> Option<&str> {
        self.payloads.get(&register).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }

    pub fn measurement(&self, key: &str) -> Option<Measurement> {
        let sensor = find_sensor(key)?;
        self.decode_sensor(sensor)
    }

    pub fn measurements(&self) -> Vec<(&'static SensorDescriptor, Option<Measurement>)> {
        SENSORS
            .iter()
            .map(|sensor| (sensor, self.decode_sensor(sensor)))
            .collect()
    }

    fn decode_sensor(&self, sensor: &SensorDescriptor) -> Option<Measurement> {
        self.raw(sensor.register).and_then(|raw| sensor.decode(raw))
    }

    pub fn device_type(&self) -> Option<&'static str> {
        self.raw(RegisterCode::DeviceType).and_then(decode::decode_device_type)
    }

    pub fn serial_number(&self) -> Option<String> {
        self.raw(RegisterCode::SerialNumber).and_then(decode::decode_serial_number)
    }

    pub fn software_version(&self) -> Option<String> {
        self.raw(RegisterCode::SoftwareVersion).and_then(decode::decode_software_version)
    }

    pub fn operating_hours(&self) -> Option<f64> {
        self.raw(RegisterCode::OperatingHours).and_then(decode::decode_operating_hours)
    }

    pub fn total_water_volume(&self) -> Option<f64> {
        self.raw(RegisterCode::TotalWaterVolume).and_then(decode::decode_total_water_volume)
    }

    pub fn salt_stock(&self) -> Option<f64> {
        self.raw(RegisterCode::Salt).and_then(decode::decode_salt_stock)
    }

    pub fn salt_range(&self) -> Option<u16> {
        self.raw(RegisterCode::Salt).and_then(decode::decode_salt_range)
    }

    pub fn water_hardness(&self) -> Option<u8> {
        self.raw(RegisterCode::WaterHardness).and_then(decode::decode_water_hardness)
    }
}

impl DeviceData for DecodedSnapshot {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn to_json(&self) -> Value {
        let mut measurements = Map::new();
        for (sensor, measurement) in self.measurements() {
            let value = measurement.map(|m| m.to_json()).unwrap_or(Value::Null);
            measurements.insert(sensor.key.to_string(), value);
        }

        let raw: Map<String, Value> = self
            .payloads
            .iter()
            .map(|(register, payload)| (register.code().to_string(), Value::String(payload.clone())))
            .collect();

        json!({
            "timestamp": self.timestamp.to_rfc3339(),
            "device": self.device_name(),
            "measurements": measurements,
            "raw": raw,
        })
    }

    fn get_all_measurements(&self) -> Vec<(&'static str, Option<Measurement>)> {
        self.measurements()
            .into_iter()
            .map(|(sensor, measurement)| (sensor.key, measurement))
            .collect()
    }

    fn device_name(&self) -> String {
        let model = self.device_type().unwrap_or(decode::UNKNOWN_DEVICE_TYPE);
        match self.serial_number() {
            Some(serial) => format!("{} #{}", model, serial),
            None => model.to_string(),
        }
    }
}
