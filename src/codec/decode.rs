//! Decode rules for the individual registers.
//!
//! Every rule validates the hex string and its own minimum width first and
//! answers `None` when either check fails. Byte order differs between
//! registers and is part of each rule.

use serde_json::{json, Value};
use std::fmt;

use super::payload::RawPayload;

pub const UNKNOWN_DEVICE_TYPE: &str = "Unknown";

const DEVICE_TYPES: [(u8, &str); 5] = [
    (0x34, "SOFTwell P"),
    (0x35, "SOFTwell S"),
    (0x36, "SOFTwell K"),
    (0x47, "SOFTwell KP"),
    (0x48, "SOFTwell KS"),
];

pub const UNIT_CUBIC_METERS: &str = "m³";
pub const UNIT_KILOGRAMS: &str = "kg";
pub const UNIT_HOURS: &str = "h";
pub const UNIT_DAYS: &str = "d";
pub const UNIT_GERMAN_HARDNESS: &str = "°dH";

/// A decoded register value with its engineering unit.
#[derive(Debug, Clone, PartialEq)]
pub enum Measurement {
    Float { value: f64, unit: &'static str },
    Integer { value: u64, unit: Option<&'static str> },
    Label(String),
}

impl Measurement {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Measurement::Float { value, .. } => Some(*value),
            Measurement::Integer { value, .. } => Some(*value as f64),
            Measurement::Label(_) => None,
        }
    }

    pub fn unit(&self) -> Option<&'static str> {
        match self {
            Measurement::Float { unit, .. } => Some(unit),
            Measurement::Integer { unit, .. } => *unit,
            Measurement::Label(_) => None,
        }
    }

    /// The bare value without unit; CSV output puts the unit in its own column.
    pub fn value_string(&self) -> String {
        match self {
            Measurement::Float { value, .. } => value.to_string(),
            Measurement::Integer { value, .. } => value.to_string(),
            Measurement::Label(label) => label.clone(),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Measurement::Float { value, unit } => json!({ "value": value, "unit": unit }),
            Measurement::Integer { value, unit } => json!({ "value": value, "unit": unit }),
            Measurement::Label(label) => json!({ "value": label }),
        }
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Measurement::Float { value, unit } => write!(f, "{} {}", value, unit),
            Measurement::Integer { value, unit: Some(unit) } => write!(f, "{} {}", value, unit),
            Measurement::Integer { value, unit: None } => write!(f, "{}", value),
            Measurement::Label(label) => f.write_str(label),
        }
    }
}

fn leading<const N: usize>(raw: &str) -> Option<[u8; N]> {
    let payload = RawPayload::parse(raw).ok()?;
    payload.prefix(N)?.try_into().ok()
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// `FF00`: one byte mapped through the model table; unmapped codes are "Unknown".
pub fn decode_device_type(raw: &str) -> Option<&'static str> {
    let [code] = leading::<1>(raw)?;
    Some(device_type_label(code))
}

pub fn device_type_label(code: u8) -> &'static str {
    DEVICE_TYPES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, label)| *label)
        .unwrap_or(UNKNOWN_DEVICE_TYPE)
}

/// `0600`: the whole payload as a big-endian unsigned integer.
pub fn decode_serial_number(raw: &str) -> Option<String> {
    let payload = RawPayload::parse(raw).ok()?;
    if payload.len() < 2 || payload.len() > 16 {
        return None;
    }
    let value = payload
        .bytes()
        .iter()
        .fold(0u128, |acc, &byte| (acc << 8) | byte as u128);
    Some(value.to_string())
}

/// `0100`: byte 1 is the major, byte 2 the minor version.
pub fn decode_software_version(raw: &str) -> Option<String> {
    let [_, major, minor] = leading::<3>(raw)?;
    Some(format!("{}.{:02}", major, minor))
}

/// `2500`: minutes, hours, then days as little-endian u16. Result in hours.
pub fn decode_operating_hours(raw: &str) -> Option<f64> {
    let [minutes, hours, days_lo, days_hi] = leading::<4>(raw)?;
    let days = u16::from_le_bytes([days_lo, days_hi]) as f64;
    let total = days * 24.0 + hours as f64 + minutes as f64 / 60.0;
    Some(round_to(total, 1))
}

/// `2900`: liters as a byte-swapped u32, reported in cubic meters.
pub fn decode_total_water_volume(raw: &str) -> Option<f64> {
    let bytes = leading::<4>(raw)?;
    let liters = u32::from_le_bytes(bytes);
    Some(liters as f64 / 1000.0)
}

/// `5600` bytes 0-1: salt stock in grams, big-endian.
pub fn decode_salt_stock_grams(raw: &str) -> Option<u16> {
    let bytes = leading::<2>(raw)?;
    Some(u16::from_be_bytes(bytes))
}

/// Salt stock in kilograms.
pub fn decode_salt_stock(raw: &str) -> Option<f64> {
    decode_salt_stock_grams(raw).map(|grams| grams as f64 / 1000.0)
}

/// `5600` bytes 2-3: days of salt range left, little-endian.
pub fn decode_salt_range(raw: &str) -> Option<u16> {
    let [_, _, lo, hi] = leading::<4>(raw)?;
    Some(u16::from_le_bytes([lo, hi]))
}

/// `5100`: first byte in °dH.
pub fn decode_water_hardness(raw: &str) -> Option<u8> {
    let [hardness] = leading::<1>(raw)?;
    Some(hardness)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_type() {
        assert_eq!(decode_device_type("34"), Some("SOFTwell P"));
        assert_eq!(decode_device_type("48"), Some("SOFTwell KS"));
        assert_eq!(decode_device_type("99"), Some(UNKNOWN_DEVICE_TYPE));
        assert_eq!(decode_device_type(""), None);
        assert_eq!(decode_device_type("X4"), None);
    }

    #[test]
    fn test_serial_number_is_big_endian() {
        assert_eq!(decode_serial_number("0102").as_deref(), Some("258"));
        assert_eq!(decode_serial_number("00BC614E").as_deref(), Some("12345678"));
        assert_eq!(decode_serial_number("01"), None);
    }

    #[test]
    fn test_software_version_pads_minor() {
        assert_eq!(decode_software_version("000205").as_deref(), Some("2.05"));
        assert_eq!(decode_software_version("00030F00").as_deref(), Some("3.15"));
        assert_eq!(decode_software_version("0002"), None);
    }

    #[test]
    fn test_operating_hours() {
        assert_eq!(decode_operating_hours("1E0A0500"), Some(130.5));
        // 20 minutes rounds to one decimal
        assert_eq!(decode_operating_hours("14000000"), Some(0.3));
        // days are little-endian: 0x0100 = 256 days
        assert_eq!(decode_operating_hours("00000001"), Some(6144.0));
        assert_eq!(decode_operating_hours("1E0A05"), None);
    }

    #[test]
    fn test_total_water_volume_is_byte_swapped() {
        assert_eq!(decode_total_water_volume("78563412"), Some(305419.896));
        assert_eq!(decode_total_water_volume("E8030000"), Some(1.0));
        assert_eq!(decode_total_water_volume("785634"), None);
        assert_eq!(decode_total_water_volume("7856341G"), None);
    }

    #[test]
    fn test_salt_register_serves_two_fields() {
        let raw = "0BB80014";
        assert_eq!(decode_salt_stock_grams(raw), Some(3000));
        assert_eq!(decode_salt_stock(raw), Some(3.0));
        // Range bytes are read little-endian, as the register table documents.
        // The protocol notes also give "0BB80014" as a 20 day example, which
        // only holds for a big-endian read. Here it is 5120 days and the
        // little-endian "0BB81400" is the 20 day payload.
        // TODO: settle the byte order against a 5600 reply captured from a real device.
        assert_eq!(decode_salt_range(raw), Some(0x1400));
        assert_eq!(decode_salt_range("0BB81400"), Some(20));
    }

    #[test]
    fn test_salt_short_payloads() {
        assert_eq!(decode_salt_range("0BB8"), None);
        assert_eq!(decode_salt_stock("0BB8"), Some(3.0));
        assert_eq!(decode_salt_stock("0B"), None);
    }

    #[test]
    fn test_water_hardness() {
        assert_eq!(decode_water_hardness("0E"), Some(14));
        assert_eq!(decode_water_hardness("0E00FF"), Some(14));
        assert_eq!(decode_water_hardness("E"), None);
    }

    #[test]
    fn test_measurement_display() {
        let volume = Measurement::Float { value: 1.5, unit: UNIT_CUBIC_METERS };
        assert_eq!(volume.to_string(), "1.5 m³");
        let count = Measurement::Integer { value: 7, unit: None };
        assert_eq!(count.to_string(), "7");
        assert_eq!(count.as_f64(), Some(7.0));
        assert_eq!(Measurement::Label("SOFTwell K".into()).as_f64(), None);
    }
}
