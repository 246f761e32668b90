use super::decode::{self, Measurement};
use super::register::RegisterCode;

/// One exposed measurement: which register feeds it and how it is decoded.
#[derive(Clone, Copy)]
pub struct SensorDescriptor {
    pub key: &'static str,
    pub name: &'static str,
    pub register: RegisterCode,
    pub decode: fn(&str) -> Option<Measurement>,
}

impl SensorDescriptor {
    pub fn decode(&self, raw: &str) -> Option<Measurement> {
        (self.decode)(raw)
    }
}

/// Salt is fetched once and feeds both `salt_stock` and `salt_range`.
pub static SENSORS: &[SensorDescriptor] = &[
    SensorDescriptor {
        key: "device_type",
        name: "Device Type",
        register: RegisterCode::DeviceType,
        decode: device_type,
    },
    SensorDescriptor {
        key: "device_no",
        name: "Device Number",
        register: RegisterCode::SerialNumber,
        decode: serial_number,
    },
    SensorDescriptor {
        key: "sw_version",
        name: "Software Version",
        register: RegisterCode::SoftwareVersion,
        decode: software_version,
    },
    SensorDescriptor {
        key: "operating_hours",
        name: "Operating Hours",
        register: RegisterCode::OperatingHours,
        decode: operating_hours,
    },
    SensorDescriptor {
        key: "total_water_volume",
        name: "Total Water Volume",
        register: RegisterCode::TotalWaterVolume,
        decode: total_water_volume,
    },
    SensorDescriptor {
        key: "salt_stock",
        name: "Salt Stock",
        register: RegisterCode::Salt,
        decode: salt_stock,
    },
    SensorDescriptor {
        key: "salt_range",
        name: "Salt Range",
        register: RegisterCode::Salt,
        decode: salt_range,
    },
    SensorDescriptor {
        key: "water_hardness",
        name: "Water Hardness",
        register: RegisterCode::WaterHardness,
        decode: water_hardness,
    },
];

pub fn find_sensor(key: &str) -> Option<&'static SensorDescriptor> {
    SENSORS.iter().find(|sensor| sensor.key == key)
}

pub fn sensor_keys() -> Vec<&'static str> {
    SENSORS.iter().map(|sensor| sensor.key).collect()
}

fn device_type(raw: &str) -> Option<Measurement> {
    decode::decode_device_type(raw).map(|label| Measurement::Label(label.to_string()))
}

fn serial_number(raw: &str) -> Option<Measurement> {
    decode::decode_serial_number(raw).map(Measurement::Label)
}

fn software_version(raw: &str) -> Option<Measurement> {
    decode::decode_software_version(raw).map(Measurement::Label)
}

fn operating_hours(raw: &str) -> Option<Measurement> {
    decode::decode_operating_hours(raw).map(|value| Measurement::Float {
        value,
        unit: decode::UNIT_HOURS,
    })
}

fn total_water_volume(raw: &str) -> Option<Measurement> {
    decode::decode_total_water_volume(raw).map(|value| Measurement::Float {
        value,
        unit: decode::UNIT_CUBIC_METERS,
    })
}

fn salt_stock(raw: &str) -> Option<Measurement> {
    decode::decode_salt_stock(raw).map(|value| Measurement::Float {
        value,
        unit: decode::UNIT_KILOGRAMS,
    })
}

fn salt_range(raw: &str) -> Option<Measurement> {
    decode::decode_salt_range(raw).map(|days| Measurement::Integer {
        value: days as u64,
        unit: Some(decode::UNIT_DAYS),
    })
}

fn water_hardness(raw: &str) -> Option<Measurement> {
    decode::decode_water_hardness(raw).map(|hardness| Measurement::Integer {
        value: hardness as u64,
        unit: Some(decode::UNIT_GERMAN_HARDNESS),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::register::TRACKED_REGISTERS;

    #[test]
    fn test_every_tracked_register_feeds_a_sensor() {
        for register in TRACKED_REGISTERS {
            assert!(
                SENSORS.iter().any(|sensor| sensor.register == register),
                "register {} has no sensor",
                register
            );
        }
    }

    #[test]
    fn test_dispatch_through_table() {
        let stock = find_sensor("salt_stock").unwrap();
        assert_eq!(
            stock.decode("0BB81400"),
            Some(Measurement::Float { value: 3.0, unit: "kg" })
        );
        let range = find_sensor("salt_range").unwrap();
        assert_eq!(
            range.decode("0BB81400"),
            Some(Measurement::Integer { value: 20, unit: Some("d") })
        );
        assert_eq!(find_sensor("device_type").unwrap().decode("99"), Some(Measurement::Label("Unknown".into())));
        assert!(find_sensor("flow_rate").is_none());
    }

    #[test]
    fn test_keys_are_unique() {
        let mut keys = sensor_keys();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), SENSORS.len());
    }
}
