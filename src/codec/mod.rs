//! Register codec: hex payloads in, typed measurements out, and the salt refill encoding.
//!
//! Nothing in here performs I/O or keeps state.

pub mod decode;
pub mod encode;
pub mod payload;
pub mod register;
pub mod sensors;

pub use decode::{
    decode_device_type, decode_operating_hours, decode_salt_range, decode_salt_stock,
    decode_salt_stock_grams, decode_serial_number, decode_software_version,
    decode_total_water_volume, decode_water_hardness, Measurement,
};
pub use encode::{encode_salt_refill, salt_refill_command, SALT_REFILL_MAX_KG, SALT_REFILL_MIN_KG};
pub use payload::RawPayload;
pub use register::{RegisterCode, TRACKED_REGISTERS};
pub use sensors::{find_sensor, SensorDescriptor, SENSORS};
