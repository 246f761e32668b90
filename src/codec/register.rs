use std::fmt;
use std::str::FromStr;

use crate::utils::error::JudoError;

/// Registers of the Connectivity Module REST API that this crate knows how to read.
///
/// The codes are fixed by the device firmware; salt (`5600`) doubles as the
/// prefix of the refill write command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RegisterCode {
    DeviceType,
    SerialNumber,
    SoftwareVersion,
    OperatingHours,
    TotalWaterVolume,
    Salt,
    WaterHardness,
}

/// Polled on every cycle, in this order.
pub const TRACKED_REGISTERS: [RegisterCode; 7] = [
    RegisterCode::DeviceType,
    RegisterCode::SerialNumber,
    RegisterCode::SoftwareVersion,
    RegisterCode::OperatingHours,
    RegisterCode::TotalWaterVolume,
    RegisterCode::Salt,
    RegisterCode::WaterHardness,
];

impl RegisterCode {
    pub const fn code(&self) -> &'static str {
        match self {
            RegisterCode::DeviceType => "FF00",
            RegisterCode::SerialNumber => "0600",
            RegisterCode::SoftwareVersion => "0100",
            RegisterCode::OperatingHours => "2500",
            RegisterCode::TotalWaterVolume => "2900",
            RegisterCode::Salt => "5600",
            RegisterCode::WaterHardness => "5100",
        }
    }

    pub const fn description(&self) -> &'static str {
        match self {
            RegisterCode::DeviceType => "device type",
            RegisterCode::SerialNumber => "device serial number",
            RegisterCode::SoftwareVersion => "software version",
            RegisterCode::OperatingHours => "operating hours",
            RegisterCode::TotalWaterVolume => "total water volume",
            RegisterCode::Salt => "salt stock and range",
            RegisterCode::WaterHardness => "water hardness",
        }
    }
}

impl fmt::Display for RegisterCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for RegisterCode {
    type Err = JudoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        TRACKED_REGISTERS
            .iter()
            .copied()
            .find(|register| register.code().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| JudoError::ValidationError(format!("Unknown register code: {}", s)))
    }
}
