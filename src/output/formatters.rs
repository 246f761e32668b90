use chrono::Utc;
use serde_json::json;

use crate::codec::decode::Measurement;
use crate::devices::{DeviceData, Freshness};

const UNKNOWN: &str = "unknown";

pub trait DataFormatter: Send + Sync {
    fn format_header(&self) -> String;
    fn format_snapshot(&self, data: &dyn DeviceData, freshness: Freshness) -> String;
    fn format_parameter(&self, parameter: &str, value: Option<&Measurement>, freshness: Freshness) -> String;
    /// No poll cycle has succeeded yet.
    fn format_no_data(&self) -> String;
}

pub struct ConsoleFormatter;

impl DataFormatter for ConsoleFormatter {
    fn format_header(&self) -> String {
        format!("🚰 JUDO SOFTwell Data - {}\n", Utc::now().format("%Y-%m-%d %H:%M:%S"))
    }

    fn format_snapshot(&self, data: &dyn DeviceData, freshness: Freshness) -> String {
        let mut output = format!(
            "🔹 {} (polled {})\n",
            data.device_name(),
            data.timestamp().format("%Y-%m-%d %H:%M:%S UTC")
        );
        if freshness == Freshness::Stale {
            output.push_str("⚠️  Last poll failed, values below are from the previous cycle\n");
        }
        output.push_str(&"═".repeat(60));
        output.push('\n');

        for (name, value) in data.get_all_parameters() {
            output.push_str(&format!("{}: {}\n", name, value.as_deref().unwrap_or(UNKNOWN)));
        }
        output
    }

    fn format_parameter(&self, parameter: &str, value: Option<&Measurement>, freshness: Freshness) -> String {
        let marker = match freshness {
            Freshness::Fresh => "",
            Freshness::Stale => " (stale)",
        };
        let value = value.map(|m| m.to_string()).unwrap_or_else(|| UNKNOWN.to_string());
        format!("📈 {}: {}{}\n", parameter, value, marker)
    }

    fn format_no_data(&self) -> String {
        "❌ No data available yet, the device has not answered a full poll cycle\n".to_string()
    }
}

pub struct JsonFormatter;

impl DataFormatter for JsonFormatter {
    fn format_header(&self) -> String {
        String::new() // JSON doesn't need headers
    }

    fn format_snapshot(&self, data: &dyn DeviceData, freshness: Freshness) -> String {
        let result = json!({
            "stale": freshness == Freshness::Stale,
            "snapshot": data.to_json(),
        });
        serde_json::to_string_pretty(&result).unwrap_or_default()
    }

    fn format_parameter(&self, parameter: &str, value: Option<&Measurement>, freshness: Freshness) -> String {
        let result = json!({
            "parameter": parameter,
            "timestamp": Utc::now().timestamp(),
            "measurement": value.map(Measurement::to_json),
            "stale": freshness == Freshness::Stale,
        });
        serde_json::to_string_pretty(&result).unwrap_or_default()
    }

    fn format_no_data(&self) -> String {
        json!({ "stale": true, "snapshot": null }).to_string()
    }
}

pub struct CsvFormatter;

impl DataFormatter for CsvFormatter {
    fn format_header(&self) -> String {
        "Timestamp,Parameter,Value,Unit,Stale\n".to_string()
    }

    fn format_snapshot(&self, data: &dyn DeviceData, freshness: Freshness) -> String {
        let timestamp = data.timestamp().to_rfc3339();
        let stale = freshness == Freshness::Stale;
        let mut csv = String::new();

        for (name, measurement) in data.get_all_measurements() {
            csv.push_str(&csv_row(&timestamp, name, measurement.as_ref(), stale));
        }
        csv
    }

    fn format_parameter(&self, parameter: &str, value: Option<&Measurement>, freshness: Freshness) -> String {
        csv_row(&Utc::now().to_rfc3339(), parameter, value, freshness == Freshness::Stale)
    }

    fn format_no_data(&self) -> String {
        String::new()
    }
}

// absent measurements leave both value and unit empty
fn csv_row(timestamp: &str, name: &str, measurement: Option<&Measurement>, stale: bool) -> String {
    let value = measurement.map(Measurement::value_string).unwrap_or_default();
    let unit = measurement.and_then(Measurement::unit).unwrap_or_default();
    format!("{},{},{},{},{}\n", timestamp, name, value, unit, stale)
}

pub fn formatter_for(name: &str) -> Box<dyn DataFormatter> {
    match name {
        "json" => Box::new(JsonFormatter),
        "csv" => Box::new(CsvFormatter),
        _ => Box::new(ConsoleFormatter),
    }
}
