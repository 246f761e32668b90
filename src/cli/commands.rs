use anyhow::{bail, Context};
use clap::{Arg, ArgMatches, Command};
use log::info;

use crate::codec::register::{RegisterCode, TRACKED_REGISTERS};
use crate::codec::sensors::{find_sensor, sensor_keys};
use crate::output::raw_sender::{RawDataFormat, RawDataSender};
use crate::services::DataService;

pub fn build_cli() -> Command {
    Command::new("judo_softwell")
        .version(crate::VERSION)
        .about("Reads and controls a JUDO SOFTwell softener through its Connectivity Module")
        .arg(Arg::new("config").long("config").short('c').value_name("FILE").help("TOML configuration file"))
        .arg(Arg::new("host").long("host").short('H').help("Connectivity Module host or IP"))
        .arg(Arg::new("port").long("port").short('p').help("REST port (default 8080)"))
        .arg(Arg::new("username").long("username").short('u').help("HTTP Basic auth user"))
        .arg(Arg::new("password").long("password").short('P').help("HTTP Basic auth password"))
        .arg(Arg::new("interval").long("interval").short('i').help("Poll interval in seconds, at least 30"))
        .arg(Arg::new("timeout-ms").long("timeout-ms").help("Per request timeout in milliseconds"))
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .value_parser(["console", "json", "csv"])
                .help("Output format"),
        )
        .arg(Arg::new("output-file").long("output-file").short('o').help("Also append output to this file"))
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .default_value("info")
                .help("Log filter used when RUST_LOG is not set"),
        )
        .subcommand(Command::new("probe").about("Check that the device answers and report its type"))
        .subcommand(Command::new("getdata").about("Read every register once and print the snapshot"))
        .subcommand(
            Command::new("getvalue")
                .about("Read once and print a single measurement")
                .arg(Arg::new("key").required(true).help("Measurement key, e.g. salt_stock")),
        )
        .subcommand(
            Command::new("getrawdata")
                .about("Dump raw register payloads without decoding")
                .arg(Arg::new("register").long("register").short('r').help("Register code, e.g. 5600"))
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .value_parser(["hex", "binary", "base64", "json", "debug"])
                        .default_value("debug"),
                )
                .arg(Arg::new("output").long("output").help("Write the dump to this file")),
        )
        .subcommand(
            Command::new("saltrefill")
                .about("Set the salt refill amount in kg (0 to 25)")
                .arg(Arg::new("kg").required(true).allow_negative_numbers(true)),
        )
        .subcommand(Command::new("monitor").about("Poll continuously until Ctrl-C (default)"))
        .subcommand(
            Command::new("initconfig")
                .about("Probe the device, then save the effective configuration")
                .arg(Arg::new("path").required(true)),
        )
}

/// Runs the one-shot subcommands. `Ok(false)` means none matched and the
/// caller should start monitoring.
pub async fn handle_subcommands(matches: &ArgMatches, service: &DataService) -> anyhow::Result<bool> {
    match matches.subcommand() {
        Some(("probe", _)) => {
            info!("🔍 Executing probe command...");
            let device_type = service.probe().await?;
            println!("✅ {} at {}", device_type, service.device().base_url());
            Ok(true)
        }

        Some(("getdata", _)) => {
            info!("🔍 Executing getdata command...");
            service.refresh().await?;
            service.print_snapshot().await?;
            Ok(true)
        }

        Some(("getvalue", sub)) => {
            let key = sub.get_one::<String>("key").map(String::as_str).unwrap_or_default();
            if find_sensor(key).is_none() {
                bail!("Unknown measurement '{}', available: {}", key, sensor_keys().join(", "));
            }
            info!("📈 Executing getvalue {}...", key);
            service.refresh().await?;
            service.print_parameter(key).await?;
            Ok(true)
        }

        Some(("getrawdata", sub)) => {
            info!("🔍 Executing getrawdata command...");
            let registers = match sub.get_one::<String>("register") {
                Some(code) => vec![code.parse::<RegisterCode>()?],
                None => TRACKED_REGISTERS.to_vec(),
            };
            let format = match sub.get_one::<String>("format") {
                Some(name) => name.parse::<RawDataFormat>()?,
                None => RawDataFormat::Debug,
            };

            let dumps = service.read_raw_registers(&registers).await?;
            match sub.get_one::<String>("output") {
                Some(path) => {
                    let sender = RawDataSender::new(path, format, true);
                    for dump in &dumps {
                        sender.send_raw_payload(dump).await?;
                    }
                }
                None => {
                    for dump in &dumps {
                        println!("{}", format.render(dump));
                    }
                }
            }
            Ok(true)
        }

        Some(("saltrefill", sub)) => {
            let raw = sub.get_one::<String>("kg").map(String::as_str).unwrap_or_default();
            let kg: f64 = raw
                .trim()
                .parse()
                .with_context(|| format!("'{}' is not a number of kilograms", raw))?;
            service.write_salt_refill(kg).await?;
            println!("✅ Salt refill set to {:.1} kg", kg);
            if let Some(snapshot) = service.status().snapshot() {
                if let Some(stock) = snapshot.salt_stock() {
                    println!("🧂 Device now reports {} kg in stock", stock);
                }
            }
            Ok(true)
        }

        Some(("initconfig", sub)) => {
            let path = sub.get_one::<String>("path").map(String::as_str).unwrap_or_default();
            let device_type = service
                .probe()
                .await
                .context("Device did not answer, configuration not saved")?;
            service.config().save_to_file(path)?;
            println!("✅ Found {}, configuration saved to {}", device_type, path);
            Ok(true)
        }

        _ => Ok(false),
    }
}
