use anyhow::Result;
use log::info;

use judo_softwell::cli::{build_cli, handle_subcommands};
use judo_softwell::{Config, DataService};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = build_cli().get_matches();

    // RUST_LOG, when set, wins over --log-level
    let level = matches
        .get_one::<String>("log-level")
        .map(String::as_str)
        .unwrap_or("info");
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    info!("🚰 JUDO SOFTwell client v{}", judo_softwell::VERSION);

    let config = Config::from_matches(&matches)?;
    info!("🔌 Connectivity Module at {}", config.base_url());

    let service = DataService::new(config)?;
    if !handle_subcommands(&matches, &service).await? {
        service.run().await?;
    }
    Ok(())
}
