mod conf;
mod config;
mod console;
mod host;
mod message;
mod module;
mod modules;
mod services;
mod util;

use std::path::Path;
use std::sync::Arc;

use conf::ConfTable;
use config::Config;
use host::{ConsoleNetwork, Host, LogAudit, SystemClock};
use services::Services;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "connavg.toml".to_string());

    let path = Path::new(&config_path);
    if !path.exists() {
        eprintln!("Config file not found: {}", config_path);
        eprintln!("Copy the example and edit it:");
        eprintln!("  cp config.example.toml connavg.toml");
        std::process::exit(1);
    }

    let config = Config::load(path)?;
    log::info!("Loaded config from {} ({})", config_path, config.server.name);

    let host = Host::new(
        Arc::new(SystemClock),
        Arc::new(ConsoleNetwork),
        Arc::new(LogAudit),
    );

    let conf = ConfTable::new();
    let registry = modules::build_registry(&config, &conf, host.now());
    log::info!(
        "Registered {} module(s), {} conf item(s)",
        registry.all().len(),
        conf.len()
    );

    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    tokio::spawn(async move {
        if let Err(e) = console::run(tx).await {
            log::error!("Console error: {}", e);
        }
    });

    let services = Services::new(config, conf, registry, host).with_config_path(path.to_path_buf());
    services.run(rx).await
}
