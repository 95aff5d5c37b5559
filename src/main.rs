use anyhow::{Context, Result};
use clap::{Arg, Command};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod app;

use app::Application;
use composer_core::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("composer")
        .version("0.1.0")
        .about("Rack-scale composed node manager")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config/composer.toml"),
        )
        .get_matches();

    let config_path = matches
        .get_one::<String>("config")
        .context("missing config path")?;

    let config = AppConfig::load(config_path)?;
    init_logging(&config.log.level, &config.log.format)?;

    info!("starting composer");
    info!("configuration file: {config_path}");

    let app = Application::new(config).await?;
    app.run().await?;

    info!("composer stopped");
    Ok(())
}

fn init_logging(level: &str, format: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
    Ok(())
}
