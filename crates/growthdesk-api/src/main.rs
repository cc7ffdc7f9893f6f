use clap::Parser;
use growthdesk_api::Server;
use growthdesk_core::ConfigManager;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "growthdesk-api")]
#[command(author, version, about = "GrowthDesk ROI calculator and payments API", long_about = None)]
struct Cli {
    /// Directory holding default.toml, <env>.toml and local.toml
    #[arg(long, value_name = "DIR", env = "GROWTHDESK_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Environment overlay to load (development, staging, production, ...)
    #[arg(long)]
    env: Option<String>,

    #[arg(long)]
    host: Option<String>,

    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = ConfigManager::load(cli.config_dir, cli.env)?;
    if let Some(host) = cli.host {
        settings.server.host = host;
    }
    if let Some(port) = cli.port {
        settings.server.port = port;
    }
    settings.validate()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "growthdesk_api={level},growthdesk_integrations={level},growthdesk_core={level},tower_http={level}",
                    level = settings.logging.level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(env = %settings.env, "Configuration loaded");

    let server = Server::new(settings)?;
    server.run().await
}
