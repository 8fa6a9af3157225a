//! Gridduel HTTP server.

use anyhow::Result;
use clap::Parser;
use gridduel::{GameConfig, GameManager};
use gridduel_server::{Cli, router};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let games = GameManager::new(config);

    let listener = tokio::net::TcpListener::bind((cli.host.as_str(), cli.port)).await?;
    info!(host = %cli.host, port = cli.port, "Server ready at http://{}:{}/", cli.host, cli.port);

    axum::serve(listener, router(games)).await?;
    Ok(())
}

#[instrument]
fn load_config(path: Option<&std::path::Path>) -> Result<GameConfig> {
    match path {
        Some(path) => Ok(GameConfig::from_file(path)?),
        None => {
            info!("No config file given, using the classic 3x3 board");
            Ok(GameConfig::default())
        }
    }
}
