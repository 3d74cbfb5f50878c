//! Lobby client - command line entry point.
//!
//! Loads the configuration, wires the services for the configured profile
//! and prints one kind of lobby data.

use std::path::Path;

use anyhow::Context;
use tokio::runtime::Handle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lobby_client::{ClientConfig, Services};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    lobby_client::config::load_dotenv(Path::new("."));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lobby_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ClientConfig::from_env().context("Failed to load lobby client configuration")?;
    tracing::info!(profile = %config.profile, "Starting lobby client");

    let services = Services::for_profile(&config, Handle::current());
    let command = std::env::args().nth(1).unwrap_or_else(|| "leaderboards".into());

    match command.as_str() {
        "news" => {
            for item in services.lobby.get_news().await? {
                tracing::info!(title = %item.title, posted_at = %item.date, "News");
            }
        }
        "leaderboards" => {
            for leaderboard in services.leaderboard.get_leaderboards().await? {
                tracing::info!(
                    id = %leaderboard.id,
                    technical_name = %leaderboard.technical_name,
                    "Leaderboard"
                );
            }
        }
        "leagues" => {
            for league in services.leaderboard.get_leagues().await? {
                tracing::info!(technical_name = %league.technical_name, "League");
            }
        }
        other => anyhow::bail!(
            "Unknown command '{}', expected news, leaderboards or leagues",
            other
        ),
    }

    Ok(())
}
