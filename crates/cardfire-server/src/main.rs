use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use cardfire::prelude::*;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "cardfire-server", version, about = "Runs a Cardfire game server")]
struct Cli {
    /// Address to accept WebSocket connections on.
    #[arg(long, env = "CARDFIRE_BIND", default_value = "0.0.0.0:8080")]
    bind: String,

    /// Directory holding one image file per card.
    #[arg(long, env = "CARDFIRE_CARDS_DIR", default_value = "./cards")]
    cards_dir: PathBuf,

    /// Seats per room, creator included.
    #[arg(long)]
    max_players: Option<usize>,

    /// Points every player starts a game with.
    #[arg(long)]
    starting_points: Option<i32>,
}

impl Cli {
    fn room_config(&self) -> RoomConfig {
        let mut config = RoomConfig::default();
        if let Some(max_players) = self.max_players {
            config.max_players = max_players.max(1);
        }
        if let Some(points) = self.starting_points {
            config.starting_points = points;
        }
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let catalog = AssetCatalog::load_dir(&cli.cards_dir)
        .await
        .with_context(|| format!("loading cards from {}", cli.cards_dir.display()))?;

    let server = CardfireServer::builder()
        .bind(&cli.bind)
        .room_config(cli.room_config())
        .build(Arc::new(catalog))
        .await
        .with_context(|| format!("binding {}", cli.bind))?;

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("ctrl-c received");
        })
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["cardfire-server"]);
        assert_eq!(cli.cards_dir, PathBuf::from("./cards"));
        assert_eq!(cli.room_config(), RoomConfig::default());
    }

    #[test]
    fn test_cli_overrides_room_config() {
        let cli = Cli::parse_from([
            "cardfire-server",
            "--bind",
            "127.0.0.1:9000",
            "--max-players",
            "3",
            "--starting-points",
            "10",
        ]);
        assert_eq!(cli.bind, "127.0.0.1:9000");
        let config = cli.room_config();
        assert_eq!(config.max_players, 3);
        assert_eq!(config.starting_points, 10);
    }
}
