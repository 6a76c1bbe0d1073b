use std::time::Duration;

use clap::Parser;
use tacgrid::prelude::*;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// tacgrid - N-in-a-row for up to eleven players over WebSocket
#[derive(Parser, Debug)]
#[command(name = "tacgrid-server")]
#[command(version)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = DEFAULT_BIND_ADDR)]
    bind: String,

    /// Number of player slots (at most 11)
    #[arg(long, default_value_t = RoomConfig::MAX_CAPACITY)]
    capacity: usize,

    /// Length of the straight run that wins
    #[arg(long, default_value_t = 5)]
    winning_length: usize,

    /// Seconds the winning board stays up before a new game starts
    #[arg(long, default_value_t = 5)]
    win_pause_secs: u64,
}

impl Args {
    fn room_config(&self) -> RoomConfig {
        RoomConfig {
            capacity: self.capacity,
            winning_length: self.winning_length,
            win_pause: Duration::from_secs(self.win_pause_secs),
            ..RoomConfig::default()
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing();

    let server = TacgridServerBuilder::new()
        .bind(&args.bind)
        .room_config(args.room_config())
        .build()
        .await?;
    let room = server.room();

    tracing::info!(
        addr = %server.local_addr()?,
        capacity = args.capacity,
        winning_length = args.winning_length,
        "starting tacgrid server"
    );

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupted, shutting down");
            let _ = room.shutdown().await;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_room_defaults() {
        let args = Args::parse_from(["tacgrid-server"]);
        assert_eq!(args.bind, "127.0.0.1:7777");
        assert_eq!(args.room_config(), RoomConfig::default());
    }

    #[test]
    fn test_flags_override_room_config() {
        let args = Args::parse_from([
            "tacgrid-server",
            "--capacity",
            "3",
            "--winning-length",
            "4",
            "--win-pause-secs",
            "1",
        ]);
        let config = args.room_config();
        assert_eq!(config.capacity, 3);
        assert_eq!(config.winning_length, 4);
        assert_eq!(config.win_pause, Duration::from_secs(1));
    }
}
