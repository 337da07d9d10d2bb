use clap::Parser;
use tracing::info;

use game_server::{KinematicPhysics, ServerConfig, TickLoop};

#[derive(Parser)]
#[command(name = "game_server", about = "Authoritative multiplayer simulation server")]
struct Args {
    /// Target ticks per second
    #[arg(short, long, default_value_t = 20.0)]
    tick_rate: f64,

    /// Stop after this many ticks (0 = run forever)
    #[arg(long, default_value_t = 0)]
    max_ticks: u64,

    /// Maximum accepted chat message length in characters
    #[arg(long, default_value_t = 300)]
    max_chat_len: usize,

    /// Seconds after connect before the welcome tip is delivered
    #[arg(long, default_value_t = 5.0)]
    welcome_delay: f64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let config = ServerConfig {
        tick_rate: args.tick_rate,
        max_ticks: args.max_ticks,
        max_chat_len: args.max_chat_len,
        welcome_delay: args.welcome_delay,
        ..ServerConfig::default()
    };

    info!(
        tick_rate = config.tick_rate,
        max_ticks = config.max_ticks,
        "starting simulation server"
    );

    let mut server = TickLoop::new(config, Box::new(KinematicPhysics::new()));
    server.run().await;

    info!("server stopped");
    Ok(())
}
