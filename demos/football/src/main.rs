mod mode;

use clap::Parser;
use tracing::info;

use game_server::{KinematicPhysics, ServerConfig, TickLoop};

#[derive(Parser)]
#[command(name = "football", about = "Football game mode server")]
struct Args {
    /// Target ticks per second
    #[arg(short, long, default_value_t = 20.0)]
    tick_rate: f64,

    /// Stop after this many ticks (0 = run forever)
    #[arg(long, default_value_t = 0)]
    max_ticks: u64,
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
        ..ServerConfig::default()
    };

    let mut server = TickLoop::new(config, Box::new(KinematicPhysics::new()));
    mode::install(&mut server);

    info!(tick_rate = server.config().tick_rate, "kickoff");
    server.run().await;
    Ok(())
}
