#[cfg(not(feature = "std"))]
fn main() {}

#[cfg(feature = "std")]
use std::sync::Arc;

#[cfg(feature = "std")]
use battleship_royale::{
    init_logging, Autopilot, ClientConfig, HttpSessionApi, InMemorySessionServer, MatchSummary, PlayerId,
    SessionController, DEFAULT_SERVER_URL,
};
#[cfg(feature = "std")]
use clap::Parser;
#[cfg(feature = "std")]
use rand::rngs::SmallRng;
#[cfg(feature = "std")]
use rand::SeedableRng;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[cfg(feature = "std")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
#[cfg(feature = "std")]
enum Commands {
    /// Two autopilots play each other through an in-process session server.
    Local {
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
        #[arg(long, default_value_t = 10)]
        rows: usize,
        #[arg(long, default_value_t = 10)]
        cols: usize,
        #[arg(long, default_value_t = 100)]
        max_attacks: usize,
    },
    /// One autopilot joins a session on a remote server.
    Remote {
        #[arg(long, default_value = DEFAULT_SERVER_URL)]
        server: String,
        #[arg(long, default_value = "autopilot")]
        name: String,
        #[arg(long, help = "Reuse a player id instead of generating one")]
        player_id: Option<String>,
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
        #[arg(long, default_value_t = 200)]
        max_attacks: usize,
    },
}

#[cfg(feature = "std")]
fn autopilot(seed: Option<u64>) -> Autopilot {
    match seed {
        Some(s) => Autopilot::seeded(s),
        None => Autopilot::new(SmallRng::from_rng(&mut rand::rng())),
    }
}

#[cfg(feature = "std")]
fn print_summary(summary: &MatchSummary) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(summary)?);
    Ok(())
}

#[cfg(feature = "std")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Local {
            seed,
            rows,
            cols,
            max_attacks,
        } => {
            if let Some(s) = seed {
                println!("Using fixed seed: {} (placements and targets will be reproducible)", s);
            }
            let server = InMemorySessionServer::new(rows, cols);
            let config = ClientConfig {
                battle_rows: rows,
                battle_cols: cols,
                ..ClientConfig::fast()
            };

            let mut first = SessionController::new(Arc::new(server.clone()), PlayerId::new("player-one"), config.clone());
            let mut second = SessionController::new(Arc::new(server.clone()), PlayerId::new("player-two"), config);
            let mut pilot1 = autopilot(seed);
            let mut pilot2 = autopilot(seed.map(|s| s.wrapping_add(1)));

            let (summary1, summary2) = tokio::try_join!(
                pilot1.run(&mut first, "Player One", max_attacks),
                pilot2.run(&mut second, "Player Two", max_attacks),
            )?;
            first.leave().await?;
            second.leave().await?;

            print_summary(&summary1)?;
            print_summary(&summary2)?;
        }
        Commands::Remote {
            server,
            name,
            player_id,
            seed,
            max_attacks,
        } => {
            println!("Joining session at {} as {:?}...", server, name);
            let api = Arc::new(HttpSessionApi::new(server)?);
            let config = ClientConfig::default();
            let mut controller = match player_id {
                Some(id) => SessionController::new(api, PlayerId::new(id), config),
                None => SessionController::with_random_id(api, config),
            };
            let mut pilot = autopilot(seed);
            let result = pilot.run(&mut controller, &name, max_attacks).await;
            if let Err(e) = controller.leave().await {
                eprintln!("Leaving the session failed: {}", e);
            }
            print_summary(&result?)?;
        }
    }
    Ok(())
}
